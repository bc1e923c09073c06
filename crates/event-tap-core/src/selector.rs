//! Simple selectors used as delegation filters.
//!
//! Supported forms: `tag`, `*`, `#id`, `.class` and compounds such as
//! `li.item.selected` or `button#ok`. Combinators are not supported.

use crate::node::{NodeData, NodeId, NodeTree};
use crate::{CoreError, CoreResult};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    pub fn parse(input: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty selector"));
        }

        let mut selector = Selector::default();
        let tag_len = next_marker(trimmed);
        let tag = &trimmed[..tag_len];
        if !tag.is_empty() && tag != "*" {
            if !is_ident(tag) {
                return Err(invalid("unsupported character in tag"));
            }
            selector.tag = Some(tag.to_ascii_lowercase());
        }

        let mut rest = &trimmed[tag_len..];
        while let Some(marker) = rest.chars().next() {
            // markers are ASCII, so slicing past one byte is safe
            rest = &rest[1..];
            let len = next_marker(rest);
            let name = &rest[..len];
            if name.is_empty() {
                return Err(invalid("missing name after '#' or '.'"));
            }
            if !is_ident(name) {
                return Err(invalid("unsupported character in name"));
            }
            if marker == '#' {
                if selector.id.is_some() {
                    return Err(invalid("more than one id"));
                }
                selector.id = Some(name.to_string());
            } else {
                selector.classes.push(name.to_string());
            }
            rest = &rest[len..];
        }

        Ok(selector)
    }

    pub fn matches(&self, node: &NodeData) -> bool {
        if let Some(tag) = &self.tag {
            if node.tag() != tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.id() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|class| node.has_class(class))
    }
}

impl FromStr for Selector {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{tag}")?,
            None if self.id.is_none() && self.classes.is_empty() => write!(f, "*")?,
            None => {}
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        Ok(())
    }
}

fn next_marker(s: &str) -> usize {
    s.find(['#', '.']).unwrap_or(s.len())
}

fn is_ident(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Delegation filter: a selector or an arbitrary predicate over the tree.
#[derive(Clone)]
pub enum Filter {
    Selector(Selector),
    Predicate(Rc<dyn Fn(&NodeTree, NodeId) -> bool>),
}

impl Filter {
    pub fn predicate(f: impl Fn(&NodeTree, NodeId) -> bool + 'static) -> Self {
        Filter::Predicate(Rc::new(f))
    }

    pub fn matches(&self, tree: &NodeTree, node: NodeId) -> bool {
        match self {
            Filter::Selector(selector) => tree.get(node).is_some_and(|data| selector.matches(data)),
            Filter::Predicate(f) => f(tree, node),
        }
    }
}

impl From<Selector> for Filter {
    fn from(selector: Selector) -> Self {
        Filter::Selector(selector)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Selector(selector) => write!(f, "Filter({selector})"),
            Filter::Predicate(_) => write!(f, "Filter(<predicate>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let selector = Selector::parse("LI.item.selected").unwrap();
        assert_eq!(selector.to_string(), "li.item.selected");

        let selector: Selector = "#ok".parse().unwrap();
        assert_eq!(selector.to_string(), "#ok");
        assert_eq!(Selector::parse("*").unwrap().to_string(), "*");
    }

    #[test]
    fn test_parse_rejects_unsupported_forms() {
        for input in ["", "   ", "ul li", "a#", ".", "#a#b", "div>p"] {
            assert!(
                matches!(Selector::parse(input), Err(CoreError::InvalidSelector { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_matches_node() {
        let mut tree = NodeTree::new();
        let node = tree.create_element("li");
        tree.add_class(node, "item").unwrap();
        tree.set_id(node, "first").unwrap();
        let data = tree.get(node).unwrap();

        assert!(Selector::parse("li").unwrap().matches(data));
        assert!(Selector::parse(".item").unwrap().matches(data));
        assert!(Selector::parse("li#first.item").unwrap().matches(data));
        assert!(!Selector::parse("li.other").unwrap().matches(data));
        assert!(!Selector::parse("button").unwrap().matches(data));
    }

    #[test]
    fn test_predicate_filter() {
        let mut tree = NodeTree::new();
        let root = tree.create_element("div");
        let child = tree.create_element("span");
        tree.append_child(root, child).unwrap();

        let has_parent = Filter::predicate(|tree, node| tree.parent(node).is_some());
        assert!(has_parent.matches(&tree, child));
        assert!(!has_parent.matches(&tree, root));
    }
}
