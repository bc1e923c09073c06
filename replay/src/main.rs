//! Replays a recorded input sequence and prints each tap as a JSON line.
//!
//! Usage: `event-tap-replay <recording> [--config <config.yaml>] [--store <dir>]`
//!
//! `<recording>` is a JSON file path, or the name of a recording saved in
//! the store directory.

use clap::Parser;
use event_tap_core::{
    load_config, load_config_or_default, EventDispatcher, NodeId, Point, TapConfig, TapGesture,
    TAP,
};
use event_tap_platform::{
    get_app_data_dir, get_recordings_dir, init_input_mode, load_recording_file, load_recording_in,
    open_input_feed, EventPump, PlatformError, PlatformResult, PointerTranslator, Recording,
};
use serde::Serialize;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Replay recorded input and print every tap")]
struct Args {
    /// Recording file, or the name of a stored recording.
    recording: PathBuf,

    /// YAML config file. Defaults to `config.yaml` in the app data directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of stored recordings.
    #[arg(long)]
    store: Option<PathBuf>,
}

/// One printed tap.
#[derive(Debug, Serialize)]
struct TapLine {
    page: Point,
    client: Point,
    target: Option<NodeId>,
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "event_tap_replay=info,event_tap_core=info,event_tap_platform=info".into()
            }),
        )
        .try_init();
}

/// An explicit config must load; the implicit one falls back to defaults.
fn resolve_config(explicit: Option<&Path>) -> PlatformResult<TapConfig> {
    match explicit {
        Some(path) => Ok(load_config(path)?),
        None => Ok(load_config_or_default(get_app_data_dir().join("config.yaml"))),
    }
}

fn resolve_recording(recording: &Path, store: &Path) -> PlatformResult<Recording> {
    if recording.is_file() {
        return load_recording_file(recording);
    }
    let name = recording.to_string_lossy();
    debug!(%name, ?store, "Looking up stored recording");
    load_recording_in(store, &name)
}

fn run(args: &Args) -> PlatformResult<usize> {
    let config = resolve_config(args.config.as_deref())?;
    let store = args.store.clone().unwrap_or_else(get_recordings_dir);
    let recording = resolve_recording(&args.recording, &store)?;
    let mode = init_input_mode(&config);
    info!(name = %recording.name, events = recording.events.len(), ?mode, "Replaying");

    let mut dispatcher = EventDispatcher::new();
    TapGesture::new(mode).install(&mut dispatcher);
    let root = dispatcher.tree_mut().create_element("body");

    let taps = Rc::new(Cell::new(0usize));
    let counter = taps.clone();
    let subscription = dispatcher.subscribe(root, TAP, move |_, event| {
        counter.set(counter.get() + 1);
        let line = TapLine {
            page: event.page,
            client: event.client,
            target: event.current_target,
        };
        match serde_json::to_string(&line) {
            Ok(json) => println!("{json}"),
            Err(e) => warn!("Failed to encode tap: {}", e),
        }
    });

    let (feed, input) = open_input_feed(config.feed_capacity.max(1));
    let mut pump = EventPump::new(input, PointerTranslator::new(config.scroll_offset));
    for event in recording.events {
        match feed.send(event.clone()) {
            Err(PlatformError::FeedFull) => {
                pump.pump(&mut dispatcher, root);
                feed.send(event)?;
            }
            other => other?,
        }
    }
    drop(feed);
    pump.run_until_closed(&mut dispatcher, root);

    dispatcher.detach(subscription);
    Ok(taps.get())
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(taps) => {
            info!(taps, "Replay finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Replay failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_tap_core::MouseButton;
    use event_tap_platform::{save_recording_in, InputEventType, RawInputEvent};
    use std::fs;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "event-tap-replay-{}-{}",
            label,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn mouse_config(dir: &Path) -> PathBuf {
        let path = dir.join("config.yaml");
        fs::write(&path, "input_mode: mouse\n").unwrap();
        path
    }

    fn click(x: f64, y: f64) -> Recording {
        let position = Some(Point::new(x, y));
        let event = |event| RawInputEvent {
            timestamp_ms: 0,
            event,
        };
        Recording {
            name: "click".into(),
            events: vec![
                event(InputEventType::MouseDown {
                    position,
                    button: MouseButton::Left,
                }),
                event(InputEventType::MouseUp {
                    position,
                    button: MouseButton::Left,
                }),
            ],
        }
    }

    #[test]
    fn test_parse_args() {
        let args =
            Args::try_parse_from(["event-tap-replay", "taps.json", "--config", "tap.yaml"])
                .unwrap();
        assert_eq!(args.recording, PathBuf::from("taps.json"));
        assert_eq!(args.config, Some(PathBuf::from("tap.yaml")));
        assert_eq!(args.store, None);

        assert!(Args::try_parse_from(["event-tap-replay"]).is_err());
        assert!(Args::try_parse_from(["event-tap-replay", "a.json", "b.json"]).is_err());
        assert!(Args::try_parse_from(["event-tap-replay", "a.json", "--config"]).is_err());
        assert!(Args::try_parse_from(["event-tap-replay", "--verbose", "a.json"]).is_err());
    }

    #[test]
    fn test_replay_stored_recording_by_name() {
        let dir = scratch_dir("stored");
        save_recording_in(&dir, &click(5.0, 5.0)).unwrap();

        let args = Args {
            recording: PathBuf::from("click"),
            config: Some(mouse_config(&dir)),
            store: Some(dir.clone()),
        };
        assert_eq!(run(&args).unwrap(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_replay_recording_file() {
        let dir = scratch_dir("file");
        let path = save_recording_in(&dir, &click(7.0, 3.0)).unwrap();

        let args = Args {
            recording: path,
            config: Some(mouse_config(&dir)),
            store: Some(dir.join("empty")),
        };
        assert_eq!(run(&args).unwrap(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_recording_fails() {
        let dir = scratch_dir("missing");
        let args = Args {
            recording: PathBuf::from("nothing-here"),
            config: Some(mouse_config(&dir)),
            store: Some(dir.clone()),
        };
        assert!(matches!(run(&args), Err(PlatformError::NotFound(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = scratch_dir("config");
        save_recording_in(&dir, &click(1.0, 1.0)).unwrap();
        let args = Args {
            recording: PathBuf::from("click"),
            config: Some(dir.join("absent.yaml")),
            store: Some(dir.clone()),
        };
        assert!(matches!(run(&args), Err(PlatformError::Config(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}
