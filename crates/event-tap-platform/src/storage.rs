//! Recording storage and persistence.

use crate::{PlatformError, PlatformResult, RawInputEvent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A named sequence of raw input events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub name: String,
    pub events: Vec<RawInputEvent>,
}

/// Get the app data directory for event-tap.
pub fn get_app_data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("event-tap")
}

/// Get the recordings directory.
pub fn get_recordings_dir() -> PathBuf {
    get_app_data_dir().join("recordings")
}

/// Ensure `dir` exists.
pub fn ensure_dir(dir: &Path) -> PlatformResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        info!(?dir, "Created recordings directory");
    }
    Ok(())
}

/// Save a recording into `dir`.
pub fn save_recording_in(dir: &Path, recording: &Recording) -> PlatformResult<PathBuf> {
    ensure_dir(dir)?;
    let path = recording_path(dir, &recording.name);

    let json = serde_json::to_string_pretty(recording)?;
    fs::write(&path, json)?;

    info!(?path, events = recording.events.len(), "Saved recording");
    Ok(path)
}

/// Load a recording from `dir` by name.
pub fn load_recording_in(dir: &Path, name: &str) -> PlatformResult<Recording> {
    let path = recording_path(dir, name);
    if !path.exists() {
        return Err(PlatformError::NotFound(name.to_string()));
    }
    load_recording_file(&path)
}

/// Load a recording from an explicit file path.
pub fn load_recording_file(path: &Path) -> PlatformResult<Recording> {
    if !path.exists() {
        return Err(PlatformError::NotFound(path.display().to_string()));
    }

    let json = fs::read_to_string(path)?;
    let recording: Recording = serde_json::from_str(&json)?;

    debug!(?path, "Loaded recording");
    Ok(recording)
}

/// Delete a recording from `dir`.
pub fn delete_recording_in(dir: &Path, name: &str) -> PlatformResult<()> {
    let path = recording_path(dir, name);
    if !path.exists() {
        return Err(PlatformError::NotFound(name.to_string()));
    }

    fs::remove_file(&path)?;
    info!(?path, "Deleted recording");
    Ok(())
}

/// List recording names in `dir`, sorted.
pub fn list_recordings_in(dir: &Path) -> PlatformResult<Vec<String>> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "json") {
            if let Some(name) = path.file_stem() {
                names.push(name.to_string_lossy().to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

fn recording_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", sanitize_filename(name)))
}

/// Sanitize a recording name to be a valid filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}
