//! # Scan Result Discovery
//!
//! Locates the scan-result file a run works on: the most recently modified
//! `*.json` file inside the configured search directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use cleanip_common::debug;
use cleanip_common::error::{CleanIpError, Result};

const RESULT_EXTENSION: &str = "json";

/// Returns the newest `*.json` file directly inside `dir`.
///
/// Subdirectories are not searched. A missing directory and a directory without
/// any JSON file both yield [`CleanIpError::NotFound`].
pub fn latest_json_file(dir: &Path) -> Result<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CleanIpError::NotFound(dir.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !is_result_file(&path) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        debug!("candidate result file {} (modified {modified:?})", path.display());

        let is_newer = newest.as_ref().is_none_or(|(seen, _)| modified >= *seen);
        if is_newer {
            newest = Some((modified, path));
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or_else(|| CleanIpError::NotFound(dir.to_path_buf()))
}

fn is_result_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(RESULT_EXTENSION))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
