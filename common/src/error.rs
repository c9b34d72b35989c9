use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a selection run.
///
/// Per-probe failures never show up here; the prober absorbs them and simply
/// records no latency for the address.
#[derive(Error, Debug)]
pub enum CleanIpError {
    #[error("no JSON files found in {}", .0.display())]
    NotFound(PathBuf),

    #[error("group '{0}' has no members to select from")]
    EmptyGroup(String),

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("failed to open raw ICMP socket: {0}")]
    Socket(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CleanIpError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanIpError>;
