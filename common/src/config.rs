//! # Run Configuration
//!
//! Everything a selection run needs is read once from a JSON file at start-up.
//! Missing fields fall back to their defaults; the key names of the older
//! `Threshold1` / `Threshold2` / `SearchDirectory` layout are accepted as aliases.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CleanIpError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

const DEFAULT_LOW_THRESHOLD: f64 = 50.0;
const DEFAULT_HIGH_THRESHOLD: f64 = 100.0;
const DEFAULT_SEARCH_DIRECTORY: &str = "results";
const DEFAULT_MAX_GROUP_SIZE: usize = 5;
const DEFAULT_PROBE_ATTEMPTS: u32 = 3;
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1_000;
const DEFAULT_PROBE_CONCURRENCY: usize = 64;
const DEFAULT_OUTPUT_PATH: &str = "output.txt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lowest acceptable mean round-trip time in milliseconds (inclusive).
    #[serde(alias = "Threshold1")]
    pub low_threshold: f64,

    /// Highest acceptable mean round-trip time in milliseconds (inclusive).
    #[serde(alias = "Threshold2")]
    pub high_threshold: f64,

    /// Directory holding the scan results; the newest `*.json` file is used.
    #[serde(alias = "SearchDirectory")]
    pub search_directory: PathBuf,

    /// Upper bound on how many addresses of one subnet group get probed.
    pub max_group_size: usize,

    /// Echo requests sent to every address.
    pub probe_attempts: u32,

    /// How long a single echo request may wait for its reply.
    pub probe_timeout_ms: u64,

    /// Addresses probed at the same time.
    pub probe_concurrency: usize,

    /// Optional deadline for the whole probing stage.
    pub run_timeout_ms: Option<u64>,

    /// Where the comma-separated selection is written.
    pub output_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            search_directory: PathBuf::from(DEFAULT_SEARCH_DIRECTORY),
            max_group_size: DEFAULT_MAX_GROUP_SIZE,
            probe_attempts: DEFAULT_PROBE_ATTEMPTS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
            run_timeout_ms: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl Config {
    /// Reads and validates the configuration stored at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CleanIpError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CleanIpError::config(format!("malformed configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.low_threshold.is_finite() || !self.high_threshold.is_finite() {
            return Err(CleanIpError::config("thresholds must be finite numbers"));
        }
        if self.low_threshold < 0.0 {
            return Err(CleanIpError::config("low_threshold cannot be negative"));
        }
        if self.low_threshold > self.high_threshold {
            return Err(CleanIpError::config(format!(
                "low_threshold ({}) is greater than high_threshold ({})",
                self.low_threshold, self.high_threshold
            )));
        }
        if self.max_group_size == 0 {
            return Err(CleanIpError::config("max_group_size must be at least 1"));
        }
        if self.probe_attempts == 0 {
            return Err(CleanIpError::config("probe_attempts must be at least 1"));
        }
        if self.probe_timeout_ms == 0 {
            return Err(CleanIpError::config("probe_timeout_ms must be at least 1"));
        }
        if self.probe_concurrency == 0 {
            return Err(CleanIpError::config("probe_concurrency must be at least 1"));
        }
        if self.run_timeout_ms == Some(0) {
            return Err(CleanIpError::config("run_timeout_ms must be at least 1"));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_ms.map(Duration::from_millis)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_uses_defaults() {
        let cfg = Config::from_json_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.low_threshold, 50.0);
        assert_eq!(cfg.high_threshold, 100.0);
        assert_eq!(cfg.max_group_size, 5);
        assert_eq!(cfg.probe_timeout(), Duration::from_millis(1_000));
        assert!(cfg.run_timeout().is_none());
    }

    #[test]
    fn legacy_key_names_are_accepted() {
        let cfg = Config::from_json_str(
            r#"{ "Threshold1": 20, "Threshold2": 80, "SearchDirectory": "/tmp/scans" }"#,
        )
        .unwrap();
        assert_eq!(cfg.low_threshold, 20.0);
        assert_eq!(cfg.high_threshold, 80.0);
        assert_eq!(cfg.search_directory, PathBuf::from("/tmp/scans"));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = Config::from_json_str(r#"{ "low_threshold": 90, "high_threshold": 10 }"#)
            .unwrap_err();
        assert!(matches!(err, CleanIpError::Config { .. }));
    }

    #[test]
    fn zero_sized_settings_are_rejected() {
        for json in [
            r#"{ "max_group_size": 0 }"#,
            r#"{ "probe_attempts": 0 }"#,
            r#"{ "probe_timeout_ms": 0 }"#,
            r#"{ "probe_concurrency": 0 }"#,
            r#"{ "run_timeout_ms": 0 }"#,
        ] {
            assert!(Config::from_json_str(json).is_err(), "accepted {json}");
        }
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = Config::from_json_str("{ low_threshold: ").unwrap_err();
        assert!(matches!(err, CleanIpError::Config { .. }));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CleanIpError::Config { .. }));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "high_threshold": 250.5, "output_path": "picked.txt" }}"#).unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.high_threshold, 250.5);
        assert_eq!(cfg.output_path, PathBuf::from("picked.txt"));
    }
}
