//! Fixtures shared by the integration tests.

use std::collections::HashMap;
use std::fs::{self, File, FileTimes};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use cleanip_common::config::Config;
use cleanip_core::prober::{EchoProber, ProbeError};
use rand::SeedableRng;
use rand::rngs::StdRng;

use cleanip_core::service::SelectionService;

/// How a scripted address answers.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Answers after the given number of milliseconds.
    After(u64),
    /// Never answers.
    Silent,
}

/// Stands in for the ICMP prober. Waits use tokio time, so paused-clock
/// tests finish instantly.
#[derive(Default)]
pub struct ScriptedProber {
    replies: HashMap<IpAddr, Reply>,
    calls: AtomicUsize,
}

impl ScriptedProber {
    pub fn new(replies: &[(&str, Reply)]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies
                .iter()
                .map(|(ip, reply)| (ip.parse().unwrap(), *reply))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EchoProber for ScriptedProber {
    async fn echo(&self, target: IpAddr, timeout: Duration) -> Result<Duration, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(&target) {
            Some(Reply::After(ms)) => {
                let rtt = Duration::from_millis(*ms);
                tokio::time::sleep(rtt).await;
                Ok(rtt)
            }
            Some(Reply::Silent) => std::future::pending().await,
            None => Err(ProbeError::Timeout(timeout)),
        }
    }
}

pub fn seeded_service(prober: Arc<ScriptedProber>, seed: u64) -> SelectionService {
    SelectionService::with_rng(prober, StdRng::seed_from_u64(seed))
}

/// Writes a scan-result file and backdates it by `age`.
pub fn write_scan(dir: &Path, name: &str, body: &str, age: Duration) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    let modified = SystemTime::now() - age;
    File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_times(FileTimes::new().set_modified(modified))
        .unwrap();
    path
}

/// A configuration reading from and writing into `dir`.
pub fn config_in(dir: &Path) -> Config {
    Config {
        search_directory: dir.join("results"),
        output_path: dir.join("output.txt"),
        ..Config::default()
    }
}

/// Renders the usual scanner layout: `{ "results": [ { "ip": .. }, .. ] }`.
pub fn scan_body(ips: &[&str]) -> String {
    let results: Vec<serde_json::Value> = ips
        .iter()
        .map(|ip| serde_json::json!({ "ip": ip, "open": true }))
        .collect();
    serde_json::json!({ "results": results }).to_string()
}
