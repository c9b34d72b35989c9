//! The **latency probing** stage.
//!
//! [`EchoProber`] is the seam between the pipeline and the network: one call
//! sends one echo request and reports its round-trip time. The concrete ICMP
//! implementation lives in [`icmp`]; tests plug in scripted probers.
//!
//! [`measure_latency`] drives a prober over a whole candidate set. Addresses are
//! probed concurrently (bounded by [`ProbeSettings::concurrency`]) while the
//! attempts for a single address run one after another. A failed attempt only
//! costs that attempt: the remaining attempts and all other addresses carry on.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;

use cleanip_common::config::Config;
use cleanip_common::network::address::Address;
use cleanip_common::{debug, error, warn};

use crate::selection::LatencyMap;
use crate::signal::StopSignal;

pub mod icmp;

/// Why a single echo attempt produced no round-trip time.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("failed to send echo request: {0}")]
    Send(#[from] std::io::Error),

    #[error("cannot build echo request: {0}")]
    Packet(String),

    #[error("no ICMP channel available for {0}")]
    Unsupported(IpAddr),
}

#[async_trait]
pub trait EchoProber: Send + Sync {
    /// Sends one echo request to `target` and waits at most `timeout` for its reply.
    async fn echo(&self, target: IpAddr, timeout: Duration) -> Result<Duration, ProbeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    pub attempts: u32,
    pub timeout: Duration,
    pub concurrency: usize,
}

impl From<&Config> for ProbeSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            attempts: cfg.probe_attempts,
            timeout: cfg.probe_timeout(),
            concurrency: cfg.probe_concurrency,
        }
    }
}

/// Called with `(finished, total)` every time an address is done.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Measures the mean round-trip time of every address.
///
/// Only addresses with at least one answered attempt get an entry. When `stop`
/// fires, in-flight probes are aborted and the entries gathered so far are
/// returned as they are.
pub async fn measure_latency<I>(
    prober: Arc<dyn EchoProber>,
    addresses: I,
    settings: ProbeSettings,
    mut stop: StopSignal,
    on_progress: Option<ProgressCallback>,
) -> LatencyMap
where
    I: IntoIterator<Item = Address>,
{
    let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let (tx, mut rx) = mpsc::unbounded_channel::<(Address, Option<f64>)>();
    let mut tasks: JoinSet<()> = JoinSet::new();

    for addr in addresses {
        let prober = prober.clone();
        let semaphore = semaphore.clone();
        let tx = tx.clone();

        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            let latency =
                probe_address(prober.as_ref(), addr.ip(), settings.attempts, settings.timeout)
                    .await;
            let _ = tx.send((addr, latency));
        });
    }
    drop(tx);

    let total = tasks.len();
    let mut finished = 0;
    let mut latencies = LatencyMap::new();
    let mut record = |addr: Address, latency: Option<f64>, finished: &mut usize| {
        *finished += 1;
        if let Some(ms) = latency {
            latencies.insert(addr, ms);
        }
        if let Some(cb) = &on_progress {
            cb(*finished, total);
        }
    };

    loop {
        tokio::select! {
            biased;

            _ = stop.stopped() => {
                tasks.shutdown().await;
                while let Ok((addr, latency)) = rx.try_recv() {
                    record(addr, latency, &mut finished);
                }
                warn!("Probing stopped early after {finished} of {total} addresses");
                break;
            }

            msg = rx.recv() => match msg {
                Some((addr, latency)) => record(addr, latency, &mut finished),
                None => break,
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined
            && e.is_panic()
        {
            error!("A probe task panicked: {e}");
        }
    }

    latencies
}

/// Sends `attempts` sequential echo requests and averages the answered ones.
///
/// Each attempt is cut off after `timeout` regardless of what the prober does.
pub async fn probe_address(
    prober: &dyn EchoProber,
    target: IpAddr,
    attempts: u32,
    timeout: Duration,
) -> Option<f64> {
    let mut round_trips: Vec<f64> = Vec::with_capacity(attempts as usize);

    for attempt in 1..=attempts {
        let outcome = match tokio::time::timeout(timeout, prober.echo(target, timeout)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(ProbeError::Timeout(timeout)),
        };
        match outcome {
            Ok(rtt) => round_trips.push(as_millis_f64(rtt)),
            Err(e) => debug!("{target}: attempt {attempt}/{attempts} failed: {e}"),
        }
    }

    if round_trips.is_empty() {
        return None;
    }
    Some(round_trips.iter().sum::<f64>() / round_trips.len() as f64)
}

fn as_millis_f64(rtt: Duration) -> f64 {
    rtt.as_nanos() as f64 / 1_000_000.0
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
