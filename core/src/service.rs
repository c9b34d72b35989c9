//! # Selection Service
//!
//! Implements the "pick clean addresses" use case for one [`Config`].
//!
//! The service owns the random generator used by the sampling and picking
//! stages and delegates all network work to an [`EchoProber`], so the whole
//! pipeline can run against a scripted prober and a seeded generator.

use std::path::PathBuf;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use cleanip_common::config::Config;
use cleanip_common::error::Result;
use cleanip_common::network::address::Address;
use cleanip_common::{info, success, warn};

use crate::prober::{self, EchoProber, ProbeSettings, ProgressCallback};
use crate::selection::{self, LatencyMap, Selection, total_members};
use crate::signal::StopSignal;
use crate::{discovery, extract, output};

/// What one run found and chose.
#[derive(Debug, Clone, Default)]
pub struct SelectionReport {
    /// The scan-result file the candidates came from, when read from disk.
    pub source_file: Option<PathBuf>,
    /// Distinct addresses extracted.
    pub candidates: usize,
    /// Subnet groups formed from the candidates.
    pub groups: usize,
    /// Addresses left after sampling, i.e. the ones probed.
    pub probed: usize,
    pub latencies: LatencyMap,
    pub selection: Selection,
}

impl SelectionReport {
    pub fn latency_of(&self, addr: &Address) -> Option<f64> {
        self.latencies.get(addr).copied()
    }
}

pub struct SelectionService {
    prober: Arc<dyn EchoProber>,
    rng: StdRng,
    on_progress: Option<ProgressCallback>,
}

impl SelectionService {
    pub fn new(prober: Arc<dyn EchoProber>) -> Self {
        Self::with_rng(prober, StdRng::from_os_rng())
    }

    pub fn with_rng(prober: Arc<dyn EchoProber>, rng: StdRng) -> Self {
        Self {
            prober,
            rng,
            on_progress: None,
        }
    }

    /// Registers a callback receiving `(finished, total)` while probing.
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Executes a full run:
    /// 1. **Discovery** of the newest scan-result file.
    /// 2. **Extraction** of every address in it.
    /// 3. **Selection** (see [`SelectionService::select`]).
    /// 4. **Output** of the chosen addresses to `cfg.output_path`.
    pub async fn run(&mut self, cfg: &Config, stop: StopSignal) -> Result<SelectionReport> {
        let source = discovery::latest_json_file(&cfg.search_directory)?;
        info!("Processing file: {}", source.display());

        let addresses = extract::extract_from_file(&source)?;
        info!("Found {} IP addresses", addresses.len());

        let mut report = self.select(addresses, cfg, stop).await?;
        report.source_file = Some(source);

        output::write_selection(&cfg.output_path, &report.selection)?;
        success!("Selected IPs written to {}", cfg.output_path.display());
        Ok(report)
    }

    /// Groups, samples, probes, filters and picks from an address set.
    pub async fn select<I>(
        &mut self,
        addresses: I,
        cfg: &Config,
        stop: StopSignal,
    ) -> Result<SelectionReport>
    where
        I: IntoIterator<Item = Address>,
    {
        let groups = selection::group_by_subnet(addresses);
        let candidates = total_members(&groups);
        let group_count = groups.len();
        info!("Grouped into {group_count} subnets");

        let groups = selection::limit_group_size(groups, cfg.max_group_size, &mut self.rng);
        let probed = total_members(&groups);
        info!("Pinging {probed} IP addresses...");

        let stop = match cfg.run_timeout() {
            Some(limit) => stop.with_deadline(limit),
            None => stop,
        };
        let latencies = prober::measure_latency(
            self.prober.clone(),
            groups.values().flatten().cloned(),
            ProbeSettings::from(cfg),
            stop,
            self.on_progress.clone(),
        )
        .await;
        info!("{} of {probed} addresses answered", latencies.len());

        let survivors = selection::filter_by_threshold(
            groups,
            &latencies,
            cfg.low_threshold,
            cfg.high_threshold,
        );
        if survivors.is_empty() {
            warn!(
                "No address answered within {}-{} ms",
                cfg.low_threshold, cfg.high_threshold
            );
        }

        let selection = selection::select_representatives(&survivors, &mut self.rng)?;

        Ok(SelectionReport {
            source_file: None,
            candidates,
            groups: group_count,
            probed,
            latencies,
            selection,
        })
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
