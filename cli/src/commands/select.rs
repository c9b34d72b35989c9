use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tokio::task::JoinHandle;
use tracing::{Instrument, info_span};

use cleanip_common::config::Config;
use cleanip_common::{success, warn};
use cleanip_core::prober::icmp::IcmpProber;
use cleanip_core::service::{SelectionReport, SelectionService};
use cleanip_core::signal::StopHandle;

use crate::commands::CommandLine;
use crate::mprint;
use crate::terminal::input::InputHandle;
use crate::terminal::{colors, format, print, spinner};

pub async fn select(cfg: &Config, cli: &CommandLine) -> anyhow::Result<()> {
    print_settings(cfg, cli.quiet);

    let prober = IcmpProber::new().context("cannot start the ICMP prober")?;

    let stop = Arc::new(StopHandle::new());
    let ctrl_c = spawn_ctrl_c_listener(stop.clone());
    let input = if cli.no_input {
        None
    } else {
        InputHandle::start(stop.clone())
            .inspect_err(|e| warn!("Keyboard listener unavailable: {e}"))
            .ok()
    };

    let span = info_span!("selection", indicatif.pb_show = true);
    spinner::prepare(&span, input.is_some());

    let mut service = SelectionService::new(Arc::new(prober))
        .on_progress(spinner::progress_callback(span.clone()));

    let start_time = Instant::now();
    let result = service.run(cfg, stop.signal()).instrument(span).await;

    drop(input);
    ctrl_c.abort();

    let report = result?;
    selection_ends(&report, start_time.elapsed(), cfg, cli.quiet);
    Ok(())
}

fn spawn_ctrl_c_listener(stop: Arc<StopHandle>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    })
}

fn print_settings(cfg: &Config, q_level: u8) {
    if q_level > 0 {
        return;
    }
    print::aligned_line("Scan results", cfg.search_directory.display().to_string());
    print::aligned_line(
        "Latency",
        format!("{} - {} ms", cfg.low_threshold, cfg.high_threshold),
    );
    print::aligned_line("Per subnet", format!("{} probed", cfg.max_group_size));
    print::aligned_line(
        "Probes",
        format!("{} x {} ms", cfg.probe_attempts, cfg.probe_timeout_ms),
    );
    print::aligned_line("Output", cfg.output_path.display().to_string());
}

fn selection_ends(report: &SelectionReport, total_time: Duration, cfg: &Config, q_level: u8) {
    if report.selection.is_empty() {
        no_addresses_selected(q_level);
        return;
    }

    if q_level > 0 {
        mprint!();
    }

    print::header("selected addresses", q_level);
    if q_level < 2 {
        print_selection(report, cfg);
    }
    print_summary(report, total_time, q_level);
}

fn no_addresses_selected(q_level: u8) {
    print::header("no address in window", q_level);
    if q_level == 0 {
        print::no_results();
    }
}

fn print_selection(report: &SelectionReport, cfg: &Config) {
    let len = report.selection.len();
    for (idx, (key, addr)) in report.selection.iter().enumerate() {
        print::tree_head(idx, addr.as_str());
        print::as_tree_one_level(format::selection_details(
            key,
            addr,
            report.latency_of(addr),
            cfg,
        ));
        if idx + 1 != len {
            mprint!();
        }
    }
}

fn print_summary(report: &SelectionReport, total_time: Duration, q_level: u8) {
    let picked: ColoredString = format!("{} addresses", report.selection.len())
        .bold()
        .green();
    let answered: ColoredString = format!("{}/{} answered", report.latencies.len(), report.probed)
        .bold()
        .yellow();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Selection Complete: {picked} picked, {answered} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match q_level {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => {
            mprint!();
            success!("{}", output)
        }
    }
}
