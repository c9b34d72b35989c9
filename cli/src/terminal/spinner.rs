use std::sync::Arc;

use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use cleanip_core::prober::ProgressCallback;

use crate::terminal::colors;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];
const TEMPLATE: &str = "{spinner:.blue} {msg} {pos}/{len}";
const TIP: &str = "You can press 'q' to finish early";

fn probe_style() -> ProgressStyle {
    ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

/// Dresses the span's progress bar as the probing spinner.
pub fn prepare(span: &Span, show_tip: bool) {
    span.pb_set_style(&probe_style());
    let message = if show_tip {
        format!("Probing candidates... {}", TIP.italic().white())
    } else {
        String::from("Probing candidates...")
    };
    span.pb_set_message(&message.color(colors::TEXT_DEFAULT).to_string());
}

/// Forwards prober progress to the span's progress bar.
pub fn progress_callback(span: Span) -> ProgressCallback {
    Arc::new(move |finished: usize, total: usize| {
        span.pb_set_length(total as u64);
        span.pb_set_position(finished as u64);
    })
}
