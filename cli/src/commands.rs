pub mod select;

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use cleanip_common::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(name = "cleanip")]
#[command(about = "Pick one low-latency address per subnet from the latest scan results.")]
pub struct CommandLine {
    /// Configuration file to read
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,
    /// Print less; -qq only prints the final summary
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,
    /// Do not listen for 'q' to finish early
    #[arg(long)]
    pub no_input: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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
