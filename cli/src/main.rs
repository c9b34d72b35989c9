mod commands;
mod terminal;

use anyhow::Context;
use cleanip_common::config::Config;

use commands::{CommandLine, select};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    let cfg = Config::load(&commands.config)
        .with_context(|| format!("could not load {}", commands.config.display()))?;

    print::header("getting ready for selection", commands.quiet);
    select::select(&cfg, &commands).await
}
