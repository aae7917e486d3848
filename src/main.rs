mod cds;
mod cli;
mod download;
mod logging;
mod plan;
mod request;

use anyhow::Result;
use clap::Parser;
use cli::{command, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let summary = command::download(&cli).await?;
    println!(
        "Done: {} downloaded, {} already present, {} not yet complete",
        summary.downloaded, summary.already_present, summary.incomplete
    );

    Ok(())
}
