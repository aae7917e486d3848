use std::time::Duration;

use anyhow::Result;

use crate::{
    cds::{CdsClient, Credentials, PollPolicy},
    cli::Cli,
    plan::{Plan, Summary, YearMonth},
};

/// Downloads every missing month of `cli.variable` in the requested years.
pub async fn download(cli: &Cli) -> Result<Summary> {
    let plan = Plan::new(
        &cli.dataset,
        &cli.variable,
        &cli.output_directory,
        cli.start,
        cli.end,
    )?;

    let credentials = Credentials::load()?;
    tracing::debug!(?credentials, "loaded archive credentials");
    let client = CdsClient::new(credentials)?.with_poll_policy(PollPolicy {
        max: Duration::from_secs(cli.poll_max),
        ..Default::default()
    });

    plan.run(&client, YearMonth::now()).await
}
