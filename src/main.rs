//! Entry point wiring CLI dispatch to the harvest pipeline.

use anyhow::Result;
use pushshift_harvest::{cli::Cli, config::Settings, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose)?;
    let settings = Settings::load()?;

    info!(?cli, "starting command");
    cli.dispatch(settings).await
}
