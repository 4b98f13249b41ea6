//! CLI entry-point for the full submissions + comments harvest.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use super::{ConfigArgs, QueryArgs};
use crate::{
    config::Settings,
    data::{harvest, pushshift::PushshiftClient},
};

/// Args for the `fetch` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub query: QueryArgs,
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[instrument(skip(args, settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let cfg = args.config.resolve(&settings)?;
    let query = args.query.query_string();
    let client = PushshiftClient::new(cfg.api_origin.as_str(), &settings)?;

    info!(%query, "fetching submissions");
    let report = harvest::harvest(&client, &query, &cfg).await?;

    println!(
        "{} submission(s), {} comment(s) -> {}, {}",
        report.submissions,
        report.comments,
        report.submission_path.display(),
        report.comment_path.display()
    );
    Ok(())
}
