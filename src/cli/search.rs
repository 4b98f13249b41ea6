//! CLI entry-point for single resource searches.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use super::{ConfigArgs, QueryArgs};
use crate::{
    config::Settings,
    data::{harvest, pushshift::PushshiftClient, query::ResourceKind},
};

/// Args for the `search` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Resource kind to search.
    #[arg(long, value_enum, default_value_t = ResourceKind::Submission)]
    pub kind: ResourceKind,
    #[command(flatten)]
    pub query: QueryArgs,
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[instrument(skip(args, settings), fields(kind = %args.kind))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let cfg = args.config.resolve(&settings)?;
    let query = args.query.query_string();
    let client = PushshiftClient::new(cfg.api_origin.as_str(), &settings)?;

    info!(%query, "searching");
    let report = harvest::search(&client, args.kind, &query, &cfg).await?;

    println!("{} {}(s) -> {}", report.rows, report.kind, report.path.display());
    Ok(())
}
