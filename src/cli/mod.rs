//! Command-line interface wiring for pushshift-harvest.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::{
    config::{FetchConfig, FetchOptions, Settings},
    data::query::text_query,
};

pub mod fetch;
pub mod search;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Collect Reddit submissions and comments from Pushshift", long_about = None)]
pub struct Cli {
    /// Log every request URL.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Fetch(args) => fetch::run(args, settings).await,
            Commands::Search(args) => search::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch submissions matching a query together with all their comments.
    Fetch(fetch::Args),
    /// Fetch a single resource kind matching a query.
    Search(search::Args),
}

/// What to search for: a raw Pushshift query string or a plain term.
#[derive(Debug, Clone, ClapArgs)]
#[group(required = true, multiple = false)]
pub struct QueryArgs {
    /// Raw query string, e.g. `q=lockdown&subreddit=CoronavirusUS&after=30d`.
    pub query: Option<String>,
    /// Plain search term, sent as `q=<term>`.
    #[arg(long)]
    pub term: Option<String>,
}

impl QueryArgs {
    pub fn query_string(&self) -> String {
        match (&self.query, &self.term) {
            (Some(query), _) => query.trim_start_matches('?').to_string(),
            (None, Some(term)) => text_query(term),
            (None, None) => String::new(),
        }
    }
}

/// Run configuration: an optional JSON file plus per-key flag overrides.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct ConfigArgs {
    /// JSON file with any of the configuration keys below.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Comma separated submission columns to keep.
    #[arg(long)]
    pub subm_field: Option<String>,
    /// Comma separated comment columns to keep.
    #[arg(long)]
    pub cmt_field: Option<String>,
    /// Submission column used to drop duplicates.
    #[arg(long)]
    pub subm_rm_dupe: Option<String>,
    /// Comment column used to drop duplicates.
    #[arg(long)]
    pub cmt_rm_dupe: Option<String>,
    /// Number of results to request (0 leaves it to the API).
    #[arg(long)]
    pub num_fetch: Option<usize>,
    /// Submission sort key, always descending; empty disables sorting.
    #[arg(long)]
    pub sort_type: Option<String>,
    /// Output directory.
    #[arg(long)]
    pub path_save: Option<PathBuf>,
    /// Suffix appended to output file names.
    #[arg(long)]
    pub save_suffix: Option<String>,
    /// API origin, e.g. `https://api.pushshift.io/reddit`.
    #[arg(long)]
    pub api_origin: Option<String>,
    /// Longest request URL to send when batching comment IDs.
    #[arg(long)]
    pub max_url_len: Option<usize>,
}

impl ConfigArgs {
    /// Merge file and flags, then fill defaults from `settings`.
    pub fn resolve(&self, settings: &Settings) -> Result<FetchConfig> {
        let file = match &self.config {
            Some(path) => FetchOptions::from_path(path)?,
            None => FetchOptions::default(),
        };
        let flags = FetchOptions {
            subm_field: self.subm_field.clone(),
            cmt_field: self.cmt_field.clone(),
            subm_rm_dupe: self.subm_rm_dupe.clone(),
            cmt_rm_dupe: self.cmt_rm_dupe.clone(),
            num_fetch: self.num_fetch,
            sort_type: self.sort_type.clone(),
            path_save: self.path_save.clone(),
            save_suffix: self.save_suffix.clone(),
            api_origin: self.api_origin.clone(),
            max_url_len: self.max_url_len,
        };
        Ok(file.merge(flags).resolve(settings))
    }
}
