//! Submission and comment harvesting.
//!
//! [`harvest`] is the full pipeline: search submissions, then for every
//! submission that has comments look up its comment IDs, fetch them in
//! URL-sized batches and tag them with their parent. [`search`] is the
//! single-resource variant. Both are strictly sequential and never fail
//! because of the API: failed requests are logged and count as zero rows.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{
    batch,
    pushshift::{FetchOutcome, PushshiftClient},
    query::{QueryRequest, ResourceKind},
    store,
    table::{cell_text, Table},
};
use crate::config::FetchConfig;

/// Column on every comment row naming the submission it belongs to.
pub const SUBMISSION_ID_COLUMN: &str = "submission_id";
/// Column on every comment row holding the parent submission's URL.
pub const SUBMISSION_URL_COLUMN: &str = "submission_url";

/// Submission columns the comment phase needs whether or not they are saved.
const SUBMISSION_WORKING_FIELDS: &[&str] = &["id", "num_comments", "url"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    pub submissions: usize,
    pub comments: usize,
    /// Submissions whose comment count was zero, so no lookup was made.
    pub skipped_without_comments: usize,
    /// Comment-ID lookups that failed; those submissions have no comments.
    pub failed_id_lookups: usize,
    /// Comment batches that failed and were dropped.
    pub failed_batches: usize,
    pub submission_path: PathBuf,
    pub comment_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub kind: ResourceKind,
    pub rows: usize,
    pub failed: bool,
    pub path: PathBuf,
}

/// Fetch submissions for `query` and all their comments, then write
/// `submission_<suffix>.csv` and `comment_<suffix>.csv`.
#[instrument(skip(client, cfg), fields(origin = client.origin()))]
pub async fn harvest(client: &PushshiftClient, query: &str, cfg: &FetchConfig) -> Result<HarvestReport> {
    let submissions = fetch_submissions(client, query, cfg).await;
    info!(count = submissions.len(), "submission(s) fetched");

    info!("fetching comments");
    let comments = fetch_all_comments(client, &submissions, cfg).await;
    info!(count = comments.table.len(), "comment(s) fetched");

    let mut comment_columns = cfg.comment_fields.clone();
    for tag in [SUBMISSION_ID_COLUMN, SUBMISSION_URL_COLUMN] {
        if !comment_columns.iter().any(|c| c == tag) {
            comment_columns.push(tag.to_string());
        }
    }
    let submission_out = submissions.project(&cfg.submission_fields);
    let comment_out = comments.table.project(&comment_columns);

    info!(dir = %cfg.path_save.display(), "saving data");
    let submission_path = store::save_table(
        &submission_out,
        &cfg.path_save,
        ResourceKind::Submission,
        &cfg.save_suffix,
    )?;
    let comment_path = store::save_table(
        &comment_out,
        &cfg.path_save,
        ResourceKind::Comment,
        &cfg.save_suffix,
    )?;

    let report = HarvestReport {
        submissions: submission_out.len(),
        comments: comment_out.len(),
        skipped_without_comments: comments.skipped_without_comments,
        failed_id_lookups: comments.failed_id_lookups,
        failed_batches: comments.failed_batches,
        submission_path,
        comment_path,
    };
    info!(?report, "fetching data has finished");
    Ok(report)
}

/// Fetch one resource kind for `query`, deduplicate, project and write
/// `<kind>_<suffix>.csv`.
#[instrument(skip(client, cfg), fields(origin = client.origin()))]
pub async fn search(
    client: &PushshiftClient,
    kind: ResourceKind,
    query: &str,
    cfg: &FetchConfig,
) -> Result<SearchReport> {
    let fields = cfg.fields_for(kind);
    let dedupe_key = cfg.dedupe_key_for(kind);
    let sort = match kind {
        ResourceKind::Submission => cfg.sort_type.as_deref(),
        ResourceKind::Comment => None,
    };
    let request = QueryRequest::search(kind, query)
        .with_fields(&request_fields(fields, dedupe_key.into_iter()))
        .with_sort(sort)
        .with_size(cfg.size());

    let outcome = client.query(&request).await;
    let failed = log_outcome(kind, &outcome);
    let mut table = outcome.into_table(fields);
    if let Some(key) = dedupe_key {
        dedupe(&mut table, kind, key);
    }
    let table = table.project(fields);
    info!(count = table.len(), "{kind}(s) fetched");

    let path = store::save_table(&table, &cfg.path_save, kind, &cfg.save_suffix)?;
    Ok(SearchReport {
        kind,
        rows: table.len(),
        failed,
        path,
    })
}

async fn fetch_submissions(client: &PushshiftClient, query: &str, cfg: &FetchConfig) -> Table {
    let kind = ResourceKind::Submission;
    let dedupe_key = cfg.submission_dedupe_key.as_deref();
    let extra = SUBMISSION_WORKING_FIELDS.iter().copied().chain(dedupe_key);
    let fields = request_fields(&cfg.submission_fields, extra);

    let request = QueryRequest::search(kind, query)
        .with_fields(&fields)
        .with_sort(cfg.sort_type.as_deref())
        .with_size(cfg.size());

    let outcome = client.query(&request).await;
    log_outcome(kind, &outcome);
    let mut table = outcome.into_table(&fields);
    if let Some(key) = dedupe_key {
        dedupe(&mut table, kind, key);
    }
    table
}

#[derive(Debug, Default)]
struct CommentHarvest {
    table: Table,
    skipped_without_comments: usize,
    failed_id_lookups: usize,
    failed_batches: usize,
}

async fn fetch_all_comments(
    client: &PushshiftClient,
    submissions: &Table,
    cfg: &FetchConfig,
) -> CommentHarvest {
    let kind = ResourceKind::Comment;
    let dedupe_key = cfg.comment_dedupe_key.as_deref();
    let fields = request_fields(&cfg.comment_fields, dedupe_key.into_iter());
    let budget = batch::id_budget(client.origin(), &fields, cfg.max_url_len);
    debug!(budget, "comment id budget per request");

    let mut harvest = CommentHarvest::default();
    let total = submissions.len();

    for n in 0..total {
        if comment_count(submissions.get(n, "num_comments")) == Some(0) {
            harvest.skipped_without_comments += 1;
            continue;
        }
        let submission_id = submissions.get(n, "id").map(cell_text).unwrap_or_default();
        if submission_id.is_empty() {
            warn!(index = n, total, "submission without id; skipping its comments");
            continue;
        }

        let ids = match client.comment_ids(&submission_id).await {
            Ok(ids) => ids,
            Err(err) => {
                warn!(%err, index = n, total, "comment id lookup failed; skipping");
                harvest.failed_id_lookups += 1;
                continue;
            }
        };
        if ids.is_empty() {
            debug!(%submission_id, "no comment ids listed");
            continue;
        }

        let chunks = batch::chunk_ids(&ids, budget);
        debug!(%submission_id, ids = ids.len(), batches = chunks.len(), "fetching comments");

        let mut fetched = Vec::with_capacity(chunks.len());
        for (b, chunk) in chunks.iter().enumerate() {
            let request = QueryRequest::comments_by_ids(chunk, &fields);
            let outcome = client.query(&request).await;
            debug!(batch = b + 1, rows = outcome.row_count(), "comment batch done");
            match outcome {
                FetchOutcome::Records(table) => fetched.push(table),
                FetchOutcome::Empty => debug!(%submission_id, batch = b + 1, "empty comment batch"),
                FetchOutcome::Failed(err) => {
                    warn!(
                        %err,
                        index = n,
                        total,
                        batch = b + 1,
                        batches = chunks.len(),
                        "comment fetch failed; skipping batch"
                    );
                    harvest.failed_batches += 1;
                }
            }
        }

        let url = submission_url(submissions, n, &submission_id);
        let tagged = Table::concat(fetched)
            .with_constant(SUBMISSION_ID_COLUMN, Value::String(submission_id))
            .with_constant(SUBMISSION_URL_COLUMN, Value::String(url));
        harvest.table.append(tagged);
    }

    if harvest.table.columns().is_empty() {
        harvest.table = Table::empty(&fields);
    }
    if let Some(key) = dedupe_key {
        dedupe(&mut harvest.table, kind, key);
    }
    harvest
}

/// `fields` followed by any of `extra` not already listed.
fn request_fields<'a>(fields: &[String], extra: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out = fields.to_vec();
    for name in extra {
        if !out.iter().any(|f| f == name) {
            out.push(name.to_string());
        }
    }
    out
}

/// `num_comments` as a count; `None` when absent or not numeric, in which
/// case the submission is still looked up.
fn comment_count(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn submission_url(submissions: &Table, row: usize, submission_id: &str) -> String {
    submissions
        .get(row, "url")
        .map(cell_text)
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| format!("https://www.reddit.com/comments/{submission_id}/"))
}

fn dedupe(table: &mut Table, kind: ResourceKind, key: &str) {
    match table.dedupe_by(key) {
        Some(dropped) if dropped > 0 => debug!(%kind, key, dropped, "removed duplicates"),
        Some(_) => {}
        None if table.is_empty() => {}
        None => warn!(%kind, key, "dedupe column missing from response; keeping all rows"),
    }
}

/// Log a non-record outcome, returning whether the request failed.
fn log_outcome(kind: ResourceKind, outcome: &FetchOutcome) -> bool {
    match outcome {
        FetchOutcome::Records(_) => false,
        FetchOutcome::Empty => {
            info!(%kind, "query matched nothing");
            false
        }
        FetchOutcome::Failed(err) => {
            warn!(%err, %kind, "fetch failed; treating as zero results");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn comment_count_reads_numbers_and_strings() {
        assert_eq!(comment_count(Some(&json!(0))), Some(0));
        assert_eq!(comment_count(Some(&json!(12))), Some(12));
        assert_eq!(comment_count(Some(&json!("7"))), Some(7));
        assert_eq!(comment_count(Some(&Value::Null)), None);
        assert_eq!(comment_count(None), None);
    }

    #[test]
    fn request_fields_adds_missing_names_once() {
        let fields = vec!["id".to_string(), "title".to_string()];
        let out = request_fields(&fields, ["id", "num_comments", "url", "num_comments"].into_iter());
        assert_eq!(out, vec!["id", "title", "num_comments", "url"]);
    }
}
