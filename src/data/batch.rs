//! Splitting comment-ID lists so every lookup URL stays under the length limit.

use tracing::warn;

use super::query::QueryRequest;

/// Length of the comment lookup URL with an empty ID list: everything a
/// batch request carries besides the IDs themselves.
pub fn request_overhead(origin: &str, fields: &[String]) -> usize {
    QueryRequest::comments_by_ids("", fields).url(origin).len()
}

/// Characters available for the comma-joined IDs of one lookup.
pub fn id_budget(origin: &str, fields: &[String], max_url_len: usize) -> usize {
    max_url_len.saturating_sub(request_overhead(origin, fields))
}

/// Cut `ids` into comma-joined chunks of at most `budget` characters.
///
/// Chunks are cut only at commas, so an ID never spans two requests, and each
/// chunk takes as many IDs as fit. When the whole list fits, the result is a
/// single chunk. An ID that alone exceeds the budget is still sent, by itself.
pub fn chunk_ids(ids: &[String], budget: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for id in ids.iter().filter(|id| !id.is_empty()) {
        let needed = if current.is_empty() {
            id.len()
        } else {
            current.len() + 1 + id.len()
        };

        if needed > budget && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if id.len() > budget {
            warn!(%id, budget, "comment id longer than the url budget, sending it alone");
        }
        if !current.is_empty() {
            current.push(',');
        }
        current.push_str(id);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
