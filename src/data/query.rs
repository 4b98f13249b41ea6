//! Pushshift URL construction.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use urlencoding::encode;

/// API category being queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Submission,
    Comment,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submission => "submission",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the resource path is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    /// `<origin>/<resource>/search/?<query-string>`
    Search(String),
    /// `<origin>/<resource><path-suffix>`, e.g. `/comment_ids/abc123`.
    Direct(String),
}

/// One GET request against the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub kind: ResourceKind,
    pub mode: QueryMode,
    /// Sent as `filter=`; empty sends no filter.
    pub fields: Vec<String>,
    /// Sent as `sort_type=<key>&sort=desc`.
    pub sort_type: Option<String>,
    pub size: Option<usize>,
}

impl QueryRequest {
    pub fn search(kind: ResourceKind, query: impl Into<String>) -> Self {
        Self {
            kind,
            mode: QueryMode::Search(query.into()),
            fields: Vec::new(),
            sort_type: None,
            size: None,
        }
    }

    pub fn direct(kind: ResourceKind, path_suffix: impl Into<String>) -> Self {
        Self {
            kind,
            mode: QueryMode::Direct(path_suffix.into()),
            fields: Vec::new(),
            sort_type: None,
            size: None,
        }
    }

    /// Comment lookup by explicit ID list (`ids=a,b,c`).
    pub fn comments_by_ids(ids: &str, fields: &[String]) -> Self {
        Self::search(ResourceKind::Comment, format!("ids={ids}")).with_fields(fields)
    }

    /// All comment IDs attached to one submission.
    pub fn comment_ids_of(submission_id: &str) -> Self {
        Self::direct(ResourceKind::Submission, format!("/comment_ids/{submission_id}"))
    }

    pub fn with_fields(mut self, fields: &[String]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    pub fn with_sort(mut self, sort_type: Option<&str>) -> Self {
        self.sort_type = sort_type.map(str::to_string);
        self
    }

    pub fn with_size(mut self, size: Option<usize>) -> Self {
        self.size = size;
        self
    }

    /// Render the full request URL below `origin` (which carries no trailing slash).
    pub fn url(&self, origin: &str) -> String {
        let kind = self.kind.as_str();
        let mut url = match &self.mode {
            QueryMode::Search(query) => format!("{origin}/{kind}/search/?{query}"),
            QueryMode::Direct(suffix) => format!("{origin}/{kind}{suffix}"),
        };

        let mut params = Vec::new();
        if !self.fields.is_empty() {
            params.push(format!("filter={}", self.fields.join(",")));
        }
        if let Some(sort) = &self.sort_type {
            params.push(format!("sort_type={sort}&sort=desc"));
        }
        if let Some(size) = self.size {
            params.push(format!("size={size}"));
        }

        for param in params {
            let needs_query_start = matches!(self.mode, QueryMode::Direct(_)) && !url.contains('?');
            url.push(if needs_query_start { '?' } else { '&' });
            url.push_str(&param);
        }
        url
    }
}

/// Turn a bare search term into a `q=` query string.
pub fn text_query(term: &str) -> String {
    format!("q={}", encode(term.trim()))
}
