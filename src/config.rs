//! Runtime configuration utilities for pushshift-harvest.
//!
//! Two layers: [`Settings`] holds process-wide values read from `.env` and the
//! environment, while [`FetchConfig`] describes a single harvest run. A run is
//! described by a partial [`FetchOptions`] (JSON file and/or CLI flags) that is
//! resolved exactly once into a complete [`FetchConfig`].

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

use crate::data::query::ResourceKind;

pub const DEFAULT_API_ORIGIN: &str = "https://api.pushshift.io/reddit";
pub const DEFAULT_SUBMISSION_FIELDS: &str = "id,title,selftext";
pub const DEFAULT_COMMENT_FIELDS: &str = "body";
pub const DEFAULT_SORT_TYPE: &str = "num_comments";
pub const DEFAULT_NUM_FETCH: usize = 100;
/// Longest request line Pushshift's front end accepts.
pub const DEFAULT_MAX_URL_LEN: usize = 8190;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Base URL every resource path is appended to.
    pub api_origin: String,
    /// Directory CSV files land in when a run does not name one.
    pub output_dir: PathBuf,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let api_origin = env::var("PUSHSHIFT_API_ORIGIN")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_API_ORIGIN.to_string());
        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let user_agent = env::var("HTTP_USER_AGENT")
            .unwrap_or_else(|_| format!("pushshift-harvest/{}", env!("CARGO_PKG_VERSION")));

        Ok(Self {
            api_origin,
            output_dir,
            user_agent,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_origin: DEFAULT_API_ORIGIN.to_string(),
            output_dir: PathBuf::from("."),
            user_agent: format!("pushshift-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Partial run configuration, as written in a JSON config file or collected
/// from CLI flags. Every key is optional; [`FetchOptions::resolve`] fills the
/// gaps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchOptions {
    pub subm_field: Option<String>,
    pub cmt_field: Option<String>,
    pub subm_rm_dupe: Option<String>,
    pub cmt_rm_dupe: Option<String>,
    pub num_fetch: Option<usize>,
    pub sort_type: Option<String>,
    pub path_save: Option<PathBuf>,
    pub save_suffix: Option<String>,
    pub api_origin: Option<String>,
    pub max_url_len: Option<usize>,
}

impl FetchOptions {
    /// Read options from a JSON mapping on disk.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Layer `overrides` on top of `self`; any key set in `overrides` wins.
    pub fn merge(self, overrides: FetchOptions) -> Self {
        Self {
            subm_field: overrides.subm_field.or(self.subm_field),
            cmt_field: overrides.cmt_field.or(self.cmt_field),
            subm_rm_dupe: overrides.subm_rm_dupe.or(self.subm_rm_dupe),
            cmt_rm_dupe: overrides.cmt_rm_dupe.or(self.cmt_rm_dupe),
            num_fetch: overrides.num_fetch.or(self.num_fetch),
            sort_type: overrides.sort_type.or(self.sort_type),
            path_save: overrides.path_save.or(self.path_save),
            save_suffix: overrides.save_suffix.or(self.save_suffix),
            api_origin: overrides.api_origin.or(self.api_origin),
            max_url_len: overrides.max_url_len.or(self.max_url_len),
        }
    }

    /// Fill every missing key from `settings` and the built-in defaults.
    pub fn resolve(self, settings: &Settings) -> FetchConfig {
        let submission_fields = field_list(self.subm_field.as_deref(), DEFAULT_SUBMISSION_FIELDS);
        let comment_fields = field_list(self.cmt_field.as_deref(), DEFAULT_COMMENT_FIELDS);
        let sort_type = match self.sort_type {
            Some(sort) => non_empty(&sort),
            None => Some(DEFAULT_SORT_TYPE.to_string()),
        };
        let api_origin = self
            .api_origin
            .as_deref()
            .and_then(non_empty)
            .unwrap_or_else(|| settings.api_origin.clone())
            .trim_end_matches('/')
            .to_string();

        FetchConfig {
            submission_fields,
            comment_fields,
            submission_dedupe_key: self.subm_rm_dupe.as_deref().and_then(non_empty),
            comment_dedupe_key: self.cmt_rm_dupe.as_deref().and_then(non_empty),
            num_fetch: self.num_fetch.unwrap_or(DEFAULT_NUM_FETCH),
            sort_type,
            path_save: self
                .path_save
                .unwrap_or_else(|| settings.output_dir.clone()),
            save_suffix: self.save_suffix.unwrap_or_default().trim().to_string(),
            api_origin,
            max_url_len: self.max_url_len.unwrap_or(DEFAULT_MAX_URL_LEN),
        }
    }
}

/// Fully resolved configuration for one harvest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Submission columns kept in the output, in output order.
    pub submission_fields: Vec<String>,
    /// Comment columns kept in the output, in output order.
    pub comment_fields: Vec<String>,
    pub submission_dedupe_key: Option<String>,
    pub comment_dedupe_key: Option<String>,
    /// Requested submission count; `0` omits the `size=` parameter.
    pub num_fetch: usize,
    /// Sort key for the submission search, always descending.
    pub sort_type: Option<String>,
    pub path_save: PathBuf,
    pub save_suffix: String,
    pub api_origin: String,
    /// Ceiling on the full request URL, used to size comment-ID batches.
    pub max_url_len: usize,
}

impl FetchConfig {
    pub fn fields_for(&self, kind: ResourceKind) -> &[String] {
        match kind {
            ResourceKind::Submission => &self.submission_fields,
            ResourceKind::Comment => &self.comment_fields,
        }
    }

    pub fn dedupe_key_for(&self, kind: ResourceKind) -> Option<&str> {
        match kind {
            ResourceKind::Submission => self.submission_dedupe_key.as_deref(),
            ResourceKind::Comment => self.comment_dedupe_key.as_deref(),
        }
    }

    /// `size=` value to send, if any.
    pub fn size(&self) -> Option<usize> {
        (self.num_fetch > 0).then_some(self.num_fetch)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchOptions::default().resolve(&Settings::default())
    }
}

/// Split a comma separated column list, falling back to `default` when the
/// list is absent or names no column at all.
fn field_list(raw: Option<&str>, default: &str) -> Vec<String> {
    let parse = |text: &str| {
        text.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    };
    match raw.map(parse) {
        Some(fields) if !fields.is_empty() => fields,
        _ => parse(default),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_an_empty_mapping() {
        let cfg = FetchOptions::default().resolve(&Settings::default());
        assert_eq!(cfg.submission_fields, vec!["id", "title", "selftext"]);
        assert_eq!(cfg.comment_fields, vec!["body"]);
        assert_eq!(cfg.submission_dedupe_key, None);
        assert_eq!(cfg.num_fetch, 100);
        assert_eq!(cfg.sort_type.as_deref(), Some("num_comments"));
        assert_eq!(cfg.path_save, PathBuf::from("."));
        assert_eq!(cfg.save_suffix, "");
        assert_eq!(cfg.api_origin, DEFAULT_API_ORIGIN);
        assert_eq!(cfg.max_url_len, 8190);
    }

    #[test]
    fn json_mapping_accepts_every_key() {
        let opts: FetchOptions = serde_json::from_str(
            r#"{"subm_field": "id, title", "cmt_rm_dupe": "", "subm_rm_dupe": "id",
                "num_fetch": 0, "sort_type": "", "save_suffix": "covid",
                "path_save": "out/"}"#,
        )
        .unwrap();
        let cfg = opts.resolve(&Settings::default());
        assert_eq!(cfg.submission_fields, vec!["id", "title"]);
        assert_eq!(cfg.submission_dedupe_key.as_deref(), Some("id"));
        assert_eq!(cfg.comment_dedupe_key, None);
        assert_eq!(cfg.size(), None);
        assert_eq!(cfg.sort_type, None);
        assert_eq!(cfg.save_suffix, "covid");
        assert_eq!(cfg.path_save, PathBuf::from("out/"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = serde_json::from_str::<FetchOptions>(r#"{"rm_dupe_typo": "id"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn overrides_take_precedence() {
        let file = FetchOptions {
            cmt_field: Some("body,score".into()),
            num_fetch: Some(50),
            ..Default::default()
        };
        let flags = FetchOptions {
            num_fetch: Some(10),
            ..Default::default()
        };
        let cfg = file.merge(flags).resolve(&Settings::default());
        assert_eq!(cfg.num_fetch, 10);
        assert_eq!(cfg.comment_fields, vec!["body", "score"]);
    }

    #[test]
    fn blank_field_list_falls_back_to_default() {
        let opts = FetchOptions {
            cmt_field: Some(" , ".into()),
            api_origin: Some("http://localhost:9000/reddit/".into()),
            ..Default::default()
        };
        let cfg = opts.resolve(&Settings::default());
        assert_eq!(cfg.comment_fields, vec!["body"]);
        assert_eq!(cfg.api_origin, "http://localhost:9000/reddit");
    }
}
