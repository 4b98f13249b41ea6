//! Pushshift HTTP client.

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{query::QueryRequest, table::Table};
use crate::{config::Settings, error::FetchError};

/// Result of one request, keeping "nothing matched" apart from "it broke".
#[derive(Debug)]
pub enum FetchOutcome {
    Records(Table),
    Empty,
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Records(table) => table.len(),
            Self::Empty | Self::Failed(_) => 0,
        }
    }

    /// The fetched rows, or zero rows with `columns` when there are none.
    pub fn into_table(self, columns: &[String]) -> Table {
        match self {
            Self::Records(table) => table,
            Self::Empty | Self::Failed(_) => Table::empty(columns),
        }
    }
}

/// Thin wrapper pairing a `reqwest` client with the API origin.
#[derive(Debug, Clone)]
pub struct PushshiftClient {
    http: Client,
    origin: String,
}

impl PushshiftClient {
    pub fn new(origin: impl Into<String>, settings: &Settings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            http,
            origin: origin.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Run `request` and turn its `data` array into a table.
    pub async fn query(&self, request: &QueryRequest) -> FetchOutcome {
        let url = request.url(&self.origin);
        let data = match self.get_data(&url).await {
            Ok(data) => data,
            Err(err) => return FetchOutcome::Failed(err),
        };
        if data.is_empty() {
            return FetchOutcome::Empty;
        }

        let mut records = Vec::with_capacity(data.len());
        for (index, element) in data.into_iter().enumerate() {
            match element {
                Value::Object(record) => records.push(record),
                _ => return FetchOutcome::Failed(FetchError::NotARecord { url, index }),
            }
        }
        FetchOutcome::Records(Table::from_records(records))
    }

    /// Every comment ID attached to `submission_id`, in API order.
    pub async fn comment_ids(&self, submission_id: &str) -> Result<Vec<String>, FetchError> {
        let url = QueryRequest::comment_ids_of(submission_id).url(&self.origin);
        let data = self.get_data(&url).await?;
        Ok(data
            .into_iter()
            .filter_map(|value| match value {
                Value::String(id) => Some(id),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect())
    }

    async fn get_data(&self, url: &str) -> Result<Vec<Value>, FetchError> {
        debug!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = resp.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        let mut payload: Value =
            serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                url: url.to_string(),
                source,
            })?;

        match payload.get_mut("data").map(Value::take) {
            Some(Value::Array(data)) => Ok(data),
            _ => Err(FetchError::MissingData {
                url: url.to_string(),
            }),
        }
    }
}
