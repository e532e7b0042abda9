use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("WOLFRAM_API_KEY environment variable not set")]
    MissingApiKey,
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to query Wolfram Alpha: {0}")]
    Request(#[source] reqwest::Error),
    #[error("Wolfram Alpha API error: status {status}, {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse Wolfram Alpha response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Structured answer to a free-text query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QueryResult {
    #[serde(default, deserialize_with = "flag")]
    pub success: bool,
    #[serde(default, deserialize_with = "flag")]
    pub error: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub numpods: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub pods: Vec<Pod>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Pod {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub scanner: String,
    #[serde(default, deserialize_with = "flag")]
    pub error: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub position: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub subpods: Vec<Subpod>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Subpod {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub plaintext: String,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Image,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Image {
    #[serde(default, deserialize_with = "nullable")]
    pub src: String,
    #[serde(default, deserialize_with = "nullable")]
    pub alt: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub width: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub height: i64,
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    #[serde(rename = "queryresult")]
    query_result: QueryResult,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// The service reports `error` either as a bool or as a detail object.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(value) => value,
        Value::String(value) => value.eq_ignore_ascii_case("true"),
        _ => true,
    })
}

/// The computational-query capability the `query_wolfram` tool delegates to.
#[async_trait]
pub trait QueryProvider: Send + Sync {
    async fn query(&self, input: &str) -> Result<QueryResult, QueryError>;
}

#[derive(Debug, Clone)]
pub struct WolframAlphaClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl WolframAlphaClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, QueryError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            http: builder.build().map_err(QueryError::Client)?,
        })
    }

    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, QueryError> {
        config
            .api_key
            .as_ref()
            .map(|key| Self::new(key.clone(), config.base_url.clone(), config.query_timeout))
            .transpose()
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl QueryProvider for WolframAlphaClient {
    async fn query(&self, input: &str) -> Result<QueryResult, QueryError> {
        if self.api_key.is_empty() {
            return Err(QueryError::MissingApiKey);
        }

        info!(query = %input, "querying Wolfram Alpha");

        let response = self
            .http
            .get(self.query_url())
            .query(&[
                ("input", input),
                ("appid", self.api_key.as_str()),
                ("output", "json"),
            ])
            .send()
            .await
            .map_err(QueryError::Request)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(QueryError::Request)?;
        let envelope: QueryEnvelope = serde_json::from_slice(&body).map_err(QueryError::Decode)?;
        Ok(envelope.query_result)
    }
}
