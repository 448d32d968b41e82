//! Data sources: where a widget's records come from.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::WidgetError;
use crate::record::RecordCollection;

/// Fetches a record collection from a location.
///
/// One call is one round-trip: no retries, no caching.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<RecordCollection, WidgetError>;
}

/// HTTP data source backed by `reqwest`.
///
/// Relative locations (`/letters.json`) are resolved against the base URL,
/// the way a browser resolves them against the page.
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: Client,
    base: Option<Url>,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing client (connection pool, proxies, default headers).
    pub fn with_client(client: Client) -> Self {
        Self { client, base: None }
    }

    /// Resolve relative locations against `base` (builder).
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    /// Absolute URL for `location`.
    pub fn resolve(&self, location: &str) -> Result<Url, WidgetError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(WidgetError::InvalidConfig("empty source location".into()));
        }
        let parsed = match &self.base {
            Some(base) => base.join(location),
            None => Url::parse(location),
        };
        parsed.map_err(|e| WidgetError::InvalidConfig(format!("bad source location '{location}': {e}")))
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, location: &str) -> Result<RecordCollection, WidgetError> {
        let url = self.resolve(location)?;
        tracing::debug!(%url, "fetching records");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WidgetError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WidgetError::SourceUnavailable {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_owned(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| WidgetError::Transport(e.to_string()))?;
        RecordCollection::from_json_slice(&body)
    }
}
