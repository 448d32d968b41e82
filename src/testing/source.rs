//! In-memory data source for tests and demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::WidgetError;
use crate::record::RecordCollection;
use crate::source::DataSource;

#[derive(Debug, Clone)]
enum Canned {
    Body(String),
    Status(u16),
}

/// Canned responses keyed by location.
///
/// Unknown locations answer `404 Not Found`, like a server would.
#[derive(Debug, Default)]
pub struct StaticSource {
    responses: HashMap<String, Canned>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `location` with this response body.
    pub fn with_json(mut self, location: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(location.into(), Canned::Body(body.into()));
        self
    }

    /// Answer `location` with a bare status code.
    pub fn with_status(mut self, location: impl Into<String>, code: u16) -> Self {
        self.responses.insert(location.into(), Canned::Status(code));
        self
    }

    /// Delay every answer.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// How many fetches have been made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn unavailable(code: u16) -> WidgetError {
    let reason = StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or_default();
    WidgetError::SourceUnavailable {
        code,
        reason: reason.to_owned(),
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch(&self, location: &str) -> Result<RecordCollection, WidgetError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.responses.get(location) {
            Some(Canned::Body(body)) => RecordCollection::from_json_str(body),
            Some(Canned::Status(code)) if (200..300).contains(code) => Ok(RecordCollection::default()),
            Some(Canned::Status(code)) => Err(unavailable(*code)),
            None => Err(unavailable(404)),
        }
    }
}
