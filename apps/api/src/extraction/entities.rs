//! Person-name extraction on top of an external named-entity recognizer.
//!
//! The recognizer is a pluggable capability. `HttpEntityRecognizer` talks to a
//! model-serving sidecar; tests substitute in-process mocks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::text::DocumentText;

pub const PERSON_LABEL: &str = "PERSON";

#[derive(Debug, Error)]
pub enum RecognizerError {
    /// The recognizer could not be reached or loaded at startup.
    #[error("Entity recognizer unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Recognizer returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Recognizer call timed out after {0:?}")]
    Timeout(Duration),
}

/// A labeled span produced by the recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
}

/// External named-entity recognition capability.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Returns entities in document order.
    async fn find_entities(&self, text: &str) -> Result<Vec<Entity>, RecognizerError>;
}

/// First entity labeled as a person, if any.
pub fn first_person(entities: &[Entity]) -> Option<String> {
    entities
        .iter()
        .find(|e| e.label == PERSON_LABEL)
        .map(|e| e.text.clone())
}

/// Finds the candidate's name. Without a recognizer the name is always absent.
///
/// Each recognizer call is bounded by `timeout` and retried once; a second
/// failure degrades the field to absent rather than failing the parse.
#[derive(Clone)]
pub struct EntityExtractor {
    recognizer: Option<Arc<dyn EntityRecognizer>>,
    timeout: Duration,
}

impl EntityExtractor {
    pub fn new(recognizer: Option<Arc<dyn EntityRecognizer>>, timeout: Duration) -> Self {
        Self {
            recognizer,
            timeout,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, Duration::from_secs(5))
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_some()
    }

    pub async fn extract_name(&self, text: &DocumentText) -> Option<String> {
        let recognizer = self.recognizer.as_ref()?;

        let mut last_error = None;
        for attempt in 0..2 {
            match self.call_once(recognizer.as_ref(), text.as_str()).await {
                Ok(entities) => return first_person(&entities),
                Err(e) => {
                    debug!("Entity recognizer attempt {} failed: {e}", attempt + 1);
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            warn!("Entity recognition failed, leaving name empty: {e}");
        }
        None
    }

    async fn call_once(
        &self,
        recognizer: &dyn EntityRecognizer,
        text: &str,
    ) -> Result<Vec<Entity>, RecognizerError> {
        tokio::time::timeout(self.timeout, recognizer.find_entities(text))
            .await
            .map_err(|_| RecognizerError::Timeout(self.timeout))?
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP-backed recognizer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EntitiesRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    entities: Vec<Entity>,
}

/// Client for an entity-recognition service exposing
/// `GET /health` and `POST /entities`.
#[derive(Clone)]
pub struct HttpEntityRecognizer {
    client: Client,
    base_url: String,
}

impl HttpEntityRecognizer {
    /// Builds the client and probes `/health`. A failed probe is reported as
    /// `Unavailable`, distinct from "no person found" at parse time.
    pub async fn connect(base_url: &str, timeout: Duration) -> Result<Self, RecognizerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecognizerError::Unavailable(format!("client build failed: {e}")))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let response = client
            .get(format!("{base_url}/health"))
            .send()
            .await
            .map_err(|e| RecognizerError::Unavailable(format!("{base_url}: {e}")))?;
        if !response.status().is_success() {
            return Err(RecognizerError::Unavailable(format!(
                "{base_url}/health returned {}",
                response.status()
            )));
        }

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl EntityRecognizer for HttpEntityRecognizer {
    async fn find_entities(&self, text: &str) -> Result<Vec<Entity>, RecognizerError> {
        let response = self
            .client
            .post(format!("{}/entities", self.base_url))
            .json(&EntitiesRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RecognizerError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: EntitiesResponse = response.json().await?;
        Ok(body.entities)
    }
}
