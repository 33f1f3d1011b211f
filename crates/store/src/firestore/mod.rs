//! Document database REST client.
//!
//! Thin wrapper over the managed document store's REST surface. The store is
//! the source of truth - no local sync, direct API calls, with a short-TTL
//! `moka` cache for single-document reads on hot collections.
//!
//! # Operations
//!
//! - Create a document (optionally with a caller-chosen id)
//! - Get by id (absent documents are `Ok(None)`, not an error)
//! - Patch with a field mask (partial merge; the server refreshes
//!   `updateTime`)
//! - Delete
//! - Run a structured query (equality/range filters, single order-by)
//! - Run a COUNT aggregation

mod query;
mod types;
mod value;

pub use query::{Direction, Op, Query};
pub use types::Document;
pub use value::{ArrayValue, Fields, MapValue, Value};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use thiserror::Error;

use types::{AggregationElement, ApiErrorEnvelope, RunQueryElement, WriteDocument};

/// TTL for cached single-document reads.
const READ_CACHE_TTL: Duration = Duration::from_secs(60);

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("store API error ({code}): {message}")]
    Api { code: u16, message: String },

    /// A document with the requested id already exists.
    #[error("document already exists")]
    AlreadyExists,

    /// Rate limited; retry after the given number of seconds.
    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Failed to parse a response body.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for the document store client.
///
/// Implements `Debug` manually to redact the service token.
#[derive(Clone)]
pub struct FirestoreConfig {
    /// Cloud project id.
    pub project_id: String,
    /// Database id (usually `(default)`).
    pub database_id: String,
    /// Service bearer token for server-side access.
    pub service_token: SecretString,
    /// Endpoint override for the local emulator; `None` means production.
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for FirestoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreConfig")
            .field("project_id", &self.project_id)
            .field("database_id", &self.database_id)
            .field("service_token", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Client for the document database.
///
/// Cheaply cloneable; all clones share one HTTP connection pool and read
/// cache.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    /// `{endpoint}/v1/projects/{p}/databases/{d}/documents`
    documents_url: String,
    service_token: String,
    read_cache: Cache<String, Arc<Document>>,
}

impl FirestoreClient {
    /// Create a new document store client.
    #[must_use]
    pub fn new(config: &FirestoreConfig) -> Self {
        let endpoint = config
            .endpoint
            .as_deref()
            .unwrap_or("https://firestore.googleapis.com");
        let documents_url = format!(
            "{endpoint}/v1/projects/{}/databases/{}/documents",
            config.project_id, config.database_id
        );

        let read_cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(READ_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(FirestoreClientInner {
                client: reqwest::Client::new(),
                documents_url,
                service_token: config.service_token.expose_secret().to_owned(),
                read_cache,
            }),
        }
    }

    /// Get a document by id. Absent documents return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure.
    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(collection, id);
        let response = self.request(self.inner.client.get(&url)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = Self::check_status(response).await?;
        Ok(Some(serde_json::from_str(&body)?))
    }

    /// Get a document through the read cache.
    ///
    /// Writes through this client invalidate the cached entry; the entry
    /// otherwise expires after one minute.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure.
    pub async fn get_document_cached(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Arc<Document>>, StoreError> {
        let key = format!("{collection}/{id}");
        if let Some(doc) = self.inner.read_cache.get(&key).await {
            return Ok(Some(doc));
        }

        match self.get_document(collection, id).await? {
            Some(doc) => {
                let doc = Arc::new(doc);
                self.inner.read_cache.insert(key, Arc::clone(&doc)).await;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    /// Create a document.
    ///
    /// With `document_id`, an existing document with that id fails with
    /// [`StoreError::AlreadyExists`]; without, the store assigns an id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure.
    pub async fn create_document(
        &self,
        collection: &str,
        document_id: Option<&str>,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        let mut url = format!("{}/{collection}", self.inner.documents_url);
        if let Some(id) = document_id {
            url = format!("{url}?documentId={id}");
        }

        let response = self
            .request(self.inner.client.post(&url).json(&WriteDocument { fields }))
            .await?;
        let body = Self::check_status(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Patch a document: merge the given fields, leaving others untouched.
    ///
    /// The update mask is derived from the field keys, so removing a field
    /// requires writing an explicit null. The server refreshes `updateTime`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure.
    pub async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, StoreError> {
        let mask: Vec<String> = fields
            .keys()
            .map(|k| format!("updateMask.fieldPaths={k}"))
            .collect();
        let url = format!("{}?{}", self.document_url(collection, id), mask.join("&"));

        let response = self
            .request(
                self.inner
                    .client
                    .patch(&url)
                    .json(&WriteDocument { fields }),
            )
            .await?;
        let body = Self::check_status(response).await?;

        self.invalidate(collection, id).await;
        Ok(serde_json::from_str(&body)?)
    }

    /// Delete a document. Deleting an absent document succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let response = self.request(self.inner.client.delete(&url)).await?;
        Self::check_status(response).await?;

        self.invalidate(collection, id).await;
        Ok(())
    }

    /// Run a structured query and return the matching documents.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure.
    pub async fn run_query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}:runQuery", self.inner.documents_url);
        let body = json!({"structuredQuery": query.to_structured_query()});

        let response = self.request(self.inner.client.post(&url).json(&body)).await?;
        let body = Self::check_status(response).await?;

        let elements: Vec<RunQueryElement> = serde_json::from_str(&body)?;
        Ok(elements.into_iter().filter_map(|e| e.document).collect())
    }

    /// Count the documents matching a query via a COUNT aggregation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or API failure.
    pub async fn count(&self, query: &Query) -> Result<i64, StoreError> {
        let url = format!("{}:runAggregationQuery", self.inner.documents_url);
        let body = json!({
            "structuredAggregationQuery": {
                "structuredQuery": query.to_structured_query(),
                "aggregations": [{"count": {}, "alias": "total"}],
            }
        });

        let response = self.request(self.inner.client.post(&url).json(&body)).await?;
        let body = Self::check_status(response).await?;

        let elements: Vec<AggregationElement> = serde_json::from_str(&body)?;
        let count = elements
            .into_iter()
            .filter_map(|e| e.result)
            .find_map(|r| r.aggregate_fields.get("total").and_then(Value::as_i64))
            .unwrap_or(0);
        Ok(count)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.inner.documents_url)
    }

    async fn invalidate(&self, collection: &str, id: &str) {
        self.inner
            .read_cache
            .invalidate(&format!("{collection}/{id}"))
            .await;
    }

    async fn request(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let response = builder
            .bearer_auth(&self.inner.service_token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(StoreError::RateLimited(retry_after));
        }

        Ok(response)
    }

    /// Map non-success responses to typed errors, returning the body text on
    /// success.
    async fn check_status(response: reqwest::Response) -> Result<String, StoreError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.chars().take(200).collect());

        if status == reqwest::StatusCode::CONFLICT
            || message.contains("ALREADY_EXISTS")
            || message.contains("already exists")
        {
            return Err(StoreError::AlreadyExists);
        }

        tracing::error!(
            status = %status,
            message = %message,
            "document store returned non-success status"
        );
        Err(StoreError::Api {
            code: status.as_u16(),
            message,
        })
    }
}
