//! HTTP client for the Version Ledger API.
//!
//! [`HttpLedgerClient`] implements [`LedgerGateway`] so an
//! [`EditSession`](livetext_core::session::EditSession) in the admin UI can
//! save and browse history against a remote `livetext-api` server.

use async_trait::async_trait;
use livetext_core::error::CoreError;
use livetext_core::ledger::LedgerGateway;
use livetext_core::text_field::{SaveEntry, SaveOutcome, TextField, VersionRecord};
use livetext_core::types::VersionNumber;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors from the ledger HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("Ledger API error ({status}): {message}")]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Request(e) => CoreError::Storage(e.to_string()),
            ClientError::Api {
                status, message, ..
            } => match status {
                StatusCode::BAD_REQUEST => CoreError::Validation(message),
                StatusCode::UNAUTHORIZED => CoreError::Unauthorized(message),
                StatusCode::FORBIDDEN => CoreError::Forbidden(message),
                StatusCode::CONFLICT => CoreError::Conflict(message),
                StatusCode::NOT_FOUND => CoreError::NotFound {
                    entity: "Resource",
                    key: message,
                },
                s if s.is_server_error() || s == StatusCode::REQUEST_TIMEOUT => {
                    CoreError::Storage(message)
                }
                _ => CoreError::Internal(format!("unexpected status {status}: {message}")),
            },
        }
    }
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

#[derive(Serialize)]
struct BatchSaveBody<'a> {
    entries: &'a [SaveEntry],
}

/// Client for one `livetext-api` server, authenticated as one editor.
#[derive(Clone)]
pub struct HttpLedgerClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpLedgerClient {
    /// * `base_url` - Server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach the editor's bearer token, sent with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/text-fields{path}", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => (Some(body.code), body.error),
                Err(_) => (None, text),
            };
            tracing::debug!(%status, ?code, %message, "Ledger API request failed");
            return Err(ClientError::Api {
                status,
                code,
                message,
            });
        }
        let envelope: DataEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    /// Like [`send`](Self::send) but maps 404 to `None`.
    async fn send_optional<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>, ClientError> {
        match self.send(request).await {
            Ok(value) => Ok(Some(value)),
            Err(ClientError::Api { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl LedgerGateway for HttpLedgerClient {
    async fn get_current(&self, key: &str) -> Result<Option<TextField>, CoreError> {
        let request = self.http.get(self.url(&format!("/{key}")));
        Ok(self.send_optional(request).await?)
    }

    async fn list_history(&self, key: &str, limit: i64) -> Result<Vec<VersionRecord>, CoreError> {
        let request = self
            .http
            .get(self.url(&format!("/{key}/history")))
            .query(&[("limit", limit)]);
        Ok(self.send(request).await?)
    }

    async fn get_version(
        &self,
        key: &str,
        version_number: VersionNumber,
    ) -> Result<Option<VersionRecord>, CoreError> {
        let request = self
            .http
            .get(self.url(&format!("/{key}/history/{version_number}")));
        Ok(self.send_optional(request).await?)
    }

    async fn batch_save(&self, entries: &[SaveEntry]) -> Result<Vec<SaveOutcome>, CoreError> {
        let request = self.http.post(self.url("")).json(&BatchSaveBody { entries });
        let outcomes: Vec<SaveOutcome> = self.send(request).await?;
        tracing::debug!(count = outcomes.len(), "Batch saved over HTTP");
        Ok(outcomes)
    }
}
