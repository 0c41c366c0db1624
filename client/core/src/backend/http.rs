//! HTTP Backend Implementation
//!
//! Talks to the FastAPI conversation service over JSON/HTTP.
//!
//! # API
//!
//! | Method & Path | Body | Response |
//! |---|---|---|
//! | `GET /conversations/` | - | `[{id, title}]` |
//! | `POST /conversations/` | `{title}` | `{id, title}` |
//! | `DELETE /conversations/{id}` | - | `{ok}` / `{detail}` |
//! | `GET /conversations/{id}/messages` | - | `[{role, content}]` |
//! | `POST /conversations/{id}/messages` | `{role: "user", content}` | `{role: "assistant", content}` |
//! | `POST /generate-title` | `{content}` | `{title}` |
//!
//! No retries and no authentication.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::traits::ChatBackend;
use crate::config::ClientConfig;
use crate::error::{SyncError, SyncResult};
use crate::messages::{
    Conversation, ConversationId, ErrorBody, Message, NewConversation, TitleRequest,
    TitleResponse,
};

/// HTTP client for the conversation service
#[derive(Clone)]
pub struct HttpBackend {
    /// Base URL without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend from configuration
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> SyncResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(SyncError::Client)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Base URL this backend talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode a JSON body
    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: String,
        request: RequestBuilder,
    ) -> SyncResult<T> {
        let body = self.send(&endpoint, request).await?;
        serde_json::from_str(&body).map_err(|e| SyncError::Decode {
            endpoint,
            reason: e.to_string(),
        })
    }

    /// Send a request, returning the raw body of a success response
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> SyncResult<String> {
        debug!(endpoint, "Sending request");

        let response = request.send().await.map_err(|source| SyncError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| SyncError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(status_error(endpoint, status, &body));
        }

        Ok(body)
    }
}

/// Map a non-success response, preferring the backend's `detail`
fn status_error(endpoint: &str, status: StatusCode, body: &str) -> SyncError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail_text())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    SyncError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        detail,
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn list_conversations(&self) -> SyncResult<Vec<Conversation>> {
        let request = self.http_client.get(self.url("/conversations/"));
        self.send_json("GET /conversations/".to_string(), request)
            .await
    }

    async fn create_conversation(&self, title: &str) -> SyncResult<Conversation> {
        let request = self
            .http_client
            .post(self.url("/conversations/"))
            .json(&NewConversation {
                title: title.to_string(),
            });
        self.send_json("POST /conversations/".to_string(), request)
            .await
    }

    async fn delete_conversation(&self, id: ConversationId) -> SyncResult<()> {
        let path = format!("/conversations/{id}");
        let request = self
            .http_client
            .delete(self.url(&path))
            .header(CONTENT_TYPE, "application/json");
        // The result object ({"ok": true}) carries nothing we keep
        self.send(&format!("DELETE {path}"), request).await?;
        Ok(())
    }

    async fn fetch_messages(&self, id: ConversationId) -> SyncResult<Vec<Message>> {
        let path = format!("/conversations/{id}/messages");
        let request = self.http_client.get(self.url(&path));
        self.send_json(format!("GET {path}"), request).await
    }

    async fn post_message(&self, id: ConversationId, content: &str) -> SyncResult<Message> {
        let path = format!("/conversations/{id}/messages");
        let request = self
            .http_client
            .post(self.url(&path))
            .json(&Message::user(content));
        self.send_json(format!("POST {path}"), request).await
    }

    async fn generate_title(&self, content: &str) -> SyncResult<String> {
        let request = self
            .http_client
            .post(self.url("/generate-title"))
            .json(&TitleRequest {
                content: content.to_string(),
            });
        let response: TitleResponse = self
            .send_json("POST /generate-title".to_string(), request)
            .await?;
        Ok(response.title)
    }
}
