use super::http_client::build_service_client;
use super::scrub::sanitize_error_body;
use super::types::{
    ChatRequest, ChatResponse, ExchangeResult, FailureKind, HealthStatus, MemoryListing,
};
use crate::config::ApiConfig;
use crate::error::ServiceError;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One round trip to the remote assistant.
///
/// Implementations make exactly one attempt and fold every failure into
/// [`ExchangeResult::Failure`]; they never retry.
pub trait ExchangeClient: Send + Sync {
    fn exchange<'a>(
        &'a self,
        session_id: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = ExchangeResult> + Send + 'a>>;
}

/// HTTP client for the memory chat service.
pub struct HttpExchangeClient {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl HttpExchangeClient {
    pub fn new(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.trim().trim_end_matches('/').to_string(),
            timeout: api.timeout(),
            client: build_service_client(api),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_failure(err: &reqwest::Error) -> FailureKind {
        if err.is_timeout() {
            FailureKind::Timeout
        } else {
            FailureKind::NetworkUnreachable
        }
    }

    async fn send_chat(&self, session_id: &str, text: &str) -> ExchangeResult {
        let url = format!("{}/chat", self.base_url);
        let request = ChatRequest {
            session_id,
            message: text,
        };

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                let kind = Self::transport_failure(&e);
                warn!(%kind, error = %e, "chat request failed before a response");
                return ExchangeResult::failure(kind);
            }
        };

        let status = response.status();
        let body = response.text().await;

        if !status.is_success() {
            let body = body.map_or_else(
                |_| "<unreadable body>".to_string(),
                |body| sanitize_error_body(&body),
            );
            warn!(%status, %body, "chat service returned an error status");
            return ExchangeResult::failure(FailureKind::ServerError);
        }

        let body = match body {
            Ok(body) => body,
            Err(e) => {
                // The service answered; only a stalled body counts as a timeout.
                let kind = if e.is_timeout() {
                    FailureKind::Timeout
                } else {
                    FailureKind::InvalidResponse
                };
                warn!(%kind, %status, error = %e, "failed to read chat response body");
                return ExchangeResult::failure(kind);
            }
        };

        match serde_json::from_str::<ChatResponse>(&body) {
            Ok(parsed) => {
                if let Some(error) = parsed.error.as_deref() {
                    warn!(error = %sanitize_error_body(error), "chat service reported an internal error");
                }
                debug!(
                    turn = ?parsed.turn,
                    used_memory = parsed.used_memory,
                    reply_chars = parsed.reply.chars().count(),
                    "chat reply received"
                );
                ExchangeResult::Success {
                    reply: parsed.reply,
                    used_memory: parsed.used_memory,
                }
            }
            Err(e) => {
                warn!(error = %e, body = %sanitize_error_body(&body), "malformed chat response");
                ExchangeResult::failure(FailureKind::InvalidResponse)
            }
        }
    }

    // ── Service endpoints ────────────────────────────────────────

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::from_transport(&e))?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: sanitize_error_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }

    /// `GET /` health probe.
    pub async fn health(&self) -> Result<HealthStatus, ServiceError> {
        let url = format!("{}/", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::from_transport(&e))?;
        Self::read_json(response).await
    }

    pub async fn list_memories(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<MemoryListing, ServiceError> {
        let url = self.memories_url(session_id)?;
        let response = self
            .client
            .get(url)
            .query(&[("limit", limit)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::from_transport(&e))?;
        Self::read_json(response).await
    }

    /// Ask the service to forget every memory stored for `session_id`.
    pub async fn clear_memories(&self, session_id: &str) -> Result<(), ServiceError> {
        let url = self.memories_url(session_id)?;
        let response = self
            .client
            .delete(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::from_transport(&e))?;
        let _: serde_json::Value = Self::read_json(response).await?;
        info!("cleared remote memories for current session");
        Ok(())
    }

    fn memories_url(&self, session_id: &str) -> Result<url::Url, ServiceError> {
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|e| ServiceError::Unreachable(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ServiceError::Unreachable("base url cannot have a path".into()))?
            .pop_if_empty()
            .extend(["session", session_id, "memories"]);
        Ok(url)
    }
}

impl ExchangeClient for HttpExchangeClient {
    fn exchange<'a>(
        &'a self,
        session_id: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = ExchangeResult> + Send + 'a>> {
        Box::pin(async move {
            debug!(url = %self.base_url, "dispatching chat exchange");
            match tokio::time::timeout(self.timeout, self.send_chat(session_id, text)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_secs = self.timeout.as_secs(), "chat exchange timed out");
                    ExchangeResult::failure(FailureKind::Timeout)
                }
            }
        })
    }
}
