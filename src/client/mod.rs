//! Session transport: HTTP + SSE connection to the agent server.
//!
//! [`SessionTransport`] is the seam the orchestrator drives; the default
//! implementation is [`OpenCodeClient`]. One underlying connection per
//! process is enough for any number of sessions ([`OpenCodeClient::shared`]);
//! construct explicitly for isolated scenarios.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::types::event::ServerEvent;
use crate::types::request::{ModelRef, PromptPart, PromptReply, ProviderRequest};

static SHARED_CLIENT: OnceLock<Arc<OpenCodeClient>> = OnceLock::new();

/// Asynchronous sequence of server events, all sessions interleaved.
pub type EventStream = BoxStream<'static, Result<ServerEvent>>;

/// Session lifecycle and event feed of the agent server.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Create a session, returning its id.
    async fn create_session(&self, title: Option<&str>) -> Result<String>;

    /// Submit a prompt and wait for the complete terminal reply.
    async fn submit_prompt(&self, session_id: &str, request: &ProviderRequest)
        -> Result<PromptReply>;

    /// Best-effort server-side abort of a running session.
    async fn abort_session(&self, session_id: &str) -> Result<()>;

    /// Subscribe to the server's event feed.
    async fn subscribe(&self) -> Result<EventStream>;
}

/// HTTP client for an opencode-style agent server.
#[derive(Debug, Clone)]
pub struct OpenCodeClient {
    config: BridgeConfig,
    http: reqwest::Client,
}

impl OpenCodeClient {
    pub fn new(config: BridgeConfig) -> Self {
        // No overall timeout: the event feed is long-lived.
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    /// Get (or create) the process-wide shared client, configured from env.
    pub fn shared() -> Arc<OpenCodeClient> {
        SHARED_CLIENT
            .get_or_init(|| Arc::new(Self::new(BridgeConfig::global().clone())))
            .clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url())
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = self.config.auth_token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BridgeError::api(status.as_u16(), body))
    }
}

#[derive(Serialize)]
struct CreateSessionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
}

#[derive(Deserialize)]
struct SessionInfo {
    id: String,
}

#[derive(Serialize)]
struct PromptBody<'a> {
    parts: &'a [PromptPart],
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a ModelRef>,
}

#[async_trait]
impl SessionTransport for OpenCodeClient {
    async fn create_session(&self, title: Option<&str>) -> Result<String> {
        let response = self
            .request(reqwest::Method::POST, "/session")
            .json(&CreateSessionBody { title })
            .send()
            .await?;
        let info: SessionInfo = Self::check(response).await?.json().await?;
        Ok(info.id)
    }

    async fn submit_prompt(
        &self,
        session_id: &str,
        request: &ProviderRequest,
    ) -> Result<PromptReply> {
        let body = PromptBody {
            parts: &request.parts,
            model: request.model.as_ref(),
        };
        let response = self
            .request(reqwest::Method::POST, &format!("/session/{session_id}/message"))
            .json(&body)
            .send()
            .await?;
        let reply: PromptReply = Self::check(response).await?.json().await?;
        Ok(reply)
    }

    async fn abort_session(&self, session_id: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, &format!("/session/{session_id}/abort"))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn subscribe(&self) -> Result<EventStream> {
        let response = self.request(reqwest::Method::GET, "/event").send().await?;
        let response = Self::check(response).await?;
        let mut bytes = response.bytes_stream();

        let events = async_stream::stream! {
            let mut buffer = String::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(BridgeError::Network(e));
                        break;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    if let Some(data) = parse_sse_data(&line) {
                        match serde_json::from_str::<ServerEvent>(data) {
                            Ok(event) => yield Ok(event),
                            // Malformed payloads are skipped, not fatal.
                            Err(e) => {
                                tracing::debug!(error = %e, "skipping malformed event payload");
                            }
                        }
                    }
                }
            }
        };

        Ok(Box::pin(events))
    }
}

/// Parse an SSE "data:" line.
fn parse_sse_data(line: &str) -> Option<&str> {
    line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:"))
}
