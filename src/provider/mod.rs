//! The provider surface: drive one generation request against the agent
//! server, streaming or not.
//!
//! Streaming relays the server event feed through the per-request
//! [`StreamState`](crate::translate::StreamState); the non-streaming path
//! runs the same interpretation over the complete reply. One logical task
//! per request; concurrent requests are isolated purely by session
//! correlation on the shared feed.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::{OpenCodeClient, SessionTransport};
use crate::correlate;
use crate::error::Result;
use crate::finish;
use crate::translate::StreamState;
use crate::types::event::{MessageInfo, Role, ServerEvent};
use crate::types::request::{
    GenerateResult, PromptReply, ProviderRequest, ToolCallSummary, ToolResultSummary,
};
use crate::types::stream::StreamPart;

/// Provider backed by one agent-server session.
///
/// Holds a session reference, never ownership: sessions outlive the
/// provider and are only created here when the caller supplied none.
#[derive(Clone)]
pub struct OpenCodeProvider {
    transport: Arc<dyn SessionTransport>,
    session_id: Option<String>,
    session_title: Option<String>,
}

impl OpenCodeProvider {
    pub fn new(transport: Arc<dyn SessionTransport>) -> Self {
        Self {
            transport,
            session_id: None,
            session_title: None,
        }
    }

    /// Provider over the process-wide shared connection.
    pub fn from_shared() -> Self {
        Self::new(OpenCodeClient::shared())
    }

    /// Reuse an existing session instead of creating one lazily.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Title given to a lazily created session.
    pub fn with_session_title(mut self, title: impl Into<String>) -> Self {
        self.session_title = Some(title.into());
        self
    }

    async fn resolve_session(&self) -> Result<String> {
        match &self.session_id {
            Some(id) => Ok(id.clone()),
            None => {
                self.transport
                    .create_session(self.session_title.as_deref())
                    .await
            }
        }
    }

    /// Generate a complete result (non-streaming).
    pub async fn generate_text(&self, request: &ProviderRequest) -> Result<GenerateResult> {
        let warnings = setup_warnings(request);
        let session_id = self.resolve_session().await?;
        let reply = self.transport.submit_prompt(&session_id, request).await?;
        Ok(collect_reply(&reply, warnings))
    }

    /// Generate as a live stream of [`StreamPart`]s.
    ///
    /// The stream ends with exactly one `finish` or `error` event, except
    /// under cancellation, where it simply closes. A token cancelled before
    /// the call short-circuits with no network activity.
    pub async fn stream_text(
        &self,
        request: &ProviderRequest,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, StreamPart>> {
        if cancel.is_cancelled() {
            return Ok(Box::pin(futures::stream::empty()));
        }

        let warnings = setup_warnings(request);
        let transport = self.transport.clone();
        let session_id = self.resolve_session().await?;
        let request = request.clone();

        let stream = async_stream::stream! {
            yield StreamPart::StreamStart { warnings };

            // Subscribe before submitting so no early event is missed.
            let mut events = match transport.subscribe().await {
                Ok(events) => events,
                Err(e) => {
                    yield StreamPart::Error { message: e.to_string() };
                    return;
                }
            };

            // Submission runs detached; the event feed stays authoritative
            // for completion, so a submit failure is surfaced but does not
            // end the relay by itself.
            let (submit_err_tx, mut submit_err_rx) = mpsc::channel(1);
            {
                let transport = transport.clone();
                let session_id = session_id.clone();
                tokio::spawn(async move {
                    if let Err(e) = transport.submit_prompt(&session_id, &request).await {
                        let _ = submit_err_tx.send(e).await;
                    }
                });
            }

            let mut state = StreamState::new();
            let mut last_assistant: Option<MessageInfo> = None;

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        // Abort is advisory; its failure is swallowed. No
                        // finish event on this path: closure without one
                        // is how callers see an aborted generation.
                        let _ = transport.abort_session(&session_id).await;
                        return;
                    }
                    Some(e) = submit_err_rx.recv() => {
                        yield StreamPart::Error { message: e.to_string() };
                    }
                    next = events.next() => {
                        let Some(item) = next else {
                            for part in state.close_open_spans() {
                                yield part;
                            }
                            yield StreamPart::Error {
                                message: "event feed closed before the session went idle".to_string(),
                            };
                            return;
                        };
                        let event = match item {
                            Ok(event) => event,
                            Err(e) => {
                                for part in state.close_open_spans() {
                                    yield part;
                                }
                                yield StreamPart::Error { message: e.to_string() };
                                return;
                            }
                        };

                        if !correlate::belongs_to_session(&event, &session_id) {
                            continue;
                        }
                        if correlate::is_terminal(&event, &session_id) {
                            for part in state.close_open_spans() {
                                yield part;
                            }
                            yield StreamPart::Finish {
                                usage: state.usage(),
                                finish_reason: finish::classify(last_assistant.as_ref()),
                            };
                            return;
                        }

                        if let ServerEvent::MessageUpdated(m) = &event {
                            if m.info.role == Role::Assistant {
                                last_assistant = Some(m.info.clone());
                            }
                        }
                        for part in state.translate(&event) {
                            yield part;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Warnings surfaced on `stream-start`: settings and tool definitions the
/// agent server does not accept from a client.
fn setup_warnings(request: &ProviderRequest) -> Vec<String> {
    let mut warnings = Vec::new();
    let settings = &request.settings;
    let ignored = [
        ("max_tokens", settings.max_tokens.is_some()),
        ("temperature", settings.temperature.is_some()),
        ("top_p", settings.top_p.is_some()),
        ("seed", settings.seed.is_some()),
        ("stop_sequences", settings.stop_sequences.is_some()),
    ];
    for (name, present) in ignored {
        if present {
            warnings.push(format!(
                "{name} is ignored: sampling is controlled by the agent server"
            ));
        }
    }
    if !request.tools.is_empty() {
        warnings.push(
            "tool definitions are ignored: the agent server manages its own tools".to_string(),
        );
    }
    warnings
}

/// Fold a complete reply through the translator, applying the same
/// interpretation the streaming path applies incrementally.
fn collect_reply(reply: &PromptReply, warnings: Vec<String>) -> GenerateResult {
    let mut state = StreamState::new();
    state.note_role(&reply.info.id, reply.info.role);

    let mut parts = Vec::new();
    for part in &reply.parts {
        parts.extend(state.translate_part(part));
    }
    parts.extend(state.close_open_spans());

    let mut text = String::new();
    let mut reasoning = String::new();
    let mut tool_calls = Vec::new();
    let mut tool_results = Vec::new();
    for part in parts {
        match part {
            StreamPart::TextDelta { text: t, .. } => text.push_str(&t),
            StreamPart::ReasoningDelta { text: t, .. } => reasoning.push_str(&t),
            StreamPart::ToolCall {
                id,
                tool_name,
                input,
            } => tool_calls.push(ToolCallSummary {
                id,
                tool_name,
                input,
            }),
            StreamPart::ToolResult {
                id,
                tool_name,
                output,
                is_error,
            } => tool_results.push(ToolResultSummary {
                id,
                tool_name,
                output,
                is_error,
            }),
            _ => {}
        }
    }

    GenerateResult {
        text,
        reasoning,
        tool_calls,
        tool_results,
        usage: state.usage(),
        finish_reason: finish::classify(Some(&reply.info)),
        warnings,
    }
}
