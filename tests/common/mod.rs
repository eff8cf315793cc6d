//! Shared test support: a scripted in-process transport.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use opencode_bridge::client::{EventStream, SessionTransport};
use opencode_bridge::error::{BridgeError, Result};
use opencode_bridge::types::{
    MessageInfo, PartUpdated, PromptReply, ProviderRequest, Role, ServerEvent, SessionIdle,
};
use opencode_bridge::types::event::{Part, StepFinishPart, TextPart, TokenCounts};

/// Transport that replays a scripted event sequence.
pub struct FakeTransport {
    pub session_id: String,
    events: Mutex<Vec<ServerEvent>>,
    reply: Mutex<Option<PromptReply>>,
    pub fail_submit: bool,
    pub fail_subscribe: bool,
    /// Keep the feed open after the scripted events instead of closing it.
    pub hold_open: bool,
    aborted: AtomicBool,
}

impl FakeTransport {
    pub fn new(session_id: &str, events: Vec<ServerEvent>) -> Self {
        Self {
            session_id: session_id.to_string(),
            events: Mutex::new(events),
            reply: Mutex::new(None),
            fail_submit: false,
            fail_subscribe: false,
            hold_open: false,
            aborted: AtomicBool::new(false),
        }
    }

    pub fn with_reply(self, reply: PromptReply) -> Self {
        *self.reply.lock().unwrap() = Some(reply);
        self
    }

    pub fn abort_requested(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionTransport for FakeTransport {
    async fn create_session(&self, _title: Option<&str>) -> Result<String> {
        Ok(self.session_id.clone())
    }

    async fn submit_prompt(
        &self,
        _session_id: &str,
        _request: &ProviderRequest,
    ) -> Result<PromptReply> {
        if self.fail_submit {
            return Err(BridgeError::Stream("prompt submission refused".to_string()));
        }
        // Streaming callers ignore the reply; default to an empty one.
        Ok(self.reply.lock().unwrap().take().unwrap_or(PromptReply {
            info: MessageInfo {
                id: "msg_reply".to_string(),
                role: Role::Assistant,
                session_id: Some(self.session_id.clone()),
                error: None,
                finish: None,
            },
            parts: Vec::new(),
        }))
    }

    async fn abort_session(&self, _session_id: &str) -> Result<()> {
        self.aborted.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(&self) -> Result<EventStream> {
        if self.fail_subscribe {
            return Err(BridgeError::Stream("subscription refused".to_string()));
        }
        let events: Vec<Result<ServerEvent>> = self
            .events
            .lock()
            .unwrap()
            .clone()
            .into_iter()
            .map(Ok)
            .collect();
        let stream = futures::stream::iter(events);
        if self.hold_open {
            Ok(stream.chain(futures::stream::pending()).boxed())
        } else {
            Ok(stream.boxed())
        }
    }
}

pub fn assistant_message(session: &str, message_id: &str) -> ServerEvent {
    message_with_role(session, message_id, Role::Assistant)
}

pub fn message_with_role(session: &str, message_id: &str, role: Role) -> ServerEvent {
    ServerEvent::MessageUpdated(opencode_bridge::types::MessageUpdated {
        info: MessageInfo {
            id: message_id.to_string(),
            role,
            session_id: Some(session.to_string()),
            error: None,
            finish: None,
        },
        session_id: None,
    })
}

pub fn text_delta(session: &str, message_id: &str, part_id: &str, delta: &str) -> ServerEvent {
    ServerEvent::PartUpdated(PartUpdated {
        part: Part::Text(TextPart {
            id: part_id.to_string(),
            session_id: Some(session.to_string()),
            message_id: Some(message_id.to_string()),
            text: None,
            synthetic: false,
            ignored: false,
        }),
        delta: Some(delta.to_string()),
        session_id: None,
    })
}

pub fn step_finish(session: &str, message_id: &str, input: u64, output: u64) -> ServerEvent {
    ServerEvent::PartUpdated(PartUpdated {
        part: Part::StepFinish(StepFinishPart {
            id: "prt_step".to_string(),
            session_id: Some(session.to_string()),
            message_id: Some(message_id.to_string()),
            tokens: TokenCounts {
                input,
                output,
                ..TokenCounts::default()
            },
            cost: 0.0,
        }),
        delta: None,
        session_id: None,
    })
}

pub fn idle(session: &str) -> ServerEvent {
    ServerEvent::SessionIdle(SessionIdle {
        session_id: Some(session.to_string()),
    })
}
