//! Event-to-stream-part translation.
//!
//! [`StreamState`] is owned by exactly one in-flight request. Feeding it
//! server events (already confirmed to belong to the request's session)
//! yields caller-facing [`StreamPart`]s in a well-formed order: at most one
//! open text span and one open reasoning span at a time, start before delta
//! before end, and idempotent tool lifecycle emission under at-least-once
//! event delivery. Translation never fails; uninterpretable input is
//! dropped.

use std::collections::HashMap;

use serde_json::Value;

use crate::types::event::{
    Part, Role, ServerEvent, StepFinishPart, TextPart, ToolPart, ToolState, ToolStateDetail,
};
use crate::types::stream::StreamPart;
use crate::types::usage::Usage;

/// Per-request translation state.
#[derive(Debug, Default)]
pub struct StreamState {
    open_text: Option<OpenSpan>,
    open_reasoning: Option<OpenSpan>,
    tools: HashMap<String, ToolProgress>,
    usage: Usage,
    /// Message id -> role, used to suppress replays of the caller's own
    /// prior turns.
    roles: HashMap<String, Role>,
}

#[derive(Debug)]
struct OpenSpan {
    id: String,
    buffered: String,
}

/// Progress latches for one tool call. Each flag flips once; replayed
/// terminal states re-emit nothing.
#[derive(Debug)]
struct ToolProgress {
    tool_name: String,
    input_started: bool,
    input_ended: bool,
    call_emitted: bool,
    result_emitted: bool,
    last_input: String,
}

impl ToolProgress {
    fn new(tool_name: String) -> Self {
        Self {
            tool_name,
            input_started: false,
            input_ended: false,
            call_emitted: false,
            result_emitted: false,
            last_input: String::new(),
        }
    }
}

#[derive(Clone, Copy)]
enum SpanKind {
    Text,
    Reasoning,
}

impl SpanKind {
    fn start(self, id: &str) -> StreamPart {
        match self {
            SpanKind::Text => StreamPart::TextStart { id: id.to_string() },
            SpanKind::Reasoning => StreamPart::ReasoningStart { id: id.to_string() },
        }
    }

    fn delta(self, id: &str, text: &str) -> StreamPart {
        match self {
            SpanKind::Text => StreamPart::TextDelta {
                id: id.to_string(),
                text: text.to_string(),
            },
            SpanKind::Reasoning => StreamPart::ReasoningDelta {
                id: id.to_string(),
                text: text.to_string(),
            },
        }
    }

    fn end(self, id: &str) -> StreamPart {
        match self {
            SpanKind::Text => StreamPart::TextEnd { id: id.to_string() },
            SpanKind::Reasoning => StreamPart::ReasoningEnd { id: id.to_string() },
        }
    }
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message's role without going through a full event.
    pub fn note_role(&mut self, message_id: &str, role: Role) {
        self.roles.insert(message_id.to_string(), role);
    }

    /// Snapshot of the accumulated usage.
    pub fn usage(&self) -> Usage {
        self.usage.clone()
    }

    /// Translate one inbound event into zero or more outbound parts.
    ///
    /// Terminal signals (`session.status`, `session.idle`) are not handled
    /// here; the orchestrator consumes them via the correlator.
    pub fn translate(&mut self, event: &ServerEvent) -> Vec<StreamPart> {
        let mut out = Vec::new();
        match event {
            ServerEvent::MessageUpdated(e) => {
                self.roles.insert(e.info.id.clone(), e.info.role);
            }
            ServerEvent::PartUpdated(e) => {
                self.translate_part_into(&e.part, e.delta.as_deref(), &mut out);
            }
            ServerEvent::SessionStatus(_) | ServerEvent::SessionIdle(_) | ServerEvent::Unknown => {}
        }
        out
    }

    /// Translate one part, as from an event carrying no explicit delta.
    /// Used by the non-streaming path over a complete part list.
    pub fn translate_part(&mut self, part: &Part) -> Vec<StreamPart> {
        let mut out = Vec::new();
        self.translate_part_into(part, None, &mut out);
        out
    }

    /// Close any still-open spans, returning their end events. Called before
    /// `finish` so every start is matched.
    pub fn close_open_spans(&mut self) -> Vec<StreamPart> {
        let mut out = Vec::new();
        if let Some(span) = self.open_text.take() {
            out.push(StreamPart::TextEnd { id: span.id });
        }
        if let Some(span) = self.open_reasoning.take() {
            out.push(StreamPart::ReasoningEnd { id: span.id });
        }
        out
    }

    fn translate_part_into(&mut self, part: &Part, delta: Option<&str>, out: &mut Vec<StreamPart>) {
        // Fragments from the caller's own prior turns are replayed by the
        // server; only assistant output reaches the caller stream.
        if let Some(message_id) = part.message_id() {
            if self.roles.get(message_id) == Some(&Role::User) {
                return;
            }
        }

        match part {
            Part::Text(p) => self.relay_span(SpanKind::Text, p, delta, out),
            Part::Reasoning(p) => self.relay_span(SpanKind::Reasoning, p, delta, out),
            Part::Tool(p) => self.relay_tool(p, out),
            Part::StepFinish(p) => self.add_usage(p),
            // Attachments have no outbound mapping.
            Part::File(_) => {}
            Part::Unknown => {
                tracing::debug!("ignoring unrecognized part kind");
            }
        }
    }

    fn relay_span(
        &mut self,
        kind: SpanKind,
        part: &TextPart,
        delta: Option<&str>,
        out: &mut Vec<StreamPart>,
    ) {
        if part.synthetic || part.ignored {
            return;
        }

        let slot = match kind {
            SpanKind::Text => &mut self.open_text,
            SpanKind::Reasoning => &mut self.open_reasoning,
        };

        let same_span = slot.as_ref().is_some_and(|span| span.id == part.id);
        if !same_span {
            if let Some(previous) = slot.take() {
                out.push(kind.end(&previous.id));
            }
            out.push(kind.start(&part.id));
            *slot = Some(OpenSpan {
                id: part.id.clone(),
                buffered: String::new(),
            });
        }
        let Some(span) = slot.as_mut() else {
            return;
        };

        if let Some(delta) = delta {
            if !delta.is_empty() {
                out.push(kind.delta(&part.id, delta));
                span.buffered.push_str(delta);
            }
        } else if let Some(snapshot) = part.text.as_deref() {
            // Snapshots must extend what we have already emitted. A snapshot
            // that is not a superset is a server inconsistency; emit nothing
            // rather than a negative-length delta.
            if let Some(suffix) = snapshot.strip_prefix(span.buffered.as_str()) {
                if !suffix.is_empty() {
                    out.push(kind.delta(&part.id, suffix));
                    span.buffered = snapshot.to_string();
                }
            }
        }
    }

    fn relay_tool(&mut self, part: &ToolPart, out: &mut Vec<StreamPart>) {
        let call_id = part
            .call_id
            .clone()
            .unwrap_or_else(|| part.id.clone());
        let progress = self
            .tools
            .entry(call_id.clone())
            .or_insert_with(|| ToolProgress::new(part.tool.clone()));

        match &part.state {
            ToolState::Pending(detail) => {
                open_input(progress, &call_id, detail, out);
            }
            ToolState::Running(detail) => {
                open_input(progress, &call_id, detail, out);
                let serialized = serialize_input(detail.input.as_ref());
                if let Some(suffix) = serialized.strip_prefix(progress.last_input.as_str()) {
                    if !suffix.is_empty() {
                        out.push(StreamPart::ToolInputDelta {
                            id: call_id.clone(),
                            delta: suffix.to_string(),
                        });
                    }
                }
                progress.last_input = serialized;
            }
            ToolState::Completed(detail) => {
                let output = detail.output.clone().unwrap_or_default();
                close_call(progress, &call_id, detail, output, false, out);
            }
            ToolState::Error(detail) => {
                let output = detail
                    .error
                    .clone()
                    .unwrap_or_else(|| "tool execution failed".to_string());
                tracing::warn!(
                    tool = %progress.tool_name,
                    call = %call_id,
                    "tool call ended in error"
                );
                close_call(progress, &call_id, detail, output, true, out);
            }
            ToolState::Unknown => {}
        }
    }

    fn add_usage(&mut self, step: &StepFinishPart) {
        self.usage.add_step(step);
    }
}

fn open_input(
    progress: &mut ToolProgress,
    call_id: &str,
    detail: &ToolStateDetail,
    out: &mut Vec<StreamPart>,
) {
    if !progress.input_started {
        out.push(StreamPart::ToolInputStart {
            id: call_id.to_string(),
            tool_name: progress.tool_name.clone(),
            title: detail.title.clone(),
        });
        progress.input_started = true;
    }
}

/// Terminal handling shared by `completed` and `error`: close the input
/// stream (opening it first if the backend skipped straight to a terminal
/// state), then emit the call and result exactly once.
fn close_call(
    progress: &mut ToolProgress,
    call_id: &str,
    detail: &ToolStateDetail,
    output: String,
    is_error: bool,
    out: &mut Vec<StreamPart>,
) {
    let serialized = serialize_input(detail.input.as_ref());

    if !progress.input_ended {
        open_input(progress, call_id, detail, out);
        out.push(StreamPart::ToolInputEnd {
            id: call_id.to_string(),
        });
        progress.input_ended = true;
    }
    if !progress.call_emitted {
        out.push(StreamPart::ToolCall {
            id: call_id.to_string(),
            tool_name: progress.tool_name.clone(),
            input: serialized.clone(),
        });
        progress.call_emitted = true;
    }
    if !progress.result_emitted {
        out.push(StreamPart::ToolResult {
            id: call_id.to_string(),
            tool_name: progress.tool_name.clone(),
            output,
            is_error,
        });
        progress.result_emitted = true;
    }
    progress.last_input = serialized;
}

fn serialize_input(input: Option<&Value>) -> String {
    input.map(Value::to_string).unwrap_or_default()
}
