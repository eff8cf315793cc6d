//! Inbound server events.
//!
//! The agent server publishes state changes on one SSE feed shared by every
//! session. Shapes here mirror the wire protocol (camelCase identifiers such
//! as `sessionID`); unknown event and part kinds deserialize into `Unknown`
//! variants instead of failing, so a newer server never breaks the feed.

use serde::Deserialize;
use serde_json::Value;

/// One notification from the server event feed.
///
/// Tagged by `type` with the payload under `properties`. Deserialized by
/// hand because serde's derived `#[serde(other)]` rejects unknown tags that
/// still carry a content payload.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    PartUpdated(PartUpdated),
    MessageUpdated(MessageUpdated),
    SessionStatus(SessionStatusChanged),
    SessionIdle(SessionIdle),
    Unknown,
}

impl<'de> Deserialize<'de> for ServerEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(rename = "type")]
            kind: String,
            #[serde(default)]
            properties: Value,
        }

        let envelope = Envelope::deserialize(deserializer)?;
        let event = match envelope.kind.as_str() {
            "message.part.updated" => ServerEvent::PartUpdated(
                serde_json::from_value(envelope.properties).map_err(serde::de::Error::custom)?,
            ),
            "message.updated" => ServerEvent::MessageUpdated(
                serde_json::from_value(envelope.properties).map_err(serde::de::Error::custom)?,
            ),
            "session.status" => ServerEvent::SessionStatus(
                serde_json::from_value(envelope.properties).map_err(serde::de::Error::custom)?,
            ),
            "session.idle" => ServerEvent::SessionIdle(
                serde_json::from_value(envelope.properties).map_err(serde::de::Error::custom)?,
            ),
            _ => ServerEvent::Unknown,
        };
        Ok(event)
    }
}

/// A message part arrived or changed.
#[derive(Debug, Clone, Deserialize)]
pub struct PartUpdated {
    pub part: Part,
    /// Incremental delta for text/reasoning parts. Servers that send only
    /// full snapshots omit this.
    #[serde(default)]
    pub delta: Option<String>,
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
}

/// A message's metadata changed (role known, terminal status, error).
#[derive(Debug, Clone, Deserialize)]
pub struct MessageUpdated {
    pub info: MessageInfo,
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatusChanged {
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionIdle {
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Busy,
    Retrying,
    #[serde(other)]
    Unknown,
}

/// Message metadata. For assistant messages the terminal update doubles as
/// the finish descriptor: `error` and `finish` feed reason classification.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageInfo {
    pub id: String,
    pub role: Role,
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub error: Option<MessageError>,
    #[serde(default)]
    pub finish: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageError {
    pub name: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Role {
    User,
    Assistant,
    /// Any role this crate does not recognize.
    Other,
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other,
        }
    }
}

/// A typed piece of message content.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Part {
    #[serde(rename = "text")]
    Text(TextPart),
    #[serde(rename = "reasoning")]
    Reasoning(TextPart),
    #[serde(rename = "tool")]
    Tool(ToolPart),
    #[serde(rename = "step-finish")]
    StepFinish(StepFinishPart),
    #[serde(rename = "file")]
    File(FilePart),
    #[serde(other)]
    Unknown,
}

impl Part {
    /// Session this part belongs to, when the part carries one.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Part::Text(p) | Part::Reasoning(p) => p.session_id.as_deref(),
            Part::Tool(p) => p.session_id.as_deref(),
            Part::StepFinish(p) => p.session_id.as_deref(),
            Part::File(p) => p.session_id.as_deref(),
            Part::Unknown => None,
        }
    }

    /// Owning message, when the part carries one.
    pub fn message_id(&self) -> Option<&str> {
        match self {
            Part::Text(p) | Part::Reasoning(p) => p.message_id.as_deref(),
            Part::Tool(p) => p.message_id.as_deref(),
            Part::StepFinish(p) => p.message_id.as_deref(),
            Part::File(p) => p.message_id.as_deref(),
            Part::Unknown => None,
        }
    }
}

/// Text or reasoning content. `text` is a full snapshot of the part so far;
/// the owning event may additionally carry an incremental delta.
#[derive(Debug, Clone, Deserialize)]
pub struct TextPart {
    pub id: String,
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
    #[serde(rename = "messageID", default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Injected context, not model output.
    #[serde(default)]
    pub synthetic: bool,
    #[serde(default)]
    pub ignored: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolPart {
    pub id: String,
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
    #[serde(rename = "messageID", default)]
    pub message_id: Option<String>,
    /// Stable call identifier. Falls back to the part id when absent.
    #[serde(rename = "callID", default)]
    pub call_id: Option<String>,
    pub tool: String,
    pub state: ToolState,
}

/// Tool call lifecycle: `pending -> running -> (completed | error)`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolState {
    Pending(ToolStateDetail),
    Running(ToolStateDetail),
    Completed(ToolStateDetail),
    Error(ToolStateDetail),
    #[serde(other)]
    Unknown,
}

/// State payload shared by the lifecycle variants. `input` is cumulative;
/// `output`/`error` only appear in terminal states.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolStateDetail {
    #[serde(default)]
    pub input: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Per-step token accounting emitted by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct StepFinishPart {
    pub id: String,
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
    #[serde(rename = "messageID", default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub tokens: TokenCounts,
    #[serde(default)]
    pub cost: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenCounts {
    #[serde(default)]
    pub input: u64,
    #[serde(default)]
    pub output: u64,
    #[serde(default)]
    pub reasoning: u64,
    #[serde(default)]
    pub cache: CacheTokens,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheTokens {
    #[serde(default)]
    pub read: u64,
    #[serde(default)]
    pub write: u64,
}

/// File attachment produced by the agent. Has no outbound stream mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct FilePart {
    pub id: String,
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
    #[serde(rename = "messageID", default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
