//! Core types: inbound server events, outbound stream parts, requests, usage.

pub mod event;
pub mod request;
pub mod stream;
pub mod usage;

pub use event::{
    MessageError, MessageInfo, MessageUpdated, Part, PartUpdated, Role, ServerEvent,
    SessionIdle, SessionStatus, SessionStatusChanged, StepFinishPart, TextPart, ToolPart,
    ToolState, ToolStateDetail,
};
pub use request::{
    GenerateResult, GenerationSettings, ModelRef, PromptPart, PromptReply, ProviderRequest,
    ToolCallSummary, ToolDefinition, ToolResultSummary,
};
pub use stream::{FinishReason, StreamPart};
pub use usage::Usage;
