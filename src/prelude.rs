//! Convenience re-exports for common use.

pub use crate::client::{EventStream, OpenCodeClient, SessionTransport};
pub use crate::config::BridgeConfig;
pub use crate::error::{BridgeError, Result};
pub use crate::provider::OpenCodeProvider;
pub use crate::translate::StreamState;
pub use crate::types::{
    FinishReason, GenerateResult, GenerationSettings, ModelRef, Part, PromptPart, PromptReply,
    ProviderRequest, Role, ServerEvent, StreamPart, ToolDefinition, Usage,
};
