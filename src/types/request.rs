//! Request and result shapes for the provider surface.

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::event::{MessageInfo, Part};
use super::stream::FinishReason;
use super::usage::Usage;

/// A request sent to the agent server.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    pub parts: Vec<PromptPart>,
    pub model: Option<ModelRef>,
    /// Tool definitions supplied by the caller. The agent server manages its
    /// own tools, so these are dropped with a warning.
    pub tools: Vec<ToolDefinition>,
    pub settings: GenerationSettings,
}

impl ProviderRequest {
    /// Request carrying a single user text part.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![PromptPart::Text {
                text: prompt.into(),
            }],
            ..Self::default()
        }
    }
}

/// Prompt content sent to the server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptPart {
    Text { text: String },
}

/// Model selection forwarded to the server.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRef {
    #[serde(rename = "providerID")]
    pub provider_id: String,
    #[serde(rename = "modelID")]
    pub model_id: String,
}

/// Tool definition in the conventional provider shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Settings accepted for interface compatibility. The agent server controls
/// sampling itself, so any setting present here produces a stream-start
/// warning instead of an effect.
#[derive(Debug, Clone, Builder, Default)]
pub struct GenerationSettings {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub seed: Option<u64>,
    pub stop_sequences: Option<Vec<String>>,
}

/// Complete reply to a prompt: the terminal assistant message plus every
/// part it produced, in order.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptReply {
    pub info: MessageInfo,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Non-streaming generation result.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResult {
    pub text: String,
    pub reasoning: String,
    pub tool_calls: Vec<ToolCallSummary>,
    pub tool_results: Vec<ToolResultSummary>,
    pub usage: Usage,
    pub finish_reason: FinishReason,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallSummary {
    pub id: String,
    pub tool_name: String,
    /// Serialized JSON input.
    pub input: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolResultSummary {
    pub id: String,
    pub tool_name: String,
    pub output: String,
    pub is_error: bool,
}
