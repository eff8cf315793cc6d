//! Finish-reason classification.
//!
//! Maps the terminal assistant message descriptor (or a raw failure) onto
//! the closed [`FinishReason`] taxonomy. Pure and total: never panics,
//! never errors.

use crate::error::BridgeError;
use crate::types::event::MessageInfo;
use crate::types::stream::FinishReason;

/// Classify a terminal message descriptor.
///
/// A reported error wins over any `finish` token. Unrecognized finish
/// tokens map to `Stop`: the server treats them as normal completion, and
/// so do we. Only a missing descriptor yields `Unknown`.
pub fn classify(info: Option<&MessageInfo>) -> FinishReason {
    let Some(info) = info else {
        return FinishReason::Unknown;
    };

    if let Some(error) = &info.error {
        // Error names are matched case-sensitively; an abort is a normal
        // stop, not a failure.
        return match error.name.as_str() {
            "MessageAbortedError" => FinishReason::Stop,
            "MessageOutputLengthError" => FinishReason::Length,
            _ => FinishReason::Error,
        };
    }

    match info.finish.as_deref() {
        None => FinishReason::Stop,
        Some(finish) => match finish.to_ascii_lowercase().as_str() {
            "end_turn" | "stop" | "end" => FinishReason::Stop,
            "max_tokens" | "length" => FinishReason::Length,
            "tool_use" | "tool_calls" => FinishReason::ToolCalls,
            "content_filter" | "safety" => FinishReason::ContentFilter,
            "error" => FinishReason::Error,
            _ => FinishReason::Stop,
        },
    }
}

/// Classify a raw caught failure (not a message descriptor).
pub fn classify_failure(error: &BridgeError) -> FinishReason {
    let text = error.to_string().to_ascii_lowercase();
    if text.contains("abort") {
        FinishReason::Stop
    } else if text.contains("output length") || text.contains("max tokens") {
        FinishReason::Length
    } else {
        FinishReason::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event::{MessageError, Role};

    fn descriptor(error: Option<&str>, finish: Option<&str>) -> MessageInfo {
        MessageInfo {
            id: "msg_1".to_string(),
            role: Role::Assistant,
            session_id: None,
            error: error.map(|name| MessageError {
                name: name.to_string(),
                data: None,
            }),
            finish: finish.map(str::to_string),
        }
    }

    #[test]
    fn finish_tokens_classify_case_insensitively() {
        let cases = [
            ("end_turn", FinishReason::Stop),
            ("MAX_TOKENS", FinishReason::Length),
            ("tool_use", FinishReason::ToolCalls),
            ("tool_calls", FinishReason::ToolCalls),
            ("content_filter", FinishReason::ContentFilter),
            ("safety", FinishReason::ContentFilter),
            ("error", FinishReason::Error),
            ("some_future_token", FinishReason::Stop),
        ];
        for (token, expected) in cases {
            assert_eq!(
                classify(Some(&descriptor(None, Some(token)))),
                expected,
                "finish token {token:?}"
            );
        }
    }

    #[test]
    fn error_names_classify_case_sensitively() {
        assert_eq!(
            classify(Some(&descriptor(Some("MessageAbortedError"), None))),
            FinishReason::Stop
        );
        assert_eq!(
            classify(Some(&descriptor(Some("MessageOutputLengthError"), None))),
            FinishReason::Length
        );
        assert_eq!(
            classify(Some(&descriptor(Some("ProviderAuthError"), None))),
            FinishReason::Error
        );
        assert_eq!(
            classify(Some(&descriptor(Some("messageabortederror"), None))),
            FinishReason::Error
        );
    }

    #[test]
    fn error_wins_over_finish() {
        assert_eq!(
            classify(Some(&descriptor(Some("APIError"), Some("end_turn")))),
            FinishReason::Error
        );
    }

    #[test]
    fn missing_descriptor_is_unknown_and_empty_descriptor_is_stop() {
        assert_eq!(classify(None), FinishReason::Unknown);
        assert_eq!(classify(Some(&descriptor(None, None))), FinishReason::Stop);
    }

    #[test]
    fn failures_classify_by_signature() {
        assert_eq!(
            classify_failure(&BridgeError::Aborted),
            FinishReason::Stop
        );
        assert_eq!(
            classify_failure(&BridgeError::Stream("output length exceeded".to_string())),
            FinishReason::Length
        );
        assert_eq!(
            classify_failure(&BridgeError::Configuration("missing url".to_string())),
            FinishReason::Error
        );
    }
}
