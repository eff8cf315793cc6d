//! Session correlation.
//!
//! The server multiplexes every session onto one event feed; these checks
//! are the only isolation between concurrent requests. Both functions are
//! pure and total: malformed or unknown shapes are non-matching, never an
//! error.

use crate::types::event::{ServerEvent, SessionStatus};

/// Does this event belong to the given session?
///
/// Attribution is checked innermost-first: a nested part's session, then a
/// nested message descriptor's, then the event payload's own. The first
/// attribution present decides; an event with none does not match.
pub fn belongs_to_session(event: &ServerEvent, session_id: &str) -> bool {
    let claimed = match event {
        ServerEvent::PartUpdated(e) => e.part.session_id().or(e.session_id.as_deref()),
        ServerEvent::MessageUpdated(e) => {
            e.info.session_id.as_deref().or(e.session_id.as_deref())
        }
        ServerEvent::SessionStatus(e) => e.session_id.as_deref(),
        ServerEvent::SessionIdle(e) => e.session_id.as_deref(),
        ServerEvent::Unknown => None,
    };
    claimed == Some(session_id)
}

/// Is this event the session's "now idle" terminal signal?
pub fn is_terminal(event: &ServerEvent, session_id: &str) -> bool {
    match event {
        ServerEvent::SessionStatus(e) => {
            e.status == SessionStatus::Idle && e.session_id.as_deref() == Some(session_id)
        }
        ServerEvent::SessionIdle(e) => e.session_id.as_deref() == Some(session_id),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event::{
        MessageInfo, MessageUpdated, Part, PartUpdated, Role, SessionIdle,
        SessionStatusChanged, TextPart,
    };

    fn text_part_event(part_session: Option<&str>, direct_session: Option<&str>) -> ServerEvent {
        ServerEvent::PartUpdated(PartUpdated {
            part: Part::Text(TextPart {
                id: "prt_1".to_string(),
                session_id: part_session.map(str::to_string),
                message_id: Some("msg_1".to_string()),
                text: None,
                synthetic: false,
                ignored: false,
            }),
            delta: None,
            session_id: direct_session.map(str::to_string),
        })
    }

    #[test]
    fn part_attribution_matches_and_filters() {
        let event = text_part_event(Some("A"), None);
        assert!(belongs_to_session(&event, "A"));
        assert!(!belongs_to_session(&event, "B"));
    }

    #[test]
    fn nested_attribution_wins_over_direct() {
        let event = text_part_event(Some("A"), Some("B"));
        assert!(belongs_to_session(&event, "A"));
        assert!(!belongs_to_session(&event, "B"));
    }

    #[test]
    fn direct_attribution_used_when_part_has_none() {
        let event = text_part_event(None, Some("B"));
        assert!(belongs_to_session(&event, "B"));
    }

    #[test]
    fn message_attribution_comes_from_info() {
        let event = ServerEvent::MessageUpdated(MessageUpdated {
            info: MessageInfo {
                id: "msg_1".to_string(),
                role: Role::Assistant,
                session_id: Some("A".to_string()),
                error: None,
                finish: None,
            },
            session_id: None,
        });
        assert!(belongs_to_session(&event, "A"));
        assert!(!belongs_to_session(&event, "B"));
    }

    #[test]
    fn events_without_attribution_never_match() {
        assert!(!belongs_to_session(&ServerEvent::Unknown, "A"));
        assert!(!belongs_to_session(&text_part_event(None, None), "A"));
    }

    #[test]
    fn idle_status_for_matching_session_is_terminal() {
        let event = ServerEvent::SessionStatus(SessionStatusChanged {
            session_id: Some("A".to_string()),
            status: SessionStatus::Idle,
        });
        assert!(is_terminal(&event, "A"));
        assert!(!is_terminal(&event, "B"));

        let busy = ServerEvent::SessionStatus(SessionStatusChanged {
            session_id: Some("A".to_string()),
            status: SessionStatus::Busy,
        });
        assert!(!is_terminal(&busy, "A"));
    }

    #[test]
    fn session_idle_event_is_terminal() {
        let event = ServerEvent::SessionIdle(SessionIdle {
            session_id: Some("A".to_string()),
        });
        assert!(is_terminal(&event, "A"));
        assert!(!is_terminal(&event, "B"));
        assert!(!is_terminal(&text_part_event(Some("A"), None), "A"));
    }
}
