//! Answer Extraction
//!
//! Picks the single message to show the user out of an agent transcript.

use crate::message::{Message, Role};

/// Shown by front-ends when [`extract_final_answer`] finds nothing
pub const NO_ANSWER_WARNING: &str = "No answer could be extracted from the model response.";

/// Select the final answer from a transcript.
///
/// Scans from the most recent message backwards. The first assistant message
/// encountered ends the scan: its content is the answer if it is non-empty
/// after trimming, otherwise there is no answer. Earlier assistant messages
/// are never consulted. Trailing non-assistant messages (tool observations)
/// are skipped rather than ending the scan, unlike a check of the last
/// message alone.
pub fn extract_final_answer(messages: &[Message]) -> Option<&str> {
    let candidate = messages.iter().rev().find(|m| m.role == Role::Assistant)?;

    if candidate.content.trim().is_empty() {
        None
    } else {
        Some(candidate.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolCall;

    #[test]
    fn test_last_assistant_message_wins() {
        let transcript = vec![
            Message::user("What is 6 * 7?"),
            Message::assistant_tool_calls("", vec![ToolCall::new("calculator")]),
            Message::tool("42", Some("call_1".into()), "calculator"),
            Message::assistant("42"),
        ];
        assert_eq!(extract_final_answer(&transcript), Some("42"));
    }

    #[test]
    fn test_whitespace_answer_stops_scan() {
        // An earlier assistant message has content, but the scan must not reach it.
        let transcript = vec![
            Message::user("question"),
            Message::assistant("an earlier answer"),
            Message::assistant("  "),
        ];
        assert_eq!(extract_final_answer(&transcript), None);
    }

    #[test]
    fn test_empty_tool_call_message_stops_scan() {
        let transcript = vec![
            Message::user("question"),
            Message::assistant("draft"),
            Message::tool("observation", None, "wikipedia_search"),
            Message::assistant_tool_calls("", vec![ToolCall::new("calculator")]),
        ];
        assert_eq!(extract_final_answer(&transcript), None);
    }

    #[test]
    fn test_trailing_tool_messages_are_skipped() {
        let transcript = vec![
            Message::user("question"),
            Message::assistant("final"),
            Message::tool("late observation", None, "calculator"),
        ];
        assert_eq!(extract_final_answer(&transcript), Some("final"));
    }

    #[test]
    fn test_content_returned_untrimmed() {
        let transcript = vec![Message::user("q"), Message::assistant("  84\n")];
        assert_eq!(extract_final_answer(&transcript), Some("  84\n"));
    }

    #[test]
    fn test_empty_transcript() {
        assert_eq!(extract_final_answer(&[]), None);
    }

    #[test]
    fn test_user_only_transcript() {
        assert_eq!(extract_final_answer(&[Message::user("hello")]), None);
    }
}
