//! Widget data model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::FailureKind;

/// Visibility of the chat panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelState {
    #[default]
    Closed,
    Open,
}

impl PanelState {
    /// The other state.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }

    #[must_use]
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Bot,
}

/// One entry of the display log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub origin: Origin,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::User,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Bot,
        }
    }
}

/// Marker for the "bot is typing" placeholder.
///
/// Not a message: it never enters the display log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingIndicator {
    /// Submission the indicator belongs to.
    pub submission: Uuid,
}

/// Lifecycle of the single in-flight submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Sending { id: Uuid },
}

/// A question accepted by the widget, waiting for its request to be issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub id: Uuid,
    pub question: String,
}

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Resolved,
    Failed(FailureKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_parity() {
        let mut state = PanelState::default();
        assert_eq!(state, PanelState::Closed);

        for n in 1..=6 {
            state = state.toggled();
            assert_eq!(state.is_open(), n % 2 == 1);
        }
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_value(Message::bot("Hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "Hi", "origin": "bot" }));
    }
}
