//! Conversation message types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::location::Location;

/// Content of the transient placeholder shown while a turn is in flight.
pub const TYPING_PLACEHOLDER: &str = "typingIndicator";

/// Reply synthesised when the conversational endpoint cannot be reached or
/// returns something undecodable.
pub const APOLOGY_TEXT: &str = "An error has occurred. Please try again. Thank you!";

/// Prompt appended after a batch of recommended locations.
pub const LOCATIONS_FOLLOW_UP_TEXT: &str =
    "Swipe through these handpicked spots and share your thoughts on them!";

/// Distinguishes real messages from the transient typing indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Regular,
    Typing,
}

/// A single message in the conversation history. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Option<String>,
    pub user_id: String,
    pub content: String,
    pub kind: MessageKind,
    pub is_user_authored: bool,
}

impl ChatMessage {
    fn build(
        session_id: Option<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
        kind: MessageKind,
        is_user_authored: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            user_id: user_id.into(),
            content: content.into(),
            kind,
            is_user_authored,
        }
    }

    /// A regular message typed by the user.
    pub fn from_user(
        session_id: Option<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::build(session_id, user_id, content, MessageKind::Regular, true)
    }

    /// A regular message produced by the assistant.
    pub fn from_assistant(
        session_id: Option<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::build(session_id, user_id, content, MessageKind::Regular, false)
    }

    /// The placeholder displayed while waiting for a reply.
    pub fn typing(session_id: Option<String>, user_id: impl Into<String>) -> Self {
        Self::build(
            session_id,
            user_id,
            TYPING_PLACEHOLDER,
            MessageKind::Typing,
            false,
        )
    }

    /// The canned reply used when a turn fails.
    pub fn apology(user_id: impl Into<String>) -> Self {
        Self::from_assistant(None, user_id, APOLOGY_TEXT)
    }

    pub fn is_typing(&self) -> bool {
        self.kind == MessageKind::Typing
    }
}

/// A batch of ranked locations returned as one conversational reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationBatch {
    pub id: Uuid,
    pub session_id: Option<String>,
    pub user_id: String,
    pub locations: Vec<Location>,
}

impl LocationBatch {
    pub fn new(
        session_id: Option<String>,
        user_id: impl Into<String>,
        locations: Vec<Location>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            user_id: user_id.into(),
            locations,
        }
    }
}

/// One row of the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum HistoryEntry {
    Message(ChatMessage),
    Locations(LocationBatch),
}

impl HistoryEntry {
    pub fn as_message(&self) -> Option<&ChatMessage> {
        match self {
            HistoryEntry::Message(message) => Some(message),
            HistoryEntry::Locations(_) => None,
        }
    }

    pub fn as_locations(&self) -> Option<&LocationBatch> {
        match self {
            HistoryEntry::Locations(batch) => Some(batch),
            HistoryEntry::Message(_) => None,
        }
    }

    pub fn is_typing(&self) -> bool {
        self.as_message().is_some_and(ChatMessage::is_typing)
    }
}

/// Decoded reply of the conversational endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    /// A plain text answer. Carries the session id the backend assigned.
    Regular(ChatMessage),
    /// A ranked set of locations.
    Locations(LocationBatch),
}
