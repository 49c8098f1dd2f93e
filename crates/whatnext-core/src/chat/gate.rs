//! The dispatch gate of a chat session.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

/// Identifies one outbound turn so its reply can be matched on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnTicket(Uuid);

impl TurnTicket {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TurnTicket {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TurnTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a session stands with respect to sending its next turn.
///
/// Transitions:
/// - `Idle | Debouncing` --fragment--> `Debouncing` (deadline restarted)
/// - `Debouncing` --deadline passed--> `Idle`
/// - `Idle` --flush--> `AwaitingResponse`
/// - `AwaitingResponse` --reply--> `Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatGate {
    #[default]
    Idle,
    Debouncing {
        deadline: Instant,
    },
    AwaitingResponse {
        ticket: TurnTicket,
    },
}

impl ChatGate {
    pub fn is_debouncing(&self) -> bool {
        matches!(self, ChatGate::Debouncing { .. })
    }

    pub fn is_awaiting_response(&self) -> bool {
        matches!(self, ChatGate::AwaitingResponse { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self {
            ChatGate::Debouncing { deadline } => Some(*deadline),
            _ => None,
        }
    }

    pub fn in_flight(&self) -> Option<TurnTicket> {
        match self {
            ChatGate::AwaitingResponse { ticket } => Some(*ticket),
            _ => None,
        }
    }

    /// Lets an expired debounce window fall back to `Idle`.
    ///
    /// Returns `true` when this call performed the transition.
    pub fn expire(&mut self, now: Instant) -> bool {
        match *self {
            ChatGate::Debouncing { deadline } if now >= deadline => {
                *self = ChatGate::Idle;
                true
            }
            _ => false,
        }
    }
}
