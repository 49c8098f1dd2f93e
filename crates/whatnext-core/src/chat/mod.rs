//! Conversational search domain module.
//!
//! # Module Structure
//!
//! - `message`: history types (`ChatMessage`, `LocationBatch`, `HistoryEntry`, `ChatReply`)
//! - `gate`: the `Idle / Debouncing / AwaitingResponse` dispatch gate
//! - `accumulator`: `ChatAccumulator`, batching of fragments into turns
//! - `advisory`: transient "please wait" notices
//! - `client`: trait for the remote conversational endpoint

mod accumulator;
mod advisory;
mod client;
mod gate;
mod message;

pub use accumulator::{ChatAccumulator, ChatGuard, DEFAULT_DEBOUNCE, OutboundTurn, TurnRequest};
pub use advisory::{ADVISORY_DURATION, Advisory, AdvisoryBoard, PLEASE_WAIT_TEXT};
pub use client::ConversationClient;
pub use gate::{ChatGate, TurnTicket};
pub use message::{
    APOLOGY_TEXT, ChatMessage, ChatReply, HistoryEntry, LOCATIONS_FOLLOW_UP_TEXT, LocationBatch,
    MessageKind, TYPING_PLACEHOLDER,
};
