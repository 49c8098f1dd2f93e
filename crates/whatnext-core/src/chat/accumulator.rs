//! Batching of user input into conversational turns.
//!
//! `ChatAccumulator` is a synchronous state machine: callers feed it input and
//! the current time, and it tells them when a turn is ready to be sent. It
//! never performs I/O or sleeps, so the async driver in `whatnext-application`
//! owns the timer and the network call and marshals results back in.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use super::gate::{ChatGate, TurnTicket};
use super::message::{
    ChatMessage, ChatReply, HistoryEntry, LOCATIONS_FOLLOW_UP_TEXT,
};
use crate::error::WhatnextError;
use crate::location::Coordinates;

/// Quiet period after the last fragment before a turn may be sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Reasons a guarded chat operation was refused. None of them is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChatGuard {
    /// The submitted fragment had no content.
    #[error("fragment is empty")]
    EmptyFragment,
    /// A turn is in flight; the caller should show the "please wait" advisory.
    #[error("a response is still pending")]
    AwaitingResponse,
}

/// Body of one request to the conversational endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnRequest {
    pub user_id: String,
    pub message: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A turn that is ready to be dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundTurn {
    pub ticket: TurnTicket,
    pub request: TurnRequest,
}

/// Accumulates fragments and decides when to flush them as one turn.
#[derive(Debug, Clone)]
pub struct ChatAccumulator {
    user_id: String,
    coordinates: Coordinates,
    debounce: Duration,
    accumulated_text: String,
    pending_text: String,
    gate: ChatGate,
    session_id: Option<String>,
    history: Vec<HistoryEntry>,
}

impl ChatAccumulator {
    pub fn new(user_id: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            user_id: user_id.into(),
            coordinates,
            debounce: DEFAULT_DEBOUNCE,
            accumulated_text: String::new(),
            pending_text: String::new(),
            gate: ChatGate::Idle,
            session_id: None,
            history: Vec::new(),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn accumulated_text(&self) -> &str {
        &self.accumulated_text
    }

    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    pub fn gate(&self) -> ChatGate {
        self.gate
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.gate.is_awaiting_response()
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.gate.deadline()
    }

    // ============================================================================
    // Operations
    // ============================================================================

    /// Records the current, unsubmitted content of the input field.
    ///
    /// A non-empty pending text holds back the flush, so a turn is never sent
    /// while the user is in the middle of typing the next fragment.
    pub fn set_pending_text(&mut self, text: impl Into<String>) {
        self.pending_text = text.into();
    }

    /// Adds a submitted fragment to the current batch and restarts the debounce.
    ///
    /// The fragment is echoed into the history as a user message right away.
    pub fn submit_fragment(&mut self, text: &str, now: Instant) -> Result<(), ChatGuard> {
        if self.gate.is_awaiting_response() {
            tracing::debug!("[ChatAccumulator] fragment rejected: response pending");
            return Err(ChatGuard::AwaitingResponse);
        }
        if text.trim().is_empty() {
            return Err(ChatGuard::EmptyFragment);
        }

        self.history.push(HistoryEntry::Message(ChatMessage::from_user(
            self.session_id.clone(),
            self.user_id.clone(),
            text,
        )));
        self.accumulated_text.push_str(text);
        self.accumulated_text.push(' ');
        self.pending_text.clear();
        self.gate = ChatGate::Debouncing {
            deadline: now + self.debounce,
        };

        tracing::debug!(
            "[ChatAccumulator] fragment accepted, {} chars accumulated",
            self.accumulated_text.len()
        );
        Ok(())
    }

    /// Ends the debounce window if its deadline has passed.
    pub fn poll_debounce(&mut self, now: Instant) -> bool {
        self.gate.expire(now)
    }

    /// Whether a turn would be sent by `try_flush` right now.
    pub fn can_flush(&self) -> bool {
        self.gate == ChatGate::Idle
            && !self.accumulated_text.is_empty()
            && self.pending_text.is_empty()
    }

    /// Sends the accumulated batch if the debounce is over, nothing is in flight
    /// and the input field is empty.
    ///
    /// On success a typing placeholder is appended to the history and the gate
    /// moves to `AwaitingResponse`. The accumulated text is kept until the reply
    /// arrives.
    pub fn try_flush(&mut self, now: Instant) -> Option<OutboundTurn> {
        self.poll_debounce(now);
        if !self.can_flush() {
            return None;
        }

        let ticket = TurnTicket::new();
        let request = TurnRequest {
            user_id: self.user_id.clone(),
            message: self.accumulated_text.trim_end().to_string(),
            latitude: self.coordinates.latitude,
            longitude: self.coordinates.longitude,
            session_id: self.session_id.clone(),
        };

        self.history.push(HistoryEntry::Message(ChatMessage::typing(
            self.session_id.clone(),
            self.user_id.clone(),
        )));
        self.gate = ChatGate::AwaitingResponse { ticket };

        tracing::info!("[ChatAccumulator] dispatching turn {}", ticket);
        Some(OutboundTurn { ticket, request })
    }

    /// Applies the outcome of the in-flight turn.
    ///
    /// Failures are converted into the apology message; nothing is propagated.
    /// Returns `false` and changes nothing if `ticket` is not the turn in flight.
    pub fn on_response(
        &mut self,
        ticket: TurnTicket,
        result: Result<ChatReply, WhatnextError>,
    ) -> bool {
        if self.gate.in_flight() != Some(ticket) {
            tracing::warn!("[ChatAccumulator] discarding reply for stale turn {}", ticket);
            return false;
        }

        self.history.retain(|entry| !entry.is_typing());

        match result {
            Ok(ChatReply::Regular(message)) => {
                // A reply without a session id starts a fresh backend session.
                self.session_id = message.session_id.clone();
                self.history.push(HistoryEntry::Message(message));
            }
            Ok(ChatReply::Locations(batch)) => {
                tracing::info!(
                    "[ChatAccumulator] received {} locations",
                    batch.locations.len()
                );
                self.history.push(HistoryEntry::Locations(batch));
                self.history
                    .push(HistoryEntry::Message(ChatMessage::from_assistant(
                        self.session_id.clone(),
                        self.user_id.clone(),
                        LOCATIONS_FOLLOW_UP_TEXT,
                    )));
            }
            Err(err) => {
                tracing::warn!("[ChatAccumulator] turn {} failed: {}", ticket, err);
                self.history
                    .push(HistoryEntry::Message(ChatMessage::apology(self.user_id.clone())));
            }
        }

        self.accumulated_text.clear();
        self.gate = ChatGate::Idle;
        true
    }

    /// Starts a new conversation.
    ///
    /// Refused while a turn is in flight so its reply cannot land in a cleared
    /// history.
    pub fn restart(&mut self) -> Result<(), ChatGuard> {
        if self.gate.is_awaiting_response() {
            tracing::debug!("[ChatAccumulator] restart rejected: response pending");
            return Err(ChatGuard::AwaitingResponse);
        }

        self.history.clear();
        self.session_id = None;
        self.accumulated_text.clear();
        self.pending_text.clear();
        self.gate = ChatGate::Idle;
        tracing::info!("[ChatAccumulator] conversation restarted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::{APOLOGY_TEXT, LocationBatch, MessageKind};
    use crate::location::Location;

    fn accumulator() -> ChatAccumulator {
        ChatAccumulator::new("user-1", Coordinates::new(32.88088, -117.23790))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn messages(acc: &ChatAccumulator) -> Vec<&ChatMessage> {
        acc.history().iter().filter_map(HistoryEntry::as_message).collect()
    }

    #[test]
    fn submit_accumulates_and_echoes() {
        let t0 = Instant::now();
        let mut acc = accumulator();
        acc.set_pending_text("sushi");
        acc.submit_fragment("sushi", t0).unwrap();
        acc.submit_fragment("tonight", t0 + ms(300)).unwrap();

        assert_eq!(acc.accumulated_text(), "sushi tonight ");
        assert_eq!(acc.pending_text(), "");
        assert_eq!(acc.debounce_deadline(), Some(t0 + ms(1300)));
        let echoed: Vec<_> = messages(&acc).iter().map(|m| m.content.as_str()).collect();
        assert_eq!(echoed, vec!["sushi", "tonight"]);
        assert!(messages(&acc).iter().all(|m| m.is_user_authored));
    }

    #[test]
    fn empty_fragment_is_rejected_without_mutation() {
        let t0 = Instant::now();
        let mut acc = accumulator();
        assert_eq!(acc.submit_fragment("", t0), Err(ChatGuard::EmptyFragment));
        assert_eq!(acc.submit_fragment("   ", t0), Err(ChatGuard::EmptyFragment));
        assert!(acc.history().is_empty());
        assert_eq!(acc.gate(), ChatGate::Idle);
    }

    #[test]
    fn flush_waits_for_debounce_after_last_fragment() {
        let t0 = Instant::now();
        let mut acc = accumulator();
        acc.submit_fragment("sushi", t0).unwrap();
        acc.submit_fragment("tonight", t0 + ms(900)).unwrap();

        assert!(acc.try_flush(t0 + ms(1000)).is_none());
        assert!(acc.try_flush(t0 + ms(1899)).is_none());

        let turn = acc.try_flush(t0 + ms(1900)).expect("turn should flush");
        assert_eq!(turn.request.message, "sushi tonight");
        assert_eq!(turn.request.user_id, "user-1");
        assert_eq!(turn.request.session_id, None);
        assert!(acc.is_awaiting_response());
        assert!(acc.history().last().unwrap().is_typing());
        // Accumulated text survives until the reply lands
        assert_eq!(acc.accumulated_text(), "sushi tonight ");
    }

    #[test]
    fn flush_is_held_back_by_pending_text() {
        let t0 = Instant::now();
        let mut acc = accumulator();
        acc.submit_fragment("ramen", t0).unwrap();
        acc.set_pending_text("near camp");

        assert!(acc.try_flush(t0 + ms(5000)).is_none());
        acc.set_pending_text("");
        assert!(acc.try_flush(t0 + ms(5001)).is_some());
    }

    #[test]
    fn only_one_turn_in_flight() {
        let t0 = Instant::now();
        let mut acc = accumulator();
        acc.submit_fragment("tacos", t0).unwrap();
        let first = acc.try_flush(t0 + ms(1000)).unwrap();

        assert!(acc.try_flush(t0 + ms(2000)).is_none());
        assert_eq!(
            acc.submit_fragment("and beer", t0 + ms(2000)),
            Err(ChatGuard::AwaitingResponse)
        );

        let reply = ChatMessage::from_assistant(Some("sess-1".into()), "user-1", "Try Lolita's");
        assert!(acc.on_response(first.ticket, Ok(ChatReply::Regular(reply))));
        assert!(!acc.is_awaiting_response());
        assert_eq!(acc.accumulated_text(), "");
        assert!(acc.try_flush(t0 + ms(3000)).is_none());
    }

    #[test]
    fn regular_reply_sets_session_and_replaces_placeholder() {
        let t0 = Instant::now();
        let mut acc = accumulator();
        acc.submit_fragment("coffee", t0).unwrap();
        let turn = acc.try_flush(t0 + ms(1000)).unwrap();

        let reply = ChatMessage::from_assistant(Some("sess-9".into()), "user-1", "Try Better Buzz");
        acc.on_response(turn.ticket, Ok(ChatReply::Regular(reply)));

        assert_eq!(acc.session_id(), Some("sess-9"));
        assert!(acc.history().iter().all(|e| !e.is_typing()));
        let last = messages(&acc).last().unwrap().content.clone();
        assert_eq!(last, "Try Better Buzz");

        acc.submit_fragment("somewhere else", t0 + ms(2000)).unwrap();
        let next = acc.try_flush(t0 + ms(3000)).unwrap();
        assert_eq!(next.request.session_id.as_deref(), Some("sess-9"));
    }

    #[test]
    fn regular_reply_without_session_clears_it() {
        let t0 = Instant::now();
        let mut acc = accumulator();
        acc.submit_fragment("coffee", t0).unwrap();
        let turn = acc.try_flush(t0 + ms(1000)).unwrap();
        let reply = ChatMessage::from_assistant(Some("sess-9".into()), "user-1", "Try Better Buzz");
        acc.on_response(turn.ticket, Ok(ChatReply::Regular(reply)));
        assert_eq!(acc.session_id(), Some("sess-9"));

        acc.submit_fragment("open late", t0 + ms(2000)).unwrap();
        let turn = acc.try_flush(t0 + ms(3000)).unwrap();
        let reply = ChatMessage::from_assistant(None, "user-1", "Let's start over");
        acc.on_response(turn.ticket, Ok(ChatReply::Regular(reply)));
        assert_eq!(acc.session_id(), None);

        acc.submit_fragment("anything", t0 + ms(4000)).unwrap();
        let next = acc.try_flush(t0 + ms(5000)).unwrap();
        assert_eq!(next.request.session_id, None);
    }

    #[test]
    fn location_reply_appends_batch_and_follow_up() {
        let t0 = Instant::now();
        let mut acc = accumulator();
        acc.submit_fragment("date night", t0).unwrap();
        let turn = acc.try_flush(t0 + ms(1000)).unwrap();

        let batch = LocationBatch::new(
            Some("sess-2".into()),
            "user-1",
            vec![Location::new("a", "A"), Location::new("b", "B")],
        );
        acc.on_response(turn.ticket, Ok(ChatReply::Locations(batch)));

        let n = acc.history().len();
        assert_eq!(acc.history()[n - 2].as_locations().unwrap().locations.len(), 2);
        let follow_up = acc.history()[n - 1].as_message().unwrap();
        assert_eq!(follow_up.content, LOCATIONS_FOLLOW_UP_TEXT);
        assert_eq!(follow_up.kind, MessageKind::Regular);
        assert!(!acc.is_awaiting_response());
    }

    #[test]
    fn failed_turn_appends_single_apology() {
        let t0 = Instant::now();
        let mut acc = accumulator();
        acc.submit_fragment("sushi tonight", t0).unwrap();
        let turn = acc.try_flush(t0 + ms(1000)).unwrap();
        let before = acc.history().len() - 1; // minus the typing placeholder

        acc.on_response(
            turn.ticket,
            Err(WhatnextError::transport(None, "connection refused")),
        );

        assert_eq!(acc.history().len(), before + 1);
        let apology = acc.history().last().unwrap().as_message().unwrap();
        assert_eq!(apology.content, APOLOGY_TEXT);
        assert_eq!(apology.kind, MessageKind::Regular);
        assert!(!apology.is_user_authored);
        assert!(!acc.is_awaiting_response());
    }

    #[test]
    fn stale_reply_is_ignored() {
        let t0 = Instant::now();
        let mut acc = accumulator();
        acc.submit_fragment("pho", t0).unwrap();
        let turn = acc.try_flush(t0 + ms(1000)).unwrap();

        assert!(!acc.on_response(TurnTicket::new(), Err(WhatnextError::decode("x"))));
        assert!(acc.is_awaiting_response());
        assert_eq!(acc.gate().in_flight(), Some(turn.ticket));
    }

    #[test]
    fn restart_is_refused_while_waiting() {
        let t0 = Instant::now();
        let mut acc = accumulator();
        acc.submit_fragment("bbq", t0).unwrap();
        let turn = acc.try_flush(t0 + ms(1000)).unwrap();
        let history_before = acc.history().to_vec();

        assert_eq!(acc.restart(), Err(ChatGuard::AwaitingResponse));
        assert_eq!(acc.history(), history_before.as_slice());
        assert_eq!(acc.accumulated_text(), "bbq ");

        acc.on_response(turn.ticket, Err(WhatnextError::decode("bad json")));
        acc.set_pending_text("half typed");
        acc.restart().unwrap();
        assert!(acc.history().is_empty());
        assert_eq!(acc.session_id(), None);
        assert_eq!(acc.pending_text(), "");
        assert_eq!(acc.gate(), ChatGate::Idle);
    }
}
