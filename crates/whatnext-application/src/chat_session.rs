//! Async driver for a chat conversation.
//!
//! [`ChatSessionRunner`] owns a [`ChatAccumulator`] and is the only task that
//! touches it. Commands arrive over an mpsc channel, replies from the
//! conversational endpoint are marshaled back over a second channel, and the
//! debounce deadline is awaited with `sleep_until`. Every state change is
//! published as a [`ChatSnapshot`] on a watch channel.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use whatnext_core::chat::{
    AdvisoryBoard, ChatAccumulator, ChatGuard, ChatMessage, ChatReply, ConversationClient,
    HistoryEntry, LocationBatch, OutboundTurn, TurnTicket,
};
use whatnext_core::config::ChatConfig;
use whatnext_core::error::{Result, WhatnextError};

const COMMAND_BUFFER: usize = 32;

/// Failure of a command sent to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session refused the command; see [`ChatGuard`].
    #[error(transparent)]
    Guard(#[from] ChatGuard),
    /// The session task has stopped.
    #[error("chat session is closed")]
    Closed,
}

impl SessionError {
    pub fn guard(&self) -> Option<ChatGuard> {
        match self {
            SessionError::Guard(guard) => Some(*guard),
            SessionError::Closed => None,
        }
    }
}

/// Read-only view of the conversation for presentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSnapshot {
    pub history: Vec<HistoryEntry>,
    pub session_id: Option<String>,
    pub awaiting_response: bool,
    /// Text of the visible advisory, if one has not yet expired.
    pub advisory: Option<String>,
}

impl ChatSnapshot {
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.history.iter().filter_map(HistoryEntry::as_message)
    }

    /// The most recent location batch in the history.
    pub fn latest_locations(&self) -> Option<&LocationBatch> {
        self.history.iter().rev().find_map(HistoryEntry::as_locations)
    }
}

enum ChatCommand {
    SetPendingText(String),
    Submit {
        text: String,
        reply: oneshot::Sender<std::result::Result<(), ChatGuard>>,
    },
    Restart {
        reply: oneshot::Sender<std::result::Result<(), ChatGuard>>,
    },
}

type TurnOutcome = (TurnTicket, Result<ChatReply>);

/// Event loop around a [`ChatAccumulator`].
pub struct ChatSessionRunner {
    accumulator: ChatAccumulator,
    advisories: AdvisoryBoard,
    client: Arc<dyn ConversationClient>,
    in_flight: Option<AbortHandle>,
}

impl ChatSessionRunner {
    pub fn new(accumulator: ChatAccumulator, client: Arc<dyn ConversationClient>) -> Self {
        Self {
            accumulator,
            advisories: AdvisoryBoard::default(),
            client,
            in_flight: None,
        }
    }

    /// Builds a runner using the `[chat]` settings for identity, location and
    /// timings.
    pub fn from_config(config: &ChatConfig, client: Arc<dyn ConversationClient>) -> Self {
        let accumulator = ChatAccumulator::new(config.user_id.clone(), config.coordinates())
            .with_debounce(config.debounce());
        Self::new(accumulator, client)
            .with_advisories(AdvisoryBoard::new(config.advisory_lifetime()))
    }

    pub fn with_advisories(mut self, advisories: AdvisoryBoard) -> Self {
        self.advisories = advisories;
        self
    }

    /// Starts the event loop on the current runtime.
    pub fn spawn(self) -> ChatSessionHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(ChatSnapshot::default());
        let cancel = CancellationToken::new();

        let task = tokio::spawn(self.run(command_rx, snapshot_tx, cancel.clone()));

        ChatSessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            cancel,
            task,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<ChatCommand>,
        snapshots: watch::Sender<ChatSnapshot>,
        cancel: CancellationToken,
    ) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<TurnOutcome>();
        tracing::debug!(
            "[ChatSessionRunner] started for user {}",
            self.accumulator.user_id()
        );
        self.publish(&snapshots);

        loop {
            let debounce_deadline = self.accumulator.debounce_deadline();
            let advisory_expiry = self.advisories.next_expiry();

            tokio::select! {
                _ = cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some((ticket, result)) = done_rx.recv() => {
                    self.in_flight = None;
                    self.accumulator.on_response(ticket, result);
                }
                _ = sleep_until_opt(debounce_deadline) => {
                    self.accumulator.poll_debounce(Instant::now());
                }
                // Wakes the loop so the expired advisory is dropped from the snapshot.
                _ = sleep_until_opt(advisory_expiry) => {}
            }

            if let Some(turn) = self.accumulator.try_flush(Instant::now()) {
                self.dispatch(turn, &done_tx);
            }
            self.publish(&snapshots);
        }

        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        tracing::debug!("[ChatSessionRunner] stopped");
    }

    fn handle_command(&mut self, command: ChatCommand) {
        let now = Instant::now();
        match command {
            ChatCommand::SetPendingText(text) => self.accumulator.set_pending_text(text),
            ChatCommand::Submit { text, reply } => {
                let result = self.accumulator.submit_fragment(&text, now);
                self.advise(result, now);
                let _ = reply.send(result);
            }
            ChatCommand::Restart { reply } => {
                let result = self.accumulator.restart();
                if result.is_ok() {
                    self.advisories.clear();
                }
                self.advise(result, now);
                let _ = reply.send(result);
            }
        }
    }

    fn advise(&mut self, result: std::result::Result<(), ChatGuard>, now: Instant) {
        if let Err(ChatGuard::AwaitingResponse) = result {
            self.advisories.post_please_wait(now);
        }
    }

    /// Sends the turn on its own task. The outcome is always reported for the
    /// turn's ticket, including when the request task panics or is aborted.
    fn dispatch(&mut self, turn: OutboundTurn, done_tx: &mpsc::UnboundedSender<TurnOutcome>) {
        let client = Arc::clone(&self.client);
        let OutboundTurn { ticket, request } = turn;
        let request_task = tokio::spawn(async move { client.send_turn(&request).await });
        self.in_flight = Some(request_task.abort_handle());

        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let result = match request_task.await {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!("[ChatSessionRunner] chat request task failed: {}", err);
                    Err(WhatnextError::internal(format!(
                        "chat request task failed: {err}"
                    )))
                }
            };
            let _ = done_tx.send((ticket, result));
        });
    }

    fn publish(&mut self, snapshots: &watch::Sender<ChatSnapshot>) {
        let next = ChatSnapshot {
            history: self.accumulator.history().to_vec(),
            session_id: self.accumulator.session_id().map(str::to_string),
            awaiting_response: self.accumulator.is_awaiting_response(),
            advisory: self
                .advisories
                .current(Instant::now())
                .map(|advisory| advisory.message.clone()),
        };
        snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Client side of a running [`ChatSessionRunner`].
pub struct ChatSessionHandle {
    commands: mpsc::Sender<ChatCommand>,
    snapshots: watch::Receiver<ChatSnapshot>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ChatSessionHandle {
    /// Reports the current content of the input field.
    pub async fn set_pending_text(
        &self,
        text: impl Into<String>,
    ) -> std::result::Result<(), SessionError> {
        self.commands
            .send(ChatCommand::SetPendingText(text.into()))
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Submits one fragment of user input.
    pub async fn submit(
        &self,
        text: impl Into<String>,
    ) -> std::result::Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(ChatCommand::Submit {
                text: text.into(),
                reply,
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?.map_err(SessionError::from)
    }

    /// Starts a new conversation.
    pub async fn restart(&self) -> std::result::Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(ChatCommand::Restart { reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?.map_err(SessionError::from)
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the event loop, abandoning any in-flight turn.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.task.await {
            tracing::warn!("[ChatSessionHandle] session task ended abnormally: {}", err);
        }
    }
}
