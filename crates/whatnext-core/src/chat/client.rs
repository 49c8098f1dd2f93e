use async_trait::async_trait;

use super::accumulator::TurnRequest;
use super::message::ChatReply;
use crate::error::Result;

/// The remote conversational endpoint.
///
/// Implementations report transport and decode problems as errors;
/// `ChatAccumulator::on_response` turns them into the apology message.
#[async_trait]
pub trait ConversationClient: Send + Sync {
    async fn send_turn(&self, request: &TurnRequest) -> Result<ChatReply>;
}
