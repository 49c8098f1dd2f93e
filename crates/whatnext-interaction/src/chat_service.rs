//! ChatService - REST client for the conversational search endpoint.
//!
//! The endpoint answers with either a text reply or a ranked list of
//! locations; the `chat_type` field tells which shape the body has.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use whatnext_core::chat::{ChatMessage, ChatReply, ConversationClient, LocationBatch, TurnRequest};
use whatnext_core::config::ApiConfig;
use whatnext_core::error::{Result, WhatnextError};
use whatnext_core::location::Location;

/// `chat_type` value of a plain text reply. Anything else carries locations.
const REGULAR_CHAT_TYPE: &str = "regular";

/// Client for `POST /chatgpt_response`.
#[derive(Clone)]
pub struct ChatService {
    client: Client,
    endpoint: String,
}

impl ChatService {
    /// Creates a service posting to `endpoint` with a default HTTP client.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Builds the service from the `[api]` configuration section.
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: crate::build_client(api)?,
            endpoint: api.chat_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_turn(&self, request: &TurnRequest) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|err| {
                WhatnextError::transport(None, format!("chat request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(crate::map_http_error(status, body_text));
        }

        let bytes = response.bytes().await.map_err(|err| {
            WhatnextError::transport(None, format!("failed to read chat response: {err}"))
        })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ConversationClient for ChatService {
    async fn send_turn(&self, request: &TurnRequest) -> Result<ChatReply> {
        tracing::debug!(
            "[ChatService] sending turn ({} chars, session: {:?})",
            request.message.len(),
            request.session_id
        );
        let body = self.post_turn(request).await?;
        let reply = decode_chat_reply(&body)?;
        tracing::debug!(
            "[ChatService] received {} reply",
            match reply {
                ChatReply::Regular(_) => "regular",
                ChatReply::Locations(_) => "locations",
            }
        );
        Ok(reply)
    }
}

#[derive(Deserialize)]
struct ChatTypeProbe {
    chat_type: String,
}

#[derive(Deserialize)]
struct RegularChatResponse {
    #[serde(default)]
    session_id: Option<String>,
    user_id: String,
    content: String,
    is_user_message: String,
}

#[derive(Deserialize)]
struct LocationsChatResponse {
    #[serde(default)]
    session_id: Option<String>,
    user_id: String,
    content: Vec<Location>,
    #[allow(dead_code)]
    is_user_message: String,
}

/// Decodes a response body, dispatching on its `chat_type` discriminant.
pub fn decode_chat_reply(body: &[u8]) -> Result<ChatReply> {
    let probe: ChatTypeProbe = serde_json::from_slice(body)
        .map_err(|err| WhatnextError::decode(format!("missing chat_type: {err}")))?;

    if probe.chat_type == REGULAR_CHAT_TYPE {
        let response: RegularChatResponse = serde_json::from_slice(body)
            .map_err(|err| WhatnextError::decode(format!("bad regular reply: {err}")))?;
        let is_user = parse_flag(&response.is_user_message)?;
        let message = if is_user {
            ChatMessage::from_user(response.session_id, response.user_id, response.content)
        } else {
            ChatMessage::from_assistant(response.session_id, response.user_id, response.content)
        };
        Ok(ChatReply::Regular(message))
    } else {
        let response: LocationsChatResponse = serde_json::from_slice(body)
            .map_err(|err| WhatnextError::decode(format!("bad locations reply: {err}")))?;
        Ok(ChatReply::Locations(LocationBatch::new(
            response.session_id,
            response.user_id,
            response.content,
        )))
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(WhatnextError::decode(format!(
            "is_user_message must be \"true\" or \"false\", got {other:?}"
        ))),
    }
}
