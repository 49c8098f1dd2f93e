//! HTTP adapters for the WhatNext backend.
//!
//! Implements the collaborator traits of `whatnext-core` over REST:
//! [`ChatService`] for conversational turns and [`LocationService`] for
//! nearby-location lookups.

pub mod chat_service;
pub mod location_service;

pub use chat_service::{ChatService, decode_chat_reply};
pub use location_service::LocationService;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use whatnext_core::config::ApiConfig;
use whatnext_core::error::{Result, WhatnextError};

/// Builds the shared HTTP client, applying the configured timeout if any.
pub(crate) fn build_client(api: &ApiConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = api.timeout() {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|err| WhatnextError::config(format!("failed to build HTTP client: {err}")))
}

/// Turns a non-2xx response into a transport error, preferring FastAPI's
/// `{"detail": ...}` message over the raw body.
pub(crate) fn map_http_error(status: StatusCode, body: String) -> WhatnextError {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: String,
    }

    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|wrapper| wrapper.detail)
        .unwrap_or(body);
    WhatnextError::transport(Some(status.as_u16()), message)
}
