//! Application layer for WhatNext.
//!
//! Drives the synchronous domain state machines from async code: the chat
//! session event loop owns the debounce timer and the network call, and the
//! browse use case turns fetched locations into a card stack.

pub mod browse_usecase;
pub mod chat_session;

pub use browse_usecase::BrowseUseCase;
pub use chat_session::{ChatSessionHandle, ChatSessionRunner, ChatSnapshot, SessionError};
