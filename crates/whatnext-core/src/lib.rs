//! Domain layer of the WhatNext client.
//!
//! Holds the two stateful components of the conversational search feature:
//! [`chat::ChatAccumulator`], which batches user input into turns sent one at a
//! time, and [`cards::CardStackController`], which keeps the stacking state of a
//! swipeable set of recommendations. Remote collaborators are reached only
//! through the traits defined here.

pub mod cards;
pub mod chat;
pub mod config;
pub mod error;
pub mod location;

// Re-export common error type
pub use error::WhatnextError;
