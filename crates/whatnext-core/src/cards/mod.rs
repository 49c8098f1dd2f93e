//! Swipeable card stack for browsing ranked results.
//!
//! - `geometry`: offsets, the decay formula and the `zIndex -> offset` table
//! - `position`: per-card stacking state and swipe directions
//! - `stack`: `CardStackController`
//! - `presenter`: detail view collaborator

mod geometry;
mod position;
mod presenter;
mod stack;

pub use geometry::{Offset, OffsetDecay, OffsetTable};
pub use position::{CardPosition, Side, SwipeDirection};
pub use presenter::DetailPresenter;
pub use stack::{CardStackController, IgnoredSwipe, RenderedCard, StackCard, SwipeOutcome};
