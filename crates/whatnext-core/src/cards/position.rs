use serde::{Deserialize, Serialize};

use super::geometry::Offset;

/// Which visual group a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Direction of a completed swipe gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    /// Direction implied by a horizontal drag distance; zero counts as left.
    pub fn from_translation(dx: f64) -> Self {
        if dx > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    }
}

/// Stacking state of one card.
///
/// `z_index` runs from 1 (backmost) to N (frontmost). Right-side cards carry
/// mirrored offsets once a swipe has placed them; the initial front card keeps
/// the plain offset of rank 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "side", rename_all = "lowercase")]
pub enum CardPosition {
    Left { offset: Offset, z_index: u32 },
    Right { offset: Offset, z_index: u32 },
}

impl CardPosition {
    pub fn side(&self) -> Side {
        match self {
            CardPosition::Left { .. } => Side::Left,
            CardPosition::Right { .. } => Side::Right,
        }
    }

    pub fn offset(&self) -> Offset {
        match self {
            CardPosition::Left { offset, .. } | CardPosition::Right { offset, .. } => *offset,
        }
    }

    pub fn z_index(&self) -> u32 {
        match self {
            CardPosition::Left { z_index, .. } | CardPosition::Right { z_index, .. } => *z_index,
        }
    }
}
