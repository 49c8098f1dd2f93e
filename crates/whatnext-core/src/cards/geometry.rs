//! Offsets of stacked cards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A 2D displacement in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn horizontal(dx: f64) -> Self {
        Self { dx, dy: 0.0 }
    }

    /// Reflects the offset across the vertical axis.
    pub fn mirrored(self) -> Self {
        Self {
            dx: -self.dx,
            dy: self.dy,
        }
    }
}

/// Geometric decay of the horizontal offset with stack depth.
///
/// `offset(rank) = decay_factor^rank * step_width` for `rank < cap_rank`; deeper
/// ranks reuse the offset of `cap_rank - 1` so long stacks do not drift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetDecay {
    pub decay_factor: f64,
    pub step_width: f64,
    pub cap_rank: u32,
}

impl Default for OffsetDecay {
    fn default() -> Self {
        Self {
            decay_factor: 0.9,
            step_width: -10.0,
            cap_rank: 5,
        }
    }
}

impl OffsetDecay {
    pub fn offset_for_rank(&self, rank: u32) -> Offset {
        let effective = if self.cap_rank == 0 {
            0
        } else {
            rank.min(self.cap_rank - 1)
        };
        Offset::horizontal(self.decay_factor.powi(effective as i32) * self.step_width)
    }
}

/// `zIndex -> base offset` table filled when the stack is built.
///
/// Lookups that miss fall back to the decay formula, with the rank derived from
/// the zIndex (`rank = total - z_index`).
#[derive(Debug, Clone)]
pub struct OffsetTable {
    decay: OffsetDecay,
    total: u32,
    entries: HashMap<u32, Offset>,
}

impl OffsetTable {
    pub fn new(decay: OffsetDecay, total: u32) -> Self {
        Self {
            decay,
            total,
            entries: HashMap::with_capacity(total as usize),
        }
    }

    /// Computes and records the base offset of `rank`, returning it.
    pub fn record_rank(&mut self, rank: u32) -> Offset {
        let offset = self.decay.offset_for_rank(rank);
        self.entries.insert(self.total - rank, offset);
        offset
    }

    pub fn lookup(&self, z_index: u32) -> Offset {
        self.entries.get(&z_index).copied().unwrap_or_else(|| {
            self.decay
                .offset_for_rank(self.total.saturating_sub(z_index))
        })
    }

    pub fn decay(&self) -> OffsetDecay {
        self.decay
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
