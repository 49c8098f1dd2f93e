//! Swipeable stack of ranked cards.
//!
//! The stack is split into two groups. The right group holds the cards already
//! brought forward, with the frontmost card (zIndex N) on top; the left group
//! holds the cards still waiting, the next one carrying the highest zIndex of
//! the group. Ranks keep their relative order, so browsing never reshuffles
//! the recommendations.
//!
//! Every completed swipe builds a complete new position map and swaps it in,
//! so observers never see a half-applied swipe.

use std::collections::{HashMap, HashSet};

use super::geometry::{Offset, OffsetDecay, OffsetTable};
use super::position::{CardPosition, Side, SwipeDirection};
use super::presenter::DetailPresenter;
use crate::location::Location;

/// Anything that can be placed in a card stack.
pub trait StackCard {
    /// Unique key of the card within its stack.
    fn card_id(&self) -> &str;
}

impl StackCard for Location {
    fn card_id(&self) -> &str {
        &self.business_id
    }
}

/// Why a swipe left the stack untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredSwipe {
    /// The dragged card is not part of this stack.
    UnknownCard,
    /// Zero or one card: there is nothing to rotate.
    TooFewCards,
    /// The frontmost card is already the last one in the swipe direction.
    AtBoundary,
}

/// Result of a swipe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    Applied(SwipeDirection),
    Ignored(IgnoredSwipe),
}

impl SwipeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SwipeOutcome::Applied(_))
    }
}

#[derive(Debug, Clone)]
struct DragState {
    card_id: String,
    translation: Offset,
}

/// A card as it should be drawn right now.
#[derive(Debug, Clone, Copy)]
pub struct RenderedCard<'a, T> {
    pub card: &'a T,
    pub position: CardPosition,
    /// Drag translation while the card is being dragged, its resting offset otherwise.
    pub offset: Offset,
}

/// Owns the stacking state of a ranked set of cards.
#[derive(Debug, Clone)]
pub struct CardStackController<T: StackCard> {
    cards: Vec<T>,
    positions: HashMap<String, CardPosition>,
    offsets: OffsetTable,
    /// Card that ends up in front after the last right swipe (lowest rank).
    top: Option<String>,
    /// Card in front initially and after the last left swipe (rank 0).
    bottom: Option<String>,
    drag: Option<DragState>,
}

impl<T: StackCard> CardStackController<T> {
    /// Builds the stack from cards ordered by rank, highest priority first.
    ///
    /// Cards whose id was already seen are dropped (first one wins).
    pub fn new(cards: Vec<T>, decay: OffsetDecay) -> Self {
        let mut seen = HashSet::new();
        let cards: Vec<T> = cards
            .into_iter()
            .filter(|card| {
                let fresh = seen.insert(card.card_id().to_string());
                if !fresh {
                    tracing::warn!(
                        "[CardStack] duplicate card id '{}' dropped",
                        card.card_id()
                    );
                }
                fresh
            })
            .collect();

        let total = cards.len() as u32;
        let mut offsets = OffsetTable::new(decay, total);
        let mut positions = HashMap::with_capacity(cards.len());

        for (rank, card) in cards.iter().enumerate() {
            let rank = rank as u32;
            let z_index = total - rank;
            let offset = offsets.record_rank(rank);
            let position = if rank == 0 {
                CardPosition::Right { offset, z_index }
            } else {
                CardPosition::Left { offset, z_index }
            };
            positions.insert(card.card_id().to_string(), position);
        }

        let top = cards.last().map(|c| c.card_id().to_string());
        let bottom = cards.first().map(|c| c.card_id().to_string());

        tracing::debug!("[CardStack] built stack of {} cards", total);
        Self {
            cards,
            positions,
            offsets,
            top,
            bottom,
            drag: None,
        }
    }

    /// Builds the stack with the default offset geometry.
    pub fn with_default_geometry(cards: Vec<T>) -> Self {
        Self::new(cards, OffsetDecay::default())
    }

    // ============================================================================
    // Queries
    // ============================================================================

    /// Cards in rank order.
    pub fn cards(&self) -> &[T] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card(&self, card_id: &str) -> Option<&T> {
        self.cards.iter().find(|c| c.card_id() == card_id)
    }

    pub fn position(&self, card_id: &str) -> Option<CardPosition> {
        self.positions.get(card_id).copied()
    }

    pub fn positions(&self) -> &HashMap<String, CardPosition> {
        &self.positions
    }

    /// Id of the card currently in focus (highest zIndex).
    pub fn frontmost_id(&self) -> Option<&str> {
        self.positions
            .iter()
            .max_by_key(|(_, position)| position.z_index())
            .map(|(id, _)| id.as_str())
    }

    pub fn frontmost(&self) -> Option<&T> {
        self.frontmost_id().and_then(|id| self.card(id))
    }

    /// Card under drag, if a gesture is in progress.
    pub fn dragging(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.card_id.as_str())
    }

    /// Offset the card should be drawn at, including any drag in progress.
    pub fn rendered_offset(&self, card_id: &str) -> Option<Offset> {
        let resting = self.positions.get(card_id)?.offset();
        match &self.drag {
            Some(drag) if drag.card_id == card_id => {
                Some(Offset::new(drag.translation.dx, resting.dy))
            }
            _ => Some(resting),
        }
    }

    /// All cards back to front.
    pub fn render_order(&self) -> Vec<RenderedCard<'_, T>> {
        let mut rendered: Vec<RenderedCard<'_, T>> = self
            .cards
            .iter()
            .filter_map(|card| {
                let position = self.position(card.card_id())?;
                let offset = self.rendered_offset(card.card_id())?;
                Some(RenderedCard {
                    card,
                    position,
                    offset,
                })
            })
            .collect();
        rendered.sort_by_key(|r| r.position.z_index());
        rendered
    }

    // ============================================================================
    // Gestures
    // ============================================================================

    /// Moves `card_id` with the finger. Only the transient offset changes.
    pub fn drag(&mut self, card_id: &str, translation: Offset) -> bool {
        if !self.positions.contains_key(card_id) {
            return false;
        }
        self.drag = Some(DragState {
            card_id: card_id.to_string(),
            translation,
        });
        true
    }

    /// Abandons a drag without swiping.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Ends a drag; the sign of the horizontal translation picks the direction.
    pub fn release(&mut self, card_id: &str, translation: Offset) -> SwipeOutcome {
        self.drag = None;
        self.swipe(card_id, SwipeDirection::from_translation(translation.dx))
    }

    /// Asks the presenter to show the detail view of `card_id`.
    pub fn tap(&self, card_id: &str, presenter: &dyn DetailPresenter<T>) -> bool {
        match self.card(card_id) {
            Some(card) => {
                presenter.present(card);
                true
            }
            None => false,
        }
    }

    /// Applies a completed swipe started on `card_id`.
    ///
    /// A right swipe brings the next waiting card to the front; a left swipe
    /// sends the front card back and restores the previous one.
    pub fn swipe(&mut self, card_id: &str, direction: SwipeDirection) -> SwipeOutcome {
        if !self.positions.contains_key(card_id) {
            return SwipeOutcome::Ignored(IgnoredSwipe::UnknownCard);
        }
        if self.cards.len() < 2 {
            return SwipeOutcome::Ignored(IgnoredSwipe::TooFewCards);
        }

        let front = self.frontmost_id().map(str::to_string);
        let boundary = match direction {
            SwipeDirection::Right => &self.top,
            SwipeDirection::Left => &self.bottom,
        };
        if front.is_some() && front == *boundary {
            tracing::debug!("[CardStack] {:?} swipe ignored at boundary", direction);
            return SwipeOutcome::Ignored(IgnoredSwipe::AtBoundary);
        }

        let next = match direction {
            SwipeDirection::Right => self.positions_after_right_swipe(),
            SwipeDirection::Left => self.positions_after_left_swipe(),
        };

        match next {
            Some(positions) => {
                self.positions = positions;
                tracing::debug!(
                    "[CardStack] {:?} swipe applied, front is now {:?}",
                    direction,
                    self.frontmost_id()
                );
                SwipeOutcome::Applied(direction)
            }
            None => SwipeOutcome::Ignored(IgnoredSwipe::AtBoundary),
        }
    }

    fn total(&self) -> u32 {
        self.cards.len() as u32
    }

    fn count_side(&self, side: Side) -> u32 {
        self.positions.values().filter(|p| p.side() == side).count() as u32
    }

    /// Right group moves one step back; the top of the left group comes to the front.
    fn positions_after_right_swipe(&self) -> Option<HashMap<String, CardPosition>> {
        let total = self.total();
        let promoted = self
            .positions
            .iter()
            .filter(|(_, p)| p.side() == Side::Left)
            .max_by_key(|(_, p)| p.z_index())
            .map(|(id, _)| id.clone())?;

        let next = self
            .positions
            .iter()
            .map(|(id, position)| {
                let moved = match *position {
                    CardPosition::Right { z_index, .. } => {
                        let z_index = z_index - 1;
                        CardPosition::Right {
                            offset: self.offsets.lookup(z_index).mirrored(),
                            z_index,
                        }
                    }
                    CardPosition::Left { .. } if *id == promoted => CardPosition::Right {
                        offset: self.offsets.lookup(total).mirrored(),
                        z_index: total,
                    },
                    CardPosition::Left { z_index, .. } => CardPosition::Left {
                        offset: self.offsets.lookup(z_index),
                        z_index,
                    },
                };
                (id.clone(), moved)
            })
            .collect();
        Some(next)
    }

    /// Front card drops onto the left group; the rest of the right group moves up.
    fn positions_after_left_swipe(&self) -> Option<HashMap<String, CardPosition>> {
        let total = self.total();
        let right_count = self.count_side(Side::Right);
        if right_count < 2 {
            return None;
        }
        let landing = total - right_count + 1;

        let next = self
            .positions
            .iter()
            .map(|(id, position)| {
                let moved = match *position {
                    CardPosition::Right { z_index, .. } if z_index == total => CardPosition::Left {
                        offset: self.offsets.lookup(landing),
                        z_index: landing,
                    },
                    CardPosition::Right { z_index, .. } => {
                        let z_index = z_index + 1;
                        CardPosition::Right {
                            offset: self.offsets.lookup(z_index).mirrored(),
                            z_index,
                        }
                    }
                    CardPosition::Left { z_index, .. } => CardPosition::Left {
                        offset: self.offsets.lookup(z_index),
                        z_index,
                    },
                };
                (id.clone(), moved)
            })
            .collect();
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Card(&'static str);

    impl StackCard for Card {
        fn card_id(&self) -> &str {
            self.0
        }
    }

    fn stack(ids: &[&'static str]) -> CardStackController<Card> {
        CardStackController::with_default_geometry(ids.iter().copied().map(Card).collect())
    }

    fn assert_offset(actual: Offset, dx: f64) {
        assert!((actual.dx - dx).abs() < 1e-9, "expected dx {dx}, got {}", actual.dx);
        assert_eq!(actual.dy, 0.0);
    }

    fn assert_permutation(stack: &CardStackController<Card>) {
        let mut z: Vec<u32> = stack.positions().values().map(|p| p.z_index()).collect();
        z.sort_unstable();
        let expected: Vec<u32> = (1..=stack.len() as u32).collect();
        assert_eq!(z, expected);
    }

    #[test]
    fn initial_layout() {
        let s = stack(&["A", "B", "C"]);

        let a = s.position("A").unwrap();
        assert_eq!((a.side(), a.z_index()), (Side::Right, 3));
        assert_offset(a.offset(), -10.0);

        let b = s.position("B").unwrap();
        assert_eq!((b.side(), b.z_index()), (Side::Left, 2));
        assert_offset(b.offset(), -9.0);

        let c = s.position("C").unwrap();
        assert_eq!((c.side(), c.z_index()), (Side::Left, 1));
        assert_offset(c.offset(), -8.1);

        assert_eq!(s.frontmost_id(), Some("A"));
    }

    #[test]
    fn right_swipe_brings_next_card_forward() {
        let mut s = stack(&["A", "B", "C"]);
        assert_eq!(
            s.swipe("A", SwipeDirection::Right),
            SwipeOutcome::Applied(SwipeDirection::Right)
        );

        let a = s.position("A").unwrap();
        assert_eq!((a.side(), a.z_index()), (Side::Right, 2));
        assert_offset(a.offset(), 9.0);

        let b = s.position("B").unwrap();
        assert_eq!((b.side(), b.z_index()), (Side::Right, 3));
        assert_offset(b.offset(), 10.0);

        let c = s.position("C").unwrap();
        assert_eq!((c.side(), c.z_index()), (Side::Left, 1));
        assert_offset(c.offset(), -8.1);

        assert_eq!(s.frontmost_id(), Some("B"));
    }

    #[test]
    fn left_swipe_undoes_right_swipe() {
        let mut s = stack(&["A", "B", "C", "D"]);
        let initial = s.positions().clone();

        assert!(s.swipe("B", SwipeDirection::Right).is_applied());
        assert!(s.swipe("B", SwipeDirection::Right).is_applied());
        assert_eq!(s.frontmost_id(), Some("C"));

        assert!(s.swipe("C", SwipeDirection::Left).is_applied());
        assert_eq!(s.frontmost_id(), Some("B"));
        assert!(s.swipe("B", SwipeDirection::Left).is_applied());

        for (id, position) in s.positions() {
            let before = initial[id];
            assert_eq!(position.side(), before.side(), "card {id}");
            assert_eq!(position.z_index(), before.z_index(), "card {id}");
        }
        // Cards that went through a swipe rest on the mirrored offset of their slot.
        assert_offset(initial["A"].offset(), -10.0);
        assert_offset(s.position("A").unwrap().offset(), 10.0);
        assert_eq!(s.position("B").unwrap().offset(), initial["B"].offset());
    }

    #[test]
    fn boundaries_are_no_ops() {
        let mut s = stack(&["A", "B", "C"]);
        let initial = s.positions().clone();

        assert_eq!(
            s.swipe("A", SwipeDirection::Left),
            SwipeOutcome::Ignored(IgnoredSwipe::AtBoundary)
        );
        assert_eq!(s.positions(), &initial);

        assert!(s.swipe("A", SwipeDirection::Right).is_applied());
        assert!(s.swipe("B", SwipeDirection::Right).is_applied());
        assert_eq!(s.frontmost_id(), Some("C"));

        let before = s.positions().clone();
        assert_eq!(
            s.swipe("C", SwipeDirection::Right),
            SwipeOutcome::Ignored(IgnoredSwipe::AtBoundary)
        );
        assert_eq!(s.positions(), &before);
        assert!(s.positions().values().all(|p| p.side() == Side::Right));
    }

    #[test]
    fn tiny_stacks_never_move() {
        let mut empty = stack(&[]);
        assert_eq!(
            empty.swipe("A", SwipeDirection::Right),
            SwipeOutcome::Ignored(IgnoredSwipe::UnknownCard)
        );
        assert!(empty.frontmost_id().is_none());

        let mut single = stack(&["A"]);
        for direction in [SwipeDirection::Left, SwipeDirection::Right] {
            assert_eq!(
                single.swipe("A", direction),
                SwipeOutcome::Ignored(IgnoredSwipe::TooFewCards)
            );
        }
        assert_eq!(single.position("A").unwrap().z_index(), 1);
    }

    #[test]
    fn unknown_card_is_ignored() {
        let mut s = stack(&["A", "B"]);
        assert_eq!(
            s.swipe("Z", SwipeDirection::Right),
            SwipeOutcome::Ignored(IgnoredSwipe::UnknownCard)
        );
    }

    #[test]
    fn z_indices_stay_a_permutation() {
        for n in 2..=9usize {
            let ids: Vec<&'static str> = ["a", "b", "c", "d", "e", "f", "g", "h", "i"][..n].to_vec();
            let mut s = stack(&ids);
            // Deterministic pseudo-random walk over directions and dragged cards
            let mut seed: u64 = 0x2545_f491_4f6c_dd1d ^ n as u64;
            for _ in 0..300 {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let direction = if (seed >> 33) & 1 == 0 {
                    SwipeDirection::Left
                } else {
                    SwipeDirection::Right
                };
                let card = ids[((seed >> 40) as usize) % n];
                s.swipe(card, direction);
                assert_permutation(&s);

                let front = s.frontmost_id().unwrap().to_string();
                assert_eq!(s.position(&front).unwrap().side(), Side::Right);
            }
        }
    }

    #[test]
    fn offsets_follow_table_for_new_z_index() {
        let ids = ["a", "b", "c", "d", "e", "f", "g"];
        let mut s = stack(&ids);
        let decay = OffsetDecay::default();
        for _ in 0..4 {
            s.swipe("a", SwipeDirection::Right);
        }
        for (id, position) in s.positions() {
            let base = decay.offset_for_rank(ids.len() as u32 - position.z_index());
            let expected = match position.side() {
                Side::Right => base.mirrored(),
                Side::Left => base,
            };
            assert_eq!(position.offset(), expected, "card {id}");
        }
    }

    #[test]
    fn drag_only_moves_transient_offset() {
        let mut s = stack(&["A", "B", "C"]);
        let initial = s.positions().clone();

        assert!(s.drag("B", Offset::new(42.0, 7.0)));
        assert_eq!(s.dragging(), Some("B"));
        assert_eq!(s.rendered_offset("B"), Some(Offset::new(42.0, 0.0)));
        assert_eq!(s.rendered_offset("A"), Some(initial["A"].offset()));
        assert_eq!(s.positions(), &initial);

        let order: Vec<&str> = s.render_order().iter().map(|r| r.card.0).collect();
        assert_eq!(order, vec!["C", "B", "A"]);

        assert!(s.release("B", Offset::new(42.0, 7.0)).is_applied());
        assert_eq!(s.dragging(), None);
        assert_eq!(s.frontmost_id(), Some("B"));

        assert!(!s.drag("nope", Offset::ZERO));
    }

    #[test]
    fn release_with_non_positive_translation_swipes_left() {
        let mut s = stack(&["A", "B"]);
        s.swipe("A", SwipeDirection::Right);
        assert_eq!(
            s.release("B", Offset::ZERO),
            SwipeOutcome::Applied(SwipeDirection::Left)
        );
        assert_eq!(s.frontmost_id(), Some("A"));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let s = CardStackController::with_default_geometry(vec![Card("A"), Card("B"), Card("A")]);
        assert_eq!(s.len(), 2);
        assert_permutation(&s);
    }

    #[test]
    fn tap_presents_without_changing_state() {
        let s = stack(&["A", "B"]);
        let shown = Mutex::new(Vec::new());
        let presenter = |card: &Card| shown.lock().unwrap().push(card.0);

        assert!(s.tap("B", &presenter));
        assert!(!s.tap("missing", &presenter));
        assert_eq!(*shown.lock().unwrap(), vec!["B"]);
        assert_eq!(s.frontmost_id(), Some("A"));
    }

    #[test]
    fn locations_are_keyed_by_business_id() {
        let s = CardStackController::with_default_geometry(vec![
            Location::new("biz-1", "Taco Stand"),
            Location::new("biz-2", "Pho Hoa"),
        ]);
        assert_eq!(s.frontmost().map(|l| l.name.as_str()), Some("Taco Stand"));
        assert_eq!(s.position("biz-2").unwrap().z_index(), 1);
    }
}
