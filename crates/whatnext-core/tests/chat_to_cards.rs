use std::time::Duration;

use tokio::time::Instant;
use whatnext_core::cards::{CardStackController, Side, SwipeDirection};
use whatnext_core::chat::{ChatAccumulator, ChatReply, LocationBatch};
use whatnext_core::location::{Coordinates, Location};

#[test]
fn location_reply_feeds_a_card_stack() {
    let t0 = Instant::now();
    let mut chat = ChatAccumulator::new("user-7", Coordinates::new(32.88, -117.23));

    chat.submit_fragment("somewhere", t0).unwrap();
    chat.submit_fragment("to study", t0 + Duration::from_millis(400)).unwrap();
    let turn = chat
        .try_flush(t0 + Duration::from_millis(1400))
        .expect("debounce elapsed");
    assert_eq!(turn.request.message, "somewhere to study");

    let batch = LocationBatch::new(
        Some("sess".into()),
        "user-7",
        vec![
            Location::new("geisel", "Geisel Library"),
            Location::new("audrey", "Audrey's Cafe"),
            Location::new("peets", "Peet's Coffee"),
        ],
    );
    chat.on_response(turn.ticket, Ok(ChatReply::Locations(batch)));

    let locations = chat
        .history()
        .iter()
        .find_map(|entry| entry.as_locations())
        .map(|batch| batch.locations.clone())
        .expect("batch in history");

    let mut stack = CardStackController::with_default_geometry(locations);
    assert_eq!(stack.frontmost().map(|l| l.name.as_str()), Some("Geisel Library"));

    assert!(stack.swipe("audrey", SwipeDirection::Right).is_applied());
    assert_eq!(stack.frontmost_id(), Some("audrey"));
    assert_eq!(stack.position("geisel").unwrap().side(), Side::Right);
    assert_eq!(stack.position("peets").unwrap().side(), Side::Left);
}
