//! Unit tests for BoardCore.

mod helpers;

use stripboard_proto::StripId;

use self::helpers::{TestSession, fixed_core, strip_payload};
use crate::core::BoardCore;

#[test]
fn strip_ids_are_unique_across_rooms() {
	let (core, _clock) = fixed_core(1_000);
	let egll = TestSession::join(&core, "EGLL");
	let kjfk = TestSession::join(&core, "KJFK");

	core.on_create_strip(
		egll.session_id,
		strip_payload(stripboard_proto::StripKind::Neutral, "BAW1"),
	);
	core.on_create_strip(
		kjfk.session_id,
		strip_payload(stripboard_proto::StripKind::Neutral, "AAL1"),
	);

	let (egll_strips, _) = core.room_snapshot("EGLL").unwrap();
	let (kjfk_strips, _) = core.room_snapshot("KJFK").unwrap();
	assert_eq!(egll_strips[0].id, StripId(1));
	assert_eq!(kjfk_strips[0].id, StripId(2));
}

#[test]
fn rooms_are_seeded_with_the_default_spacers() {
	let core = BoardCore::new();
	let _session = TestSession::join(&core, "EGLL");

	let (strips, spacers) = core.room_snapshot("EGLL").unwrap();
	assert!(strips.is_empty());
	let labels: Vec<&str> = spacers.iter().map(|sp| sp.label.as_str()).collect();
	assert_eq!(labels, ["DEP", "TAXIWAY", "RUNWAY", "CTR"]);
	let orders: Vec<i64> = spacers.iter().map(|sp| sp.position.order).collect();
	assert_eq!(orders, [0, 1, 2, 3]);
	assert!(spacers.iter().all(|sp| sp.position.bay.0 == 0));
}
