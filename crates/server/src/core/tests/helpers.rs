//! Common test utilities and helpers.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use serde_json::json;
use stripboard_proto::{ServerMsg, SessionId, Spacer, Strip, StripKind, StripPayload};
use tokio::sync::mpsc;

use crate::core::{BoardCore, Clock};

/// A clock frozen at a settable instant.
pub struct FixedClock(AtomicI64);

impl FixedClock {
	pub fn new(now_ms: i64) -> Self {
		Self(AtomicI64::new(now_ms))
	}

	#[allow(dead_code)]
	pub fn set(&self, now_ms: i64) {
		self.0.store(now_ms, Ordering::Relaxed);
	}
}

impl Clock for FixedClock {
	fn now_ms(&self) -> i64 {
		self.0.load(Ordering::Relaxed)
	}
}

/// A core with a frozen clock, plus the clock for tests that advance time.
pub fn fixed_core(now_ms: i64) -> (Arc<BoardCore>, Arc<FixedClock>) {
	let clock = Arc::new(FixedClock::new(now_ms));
	(BoardCore::with_clock(clock.clone()), clock)
}

/// A test harness that captures events sent to one session.
pub struct TestSession {
	pub session_id: SessionId,
	pub events_rx: mpsc::UnboundedReceiver<ServerMsg>,
}

impl TestSession {
	/// Register a session that has not joined any room.
	pub fn connect(core: &BoardCore) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		let session_id = core.register_session(tx);
		Self {
			session_id,
			events_rx: rx,
		}
	}

	/// Register a session, join a room, and discard the initial snapshots.
	pub fn join(core: &BoardCore, room: &str) -> Self {
		let mut session = Self::connect(core);
		core.on_select_airport(session.session_id, room);
		session.drain();
		session
	}

	/// Try to receive an event, returning None if none available.
	pub fn try_recv(&mut self) -> Option<ServerMsg> {
		self.events_rx.try_recv().ok()
	}

	/// Discard all pending events.
	pub fn drain(&mut self) {
		while self.events_rx.try_recv().is_ok() {}
	}

	/// Last strips snapshot among pending events, if any.
	pub fn last_strips(&mut self) -> Option<Vec<Strip>> {
		let mut out = None;
		while let Some(msg) = self.try_recv() {
			if let ServerMsg::InitialStrips(strips) | ServerMsg::StripsReordered(strips) = msg {
				out = Some(strips);
			}
		}
		out
	}

	/// Last spacers snapshot among pending events, if any.
	pub fn last_spacers(&mut self) -> Option<Vec<Spacer>> {
		let mut out = None;
		while let Some(msg) = self.try_recv() {
			if let ServerMsg::InitialSpacers(spacers) | ServerMsg::SpacersReordered(spacers) = msg
			{
				out = Some(spacers);
			}
		}
		out
	}
}

pub fn strip_payload(kind: StripKind, callsign: &str) -> StripPayload {
	let mut fields = serde_json::Map::new();
	if !callsign.is_empty() {
		fields.insert("callsign".into(), json!(callsign));
	}
	StripPayload {
		kind,
		bay: None,
		fields,
	}
}

pub fn departure(callsign: &str, eobt: &str) -> StripPayload {
	let mut payload = strip_payload(StripKind::Departure, callsign);
	payload.fields.insert("eobt".into(), json!(eobt));
	payload
}
