//! Authoritative board state and room-scoped synchronization.
//!
//! # Purpose
//!
//! - Own the per-room ordered collections of strips and spacers and every
//!   mutation applied to them.
//! - Define the placement policy for newly created strips (arrival,
//!   departure, neutral, freetext) and the EOBT-driven departure
//!   resequencing.
//! - Track connected sessions, which room each has joined, and deliver
//!   room-scoped broadcasts with the correct fan-out (snapshot to the whole
//!   room, single-strip updates to everyone but the originator).
//! - Exclude transport bootstrapping and framing; see the `ipc` module.
//!
//! # Mental model
//!
//! - A room is an isolated workspace keyed by an opaque location code
//!   (typically an ICAO identifier). Rooms are created lazily on first join,
//!   seeded with four default spacers in bay 0, and live for the process
//!   lifetime.
//! - Sessions register on connect with an outbound event sink and join at
//!   most one room at a time. Joining a new room implicitly leaves the
//!   previous one; the only other way out of a room is disconnecting.
//! - Mutations from sessions that have not joined a room, or that reference
//!   unknown ids, are silent no-ops. There is no error channel; "nothing
//!   visibly happens" is a legitimate outcome.
//! - Bulk reorder is last-writer-wins: the incoming list is the complete new
//!   truth for the room, and entities absent from it are dropped. This is
//!   the system's sole conflict policy.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints |
//! |---|---|---|
//! | [`BoardCore`] | Authoritative state machine | MUST be the only owner of session and room maps |
//! | [`Registry`] | Session bookkeeping | MUST only be accessed under the registry lock, never across sink sends |
//! | [`RoomState`] | One room's strips and spacers | MUST only be accessed under its own room lock |
//! | [`SessionEntry`] | One connected session | Tracks the joined room for fan-out resolution |
//! | [`SessionSink`] | Outbound event channel | Send failure MUST trigger authoritative session cleanup |
//! | [`Clock`] | Injected time source | Supplies strip created/updated timestamps |
//!
//! # Invariants
//!
//! 1. Strip ids come from a single process-wide atomic counter; they are
//!    unique across rooms regardless of which thread allocates them.
//! 2. At most one strip per room carries a given callsign
//!    (case-insensitive). A create with a colliding callsign overwrites the
//!    existing strip's attributes in place, preserving its id and position.
//! 3. Each room is protected by its own lock, held for the mutation plus the
//!    read-back that builds the broadcast payload. Intents against the same
//!    room serialize; intents against different rooms never block each
//!    other.
//! 4. The registry lock and a room lock are never held at the same time, and
//!    no lock is held across a sink send that can re-enter cleanup.
//! 5. A failed sink send unregisters the session before any further
//!    broadcast targets are computed.
//! 6. After every strip mutation the room's strip collection is sorted
//!    ascending by order with a stable sort, so ties keep their prior
//!    relative position.

mod events;
pub mod placement;
mod reorder;
mod room;
mod session;
mod spacers;
mod strips;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

pub use room::RoomState;
use stripboard_proto::{ServerMsg, SessionId, StripId};
use tokio::sync::mpsc;

/// Sink for delivering server events to a connected session.
pub type SessionSink = mpsc::UnboundedSender<ServerMsg>;

/// Injected time source for strip timestamps.
pub trait Clock: Send + Sync {
	/// Current time as epoch milliseconds.
	fn now_ms(&self) -> i64;
}

/// Wall-clock [`Clock`] used outside of tests.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_ms(&self) -> i64 {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_millis() as i64)
			.unwrap_or(0)
	}
}

/// Authoritative state machine for all rooms and sessions.
///
/// Session bookkeeping and room contents live behind independent locks so
/// that fan-out resolution and room mutation never contend, and so that
/// intents against different rooms run in parallel.
pub struct BoardCore {
	registry: Mutex<Registry>,
	rooms: Mutex<HashMap<String, Arc<Mutex<RoomState>>>>,
	next_strip_id: AtomicU64,
	next_session_id: AtomicU64,
	clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for BoardCore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BoardCore")
			.field("registry", &self.registry)
			.field("next_strip_id", &self.next_strip_id)
			.field("next_session_id", &self.next_session_id)
			.finish_non_exhaustive()
	}
}

/// Session bookkeeping, guarded by the registry lock.
#[derive(Debug, Default)]
struct Registry {
	sessions: HashMap<SessionId, SessionEntry>,
}

/// One connected session.
#[derive(Debug)]
struct SessionEntry {
	/// Outbound event channel back to the session's connection.
	sink: SessionSink,
	/// Room the session has joined, if any.
	room: Option<String>,
}

impl BoardCore {
	/// Create a new core with the wall clock.
	#[must_use]
	pub fn new() -> Arc<Self> {
		Self::with_clock(Arc::new(SystemClock))
	}

	/// Create a new core with an injected clock.
	#[must_use]
	pub fn with_clock(clock: Arc<dyn Clock>) -> Arc<Self> {
		Arc::new(Self {
			registry: Mutex::new(Registry::default()),
			rooms: Mutex::new(HashMap::new()),
			next_strip_id: AtomicU64::new(1),
			next_session_id: AtomicU64::new(1),
			clock,
		})
	}

	/// Allocate a process-wide unique strip id.
	pub fn next_strip_id(&self) -> StripId {
		StripId(self.next_strip_id.fetch_add(1, Ordering::Relaxed))
	}

	/// Get the handle for a room, creating and seeding it on first
	/// reference.
	pub(crate) fn room_handle(&self, room_key: &str) -> Arc<Mutex<RoomState>> {
		let mut rooms = self.rooms.lock().unwrap();
		if let Some(handle) = rooms.get(room_key) {
			return handle.clone();
		}
		tracing::info!(room = %room_key, "creating room with default spacers");
		let handle = Arc::new(Mutex::new(RoomState::seeded()));
		rooms.insert(room_key.to_string(), handle.clone());
		handle
	}

	/// Room the session has joined, if any.
	pub(crate) fn session_room(&self, session_id: SessionId) -> Option<String> {
		let registry = self.registry.lock().unwrap();
		registry
			.sessions
			.get(&session_id)
			.and_then(|entry| entry.room.clone())
	}

	/// Number of currently registered sessions.
	#[must_use]
	pub fn sessions_count(&self) -> usize {
		self.registry.lock().unwrap().sessions.len()
	}

	/// Retrieves a copy of a room's current collections for debugging or
	/// testing. Returns `None` if the room has never been referenced.
	#[doc(hidden)]
	pub fn room_snapshot(
		&self,
		room_key: &str,
	) -> Option<(Vec<stripboard_proto::Strip>, Vec<stripboard_proto::Spacer>)> {
		let handle = self.rooms.lock().unwrap().get(room_key).cloned()?;
		let room = handle.lock().unwrap();
		Some((room.strips.clone(), room.spacers.clone()))
	}
}

#[cfg(test)]
mod tests;
