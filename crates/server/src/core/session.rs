//! Session lifecycle and room membership.

use stripboard_proto::{ServerMsg, SessionId};

use super::{BoardCore, SessionEntry, SessionSink};

impl BoardCore {
	/// Register a newly connected session and return its id.
	///
	/// The session starts outside any room; mutations are dropped until it
	/// joins one.
	pub fn register_session(&self, sink: SessionSink) -> SessionId {
		let session_id = SessionId(
			self.next_session_id
				.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
		);
		let mut registry = self.registry.lock().unwrap();
		registry
			.sessions
			.insert(session_id, SessionEntry { sink, room: None });
		tracing::info!(?session_id, "session registered");
		session_id
	}

	/// Remove a session from the registry. Idempotent.
	pub fn unregister_session(&self, session_id: SessionId) {
		let mut registry = self.registry.lock().unwrap();
		if registry.sessions.remove(&session_id).is_some() {
			tracing::info!(?session_id, "session unregistered");
		}
	}

	/// Join the room for `room_key`, implicitly leaving any previous room,
	/// and send the joining session the room's full current state.
	pub fn on_select_airport(&self, session_id: SessionId, room_key: &str) {
		let sink = {
			let mut registry = self.registry.lock().unwrap();
			let Some(entry) = registry.sessions.get_mut(&session_id) else {
				tracing::debug!(?session_id, "select-airport from unknown session");
				return;
			};
			entry.room = Some(room_key.to_string());
			entry.sink.clone()
		};

		let handle = self.room_handle(room_key);
		let (strips, spacers) = {
			let room = handle.lock().unwrap();
			(room.strips.clone(), room.spacers.clone())
		};

		tracing::info!(?session_id, room = %room_key, "session joined room");
		if sink.send(ServerMsg::InitialStrips(strips)).is_err()
			|| sink.send(ServerMsg::InitialSpacers(spacers)).is_err()
		{
			self.handle_session_send_failure(session_id);
		}
	}

	/// Drop a session whose sink rejected a send.
	pub(crate) fn handle_session_send_failure(&self, session_id: SessionId) {
		tracing::warn!(?session_id, "send failed, unregistering session");
		self.unregister_session(session_id);
	}
}
