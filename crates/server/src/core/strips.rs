//! Strip intents.
//!
//! Each handler resolves the session's room, mutates under the room lock,
//! snapshots the payload while still holding it, then fans out with every
//! lock released. Intents from sessions outside any room are dropped.

use stripboard_proto::{ServerMsg, SessionId, StripId, StripPatch, StripPayload};

use super::BoardCore;

impl BoardCore {
	/// Create a strip, or overwrite the room's existing strip with the same
	/// callsign. Broadcasts the full strip snapshot room-wide, originator
	/// included.
	pub fn on_create_strip(&self, session_id: SessionId, payload: StripPayload) {
		let Some(room_key) = self.session_room(session_id) else {
			tracing::debug!(?session_id, "create-strip before joining a room");
			return;
		};

		let now_ms = self.clock.now_ms();
		let handle = self.room_handle(&room_key);
		let strips = {
			let mut room = handle.lock().unwrap();
			room.create_or_update_strip(payload, now_ms, &mut || self.next_strip_id());
			room.strips.clone()
		};

		let recipients = self.room_recipients(&room_key, None);
		self.send_to_recipients(&recipients, &[ServerMsg::StripsReordered(strips)]);
	}

	/// Merge attributes into an existing strip and broadcast the updated
	/// strip to everyone in the room except the originator, whose local copy
	/// already reflects the edit.
	pub fn on_update_strip(&self, session_id: SessionId, patch: StripPatch) {
		let Some(room_key) = self.session_room(session_id) else {
			tracing::debug!(?session_id, "update-strip before joining a room");
			return;
		};

		let now_ms = self.clock.now_ms();
		let handle = self.room_handle(&room_key);
		let updated = {
			let mut room = handle.lock().unwrap();
			room.update_strip(patch.id, patch.fields, now_ms)
		};
		let Some(strip) = updated else {
			tracing::debug!(?session_id, id = patch.id.0, "update-strip for unknown strip");
			return;
		};

		let recipients = self.room_recipients(&room_key, Some(session_id));
		self.send_to_recipients(&recipients, &[ServerMsg::StripUpdated(strip)]);
	}

	/// Delete a strip and broadcast the compacted snapshot room-wide.
	pub fn on_delete_strip(&self, session_id: SessionId, id: StripId) {
		let Some(room_key) = self.session_room(session_id) else {
			tracing::debug!(?session_id, "delete-strip before joining a room");
			return;
		};

		let handle = self.room_handle(&room_key);
		let strips = {
			let mut room = handle.lock().unwrap();
			if !room.delete_strip(id) {
				tracing::debug!(?session_id, id = id.0, "delete-strip for unknown strip");
				return;
			}
			room.strips.clone()
		};

		let recipients = self.room_recipients(&room_key, None);
		self.send_to_recipients(&recipients, &[ServerMsg::StripsReordered(strips)]);
	}
}
