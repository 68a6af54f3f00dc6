//! Spacer intents.
//!
//! Spacer mutations are rarer and coarser than strip mutations; every one of
//! them broadcasts the full spacer snapshot room-wide, originator included.

use stripboard_proto::{ServerMsg, SessionId, SpacerPatch, SpacerPayload};

use super::BoardCore;

impl BoardCore {
	/// Create a spacer, or overwrite the room's existing spacer with the same
	/// id.
	pub fn on_create_spacer(&self, session_id: SessionId, payload: SpacerPayload) {
		let Some(room_key) = self.session_room(session_id) else {
			tracing::debug!(?session_id, "create-spacer before joining a room");
			return;
		};

		let now_ms = self.clock.now_ms();
		let handle = self.room_handle(&room_key);
		let spacers = {
			let mut room = handle.lock().unwrap();
			room.create_or_update_spacer(payload, now_ms);
			room.spacers.clone()
		};

		let recipients = self.room_recipients(&room_key, None);
		self.send_to_recipients(&recipients, &[ServerMsg::SpacersReordered(spacers)]);
	}

	/// Merge fields into an existing spacer.
	pub fn on_update_spacer(&self, session_id: SessionId, patch: SpacerPatch) {
		let Some(room_key) = self.session_room(session_id) else {
			tracing::debug!(?session_id, "update-spacer before joining a room");
			return;
		};

		let handle = self.room_handle(&room_key);
		let spacers = {
			let mut room = handle.lock().unwrap();
			if !room.update_spacer(patch) {
				tracing::debug!(?session_id, "update-spacer for unknown spacer");
				return;
			}
			room.spacers.clone()
		};

		let recipients = self.room_recipients(&room_key, None);
		self.send_to_recipients(&recipients, &[ServerMsg::SpacersReordered(spacers)]);
	}

	/// Delete a spacer and broadcast the compacted snapshot room-wide.
	pub fn on_delete_spacer(&self, session_id: SessionId, id: &str) {
		let Some(room_key) = self.session_room(session_id) else {
			tracing::debug!(?session_id, "delete-spacer before joining a room");
			return;
		};

		let handle = self.room_handle(&room_key);
		let spacers = {
			let mut room = handle.lock().unwrap();
			if !room.delete_spacer(id) {
				tracing::debug!(?session_id, id, "delete-spacer for unknown spacer");
				return;
			}
			room.spacers.clone()
		};

		let recipients = self.room_recipients(&room_key, None);
		self.send_to_recipients(&recipients, &[ServerMsg::SpacersReordered(spacers)]);
	}
}
