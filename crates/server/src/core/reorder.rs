//! Bulk reorder and board reset.
//!
//! Both intents replace the room's collections wholesale and broadcast both
//! snapshots room-wide, so every session converges on the same state no
//! matter what it held before.

use stripboard_proto::{MovePayload, ServerMsg, SessionId};

use super::BoardCore;

impl BoardCore {
	/// Replace the room's ordering with the client's complete list.
	///
	/// Last writer wins: concurrent reorders resolve to whichever list is
	/// applied second. Entries with unrecognized kinds are skipped, not
	/// rejected.
	pub fn on_move_item(&self, session_id: SessionId, payload: MovePayload) {
		let Some(room_key) = self.session_room(session_id) else {
			tracing::debug!(?session_id, "move-item before joining a room");
			return;
		};

		let handle = self.room_handle(&room_key);
		let (strips, spacers) = {
			let mut room = handle.lock().unwrap();
			let skipped = room.apply_full_reorder(&payload.all_items);
			if skipped > 0 {
				tracing::debug!(?session_id, skipped, "move-item entries skipped");
			}
			(room.strips.clone(), room.spacers.clone())
		};

		let recipients = self.room_recipients(&room_key, None);
		self.send_to_recipients(
			&recipients,
			&[
				ServerMsg::StripsReordered(strips),
				ServerMsg::SpacersReordered(spacers),
			],
		);
	}

	/// Clear the room's strips, restore the default spacers, and broadcast
	/// the reset state room-wide.
	pub fn on_reset_fpb(&self, session_id: SessionId) {
		let Some(room_key) = self.session_room(session_id) else {
			tracing::debug!(?session_id, "reset-fpb before joining a room");
			return;
		};

		let handle = self.room_handle(&room_key);
		let (strips, spacers) = {
			let mut room = handle.lock().unwrap();
			room.reset();
			(room.strips.clone(), room.spacers.clone())
		};

		tracing::info!(?session_id, room = %room_key, "board reset");
		let recipients = self.room_recipients(&room_key, None);
		self.send_to_recipients(
			&recipients,
			&[
				ServerMsg::StripsReordered(strips),
				ServerMsg::SpacersReordered(spacers),
			],
		);
	}
}
