//! Per-connection service facade.
//!
//! One [`BoardService`] exists per connected client. It registers a session
//! on construction, routes decoded intents to the core, and unregisters the
//! session when dropped, so a connection teardown always cleans up its
//! registry entry even on abnormal exits.

use std::sync::Arc;

use stripboard_proto::{ClientMsg, SessionId};

use crate::core::{BoardCore, SessionSink};

/// Routes one connection's intents into the shared core.
#[derive(Debug)]
pub struct BoardService {
	core: Arc<BoardCore>,
	session_id: SessionId,
}

impl BoardService {
	/// Register a session for a new connection.
	///
	/// Events for the session are delivered through `sink`; the caller owns
	/// the receiving half and is responsible for writing drained events to
	/// the transport.
	pub fn new(core: Arc<BoardCore>, sink: SessionSink) -> Self {
		let session_id = core.register_session(sink);
		Self { core, session_id }
	}

	/// The session id assigned to this connection.
	#[must_use]
	pub fn session_id(&self) -> SessionId {
		self.session_id
	}

	/// Apply one decoded client intent.
	pub fn handle(&self, msg: ClientMsg) {
		match msg {
			ClientMsg::SelectAirport(room_key) => {
				self.core.on_select_airport(self.session_id, &room_key);
			}
			ClientMsg::CreateStrip(payload) => {
				self.core.on_create_strip(self.session_id, payload);
			}
			ClientMsg::UpdateStrip(patch) => {
				self.core.on_update_strip(self.session_id, patch);
			}
			ClientMsg::DeleteStrip(id) => {
				self.core.on_delete_strip(self.session_id, id);
			}
			ClientMsg::CreateSpacer(payload) => {
				self.core.on_create_spacer(self.session_id, payload);
			}
			ClientMsg::UpdateSpacer(patch) => {
				self.core.on_update_spacer(self.session_id, patch);
			}
			ClientMsg::DeleteSpacer(id) => {
				self.core.on_delete_spacer(self.session_id, &id);
			}
			ClientMsg::MoveItem(payload) => {
				self.core.on_move_item(self.session_id, payload);
			}
			ClientMsg::ResetFpb => {
				self.core.on_reset_fpb(self.session_id);
			}
		}
	}
}

impl Drop for BoardService {
	fn drop(&mut self) {
		self.core.unregister_session(self.session_id);
	}
}
