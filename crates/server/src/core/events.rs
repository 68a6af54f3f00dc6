//! Room-scoped fan-out.
//!
//! Recipients are resolved under the registry lock, sends happen after every
//! lock is released, and any send failure feeds back into session cleanup.

use stripboard_proto::{ServerMsg, SessionId};

use super::{BoardCore, SessionSink};

impl BoardCore {
	/// Resolve the sinks of every session currently in the room, optionally
	/// excluding one session.
	pub(crate) fn room_recipients(
		&self,
		room_key: &str,
		exclude: Option<SessionId>,
	) -> Vec<(SessionId, SessionSink)> {
		let registry = self.registry.lock().unwrap();
		registry
			.sessions
			.iter()
			.filter(|(id, entry)| {
				entry.room.as_deref() == Some(room_key) && Some(**id) != exclude
			})
			.map(|(id, entry)| (*id, entry.sink.clone()))
			.collect()
	}

	/// Deliver a batch of events to each recipient, unregistering any session
	/// whose sink has gone away.
	pub(crate) fn send_to_recipients(
		&self,
		recipients: &[(SessionId, SessionSink)],
		msgs: &[ServerMsg],
	) {
		let mut failed = Vec::new();
		for (session_id, sink) in recipients {
			for msg in msgs {
				if sink.send(msg.clone()).is_err() {
					failed.push(*session_id);
					break;
				}
			}
		}
		for session_id in failed {
			self.handle_session_send_failure(session_id);
		}
	}
}
