//! Wire types for the stripboard synchronization protocol.
//!
//! This module defines the data structures exchanged between board clients
//! and the server. Event names on the wire are kebab-case and match the
//! protocol of the original flight progress board service
//! (`select-airport`, `create-strip`, `strips-reordered`, ...).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier for connected sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

/// Unique identifier for strips.
///
/// Allocated by the server from a single monotonic counter, so strip ids are
/// unique across all rooms within one process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StripId(pub u64);

/// Sub-lane partitioning the ordering space within a room.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Bay(pub u32);

/// Placement of a strip or spacer on the board.
///
/// Within a bay, `order` defines a total order shared by strips and spacers.
/// Orders need not be contiguous or start at zero; only their relative order
/// matters for rendering. Ties break by stable collection position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
	/// Ordering key along the primary axis.
	pub order: i64,
	/// Bay the entry belongs to.
	#[serde(default)]
	pub bay: Bay,
}

/// Category of a strip, driving its initial placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripKind {
	/// Inbound flight; placed after everything else in its bay.
	Arrival,
	/// Outbound flight; placed adjacent to the bay's DEP spacer and kept
	/// sorted by EOBT.
	Departure,
	/// Plain strip with no placement policy beyond appending.
	Neutral,
	/// Free-text annotation strip; appended like neutral strips.
	Freetext,
}

/// A unit of tracked work on the board.
///
/// Beyond the typed fields, a strip carries a free-form attribute bag
/// supplied by the client (callsign, route, EOBT, ...). The bag is flattened
/// on the wire so client payload keys appear at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strip {
	/// Server-assigned identity.
	pub id: StripId,
	/// Placement category.
	#[serde(rename = "stripType")]
	pub kind: StripKind,
	/// Current placement.
	pub position: Position,
	/// Creation time, epoch milliseconds.
	pub created_at: i64,
	/// Last-modification time, epoch milliseconds.
	pub updated_at: i64,
	/// Client-supplied attributes.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl Strip {
	/// Returns the strip's callsign attribute, if present and non-empty.
	#[must_use]
	pub fn callsign(&self) -> Option<&str> {
		match self.fields.get("callsign").and_then(Value::as_str) {
			Some("") | None => None,
			Some(cs) => Some(cs),
		}
	}

	/// Returns the strip's EOBT attribute, if present and non-empty.
	#[must_use]
	pub fn eobt(&self) -> Option<&str> {
		match self.fields.get("eobt").and_then(Value::as_str) {
			Some("") | None => None,
			Some(eobt) => Some(eobt),
		}
	}
}

/// Client payload for creating a strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripPayload {
	/// Placement category (required).
	#[serde(rename = "stripType")]
	pub kind: StripKind,
	/// Requested bay; defaults to bay 0 when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bay: Option<Bay>,
	/// Free-form attributes (callsign, route, eobt, ...).
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl StripPayload {
	/// Returns the payload's callsign attribute, if present and non-empty.
	#[must_use]
	pub fn callsign(&self) -> Option<&str> {
		match self.fields.get("callsign").and_then(Value::as_str) {
			Some("") | None => None,
			Some(cs) => Some(cs),
		}
	}
}

/// Client payload for patching an existing strip in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripPatch {
	/// Identity of the strip to patch.
	pub id: StripId,
	/// Attributes to merge into the strip's bag.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

/// A labeled section marker sharing the ordering space with strips.
///
/// Spacers never carry flight data; they only partition the board visually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spacer {
	/// Identity; client- or server-assigned string.
	pub id: String,
	/// Display label (e.g. "DEP", "RUNWAY").
	#[serde(rename = "name")]
	pub label: String,
	/// Display icon identifier.
	pub icon: String,
	/// Current placement.
	pub position: Position,
}

/// Client payload for creating a spacer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacerPayload {
	/// Identity; server-generated when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Display label; defaults to "NEW SECTION".
	#[serde(default, rename = "name", skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Display icon; defaults to "mdi-minus".
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<String>,
	/// Requested order; defaults to the bay's current maximum plus one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub order: Option<i64>,
	/// Requested bay; defaults to bay 0.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bay: Option<Bay>,
}

/// Client payload for patching an existing spacer in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacerPatch {
	/// Identity of the spacer to patch.
	pub id: String,
	/// New label, if changing.
	#[serde(default, rename = "name", skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// New icon, if changing.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<String>,
	/// New order, if changing.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub order: Option<i64>,
	/// New bay, if changing.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bay: Option<Bay>,
}

/// Identity carried by a bulk-reorder entry.
///
/// Strip ids are numeric and spacer ids are strings; the entry's `type`
/// field decides which interpretation applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
	/// Numeric id referencing a strip.
	Strip(u64),
	/// String id referencing a spacer.
	Spacer(String),
}

impl EntryId {
	/// Interprets the id as a strip id.
	#[must_use]
	pub fn as_strip(&self) -> Option<StripId> {
		match self {
			EntryId::Strip(n) => Some(StripId(*n)),
			EntryId::Spacer(_) => None,
		}
	}

	/// Interprets the id as a spacer id.
	#[must_use]
	pub fn as_spacer(&self) -> Option<&str> {
		match self {
			EntryId::Strip(_) => None,
			EntryId::Spacer(s) => Some(s),
		}
	}
}

/// One entry of a bulk-reorder list.
///
/// `kind` is deliberately a plain string: entries whose kind is neither
/// `"strip"` nor `"spacer"` are skipped individually rather than failing the
/// whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderEntry {
	/// Entity kind: `"strip"` or `"spacer"`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Entity identity.
	pub id: EntryId,
	/// New order for the entity.
	pub order: i64,
	/// New bay for the entity; defaults to bay 0.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bay: Option<Bay>,
	/// Label used when materializing an unknown spacer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Icon used when materializing an unknown spacer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<String>,
}

/// Client payload for a bulk reorder of the whole board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovePayload {
	/// The complete new ordering, strips and spacers combined.
	#[serde(rename = "allItems")]
	pub all_items: Vec<ReorderEntry>,
}

/// An intent sent by a board client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMsg {
	/// Join the room for the given workspace key, leaving any previous room.
	SelectAirport(String),
	/// Create a strip, or overwrite an existing one with the same callsign.
	CreateStrip(StripPayload),
	/// Merge attributes into an existing strip.
	UpdateStrip(StripPatch),
	/// Delete a strip by id.
	DeleteStrip(StripId),
	/// Create a spacer, or overwrite an existing one with the same id.
	CreateSpacer(SpacerPayload),
	/// Merge fields into an existing spacer.
	UpdateSpacer(SpacerPatch),
	/// Delete a spacer by id.
	DeleteSpacer(String),
	/// Replace the room's ordering wholesale with the supplied list.
	MoveItem(MovePayload),
	/// Clear the room's strips and re-seed the default spacers.
	ResetFpb,
}

/// An event sent by the server to board clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMsg {
	/// Full strip collection, sent once to a joining session.
	InitialStrips(Vec<Strip>),
	/// Full spacer collection, sent once to a joining session.
	InitialSpacers(Vec<Spacer>),
	/// Full strip snapshot, broadcast room-wide after a mutation.
	StripsReordered(Vec<Strip>),
	/// Full spacer snapshot, broadcast room-wide after a mutation.
	SpacersReordered(Vec<Spacer>),
	/// Single updated strip, broadcast room-wide except to the originator.
	StripUpdated(Strip),
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn client_msg_event_names_are_kebab_case() {
		let msg = ClientMsg::SelectAirport("EGLL".to_string());
		let value = serde_json::to_value(&msg).unwrap();
		assert_eq!(value, json!({ "event": "select-airport", "data": "EGLL" }));

		let msg = ClientMsg::DeleteStrip(StripId(7));
		let value = serde_json::to_value(&msg).unwrap();
		assert_eq!(value, json!({ "event": "delete-strip", "data": 7 }));

		let msg: ClientMsg = serde_json::from_value(json!({ "event": "reset-fpb" })).unwrap();
		assert_eq!(msg, ClientMsg::ResetFpb);
	}

	#[test]
	fn strip_payload_flattens_free_form_fields() {
		let msg: ClientMsg = serde_json::from_value(json!({
			"event": "create-strip",
			"data": {
				"stripType": "departure",
				"callsign": "BAW123",
				"eobt": "0915",
				"route": "DET L6 DVR",
			}
		}))
		.unwrap();

		let ClientMsg::CreateStrip(payload) = msg else {
			panic!("expected create-strip");
		};
		assert_eq!(payload.kind, StripKind::Departure);
		assert_eq!(payload.callsign(), Some("BAW123"));
		assert_eq!(payload.fields.get("eobt"), Some(&json!("0915")));
		assert_eq!(payload.bay, None);
	}

	#[test]
	fn strip_serializes_with_camel_case_and_flattened_bag() {
		let mut fields = Map::new();
		fields.insert("callsign".into(), json!("DLH4XY"));
		let strip = Strip {
			id: StripId(3),
			kind: StripKind::Arrival,
			position: Position {
				order: 5,
				bay: Bay(1),
			},
			created_at: 1000,
			updated_at: 2000,
			fields,
		};

		let value = serde_json::to_value(&strip).unwrap();
		assert_eq!(
			value,
			json!({
				"id": 3,
				"stripType": "arrival",
				"position": { "order": 5, "bay": 1 },
				"createdAt": 1000,
				"updatedAt": 2000,
				"callsign": "DLH4XY",
			})
		);

		let back: Strip = serde_json::from_value(value).unwrap();
		assert_eq!(back, strip);
	}

	#[test]
	fn reorder_entry_ids_accept_numbers_and_strings() {
		let payload: MovePayload = serde_json::from_value(json!({
			"allItems": [
				{ "type": "strip", "id": 12, "order": 0 },
				{ "type": "spacer", "id": "spacer-1", "order": 1 },
				{ "type": "ghost", "id": "x", "order": 2 },
			]
		}))
		.unwrap();

		assert_eq!(payload.all_items[0].id.as_strip(), Some(StripId(12)));
		assert_eq!(payload.all_items[1].id.as_spacer(), Some("spacer-1"));
		assert_eq!(payload.all_items[2].kind, "ghost");
	}

	#[test]
	fn position_bay_defaults_to_zero() {
		let pos: Position = serde_json::from_value(json!({ "order": -3 })).unwrap();
		assert_eq!(pos.bay, Bay(0));
		assert_eq!(pos.order, -3);
	}

	#[test]
	fn empty_eobt_is_treated_as_absent() {
		let strip: Strip = serde_json::from_value(json!({
			"id": 1,
			"stripType": "departure",
			"position": { "order": 0 },
			"createdAt": 0,
			"updatedAt": 0,
			"eobt": "",
		}))
		.unwrap();
		assert_eq!(strip.eobt(), None);
	}

	#[test]
	fn empty_callsign_is_treated_as_absent() {
		let payload: StripPayload = serde_json::from_value(json!({
			"stripType": "neutral",
			"callsign": "",
		}))
		.unwrap();
		assert_eq!(payload.callsign(), None);
	}
}
