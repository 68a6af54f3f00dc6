//! Per-room collections and the mutations applied to them.
//!
//! Every method here runs under the room's lock; none of them perform I/O or
//! touch session bookkeeping. Callers read the collections back while still
//! holding the lock to build broadcast payloads.

use serde_json::{Map, Value};
use stripboard_proto::{
	Bay, Position, ReorderEntry, Spacer, SpacerPatch, SpacerPayload, Strip, StripId, StripKind,
	StripPayload,
};

use super::placement;

/// Spacers every new room starts with, all in bay 0.
const DEFAULT_SPACERS: [(&str, &str, &str); 4] = [
	("spacer-1", "DEP", "mdi-airplane-takeoff"),
	("spacer-2", "TAXIWAY", "mdi-taxi"),
	("spacer-3", "RUNWAY", "mdi-runway"),
	("spacer-4", "CTR", "mdi-radar"),
];

/// Attribute keys owned by the typed strip fields. Client payloads may echo
/// them back; letting them into the bag would emit duplicate JSON keys.
const RESERVED_STRIP_KEYS: [&str; 5] = ["id", "stripType", "position", "createdAt", "updatedAt"];

/// Label assigned to spacers created without one.
const DEFAULT_SPACER_LABEL: &str = "NEW SECTION";

/// Icon assigned to spacers created without one.
const DEFAULT_SPACER_ICON: &str = "mdi-minus";

/// One room's strips and spacers.
///
/// The two collections share one ordering space per bay but are stored and
/// broadcast separately.
#[derive(Debug, Default)]
pub struct RoomState {
	pub(crate) strips: Vec<Strip>,
	pub(crate) spacers: Vec<Spacer>,
}

impl RoomState {
	/// A fresh room with the default spacer set and no strips.
	#[must_use]
	pub fn seeded() -> Self {
		let spacers = DEFAULT_SPACERS
			.iter()
			.enumerate()
			.map(|(i, &(id, label, icon))| Spacer {
				id: id.to_string(),
				label: label.to_string(),
				icon: icon.to_string(),
				position: Position {
					order: i as i64,
					bay: Bay(0),
				},
			})
			.collect();
		Self {
			strips: Vec::new(),
			spacers,
		}
	}

	/// Drop all strips and restore the default spacers.
	pub fn reset(&mut self) {
		*self = Self::seeded();
	}

	/// Create a strip from a client payload, or overwrite the existing strip
	/// with the same callsign (case-insensitive).
	///
	/// An overwrite merges the payload's attributes into the existing strip,
	/// updating its kind and `updated_at` but preserving its id, position and
	/// `created_at`; no placement or resequencing happens on that path. A
	/// fresh insert runs the placement policy and, for departures,
	/// resequences the bay by EOBT. Either way the strip collection ends
	/// sorted by order.
	pub fn create_or_update_strip(
		&mut self,
		payload: StripPayload,
		now_ms: i64,
		next_id: &mut dyn FnMut() -> StripId,
	) {
		let bay = payload.bay.unwrap_or_default();
		let existing = payload.callsign().and_then(|cs| {
			self.strips
				.iter()
				.position(|s| s.callsign().is_some_and(|c| c.eq_ignore_ascii_case(cs)))
		});

		if let Some(idx) = existing {
			let strip = &mut self.strips[idx];
			strip.kind = payload.kind;
			merge_fields(&mut strip.fields, payload.fields);
			strip.updated_at = now_ms;
		} else {
			let position =
				placement::initial_position(payload.kind, bay, &self.strips, &self.spacers);
			let mut fields = Map::new();
			merge_fields(&mut fields, payload.fields);
			self.strips.push(Strip {
				id: next_id(),
				kind: payload.kind,
				position,
				created_at: now_ms,
				updated_at: now_ms,
				fields,
			});
			if payload.kind == StripKind::Departure {
				placement::resequence_departures(&mut self.strips, &self.spacers, bay);
			}
		}

		self.sort_strips();
	}

	/// Merge attributes into an existing strip. Returns the updated strip, or
	/// `None` if the id is unknown.
	pub fn update_strip(
		&mut self,
		id: StripId,
		fields: Map<String, Value>,
		now_ms: i64,
	) -> Option<Strip> {
		let strip = self.strips.iter_mut().find(|s| s.id == id)?;
		merge_fields(&mut strip.fields, fields);
		strip.updated_at = now_ms;
		Some(strip.clone())
	}

	/// Delete a strip by id, compacting the survivors' orders to their
	/// collection index. Returns `false` if the id is unknown.
	///
	/// Compaction rewrites `order` only; each survivor keeps its bay, so
	/// orders become contiguous across the whole collection rather than per
	/// bay.
	pub fn delete_strip(&mut self, id: StripId) -> bool {
		let Some(idx) = self.strips.iter().position(|s| s.id == id) else {
			return false;
		};
		self.strips.remove(idx);
		for (i, strip) in self.strips.iter_mut().enumerate() {
			strip.position.order = i as i64;
		}
		true
	}

	/// Create a spacer from a client payload, or overwrite the existing
	/// spacer with the same id.
	///
	/// An overwrite merges label and icon, preserving the spacer's position.
	/// A fresh insert fills every absent field with its default: a timestamp
	/// id, the "NEW SECTION" label, the minus icon, and an order one past the
	/// bay's current spacer maximum.
	pub fn create_or_update_spacer(&mut self, payload: SpacerPayload, now_ms: i64) {
		let bay = payload.bay.unwrap_or_default();
		let existing = payload
			.id
			.as_deref()
			.and_then(|id| self.spacers.iter().position(|sp| sp.id == id));
		if let Some(idx) = existing {
			let spacer = &mut self.spacers[idx];
			if let Some(label) = payload.label {
				spacer.label = label;
			}
			if let Some(icon) = payload.icon {
				spacer.icon = icon;
			}
			return;
		}

		let order = payload.order.unwrap_or_else(|| {
			self.spacers
				.iter()
				.filter(|sp| sp.position.bay == bay)
				.map(|sp| sp.position.order)
				.max()
				.map_or(0, |max| max + 1)
		});
		self.spacers.push(Spacer {
			id: payload.id.unwrap_or_else(|| format!("spacer-{now_ms}")),
			label: payload
				.label
				.unwrap_or_else(|| DEFAULT_SPACER_LABEL.to_string()),
			icon: payload
				.icon
				.unwrap_or_else(|| DEFAULT_SPACER_ICON.to_string()),
			position: Position { order, bay },
		});
	}

	/// Merge fields into an existing spacer. Returns `false` if the id is
	/// unknown.
	pub fn update_spacer(&mut self, patch: SpacerPatch) -> bool {
		let Some(spacer) = self.spacers.iter_mut().find(|sp| sp.id == patch.id) else {
			return false;
		};
		if let Some(label) = patch.label {
			spacer.label = label;
		}
		if let Some(icon) = patch.icon {
			spacer.icon = icon;
		}
		if let Some(order) = patch.order {
			spacer.position.order = order;
		}
		if let Some(bay) = patch.bay {
			spacer.position.bay = bay;
		}
		true
	}

	/// Delete a spacer by id, compacting the survivors' orders to their
	/// collection index. Returns `false` if the id is unknown.
	pub fn delete_spacer(&mut self, id: &str) -> bool {
		let Some(idx) = self.spacers.iter().position(|sp| sp.id == id) else {
			return false;
		};
		self.spacers.remove(idx);
		for (i, spacer) in self.spacers.iter_mut().enumerate() {
			spacer.position.order = i as i64;
		}
		true
	}

	/// Replace the room's ordering wholesale with the supplied list.
	///
	/// The list is the complete new truth: strips absent from it are dropped,
	/// spacer entries with unknown ids are materialized from the entry's
	/// label and icon, and entries whose kind is neither `"strip"` nor
	/// `"spacer"` are skipped individually. Returns the number of entries
	/// skipped.
	pub fn apply_full_reorder(&mut self, entries: &[ReorderEntry]) -> usize {
		let mut strips = Vec::new();
		let mut spacers = Vec::new();
		let mut skipped = 0;

		for entry in entries {
			let position = Position {
				order: entry.order,
				bay: entry.bay.unwrap_or_default(),
			};
			match entry.kind.as_str() {
				"strip" => {
					let Some(id) = entry.id.as_strip() else {
						skipped += 1;
						continue;
					};
					if let Some(mut strip) =
						self.strips.iter().find(|s| s.id == id).cloned()
					{
						strip.position = position;
						strips.push(strip);
					}
				}
				"spacer" => {
					let Some(id) = entry.id.as_spacer() else {
						skipped += 1;
						continue;
					};
					let mut spacer = self
						.spacers
						.iter()
						.find(|sp| sp.id == id)
						.cloned()
						.unwrap_or_else(|| Spacer {
							id: id.to_string(),
							label: entry
								.name
								.clone()
								.unwrap_or_else(|| DEFAULT_SPACER_LABEL.to_string()),
							icon: entry
								.icon
								.clone()
								.unwrap_or_else(|| DEFAULT_SPACER_ICON.to_string()),
							position,
						});
					spacer.position = position;
					spacers.push(spacer);
				}
				_ => skipped += 1,
			}
		}

		strips.sort_by_key(|s| s.position.order);
		spacers.sort_by_key(|sp| sp.position.order);
		self.strips = strips;
		self.spacers = spacers;
		skipped
	}

	fn sort_strips(&mut self) {
		self.strips.sort_by_key(|s| s.position.order);
	}
}

fn merge_fields(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
	for (key, value) in incoming {
		if RESERVED_STRIP_KEYS.contains(&key.as_str()) {
			continue;
		}
		target.insert(key, value);
	}
}
