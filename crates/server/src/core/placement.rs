//! Placement policy for newly created strips.
//!
//! Pure computation over a room's current collections; holds no state of its
//! own. Arrivals take the highest order in their bay, departures slot in
//! below the bay's DEP spacer and are kept sorted by EOBT, everything else
//! appends.

use stripboard_proto::{Bay, Position, Spacer, Strip, StripKind};

/// Label of the spacer departures anchor to.
pub const DEP_SPACER_LABEL: &str = "DEP";

/// Sort key for departures with no EOBT; compares after any real HHMM value.
pub const EOBT_MISSING_SENTINEL: &str = "9999";

/// Highest order used by any strip or spacer in the bay, or -1 when the bay
/// is empty (so the first entry lands at order 0).
fn bay_max_order(strips: &[Strip], spacers: &[Spacer], bay: Bay) -> i64 {
	let strip_max = strips
		.iter()
		.filter(|s| s.position.bay == bay)
		.map(|s| s.position.order)
		.max();
	let spacer_max = spacers
		.iter()
		.filter(|sp| sp.position.bay == bay)
		.map(|sp| sp.position.order)
		.max();
	strip_max.into_iter().chain(spacer_max).max().unwrap_or(-1)
}

/// Order of the bay's DEP spacer, or 0 when the bay has none.
fn dep_spacer_order(spacers: &[Spacer], bay: Bay) -> i64 {
	spacers
		.iter()
		.find(|sp| sp.position.bay == bay && sp.label == DEP_SPACER_LABEL)
		.map_or(0, |sp| sp.position.order)
}

fn eobt_key(strip: &Strip) -> &str {
	strip.eobt().unwrap_or(EOBT_MISSING_SENTINEL)
}

/// Compute the position for a strip about to be inserted.
///
/// - `Arrival`: strictly after everything else in the bay (bay max + 1).
/// - `Departure`: one below the lowest existing departure in the bay, or one
///   below the DEP spacer when the bay has no departures yet. The definitive
///   order is assigned by [`resequence_departures`] immediately after
///   insertion.
/// - `Neutral` / `Freetext`: simple append (bay max + 1).
#[must_use]
pub fn initial_position(kind: StripKind, bay: Bay, strips: &[Strip], spacers: &[Spacer]) -> Position {
	let order = match kind {
		StripKind::Arrival => bay_max_order(strips, spacers, bay) + 1,
		StripKind::Departure => strips
			.iter()
			.filter(|s| s.kind == StripKind::Departure && s.position.bay == bay)
			.map(|s| s.position.order)
			.min()
			.map_or_else(|| dep_spacer_order(spacers, bay) - 1, |min| min - 1),
		StripKind::Neutral | StripKind::Freetext => bay_max_order(strips, spacers, bay) + 1,
	};
	Position { order, bay }
}

/// Re-sort the bay's departures by EOBT and reassign their orders
/// contiguously, ending exactly one below the bay's DEP spacer.
///
/// The earliest EOBT receives the lowest order, i.e. it sits furthest from
/// the spacer boundary. Departures with no EOBT sort last via
/// [`EOBT_MISSING_SENTINEL`]; equal keys keep their prior relative order.
pub fn resequence_departures(strips: &mut [Strip], spacers: &[Spacer], bay: Bay) {
	let mut departures: Vec<usize> = strips
		.iter()
		.enumerate()
		.filter(|(_, s)| s.kind == StripKind::Departure && s.position.bay == bay)
		.map(|(idx, _)| idx)
		.collect();
	if departures.is_empty() {
		return;
	}

	departures.sort_by(|&a, &b| eobt_key(&strips[a]).cmp(eobt_key(&strips[b])));

	let base = dep_spacer_order(spacers, bay) - departures.len() as i64;
	for (i, &idx) in departures.iter().enumerate() {
		strips[idx].position.order = base + i as i64;
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use stripboard_proto::StripId;

	use super::*;

	fn strip(id: u64, kind: StripKind, order: i64, bay: u32, eobt: Option<&str>) -> Strip {
		let mut fields = serde_json::Map::new();
		if let Some(eobt) = eobt {
			fields.insert("eobt".into(), json!(eobt));
		}
		Strip {
			id: StripId(id),
			kind,
			position: Position {
				order,
				bay: Bay(bay),
			},
			created_at: 0,
			updated_at: 0,
			fields,
		}
	}

	fn spacer(id: &str, label: &str, order: i64, bay: u32) -> Spacer {
		Spacer {
			id: id.to_string(),
			label: label.to_string(),
			icon: String::new(),
			position: Position {
				order,
				bay: Bay(bay),
			},
		}
	}

	#[test]
	fn arrival_goes_above_everything_in_its_bay() {
		let strips = vec![strip(1, StripKind::Neutral, 4, 0, None)];
		let spacers = vec![spacer("s1", "CTR", 3, 0)];
		let pos = initial_position(StripKind::Arrival, Bay(0), &strips, &spacers);
		assert_eq!(pos.order, 5);
	}

	#[test]
	fn first_entry_in_an_empty_bay_lands_at_zero() {
		let pos = initial_position(StripKind::Neutral, Bay(2), &[], &[]);
		assert_eq!(pos.order, 0);
		assert_eq!(pos.bay, Bay(2));
	}

	#[test]
	fn placement_only_considers_the_requested_bay() {
		let strips = vec![strip(1, StripKind::Neutral, 40, 0, None)];
		let spacers = vec![spacer("s1", "CTR", 41, 0)];
		let pos = initial_position(StripKind::Arrival, Bay(1), &strips, &spacers);
		assert_eq!(pos.order, 0);
	}

	#[test]
	fn departure_anchors_below_the_dep_spacer() {
		let spacers = vec![spacer("s1", "DEP", 10, 0)];
		let pos = initial_position(StripKind::Departure, Bay(0), &[], &spacers);
		assert_eq!(pos.order, 9);
	}

	#[test]
	fn departure_without_dep_spacer_defaults_to_order_zero_anchor() {
		let pos = initial_position(StripKind::Departure, Bay(0), &[], &[]);
		assert_eq!(pos.order, -1);
	}

	#[test]
	fn resequence_ends_exactly_one_below_the_dep_spacer() {
		let spacers = vec![spacer("s1", "DEP", 0, 0)];
		let mut strips = vec![
			strip(1, StripKind::Departure, -1, 0, Some("1200")),
			strip(2, StripKind::Departure, -2, 0, Some("1000")),
			strip(3, StripKind::Departure, -3, 0, Some("1100")),
		];
		resequence_departures(&mut strips, &spacers, Bay(0));

		// Earliest EOBT gets the lowest order; the block ends at -1.
		assert_eq!(strips[1].position.order, -3); // 1000
		assert_eq!(strips[2].position.order, -2); // 1100
		assert_eq!(strips[0].position.order, -1); // 1200
	}

	#[test]
	fn missing_eobt_sorts_last() {
		let spacers = vec![spacer("s1", "DEP", 0, 0)];
		let mut strips = vec![
			strip(1, StripKind::Departure, -1, 0, None),
			strip(2, StripKind::Departure, -2, 0, Some("2330")),
		];
		resequence_departures(&mut strips, &spacers, Bay(0));

		assert!(strips[1].position.order < strips[0].position.order);
	}

	#[test]
	fn resequence_leaves_other_bays_untouched() {
		let spacers = vec![spacer("s1", "DEP", 0, 0)];
		let mut strips = vec![
			strip(1, StripKind::Departure, -1, 0, Some("0900")),
			strip(2, StripKind::Departure, 7, 1, Some("0800")),
		];
		resequence_departures(&mut strips, &spacers, Bay(0));

		assert_eq!(strips[0].position.order, -1);
		assert_eq!(strips[1].position.order, 7);
	}
}
