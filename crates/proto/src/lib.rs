//! Shared wire types for the stripboard synchronization protocol.
//!
//! This crate defines the messages exchanged between board clients and the
//! stripboard server. Frames on the wire are length-prefixed JSON; JSON is
//! required because strip payloads carry a free-form attribute bag that only
//! a self-describing format can round-trip.

#![warn(missing_docs)]

pub mod types;

pub use types::*;

/// Default TCP port the server listens on.
pub const DEFAULT_PORT: u16 = 3000;
