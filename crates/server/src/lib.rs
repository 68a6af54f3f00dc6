//! Stripboard server library.
//!
//! Maintains the authoritative, per-room ordered collections of flight
//! strips and spacers, and fans mutations out to every session viewing the
//! same room in real time.

#![warn(missing_docs)]

pub mod core;
pub mod ipc;
pub mod service;

pub use stripboard_proto as proto;
