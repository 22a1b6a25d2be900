//! Common types for the craps rules engine.
//!
//! Everything here is plain data: dice, the 64-code bet catalog, the series record with its
//! bonus trackers, and the table rules that parameterize the engine. Each persisted type has a
//! `commonware-codec` encoding so an archived series can be read back byte-for-byte.

pub mod craps;

pub use craps::*;
