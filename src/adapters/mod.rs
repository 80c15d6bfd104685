//! Port implementations.
//!
//! `live` talks to the real world, `recording` wraps a live adapter and logs
//! every call into a cassette, `replaying` answers from a cassette.

pub mod live;
pub mod recording;
pub mod replaying;
