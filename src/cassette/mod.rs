//! Cassettes: YAML recordings of port interactions.
//!
//! A run recorded with `REPOCONTEXT_RECORD=<file>` can be replayed with
//! `REPOCONTEXT_REPLAY=<file>`, which serves clock, git and model answers from the
//! file instead of the network.

pub mod format;
pub mod recorder;
pub mod replayer;
