//! Clock port used to timestamp generated documentation.

use chrono::{DateTime, Utc};

/// Provides the current time.
///
/// Replaying a fixed time keeps `metadata.json` reproducible in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
