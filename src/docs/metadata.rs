//! `metadata.json`: what produced a docs directory.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Record of one documentation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// HEAD commit of the working copy the docs were generated from.
    pub commit_hash: String,
    /// When generation ran (RFC3339 on disk).
    pub generated_at: DateTime<Utc>,
    /// Model identifier used for every section.
    pub model_used: String,
    /// Per-file versions. Always written empty; `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub file_versions: BTreeMap<String, String>,
    /// Whether the final merge pass has rewritten `full.md`.
    #[serde(default)]
    pub deduplicated: bool,
}

impl RunMetadata {
    /// Fresh metadata for a run that has not been deduplicated yet.
    pub fn new(commit_hash: impl Into<String>, generated_at: DateTime<Utc>, model_used: impl Into<String>) -> Self {
        Self {
            commit_hash: commit_hash.into(),
            generated_at,
            model_used: model_used.into(),
            file_versions: BTreeMap::new(),
            deduplicated: false,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}
