//! Error type shared by the documentation pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::ports::PortError;

/// Errors that abort a documentation run.
#[derive(Debug, Error)]
pub enum Error {
    /// `ANTHROPIC_API_KEY` was not set (or empty).
    #[error("ANTHROPIC_API_KEY environment variable must be set")]
    MissingApiKey,

    /// The repository argument was not of the form `user/repo[@tag]`.
    #[error("invalid repository path format {input:?}: expected user/repo[@tag]")]
    InvalidRepoPath {
        /// The rejected argument.
        input: String,
    },

    /// No home directory and no `REPOCONTEXT_HOME` override.
    #[error("could not determine home directory; set REPOCONTEXT_HOME")]
    NoHomeDir,

    /// Cloning or inspecting the working copy failed.
    #[error("could not clone repository {repo}: {source}")]
    Clone {
        /// `user/repo` being fetched.
        repo: String,
        /// Underlying port error.
        #[source]
        source: PortError,
    },

    /// Resolving the current commit failed.
    #[error("failed to read current commit: {0}")]
    Commit(#[source] PortError),

    /// The scan root could not be walked at all.
    #[error("cannot scan {path}: {reason}")]
    Walk {
        /// Root passed to the scanner.
        path: PathBuf,
        /// Why the walk could not start.
        reason: String,
    },

    /// A file read or write failed.
    #[error("{action} {path}: {source}")]
    Io {
        /// What was being attempted (e.g. "failed to read").
        action: &'static str,
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: PortError,
    },

    /// The metadata file could not be serialized.
    #[error("failed to encode metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// A text-generation call failed.
    #[error("failed to {stage}: {source}")]
    Generation {
        /// Pipeline stage that issued the call.
        stage: String,
        /// Underlying port error.
        #[source]
        source: PortError,
    },

    /// The model's list contained nothing usable within the budget.
    #[error("no files were selected within size constraints")]
    NoFilesSelected,

    /// A section name did not match any known section.
    #[error("unknown section: {0}")]
    UnknownSection(String),
}

/// Convenience alias for results carrying [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Wraps a port I/O failure with the action and path that caused it.
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: PortError) -> Self {
        Self::Io { action, path: path.into(), source }
    }

    /// Wraps a text-generation failure with the stage that issued the call.
    pub(crate) fn generation(stage: impl Into<String>, source: PortError) -> Self {
        Self::Generation { stage: stage.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_mentions_path_and_action() {
        let err = Error::io("failed to read", "/tmp/x.md", "boom".into());
        let msg = err.to_string();
        assert!(msg.contains("failed to read"));
        assert!(msg.contains("/tmp/x.md"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn generation_error_names_stage() {
        let err = Error::generation("generate section 01_overview.md", "rate limited".into());
        assert_eq!(err.to_string(), "failed to generate section 01_overview.md: rate limited");
    }
}
