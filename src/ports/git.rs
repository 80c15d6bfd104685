//! Source-control port: fetch a working copy and report its commit.

use std::path::Path;

use super::PortError;
use crate::repo::RepoSpec;

/// Clones repositories and inspects working copies.
pub trait GitRepo: Send + Sync {
    /// Makes a working copy of `spec` available at `dest`.
    ///
    /// An existing `dest` is reused as-is. A fresh clone is shallow and
    /// checks out `spec.tag` when one is given. A failed clone leaves no
    /// directory behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone fails.
    fn fetch(&self, spec: &RepoSpec, dest: &Path) -> Result<(), PortError>;

    /// Returns the hash of the HEAD commit of the working copy at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a repository or has no commits.
    fn current_commit(&self, path: &Path) -> Result<String, PortError>;
}
