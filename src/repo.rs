//! `user/repo[@tag]` parsing and the on-disk cache layout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

/// Version label used when no tag is requested.
pub const LATEST: &str = "latest";

/// A GitHub repository reference parsed from `user/repo[@tag]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    /// Owner (user or organization).
    pub user: String,
    /// Repository name.
    pub repo: String,
    /// Optional tag or branch to check out.
    pub tag: Option<String>,
}

impl RepoSpec {
    /// HTTPS clone URL on GitHub.
    #[must_use]
    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.user, self.repo)
    }

    /// Directory name for this snapshot: the tag, or [`LATEST`].
    #[must_use]
    pub fn version(&self) -> &str {
        self.tag.as_deref().unwrap_or(LATEST)
    }

    /// Cache directory for this snapshot under `home`.
    #[must_use]
    pub fn version_dir(&self, home: &Path) -> PathBuf {
        home.join(&self.user).join(&self.repo).join(self.version())
    }

    /// Where the working copy lives.
    #[must_use]
    pub fn src_dir(&self, home: &Path) -> PathBuf {
        self.version_dir(home).join("src")
    }

    /// Where generated documentation lives.
    #[must_use]
    pub fn docs_dir(&self, home: &Path) -> PathBuf {
        self.version_dir(home).join("docs")
    }
}

impl FromStr for RepoSpec {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidRepoPath { input: input.to_string() };

        let (path, tag) = match input.split_once('@') {
            // Tags may hold `/` (release/1.0) but every component must be a plain name.
            Some((path, tag)) if !tag.contains('@') && tag.split('/').all(is_plain_segment) => {
                (path, Some(tag.to_string()))
            }
            Some(_) => return Err(invalid()),
            None => (input, None),
        };

        let mut parts = path.split('/');
        let (Some(user), Some(repo), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        if !is_plain_segment(user) || !is_plain_segment(repo) {
            return Err(invalid());
        }

        Ok(Self { user: user.to_string(), repo: repo.to_string(), tag })
    }
}

/// A segment that stays inside its parent directory when joined.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('\\')
}

impl fmt::Display for RepoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.repo)?;
        if let Some(tag) = &self.tag {
            write!(f, "@{tag}")?;
        }
        Ok(())
    }
}
