//! Repository scanning and the file catalog.
//!
//! A walker thread feeds paths through a bounded channel to the loop that
//! stats and classifies them. Walking goes through the `ignore` crate, so
//! `.gitignore` rules apply; the `.git` directory itself is never entered.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::classify::is_binary_file;
use crate::error::{Error, Result};

/// Capacity of the walker → classifier handoff.
const HANDOFF_CAPACITY: usize = 100;

/// A candidate text file discovered by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Repository-relative path with `/` separators.
    pub path: String,
    /// Size on disk in bytes.
    pub size: u64,
    /// File contents, filled in by [`Catalog::read_contents`].
    pub content: Option<String>,
}

/// Non-binary files of a repository snapshot, keyed by relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an entry without content.
    pub fn insert(&mut self, path: impl Into<String>, size: u64) {
        let path = path.into();
        self.entries.insert(path.clone(), CatalogEntry { path, size, content: None });
    }

    /// Looks up an entry by relative path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&CatalogEntry> {
        self.entries.get(path)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Sum of all entry sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.entries.values().map(|e| e.size).sum()
    }

    /// Reads the contents of `paths` from `root` into their entries.
    ///
    /// Entries that already carry content are left as they are. Invalid
    /// UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on the first file that cannot be read.
    pub fn read_contents(&mut self, root: &Path, paths: &[String]) -> Result<()> {
        for path in paths {
            let Some(entry) = self.entries.get_mut(path) else {
                warn!(path = %path, "not in catalog, skipping content read");
                continue;
            };
            if entry.content.is_some() {
                continue;
            }
            let full = root.join(path);
            let bytes = std::fs::read(&full)
                .map_err(|e| Error::io("failed to read file", &full, Box::new(e)))?;
            entry.content = Some(String::from_utf8_lossy(&bytes).into_owned());
        }
        Ok(())
    }

    /// Path → content for the given paths that have content attached.
    #[must_use]
    pub fn contents_of(&self, paths: &[String]) -> BTreeMap<String, String> {
        paths
            .iter()
            .filter_map(|p| {
                let entry = self.entries.get(p)?;
                entry.content.clone().map(|c| (p.clone(), c))
            })
            .collect()
    }
}

/// Walks `root` and catalogs every non-binary file.
///
/// Files that cannot be stat'ed or sampled are logged and skipped.
///
/// # Errors
///
/// Returns [`Error::Walk`] if `root` does not exist or is not a directory.
pub fn scan_repository(root: &Path) -> Result<Catalog> {
    if !root.exists() {
        return Err(Error::Walk { path: root.to_path_buf(), reason: "path not found".into() });
    }
    if !root.is_dir() {
        return Err(Error::Walk { path: root.to_path_buf(), reason: "not a directory".into() });
    }

    let (tx, rx) = mpsc::sync_channel::<PathBuf>(HANDOFF_CAPACITY);
    let walk_root = root.to_path_buf();
    let walker = thread::spawn(move || walk_files(&walk_root, &tx));

    let mut catalog = Catalog::new();
    for path in rx {
        let meta = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not stat file");
                continue;
            }
        };
        if meta.is_dir() {
            continue;
        }

        match is_binary_file(&path) {
            Ok(true) => {
                debug!(path = %path.display(), "skipping binary file");
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not check if file is binary");
                continue;
            }
        }

        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        catalog.insert(relative_key(rel), meta.len());
    }

    if walker.join().is_err() {
        return Err(Error::Walk { path: root.to_path_buf(), reason: "walker thread panicked".into() });
    }

    Ok(catalog)
}

/// Producer side: sends every file path under `root` until the receiver hangs up.
fn walk_files(root: &Path, tx: &mpsc::SyncSender<PathBuf>) {
    let walk = WalkBuilder::new(root)
        .hidden(false)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    for result in walk {
        match result {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    continue;
                }
                if tx.send(entry.into_path()).is_err() {
                    return;
                }
            }
            Err(e) => warn!(error = %e, "walk error"),
        }
    }
}

/// Relative path joined with `/` regardless of platform.
fn relative_key(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
