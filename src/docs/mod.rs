//! Documentation generation with a metadata-keyed cache.
//!
//! Layout of a docs directory:
//!
//! ```text
//! 01_overview.md  02_getting_started.md  03_usage.md  full.md  metadata.json
//! ```
//!
//! `metadata.json` is the cache key. If it exists and parses, the sections on
//! disk are reused as-is. The commit hash inside it is *not* compared with the
//! working copy, so a stale cache is served until the file is removed.

pub mod metadata;
pub mod prompts;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::ports::llm::CompletionRequest;

pub use metadata::RunMetadata;
pub use prompts::{build_deduplicate_prompt, build_section_prompt, Section};

/// Concatenated document file name.
pub const FULL_DOC_FILE_NAME: &str = "full.md";

/// Cache metadata file name.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// The three sections plus their concatenation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedDocument {
    sections: BTreeMap<&'static str, String>,
    full: String,
}

impl GeneratedDocument {
    /// Content of one section, if present.
    #[must_use]
    pub fn section(&self, section: Section) -> Option<&str> {
        self.sections.get(section.file_name()).map(String::as_str)
    }

    /// Sections concatenated in [`Section::ALL`] order.
    #[must_use]
    pub fn full(&self) -> &str {
        &self.full
    }

    fn insert(&mut self, section: Section, content: String) {
        self.sections.insert(section.file_name(), content);
    }

    /// Rebuilds `full` from the sections, each followed by a blank line.
    fn concatenate(&mut self) {
        let mut full = String::new();
        for section in Section::ALL {
            if let Some(content) = self.sections.get(section.file_name()) {
                full.push_str(content);
                full.push_str("\n\n");
            }
        }
        self.full = full;
    }
}

/// Which path [`DocGenerator::load_or_generate`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Valid metadata was found and the sections were read back.
    Cached,
    /// All sections were generated by the model.
    Generated,
}

/// Generates, caches and deduplicates the documentation for one snapshot.
pub struct DocGenerator<'a> {
    ctx: &'a ServiceContext,
    docs_dir: PathBuf,
    model: String,
    meta: Option<RunMetadata>,
    document: GeneratedDocument,
    sink: Box<dyn FnMut(&str) + 'a>,
}

impl<'a> DocGenerator<'a> {
    /// Creates a generator writing into `docs_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be created.
    pub fn new(ctx: &'a ServiceContext, docs_dir: impl Into<PathBuf>, model: impl Into<String>) -> Result<Self> {
        let docs_dir = docs_dir.into();
        ctx.fs
            .create_dir_all(&docs_dir)
            .map_err(|e| Error::io("failed to create docs directory", &docs_dir, e))?;
        Ok(Self {
            ctx,
            docs_dir,
            model: model.into(),
            meta: None,
            document: GeneratedDocument::default(),
            sink: Box::new(|_: &str| {}),
        })
    }

    /// Sends streamed model output to `sink` (for progress display).
    #[must_use]
    pub fn with_sink(mut self, sink: impl FnMut(&str) + 'a) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Directory holding the generated files.
    #[must_use]
    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    /// Metadata of the current run, once loaded or generated.
    #[must_use]
    pub fn metadata(&self) -> Option<&RunMetadata> {
        self.meta.as_ref()
    }

    /// Sections held in memory after the last load or generation.
    #[must_use]
    pub fn document(&self) -> &GeneratedDocument {
        &self.document
    }

    /// Reuses cached docs when `metadata.json` is valid, otherwise generates
    /// all sections from `files` (path → content).
    ///
    /// # Errors
    ///
    /// Any file or model failure aborts with the corresponding [`Error`].
    pub fn load_or_generate(
        &mut self,
        files: &BTreeMap<String, String>,
        commit_hash: &str,
    ) -> Result<GenerationOutcome> {
        if let Some(meta) = self.read_cached_metadata() {
            info!("using cached documentation");
            self.meta = Some(meta);
            self.load_from_cache()?;
            return Ok(GenerationOutcome::Cached);
        }

        self.meta = Some(RunMetadata::new(commit_hash, self.ctx.clock.now(), &self.model));
        self.generate(files)?;
        self.save_metadata()?;
        Ok(GenerationOutcome::Generated)
    }

    /// Merges the concatenated sections into one document via the model.
    ///
    /// Does nothing when the metadata already records a merge.
    ///
    /// # Errors
    ///
    /// Returns an error if `full.md` cannot be read or written, or the model
    /// call fails.
    pub fn cleanup_duplicates(&mut self) -> Result<()> {
        let meta = self.meta.as_ref().ok_or_else(|| {
            Error::io("no metadata loaded for", self.metadata_path(), "run load_or_generate first".into())
        })?;
        if meta.deduplicated {
            info!("documentation already deduplicated, skipping cleanup pass");
            return Ok(());
        }

        let full_path = self.docs_dir.join(FULL_DOC_FILE_NAME);
        let content = self
            .ctx
            .fs
            .read_to_string(&full_path)
            .map_err(|e| Error::io("failed to read full documentation", &full_path, e))?;

        info!("performing final cleanup pass to remove duplicates");
        let request = CompletionRequest::new(&self.model, build_deduplicate_prompt(&content));
        let cleaned = self
            .ctx
            .llm
            .complete_streaming(&request, &mut *self.sink)
            .map_err(|e| Error::generation("clean documentation", e))?;

        self.ctx
            .fs
            .write(&full_path, &cleaned.text)
            .map_err(|e| Error::io("failed to write cleaned documentation", &full_path, e))?;

        if let Some(meta) = self.meta.as_mut() {
            meta.deduplicated = true;
        }
        self.save_metadata()
    }

    /// Current contents of `full.md` on disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn full_document(&self) -> Result<String> {
        let path = self.docs_dir.join(FULL_DOC_FILE_NAME);
        self.ctx.fs.read_to_string(&path).map_err(|e| Error::io("failed to read", &path, e))
    }

    fn metadata_path(&self) -> PathBuf {
        self.docs_dir.join(METADATA_FILE_NAME)
    }

    /// Valid cache means: the metadata file exists and parses.
    fn read_cached_metadata(&self) -> Option<RunMetadata> {
        let path = self.metadata_path();
        if !self.ctx.fs.exists(&path) {
            return None;
        }
        let raw = self.ctx.fs.read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(meta) => Some(meta),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring unparsable metadata");
                None
            }
        }
    }

    fn generate(&mut self, files: &BTreeMap<String, String>) -> Result<()> {
        for section in Section::ALL {
            info!(section = section.file_name(), "generating section");
            let request = CompletionRequest::new(&self.model, build_section_prompt(section, files));
            let response = self
                .ctx
                .llm
                .complete_streaming(&request, &mut *self.sink)
                .map_err(|e| Error::generation(format!("generate section {}", section.file_name()), e))?;

            let path = self.docs_dir.join(section.file_name());
            self.ctx
                .fs
                .write(&path, &response.text)
                .map_err(|e| Error::io("failed to write section", &path, e))?;
            self.document.insert(section, response.text);
        }

        self.document.concatenate();
        let full_path = self.docs_dir.join(FULL_DOC_FILE_NAME);
        self.ctx
            .fs
            .write(&full_path, self.document.full())
            .map_err(|e| Error::io("failed to write", &full_path, e))
    }

    fn load_from_cache(&mut self) -> Result<()> {
        for section in Section::ALL {
            let path = self.docs_dir.join(section.file_name());
            let content = self
                .ctx
                .fs
                .read_to_string(&path)
                .map_err(|e| Error::io("failed to read cached section", &path, e))?;
            self.document.insert(section, content);
        }
        self.document.concatenate();

        if let Some(meta) = &self.meta {
            info!(
                model = %meta.model_used,
                commit = %meta.commit_hash,
                generated_at = %meta.generated_at.to_rfc3339(),
                "documentation loaded from cache"
            );
        }
        Ok(())
    }

    fn save_metadata(&self) -> Result<()> {
        let Some(meta) = &self.meta else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(meta)?;
        let path = self.metadata_path();
        self.ctx.fs.write(&path, &json).map_err(|e| Error::io("failed to write metadata", &path, e))
    }
}
