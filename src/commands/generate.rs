//! The documentation pipeline: fetch, scan, select, generate, merge.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::docs::{DocGenerator, GenerationOutcome, Section};
use crate::error::{Error, Result};
use crate::repo::RepoSpec;
use crate::scan::scan_repository;
use crate::select::select_files;

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Directory holding the generated files.
    pub docs_dir: PathBuf,
    /// Tag or `latest`.
    pub version: String,
    /// Model recorded in the metadata.
    pub model: String,
    /// Generation timestamp recorded in the metadata.
    pub generated_at: DateTime<Utc>,
    /// Whether the sections came from the cache.
    pub outcome: GenerationOutcome,
    /// Merged document from `full.md`.
    pub full: String,
    /// Individual sections as generated or read back.
    pub sections: BTreeMap<Section, String>,
}

/// Runs the pipeline and prints the result, streaming model output to stdout.
///
/// With `section` set only that section is printed; the merge pass still runs.
///
/// # Errors
///
/// Returns the first pipeline [`Error`].
pub fn run(ctx: &ServiceContext, config: &Config, spec: &RepoSpec, section: Option<Section>) -> Result<()> {
    let report = document_repository(ctx, config, spec, stream_to_stdout)?;

    let body = match section {
        Some(section) => report.sections.get(&section).map(String::as_str).unwrap_or_default(),
        None => report.full.as_str(),
    };

    println!();
    println!("=== Generated Documentation ===");
    println!("Location: {}", report.docs_dir.display());
    println!("Version: {}", report.version);
    println!("Model: {}", report.model);
    println!("Generated: {}", report.generated_at.to_rfc3339());
    println!();
    println!("{body}");
    Ok(())
}

/// Fetches `spec` into the cache and produces its documentation.
///
/// Model output is passed to `stream` as it arrives.
///
/// # Errors
///
/// Returns [`Error::Clone`] or [`Error::Commit`] for working-copy failures and
/// whatever the scan, selection and generation stages report.
pub fn document_repository(
    ctx: &ServiceContext,
    config: &Config,
    spec: &RepoSpec,
    mut stream: fn(&str),
) -> Result<Report> {
    let src_dir = spec.src_dir(&config.home);
    let docs_dir = spec.docs_dir(&config.home);

    info!(repo = %spec, version = spec.version(), "fetching repository");
    ctx.git
        .fetch(spec, &src_dir)
        .map_err(|source| Error::Clone { repo: spec.to_string(), source })?;
    let commit = ctx.git.current_commit(&src_dir).map_err(Error::Commit)?;
    info!(commit = %commit, "working copy ready");

    let mut catalog = scan_repository(&src_dir)?;
    info!(files = catalog.len(), total = catalog.total_size(), "scanned repository");

    let selection = select_files(&catalog, config.max_context_size, ctx.llm.as_ref(), &config.model, &mut stream)?;
    catalog.read_contents(&src_dir, &selection.paths)?;
    let files = catalog.contents_of(&selection.paths);

    let mut generator = DocGenerator::new(ctx, &docs_dir, &config.model)?.with_sink(stream);
    let outcome = generator.load_or_generate(&files, &commit)?;
    generator.cleanup_duplicates()?;
    let full = generator.full_document()?;

    let sections = Section::ALL
        .into_iter()
        .filter_map(|s| generator.document().section(s).map(|c| (s, c.to_string())))
        .collect();
    let meta = generator
        .metadata()
        .ok_or_else(|| Error::io("no metadata after generation in", &docs_dir, "metadata missing".into()))?;

    info!(docs = %docs_dir.display(), ?outcome, "documentation ready");
    Ok(Report {
        docs_dir: docs_dir.clone(),
        version: spec.version().to_string(),
        model: meta.model_used.clone(),
        generated_at: meta.generated_at,
        outcome,
        full,
        sections,
    })
}

fn stream_to_stdout(chunk: &str) {
    let mut out = io::stdout().lock();
    let _ = out.write_all(chunk.as_bytes());
    let _ = out.flush();
}
