//! Budgeted file selection.
//!
//! When the whole catalog fits the byte budget every file is kept. Otherwise
//! the model ranks the files and [`accept_prioritized`] walks its answer,
//! keeping whatever still fits.

use std::collections::HashSet;
use std::fmt::Write as _;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::ports::llm::{CompletionRequest, LlmClient};
use crate::scan::Catalog;

/// Files chosen for a documentation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    /// Selected paths, in priority order.
    pub paths: Vec<String>,
    /// Sum of the selected files' sizes. Never above the budget.
    pub total_size: u64,
}

/// Picks files from `catalog` whose combined size fits `budget`.
///
/// Only calls `llm` when the catalog is over budget. Streamed model output is
/// passed to `sink`.
///
/// # Errors
///
/// Returns [`Error::Generation`] if the model call fails and
/// [`Error::NoFilesSelected`] if nothing in its answer fits.
pub fn select_files(
    catalog: &Catalog,
    budget: u64,
    llm: &dyn LlmClient,
    model: &str,
    sink: &mut dyn FnMut(&str),
) -> Result<SelectionResult> {
    let total = catalog.total_size();
    if total <= budget {
        info!(total, budget, "total size is under limit, including all files");
        return Ok(SelectionResult {
            paths: catalog.iter().map(|e| e.path.clone()).collect(),
            total_size: total,
        });
    }

    info!(total, budget, "total size exceeds limit, asking the model to select files");
    let request = CompletionRequest::new(model, build_selection_prompt(catalog, budget));
    let response = llm
        .complete_streaming(&request, sink)
        .map_err(|e| Error::generation("get file selection", e))?;

    let selection = accept_prioritized(&response.text, catalog, budget)?;
    #[allow(clippy::cast_precision_loss)]
    let percent = selection.total_size as f64 / budget as f64 * 100.0;
    info!(
        files = selection.paths.len(),
        total = selection.total_size,
        "selected {percent:.2}% of limit"
    );
    Ok(selection)
}

/// Greedily accepts paths from a model response, in response order.
///
/// Each line is trimmed. A line that is not itself a catalog path loses a
/// trailing ` (...)` size annotation.
/// Blank lines, unknown paths and repeats are skipped; so is any file that
/// would push the running total past `budget`.
///
/// # Errors
///
/// Returns [`Error::NoFilesSelected`] if no path is accepted.
pub fn accept_prioritized(response: &str, catalog: &Catalog, budget: u64) -> Result<SelectionResult> {
    let mut paths = Vec::new();
    let mut seen = HashSet::new();
    let mut total = 0u64;

    for line in response.lines() {
        let line = line.trim();
        let candidate = if catalog.get(line).is_some() { line } else { strip_annotation(line) };
        if candidate.is_empty() {
            continue;
        }

        let Some(entry) = catalog.get(candidate) else {
            warn!(path = candidate, "file not found in catalog");
            continue;
        };
        if !seen.insert(candidate) {
            debug!(path = candidate, "already selected");
            continue;
        }
        if total + entry.size > budget {
            info!(path = candidate, size = entry.size, "skipping: would exceed size limit");
            continue;
        }

        total += entry.size;
        paths.push(candidate.to_string());
        debug!(path = candidate, size = entry.size, "selected");
    }

    if paths.is_empty() {
        return Err(Error::NoFilesSelected);
    }
    Ok(SelectionResult { paths, total_size: total })
}

/// Cuts a trailing `" (1234 bytes)"` echoed back from the manifest.
fn strip_annotation(line: &str) -> &str {
    if !line.ends_with(')') {
        return line;
    }
    match line.rfind(" (") {
        Some(idx) => line[..idx].trim_end(),
        None => line,
    }
}

/// Lists every catalog entry with its size plus the overall total.
#[must_use]
pub fn build_manifest(catalog: &Catalog) -> String {
    let mut out = format!("Total size: {} bytes\n\nFiles:\n", catalog.total_size());
    for entry in catalog.iter() {
        let _ = writeln!(out, "{} ({} bytes)", entry.path, entry.size);
    }
    out
}

/// Prompt asking the model for a prioritized, budget-respecting file list.
#[must_use]
pub fn build_selection_prompt(catalog: &Catalog, budget: u64) -> String {
    format!(
        "You are helping select the most important files from a repository to analyze, \
with a maximum total size of {budget} bytes.
Current repository structure:

{manifest}
Please select the most important files to include in the analysis. Prioritize:
1. Documentation files (*.md, docs/*, etc.)
2. Key configuration files (Cargo.toml, go.mod, package.json, etc.)
3. Main source files that demonstrate the core functionality
4. README and LICENSE files

Ignore:
1. Binary files
2. Test files (unless they serve as good examples)
3. Build artifacts
4. Dependency directories (node_modules, vendor, etc.)

Format your response as a simple list of file paths, one per line.
Ensure the total size of selected files stays under {budget} bytes.
Reply ONLY with the list of files, in order of priority, nothing else.",
        manifest = build_manifest(catalog),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ports::{CompletionResponse, PortError};

    /// Answers every call with the same text and counts calls.
    struct CannedLlm {
        text: String,
        calls: AtomicUsize,
    }

    impl CannedLlm {
        fn new(text: &str) -> Self {
            Self { text: text.to_string(), calls: AtomicUsize::new(0) }
        }
    }

    impl LlmClient for CannedLlm {
        fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CompletionResponse { text: self.text.clone(), prompt_tokens: 0, completion_tokens: 0 })
        }
    }

    /// Catalog after the scanner dropped `b.bin`.
    fn scenario_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert("a.txt", 100);
        catalog.insert("c.txt", 150);
        catalog
    }

    #[test]
    fn under_budget_returns_everything_without_calling_model() {
        let catalog = scenario_catalog();
        let llm = CannedLlm::new("unused");
        let result = select_files(&catalog, 250, &llm, "m", &mut |_: &str| {}).unwrap();

        assert_eq!(result.paths, vec!["a.txt", "c.txt"]);
        assert_eq!(result.total_size, 250);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn over_budget_skips_file_that_would_overflow() {
        let catalog = scenario_catalog();
        let llm = CannedLlm::new("c.txt\na.txt");
        let mut streamed = String::new();
        let result = select_files(&catalog, 200, &llm, "m", &mut |chunk: &str| streamed.push_str(chunk)).unwrap();

        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.paths, vec!["c.txt"]);
        assert_eq!(result.total_size, 150);
        assert_eq!(streamed, "c.txt\na.txt");
    }

    #[test]
    fn later_smaller_file_still_fits_after_skip() {
        let mut catalog = Catalog::new();
        catalog.insert("big.md", 150);
        catalog.insert("huge.rs", 100);
        catalog.insert("tiny.toml", 40);

        let result = accept_prioritized("big.md\nhuge.rs\ntiny.toml\n", &catalog, 200).unwrap();
        assert_eq!(result.paths, vec!["big.md", "tiny.toml"]);
        assert_eq!(result.total_size, 190);
    }

    #[test]
    fn parsing_tolerates_annotations_blanks_and_unknowns() {
        let catalog = scenario_catalog();
        let response = "\n  a.txt (100 bytes)  \n\nghost.rs\nc.txt(oops)\n";

        let result = accept_prioritized(response, &catalog, 1_000).unwrap();
        assert_eq!(result.paths, vec!["a.txt"]);
        assert_eq!(result.total_size, 100);
    }

    #[test]
    fn parenthesized_names_are_kept_whole() {
        let mut catalog = Catalog::new();
        catalog.insert("docs/Guide (draft).md", 30);
        catalog.insert("notes (old)/todo.txt", 20);

        let response = "docs/Guide (draft).md\ndocs/Guide (draft).md (30 bytes)\nnotes (old)/todo.txt (20 bytes)\n";
        let result = accept_prioritized(response, &catalog, 1_000).unwrap();
        assert_eq!(result.paths, vec!["docs/Guide (draft).md", "notes (old)/todo.txt"]);
        assert_eq!(result.total_size, 50);
    }

    #[test]
    fn repeated_paths_count_once() {
        let catalog = scenario_catalog();
        let result = accept_prioritized("a.txt\na.txt\nc.txt", &catalog, 1_000).unwrap();
        assert_eq!(result.paths, vec!["a.txt", "c.txt"]);
        assert_eq!(result.total_size, 250);
    }

    #[test]
    fn nothing_accepted_is_an_error() {
        let catalog = scenario_catalog();
        let err = accept_prioritized("README.md\nsrc/lib.rs", &catalog, 1_000).unwrap_err();
        assert!(matches!(err, Error::NoFilesSelected));

        let err = accept_prioritized("c.txt", &catalog, 120).unwrap_err();
        assert!(matches!(err, Error::NoFilesSelected));
    }

    #[test]
    fn selection_never_exceeds_budget_and_only_names_catalog_paths() {
        let mut catalog = Catalog::new();
        for (i, size) in [10u64, 70, 30, 90, 50, 20, 60].iter().enumerate() {
            catalog.insert(format!("f{i}.rs"), *size);
        }
        let responses = [
            "f3.rs\nf1.rs\nf4.rs\nf0.rs",
            "f6.rs\nnope\nf5.rs\nf2.rs\nf1.rs",
            "f0.rs (10 bytes)\nf1.rs (70 bytes)\nf2.rs\nf3.rs\nf4.rs\nf5.rs\nf6.rs",
        ];
        for budget in [15u64, 100, 150, 200] {
            for response in responses {
                if let Ok(result) = accept_prioritized(response, &catalog, budget) {
                    assert!(result.total_size <= budget);
                    let sum: u64 = result.paths.iter().map(|p| catalog.get(p).unwrap().size).sum();
                    assert_eq!(sum, result.total_size);
                }
            }
        }
    }

    #[test]
    fn model_failure_is_a_generation_error() {
        struct FailingLlm;
        impl LlmClient for FailingLlm {
            fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, PortError> {
                Err("overloaded".into())
            }
        }

        let err = select_files(&scenario_catalog(), 10, &FailingLlm, "m", &mut |_: &str| {}).unwrap_err();
        assert!(matches!(err, Error::Generation { .. }));
        assert!(err.to_string().contains("overloaded"));
    }

    #[test]
    fn prompt_lists_manifest_and_budget() {
        let prompt = build_selection_prompt(&scenario_catalog(), 200);
        assert!(prompt.contains("maximum total size of 200 bytes"));
        assert!(prompt.contains("Total size: 250 bytes"));
        assert!(prompt.contains("a.txt (100 bytes)"));
        assert!(prompt.contains("c.txt (150 bytes)"));
    }
}
