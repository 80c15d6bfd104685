//! Documentation sections and the prompts that produce them.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::Error;

/// One independently generated piece of the documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    /// What the project is and how it is built.
    Overview,
    /// Prerequisites, installation and a first example.
    GettingStarted,
    /// Use cases, API and configuration.
    Usage,
}

impl Section {
    /// Generation and concatenation order.
    pub const ALL: [Section; 3] = [Section::Overview, Section::GettingStarted, Section::Usage];

    /// File name inside the docs directory.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Section::Overview => "01_overview.md",
            Section::GettingStarted => "02_getting_started.md",
            Section::Usage => "03_usage.md",
        }
    }

    /// Short name used on the command line and in logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Section::Overview => "overview",
            Section::GettingStarted => "getting-started",
            Section::Usage => "usage",
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            Section::Overview => OVERVIEW_INSTRUCTIONS,
            Section::GettingStarted => GETTING_STARTED_INSTRUCTIONS,
            Section::Usage => USAGE_INSTRUCTIONS,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Section {
    type Err = Error;

    /// Accepts either the short name or the file name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.name() == s || section.file_name() == s)
            .ok_or_else(|| Error::UnknownSection(s.to_string()))
    }
}

const OVERVIEW_INSTRUCTIONS: &str = "\
You are analyzing a software repository to create comprehensive documentation.
Based on the repository files provided below, create a detailed overview document in markdown format that includes:

1. A clear description of what the project does
2. Key features and capabilities
3. High-level architecture/design
4. Technologies used and dependencies
5. Project status (based on what you can determine from the code)

Please ensure the output is well-formatted markdown with appropriate headers and sections.
Use code examples from the files where relevant.";

const GETTING_STARTED_INSTRUCTIONS: &str = "\
Based on the repository files provided below, create a comprehensive \"Getting Started\" guide in markdown format that includes:

1. Prerequisites and system requirements
2. Installation instructions (step by step)
3. Basic setup and configuration
4. A simple \"Hello World\" or basic usage example
5. Common gotchas or important notes for new users

Format the output as clear, well-structured markdown with appropriate sections and code blocks.
Use actual examples from the codebase where possible.";

const USAGE_INSTRUCTIONS: &str = "\
Based on the repository files provided below, create a detailed usage guide in markdown format that includes:

1. Common use cases and examples
2. API documentation (if applicable)
3. Configuration options and their effects
4. Best practices and recommendations
5. Advanced usage examples

Use actual code examples from the repository where possible.
Format the output as clear, well-structured markdown with appropriate sections and code blocks.";

/// Instructions for the final merge of the concatenated sections.
const DEDUPLICATE_INSTRUCTIONS: &str = "\
You are cleaning up a combined markdown documentation file.
The content is currently duplicated across Overview, Getting Started, and Usage sections.

Please:
1. Keep only ONE top-level title
2. Consolidate similar sections (e.g. combine all installation instructions into one section)
3. Remove duplicate explanations while keeping the most detailed version
4. Maintain a clear, logical flow from overview -> setup -> basic usage -> advanced usage
5. Preserve ALL unique examples, especially in the advanced usage section
6. Keep ALL technical information and details
7. Ensure section headers follow a logical hierarchy

Original sections to combine:
1. Overview & Features (#)
2. Getting Started (##)
3. Usage Guide (##)

Please output a single, well-structured markdown document with no duplicate information.
Keep the most comprehensive version of any duplicated content.

Content to clean up:
";

/// Builds the prompt for `section` over the given path → content map.
#[must_use]
pub fn build_section_prompt(section: Section, files: &BTreeMap<String, String>) -> String {
    format!(
        "{}\n\nRepository files:\n{}\n\nContents:\n{}",
        section.instructions(),
        format_file_list(files),
        format_file_contents(files),
    )
}

/// Builds the merge prompt for an already concatenated document.
#[must_use]
pub fn build_deduplicate_prompt(full_document: &str) -> String {
    format!("{DEDUPLICATE_INSTRUCTIONS}{full_document}")
}

/// Sorted paths, one per line.
fn format_file_list(files: &BTreeMap<String, String>) -> String {
    files.keys().map(String::as_str).collect::<Vec<_>>().join("\n")
}

/// Sorted contents, each introduced by an `=== path ===` line.
fn format_file_contents(files: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (path, content) in files {
        let _ = write!(out, "\n=== {path} ===\n{content}\n");
    }
    out
}
