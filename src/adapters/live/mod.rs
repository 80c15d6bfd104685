//! Live adapters that talk to the real clock, disk, `git` and Anthropic API.

pub mod clock;
pub mod filesystem;
pub mod git;
pub mod llm;
