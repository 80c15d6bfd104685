//! Port traits for the external systems the pipeline talks to.
//!
//! The documentation pipeline only sees these traits. Live, recording and
//! replaying implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod git;
pub mod llm;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use git::GitRepo;
pub use llm::{CompletionRequest, CompletionResponse, LlmClient};

/// Error type returned across port boundaries.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;
