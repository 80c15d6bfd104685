//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::git::LiveGitRepo;
use crate::adapters::live::llm::LiveLlmClient;
use crate::adapters::recording::{RecordingClock, RecordingGitRepo, RecordingLlmClient};
use crate::adapters::replaying::{ReplayingClock, ReplayingGitRepo, ReplayingLlmClient};
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::git::GitRepo;
use crate::ports::llm::LlmClient;

/// Bundles all port trait objects into a single context.
///
/// Constructors wire up different adapter sets (live, recording, replaying).
pub struct ServiceContext {
    /// Clock for timestamping metadata.
    pub clock: Box<dyn Clock>,
    /// Filesystem for the docs directory.
    pub fs: Box<dyn FileSystem>,
    /// Source control for cloning and commit lookup.
    pub git: Box<dyn GitRepo>,
    /// Text generation.
    pub llm: Box<dyn LlmClient>,
    /// Shared recorder, written to disk when the context is dropped.
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Assembles a context from explicit adapters.
    #[must_use]
    pub fn new(
        clock: Box<dyn Clock>,
        fs: Box<dyn FileSystem>,
        git: Box<dyn GitRepo>,
        llm: Box<dyn LlmClient>,
    ) -> Self {
        Self { clock, fs, git, llm, recorder: None }
    }

    /// Real clock, disk, `git` CLI and Anthropic API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client's runtime cannot be started.
    pub fn live(config: &Config) -> Result<Self, String> {
        let llm = LiveLlmClient::new(config.api_key.clone())
            .map_err(|e| format!("failed to create Anthropic client: {e}"))?;
        Ok(Self::new(Box::new(LiveClock), Box::new(LiveFileSystem), Box::new(LiveGitRepo), Box::new(llm)))
    }

    /// Live adapters whose clock, git and model calls are recorded to `path`.
    ///
    /// The cassette is written when the context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client's runtime cannot be started.
    pub fn recording(config: &Config, path: &Path, name: &str) -> Result<Self, String> {
        let llm = LiveLlmClient::new(config.api_key.clone())
            .map_err(|e| format!("failed to create Anthropic client: {e}"))?;
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, name, "unknown")));
        Ok(Self {
            clock: Box::new(RecordingClock::new(Box::new(LiveClock), Arc::clone(&recorder))),
            fs: Box::new(LiveFileSystem),
            git: Box::new(RecordingGitRepo::new(Box::new(LiveGitRepo), Arc::clone(&recorder))),
            llm: Box::new(RecordingLlmClient::new(Box::new(llm), Arc::clone(&recorder))),
            recorder: Some(recorder),
        })
    }

    /// Clock, git and model answers served from the cassette at `path`.
    ///
    /// The filesystem stays live: the scanner needs a real working copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;

        // Each port gets its own replayer so cursors are independent.
        Ok(Self::new(
            Box::new(ReplayingClock::new(CassetteReplayer::new(&cassette))),
            Box::new(LiveFileSystem),
            Box::new(ReplayingGitRepo::new(CassetteReplayer::new(&cassette))),
            Box::new(ReplayingLlmClient::new(CassetteReplayer::new(&cassette))),
        ))
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        // Adapters hold the other references; release them first.
        self.clock = Box::new(LiveClock);
        self.git = Box::new(LiveGitRepo);
        self.llm = Box::new(NullLlmClient);

        let recorder = match Arc::try_unwrap(recorder) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner),
            Err(_) => {
                warn!("cassette recorder still shared, not written");
                return;
            }
        };
        match recorder.finish() {
            Ok(path) => info!(path = %path.display(), "recording saved"),
            Err(e) => warn!(error = %e, "failed to write cassette"),
        }
    }
}

/// Placeholder swapped in while a recording context is torn down.
struct NullLlmClient;

impl LlmClient for NullLlmClient {
    fn complete(
        &self,
        _request: &crate::ports::llm::CompletionRequest,
    ) -> Result<crate::ports::llm::CompletionResponse, crate::ports::PortError> {
        Err("LLM client already shut down".into())
    }
}
