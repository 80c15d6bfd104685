//! Replaying adapter for the `LlmClient` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmClient};
use crate::ports::PortError;

/// Serves recorded completions, one per call, regardless of the prompt.
pub struct ReplayingLlmClient {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingLlmClient {
    /// Create a replaying LLM client backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl LlmClient for ReplayingLlmClient {
    fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, PortError> {
        replay_result(next_output(&self.replayer, "llm", "complete"), "llm::complete")
    }
}
