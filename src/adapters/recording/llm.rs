//! Recording adapter for the `LlmClient` port.

use std::sync::{Arc, Mutex};

use serde_json::json;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmClient};
use crate::ports::PortError;

/// Records model calls while delegating to an inner implementation.
///
/// Prompts embed whole repositories, so only their size is recorded.
/// Streaming calls are recorded as `complete` so a replay can serve them.
pub struct RecordingLlmClient {
    inner: Box<dyn LlmClient>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingLlmClient {
    /// Wraps `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn LlmClient>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }

    fn record(&self, request: &CompletionRequest, result: &Result<CompletionResponse, PortError>) {
        let input = json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "prompt_bytes": request.prompt.len(),
        });
        record_result(&self.recorder, "llm", "complete", &input, result);
    }
}

impl LlmClient for RecordingLlmClient {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, PortError> {
        let result = self.inner.complete(request);
        self.record(request, &result);
        result
    }

    fn complete_streaming(
        &self,
        request: &CompletionRequest,
        sink: &mut dyn FnMut(&str),
    ) -> Result<CompletionResponse, PortError> {
        let result = self.inner.complete_streaming(request, sink);
        self.record(request, &result);
        result
    }
}
