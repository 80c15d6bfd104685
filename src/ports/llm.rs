//! Text-generation port.

use serde::{Deserialize, Serialize};

use super::PortError;

/// Default output cap for a single generation call.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A request to generate text from a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model identifier (e.g. `"claude-3-5-sonnet-20241022"`).
    pub model: String,
    /// The prompt sent as a single user message.
    pub prompt: String,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl CompletionRequest {
    /// Builds a request with the default token cap and temperature.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// The response from a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text.
    pub text: String,
    /// Number of prompt tokens consumed.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Number of completion tokens generated.
    #[serde(default)]
    pub completion_tokens: u32,
}

/// Sends prompts to a language model. Calls block until the model is done.
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (network, auth, rate-limit, etc.).
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, PortError>;

    /// Like [`complete`](Self::complete), but hands partial output to `sink`
    /// as it arrives. The sink is for display only.
    ///
    /// The default emits the whole text once after `complete` returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn complete_streaming(
        &self,
        request: &CompletionRequest,
        sink: &mut dyn FnMut(&str),
    ) -> Result<CompletionResponse, PortError> {
        let response = self.complete(request)?;
        sink(&response.text);
        Ok(response)
    }
}
