//! Live adapter for the `LlmClient` port using the Anthropic messages API.
//!
//! The port is blocking, so the adapter owns a current-thread tokio runtime
//! and drives `reqwest` on it.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::runtime::{Builder, Runtime};

use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmClient};
use crate::ports::PortError;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Live LLM client that calls the Anthropic Claude API.
pub struct LiveLlmClient {
    client: Client,
    runtime: Runtime,
    api_key: String,
}

impl LiveLlmClient {
    /// Creates a client authenticating with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the async runtime cannot be started.
    pub fn new(api_key: impl Into<String>) -> Result<Self, PortError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { client: Client::new(), runtime, api_key: api_key.into() })
    }

    /// Sends the request and returns the response once its status is known good.
    async fn send(&self, request: &CompletionRequest, stream: bool) -> Result<reqwest::Response, PortError> {
        let body = AnthropicRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream,
            messages: vec![AnthropicMessage { role: "user", content: &request.prompt }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| -> PortError { format!("Anthropic API request failed: {e}").into() })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let response_text = response.text().await.unwrap_or_default();
        let msg = serde_json::from_str::<AnthropicError>(&response_text)
            .map(|e| e.error.message)
            .unwrap_or(response_text);
        Err(format!("Anthropic API error ({}): {msg}", status.as_u16()).into())
    }
}

/// Request body sent to the Anthropic messages API.
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
    messages: Vec<AnthropicMessage<'a>>,
}

/// A single message in the Anthropic API request.
#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Top-level (non-streaming) response from the Anthropic messages API.
#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

/// A content block in the Anthropic response.
#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Token usage reported by the Anthropic API.
#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Error response from the Anthropic API.
#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

/// Detail inside an Anthropic error response.
#[derive(Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

/// One server-sent event of a streaming response.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    MessageStart { message: StreamMessage },
    ContentBlockDelta { delta: Delta },
    MessageDelta { usage: Usage },
    Error { error: AnthropicErrorDetail },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct StreamMessage {
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

/// Splits a byte stream into the `data:` payloads of server-sent events.
#[derive(Default)]
struct SseDecoder {
    pending: Vec<u8>,
}

impl SseDecoder {
    /// Feeds a chunk and returns the data payloads of every line it completed.
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}

/// Folds one streamed event into `out`, forwarding text to `sink`.
fn apply_event(
    payload: &str,
    out: &mut CompletionResponse,
    sink: &mut dyn FnMut(&str),
) -> Result<(), PortError> {
    let event: StreamEvent = serde_json::from_str(payload)
        .map_err(|e| -> PortError { format!("Failed to parse Anthropic stream event: {e}").into() })?;
    match event {
        StreamEvent::MessageStart { message } => out.prompt_tokens = message.usage.input_tokens,
        StreamEvent::ContentBlockDelta { delta: Delta::TextDelta { text } } => {
            sink(&text);
            out.text.push_str(&text);
        }
        StreamEvent::MessageDelta { usage } => out.completion_tokens = usage.output_tokens,
        StreamEvent::Error { error } => {
            return Err(format!("Anthropic stream error: {}", error.message).into());
        }
        StreamEvent::ContentBlockDelta { delta: Delta::Other } | StreamEvent::Other => {}
    }
    Ok(())
}

impl LlmClient for LiveLlmClient {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, PortError> {
        self.runtime.block_on(async {
            let response = self.send(request, false).await?;
            let response_text = response
                .text()
                .await
                .map_err(|e| -> PortError { format!("Failed to read Anthropic API response: {e}").into() })?;

            let api_response: AnthropicResponse = serde_json::from_str(&response_text)
                .map_err(|e| -> PortError { format!("Failed to parse Anthropic API response: {e}").into() })?;

            Ok::<_, PortError>(CompletionResponse {
                text: api_response.content.into_iter().map(|block| block.text).collect(),
                prompt_tokens: api_response.usage.input_tokens,
                completion_tokens: api_response.usage.output_tokens,
            })
        })
    }

    fn complete_streaming(
        &self,
        request: &CompletionRequest,
        sink: &mut dyn FnMut(&str),
    ) -> Result<CompletionResponse, PortError> {
        self.runtime.block_on(async {
            let mut response = self.send(request, true).await?;
            let mut decoder = SseDecoder::default();
            let mut out = CompletionResponse { text: String::new(), prompt_tokens: 0, completion_tokens: 0 };

            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| -> PortError { format!("Anthropic stream interrupted: {e}").into() })?
            {
                for payload in decoder.push(&chunk) {
                    apply_event(&payload, &mut out, sink)?;
                }
            }
            Ok::<_, PortError>(out)
        })
    }
}
