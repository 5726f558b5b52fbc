//! Scene-classification calls to hosted language models.
//!
//! The producer hands a rendered prompt to whichever model the deployment
//! points at and needs exactly one JSON object back: the observation
//! result the parser turns into world-state updates. Two wire dialects
//! are supported, each with its own way of forcing JSON output:
//!
//! - chat-completions endpoints (`OpenAI`, `DeepSeek`, Ollama) take a
//!   `response_format` hint in the request;
//! - the Anthropic Messages API has no such hint, so the request prefills
//!   the assistant turn with the opening brace and the reply is stitched
//!   back into a full object.
//!
//! Requests and replies are typed structs rather than ad-hoc JSON values,
//! so a malformed reply fails at deserialization with a useful error
//! instead of deep inside field navigation.

use serde::{Deserialize, Serialize};

use crate::error::VisionError;
use crate::prompt::RenderedPrompt;

/// Upper bound on the classification reply. One observation result is a
/// couple hundred tokens; anything longer is the model rambling.
const RESPONSE_TOKEN_BUDGET: u32 = 300;

/// Sampling temperature. High enough for inventive objectives and boss
/// names, low enough that the danger fields stay grounded.
const TEMPERATURE: f32 = 0.7;

/// Messages API version pin.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Assistant prefill that locks the Messages API into emitting JSON.
const JSON_PREFILL: &str = "{";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for one classification backend.
#[derive(Debug, Clone)]
pub struct LlmBackendConfig {
    /// Which wire dialect to speak.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier (e.g. `gpt-4o-mini`).
    pub model: String,
}

/// The wire dialect a backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Chat-completions dialect, shared by `OpenAI`, `DeepSeek`, and
    /// Ollama.
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

impl BackendType {
    /// Map a configuration string onto a dialect.
    ///
    /// Vendor aliases are accepted so the YAML can name the actual
    /// provider rather than the protocol.
    pub fn parse(value: &str) -> Result<Self, VisionError> {
        match value.to_lowercase().as_str() {
            "openai" | "deepseek" | "ollama" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(VisionError::Config(format!(
                "unknown backend type: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// A classification backend the pipeline can call.
///
/// Enum dispatch: async methods are not dyn-compatible, and there are
/// exactly two dialects to choose between anyway.
pub enum LlmBackend {
    /// Chat-completions dialect.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmBackend {
    /// Classify one scene: send the rendered prompt, return the model's
    /// raw JSON text for the parser.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::LlmBackend`] when the HTTP call fails, the
    /// endpoint answers with an error status, or the reply carries no
    /// usable text. The pipeline treats any of these as a failed cycle
    /// and falls back to the safe default.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, VisionError> {
        match self {
            Self::OpenAi(backend) => backend.complete(prompt).await,
            Self::Anthropic(backend) => backend.complete(prompt).await,
        }
    }

    /// Dialect name for log fields.
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }
}

/// Build a backend for the configured dialect.
pub fn create_backend(config: &LlmBackendConfig) -> LlmBackend {
    match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config)),
    }
}

// ---------------------------------------------------------------------------
// Shared wire pieces
// ---------------------------------------------------------------------------

/// One turn in either dialect's message list.
#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Convert a non-success response into an error carrying the body text.
async fn reject_error_status(
    response: reqwest::Response,
    dialect: &str,
) -> Result<reqwest::Response, VisionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<unreadable body>"));
    Err(VisionError::LlmBackend(format!(
        "{dialect} endpoint returned {status}: {detail}"
    )))
}

// ---------------------------------------------------------------------------
// Chat-completions dialect
// ---------------------------------------------------------------------------

/// Request body for `POST {base}/chat/completions`.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

/// The `response_format` hint that pins the reply to a JSON object.
#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: String,
}

impl ChatReply {
    /// The first choice's text, which should be the JSON object.
    fn into_content(self) -> Result<String, VisionError> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                VisionError::LlmBackend(String::from("chat reply carried no content"))
            })
    }
}

/// Backend speaking the chat-completions dialect.
pub struct OpenAiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Create a backend from connection settings.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, VisionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                WireMessage {
                    role: "system",
                    content: &prompt.system,
                },
                WireMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: RESPONSE_TOKEN_BUDGET,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                VisionError::LlmBackend(format!("chat completions call failed: {e}"))
            })?;

        let reply: ChatReply = reject_error_status(response, "chat completions")
            .await?
            .json()
            .await
            .map_err(|e| {
                VisionError::LlmBackend(format!("chat completions reply was not JSON: {e}"))
            })?;

        reply.into_content()
    }
}

// ---------------------------------------------------------------------------
// Anthropic Messages API
// ---------------------------------------------------------------------------

/// Request body for `POST {base}/messages`.
///
/// The second message is the assistant prefill: the reply continues from
/// the opening brace, so the stitched result is one JSON object.
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [WireMessage<'a>; 2],
}

#[derive(Deserialize)]
struct MessagesReply {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl MessagesReply {
    /// Reassemble the prefilled JSON object from the reply blocks.
    fn into_prefilled_json(self) -> Result<String, VisionError> {
        let tail: String = self.content.into_iter().map(|block| block.text).collect();
        if tail.is_empty() {
            return Err(VisionError::LlmBackend(String::from(
                "messages reply carried no text blocks",
            )));
        }
        Ok(format!("{JSON_PREFILL}{tail}"))
    }
}

/// Backend speaking the Anthropic Messages API.
pub struct AnthropicBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Create a backend from connection settings.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, VisionError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: RESPONSE_TOKEN_BUDGET,
            temperature: TEMPERATURE,
            system: &prompt.system,
            messages: [
                WireMessage {
                    role: "user",
                    content: &prompt.user,
                },
                WireMessage {
                    role: "assistant",
                    content: JSON_PREFILL,
                },
            ],
        };

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| VisionError::LlmBackend(format!("messages call failed: {e}")))?;

        let reply: MessagesReply = reject_error_status(response, "messages")
            .await?
            .json()
            .await
            .map_err(|e| {
                VisionError::LlmBackend(format!("messages reply was not JSON: {e}"))
            })?;

        reply.into_prefilled_json()
    }
}
