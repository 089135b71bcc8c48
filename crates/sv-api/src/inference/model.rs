//! Model-backed intent parsing over an OpenAI-compatible chat endpoint.
//!
//! Sends a fixed instruction prompt plus the catalog and the raw customer
//! message to `{base_url}/chat/completions` and validates the JSON reply
//! into a [`ParsedIntent`]. Every failure mode — missing credentials, HTTP
//! error, timeout, malformed or invariant-violating output — is a typed
//! [`ModelError`]; the tiered parser swallows it and falls back to the rule
//! classifier, so nothing here ever reaches an HTTP caller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sv_protocol::intent::{IntentError, ParsedIntent, RawIntent};

/// Placeholder credential used by deployments without a real key. Treated
/// as unconfigured so CI and local runs never hit the network.
const PLACEHOLDER_API_KEY: &str = "dummy-key-for-testing";

/// Instruction prompt: the five intents, extraction rules, and the
/// confidence-banding rubric with worked examples. The catalog is appended
/// per request.
const SYSTEM_PROMPT: &str = r#"You are the order parser for a soda vending machine. Parse the customer's message into a structured intent.

Intents:
- "purchase": the customer wants to buy something (positive intent)
- "query": the customer is asking about products or inventory
- "cancel": the customer wants to cancel a transaction
- "refuse": the customer explicitly says no / doesn't want to buy
- "unknown": the intent is unclear

Product extraction:
- product_name must match one of the available products exactly
- handle variations (coke / coca-cola, sprite / lemon-lime)

Quantity extraction:
- extract numbers attached to product names
- treat "a", "an", "one" as quantity 1
- default to 1 when a purchase names a product without a count

Confidence bands:
- 0.9-1.0: very clear intent
- 0.7-0.8: clear intent with some ambiguity
- 0.5-0.6: somewhat clear
- 0.3-0.4: unclear
- 0.1-0.2: very unclear

Examples:
- "I want to buy 3 cokes" -> purchase, coke, 3, 0.95
- "Give me a sprite" -> purchase, sprite, 1, 0.9
- "What do you have?" -> query, null, null, 0.95
- "I don't want to buy anything" -> refuse, null, null, 0.9
- "Cancel my order" -> cancel, null, null, 0.9

Respond with ONLY a JSON object (no markdown, no explanation):
{"intent": "<intent>", "product_name": <string or null>, "quantity": <positive integer or null>, "confidence": <0.0-1.0>, "reasoning": "<brief justification>"}"#;

/// Configuration for the model endpoint, resolved once at process start.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// API key. None or the placeholder sentinel means unconfigured.
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL (Ollama's compatibility endpoint by default).
    pub base_url: String,
    /// Model identifier passed in the request body.
    pub model: String,
    /// Per-attempt request timeout.
    pub timeout_secs: u64,
    /// Total attempts for one parse call (first try included).
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: 5,
            max_retries: 3,
        }
    }
}

impl ModelConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.model),
            timeout_secs: std::env::var("OPENAI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            max_retries: std::env::var("OPENAI_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }

    /// A usable credential is present and is not the test placeholder.
    pub fn is_configured(&self) -> bool {
        matches!(&self.api_key, Some(key) if !key.is_empty() && key != PLACEHOLDER_API_KEY)
    }
}

/// Why a model parse attempt failed. Never surfaces past the tiered parser.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("chat response carried no message content")]
    MissingContent,

    #[error("model returned invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model response violated intent invariants: {0}")]
    Invalid(#[from] IntentError),
}

// ── Chat API wire shapes (only the fields we use) ───────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the remote model tier.
pub struct ModelParser {
    client: reqwest::Client,
    config: ModelConfig,
}

impl ModelParser {
    /// Build the parser from resolved configuration. Returns `None` when no
    /// usable credential is present or the HTTP client cannot be built —
    /// the caller then runs rules-only.
    pub fn from_config(config: ModelConfig) -> Option<Self> {
        if !config.is_configured() {
            tracing::info!("model endpoint unconfigured — intent parsing is rules-only");
            return None;
        }

        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "failed to build model HTTP client — rules-only");
                return None;
            }
        };

        Some(Self { client, config })
    }

    /// Parse one message, retrying failed attempts up to the configured
    /// bound. The last error is returned when every attempt fails.
    pub async fn parse(
        &self,
        message: &str,
        catalog: &[String],
    ) -> Result<ParsedIntent, ModelError> {
        let attempts = self.config.max_retries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.request_intent(message, catalog).await {
                Ok(intent) => return Ok(intent),
                Err(e) if attempt < attempts => {
                    tracing::debug!(error = %e, attempt, "model parse attempt failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One chat exchange: request, shape validation, invariant validation.
    async fn request_intent(
        &self,
        message: &str,
        catalog: &[String],
    ) -> Result<ParsedIntent, ModelError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let system = format!(
            "{SYSTEM_PROMPT}\n\nAvailable products: {}",
            catalog.join(", ")
        );

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.0,
            stream: false,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ModelError::Status(response.status()));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ModelError::MissingContent)?;

        let raw: RawIntent = serde_json::from_str(extract_json(&content))?;
        let intent = ParsedIntent::try_from(raw)?;

        // The product must be drawn verbatim from the caller's catalog —
        // a free-form guess is rejected like any other shape failure.
        if let Some(name) = intent.product_name()
            && !catalog.iter().any(|p| p == name)
        {
            return Err(ModelError::Invalid(IntentError::UnknownProduct(
                name.to_string(),
            )));
        }

        Ok(intent)
    }
}

/// Extract JSON from model output that may be wrapped in markdown fences.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    trimmed
}
