//! Google Gemini gateway implementation for SmartStudy
//!
//! This module implements [`ModelGateway`] over the Gemini REST API:
//! `generateContent` for one-shot text and structured completions, and
//! `streamGenerateContent?alt=sse` for streamed chat replies. Chat history
//! is replayed from the [`ChatSession`] on every send.

use crate::config::GeminiConfig;
use crate::error::{Result, SmartStudyError};
use crate::providers::sse::parse_sse_stream;
use crate::providers::{ChatSession, FragmentStream, ModelGateway, Turn, TurnRole};
use crate::schema::SchemaDescriptor;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// API version segment used for every endpoint
const API_VERSION: &str = "v1beta";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Gemini gateway
///
/// # Examples
///
/// ```no_run
/// use smartstudy::config::GeminiConfig;
/// use smartstudy::providers::{GeminiGateway, ModelGateway};
///
/// # async fn example() -> smartstudy::error::Result<()> {
/// let config = GeminiConfig {
///     api_key: Some("my-key".to_string()),
///     ..Default::default()
/// };
/// let gateway = GeminiGateway::new(config)?;
/// let text = gateway.complete_text("Explain OOP", "You are a tutor").await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiGateway {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

/// Request body for `generateContent` and `streamGenerateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// Content block (a role plus parts)
#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart {
                text: Some(text.to_string()),
                thought: false,
            }],
        }
    }
}

/// Content part; only text parts are produced or consumed
#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    /// Set on reasoning summaries from thinking models
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
}

/// Output constraints for structured completions
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// Response body (also the payload of each streamed event)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, skipping thought parts
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Fail when the prompt itself was blocked
    fn ensure_not_blocked(&self) -> std::result::Result<(), SmartStudyError> {
        if self.candidates.is_empty() {
            if let Some(reason) = self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
            {
                return Err(SmartStudyError::Provider(format!(
                    "Prompt blocked by provider: {}",
                    reason
                )));
            }
        }
        Ok(())
    }
}

impl GeminiGateway {
    /// Create a new Gemini gateway
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no API key is configured, or a
    /// provider error if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                SmartStudyError::Config(
                    "Missing Gemini API key: set SMARTSTUDY_API_KEY or GEMINI_API_KEY".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("smartstudy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SmartStudyError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini gateway: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model,
            api_key,
        })
    }

    /// The configured model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the URL of a model method, e.g. `generateContent`
    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/{}/models/{}:{}",
            self.api_base, API_VERSION, self.model, method
        )
    }

    /// POST a request and return the response when the status is 2xx
    async fn post(
        &self,
        url: &str,
        query: &[(&str, &str)],
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Response> {
        tracing::debug!(
            "Sending Gemini request: url={}, {} content blocks, structured={}",
            url,
            request.contents.len(),
            request.generation_config.is_some()
        );

        let response = self
            .client
            .post(url)
            .query(query)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                SmartStudyError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(status_error(response).await.into());
        }

        Ok(response)
    }

    /// Run a one-shot `generateContent` call
    async fn generate(&self, request: GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = self.endpoint("generateContent");
        let response = self.post(&url, &[], &request).await?;

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to read Gemini response: {}", e);
            SmartStudyError::from(e)
        })?;

        body.ensure_not_blocked()?;

        if let Some(usage) = &body.usage_metadata {
            tracing::debug!(
                "Gemini usage: prompt_tokens={}, completion_tokens={}",
                usage.prompt_token_count,
                usage.candidates_token_count
            );
        }
        if let Some(reason) = body.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
            tracing::debug!("Gemini finish reason: {}", reason);
        }

        Ok(body)
    }
}

/// Convert a non-2xx response into a provider error
async fn status_error(response: reqwest::Response) -> SmartStudyError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<GeminiErrorEnvelope>(&body) {
        Ok(envelope) if !envelope.error.status.is_empty() => {
            format!("{} ({})", envelope.error.message, envelope.error.status)
        }
        Ok(envelope) => envelope.error.message,
        Err(_) => body,
    };

    tracing::error!("Gemini returned error {}: {}", status, detail);

    if status == StatusCode::TOO_MANY_REQUESTS {
        SmartStudyError::Provider(format!("Quota exhausted: {}", detail))
    } else {
        SmartStudyError::Provider(format!("Gemini returned error {}: {}", status, detail))
    }
}

fn history_to_contents(history: &[Turn]) -> Vec<GeminiContent> {
    history
        .iter()
        .map(|turn| {
            let role = match turn.role {
                TurnRole::User => "user",
                TurnRole::Model => "model",
            };
            GeminiContent::text(Some(role), &turn.text)
        })
        .collect()
}

fn system_content(instruction: &str) -> Option<GeminiContent> {
    if instruction.trim().is_empty() {
        None
    } else {
        Some(GeminiContent::text(None, instruction))
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn complete_text(&self, prompt: &str, system_instruction: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![GeminiContent::text(Some("user"), prompt)],
            system_instruction: system_content(system_instruction),
            generation_config: None,
        };

        let text = self.generate(request).await?.text();
        if text.trim().is_empty() {
            return Err(SmartStudyError::EmptyResponse.into());
        }
        Ok(text)
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &SchemaDescriptor,
    ) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![GeminiContent::text(Some("user"), prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema.to_response_schema(),
            }),
        };

        let text = self.generate(request).await?.text();
        if text.trim().is_empty() {
            return Err(SmartStudyError::EmptyResponse.into());
        }
        Ok(text)
    }

    async fn send_streaming(&self, session: &ChatSession, message: &str) -> Result<FragmentStream> {
        let mut contents = history_to_contents(&session.history().await);
        contents.push(GeminiContent::text(Some("user"), message));

        let request = GenerateContentRequest {
            contents,
            system_instruction: system_content(session.system_instruction()),
            generation_config: None,
        };

        let url = self.endpoint("streamGenerateContent");
        let response = self.post(&url, &[("alt", "sse")], &request).await?;

        let (fragment_tx, fragment_rx) = mpsc::unbounded_channel::<Result<String>>();
        let session = session.clone();
        let user_text = message.to_string();
        let byte_stream = response.bytes_stream();

        tokio::spawn(async move {
            let (payload_tx, mut payload_rx) = mpsc::unbounded_channel::<Result<String>>();
            let parser = parse_sse_stream(byte_stream, payload_tx);

            let relay = async move {
                let mut full_text = String::new();
                while let Some(item) = payload_rx.recv().await {
                    let fragment = item.and_then(|payload| {
                        let chunk: GenerateContentResponse = serde_json::from_str(&payload)
                            .map_err(|e| {
                                SmartStudyError::Provider(format!(
                                    "Malformed stream event: {}",
                                    e
                                ))
                            })?;
                        chunk.ensure_not_blocked()?;
                        Ok(chunk.text())
                    });

                    match fragment {
                        Ok(text) if text.is_empty() => continue,
                        Ok(text) => {
                            full_text.push_str(&text);
                            if fragment_tx.send(Ok(text)).is_err() {
                                tracing::debug!("Fragment consumer dropped, abandoning stream");
                                return;
                            }
                        }
                        Err(e) => {
                            tracing::error!("Gemini stream failed: {}", e);
                            let _ = fragment_tx.send(Err(e));
                            return;
                        }
                    }
                }

                if !full_text.is_empty() {
                    session.record_exchange(&user_text, &full_text).await;
                }
            };

            tokio::join!(parser, relay);
        });

        Ok(Box::pin(UnboundedReceiverStream::new(fragment_rx)))
    }
}
