// Suggestion backends
//
// Turns a validated AssistRequest into suggested cell text, either through
// the hosted recommendations endpoint or an OpenAI-compatible chat API.

use serde::{Deserialize, Serialize};

use harada_config::ai::{AssistConfigStatus, ResolvedAssistConfig};
use harada_config::AssistProvider;
use harada_engine::assist::AssistRequest;
use harada_protocol::{CellHelpRequest, CellHelpResponse, RECOMMENDATIONS_PATH};

use crate::error::ClientError;
use crate::http::{build_http, check_status};

/// Anything that can produce suggested text for one cell.
pub trait SuggestionBackend {
    fn suggest(&self, request: &AssistRequest) -> Result<String, ClientError>;
}

/// Pick the backend for a resolved configuration.
pub fn backend_for(config: &ResolvedAssistConfig) -> Result<Box<dyn SuggestionBackend>, ClientError> {
    match config.status {
        AssistConfigStatus::Ready => {}
        AssistConfigStatus::Disabled => {
            return Err(ClientError::NotConfigured(
                "assist is disabled (set \"assist\".\"provider\" in settings.json)".to_string(),
            ))
        }
        AssistConfigStatus::MissingKey => return Err(ClientError::MissingKey),
        AssistConfigStatus::MissingEndpoint => {
            return Err(ClientError::NotConfigured(
                config
                    .blocking_reason
                    .clone()
                    .unwrap_or_else(|| "no endpoint".to_string()),
            ))
        }
    }

    let endpoint = config
        .endpoint
        .as_deref()
        .ok_or_else(|| ClientError::NotConfigured("no endpoint".to_string()))?;

    match config.provider {
        AssistProvider::None => Err(ClientError::NotConfigured("assist is disabled".to_string())),
        AssistProvider::Service => Ok(Box::new(ServiceBackend::new(endpoint)?)),
        AssistProvider::OpenAI | AssistProvider::Local => Ok(Box::new(ChatBackend::new(
            endpoint,
            &config.model,
            config.api_key.clone(),
        )?)),
    }
}

/// Trim whitespace and one pair of wrapping quotes; empty text is an error.
fn clean_suggestion(text: &str) -> Result<String, ClientError> {
    let mut text = text.trim();
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        text = text[1..text.len() - 1].trim();
    }
    if text.is_empty() {
        return Err(ClientError::InvalidResponse("empty suggestion".to_string()));
    }
    Ok(text.to_string())
}

// ============================================================================
// Hosted service
// ============================================================================

/// Client for the hosted `/api/recommendations` endpoint.
pub struct ServiceBackend {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ServiceBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SuggestionBackend for ServiceBackend {
    fn suggest(&self, request: &AssistRequest) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url, RECOMMENDATIONS_PATH);
        let body = CellHelpRequest::new(
            &request.cell_id,
            request.role.as_str(),
            &request.existing_text,
            &request.user_question,
        );

        log::debug!("POST {} for {}", url, request.cell_id);
        let response = self.http.post(&url).json(&body).send()?;
        let response = check_status(response)?;

        let reply: CellHelpResponse = response
            .json()
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        let text = reply
            .recommendation
            .ok_or_else(|| ClientError::InvalidResponse("No recommendation in response".to_string()))?;
        clean_suggestion(&text)
    }
}

// ============================================================================
// OpenAI-compatible chat API
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `{endpoint}/chat/completions` (OpenAI, Ollama).
pub struct ChatBackend {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl ChatBackend {
    pub fn new(endpoint: &str, model: &str, api_key: Option<String>) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http()?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }
}

impl SuggestionBackend for ChatBackend {
    fn suggest(&self, request: &AssistRequest) -> Result<String, ClientError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt(),
            }],
            temperature: 0.7,
            max_tokens: 200,
        };

        log::debug!("POST {} model={} for {}", url, self.model, request.cell_id);
        let mut builder = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }
        let response = check_status(builder.send()?)?;

        let reply: ChatResponse = response
            .json()
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClientError::InvalidResponse("No choices in response".to_string()))?;
        clean_suggestion(&content)
    }
}
