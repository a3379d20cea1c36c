use super::SafetyClassifier;
use crate::error::VitalSimError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vitalsim_schemas::{
    classification::{ClassificationRequest, Verdict},
    event::SafetyStatus,
};

const SYSTEM_PROMPT: &str = "You are a pediatric medical safety analyzer. \
Classify the health event in the user message as SAFE, MONITOR, or DANGER, \
considering its trend, correlation tags, recent events, and the current state. \
Normal glucose is 4.0-7.0 mmol/L; below 3.5 or above 11.0 is critical. \
Respond ONLY with a JSON object: {\"status\": \"SAFE\" | \"MONITOR\" | \"DANGER\", \"reasoning\": \"...\"}";

#[derive(Debug, Clone)]
pub struct RemoteClassifierConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct RemoteClassifier {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
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
    content: String,
}

#[derive(Deserialize)]
struct RawVerdict {
    status: String,
    #[serde(default)]
    reasoning: Option<String>,
}

impl RemoteClassifier {
    pub fn new(config: RemoteClassifierConfig) -> Result<Self, VitalSimError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| VitalSimError::ClassifierUnavailable(format!("HTTP client setup: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/chat/completions", config.api_base.trim_end_matches('/')),
            model: config.model,
            api_key: config.api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SafetyClassifier for RemoteClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Verdict, VitalSimError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: serde_json::to_string(request)?,
                },
            ],
            temperature: 0.1,
            max_tokens: 200,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VitalSimError::ClassifierUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(VitalSimError::ClassifierUnavailable(format!(
                "endpoint returned {}",
                status
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| VitalSimError::ClassifierUnavailable(format!("reading body: {}", e)))?;
        parse_completion(&text)
    }

    fn name(&self) -> &str {
        "remote"
    }
}

/// Extracts the verdict from a chat-completions response body.
pub(crate) fn parse_completion(body: &str) -> Result<Verdict, VitalSimError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| VitalSimError::ClassifierUnavailable(format!("malformed response: {}", e)))?;
    let content = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| VitalSimError::ClassifierUnavailable("response has no choices".to_string()))?;

    let raw: RawVerdict = serde_json::from_str(strip_code_fence(&content))
        .map_err(|e| VitalSimError::ClassifierUnavailable(format!("unparseable verdict: {}", e)))?;
    let status: SafetyStatus = raw
        .status
        .parse()
        .map_err(VitalSimError::ClassifierUnavailable)?;

    Ok(Verdict::new(
        status,
        raw.reasoning
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "No reasoning provided".to_string()),
    ))
}

// Models sometimes wrap JSON in a markdown fence.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}
