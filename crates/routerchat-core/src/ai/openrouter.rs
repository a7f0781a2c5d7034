use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Settings;
use crate::error::CompletionError;
use crate::state::Message;
use crate::text::decode_body;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
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
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Client for an OpenRouter-compatible chat completions endpoint.
///
/// One call per turn: no streaming, no retries.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    endpoint: String,
    api_key: String,
    referrer: String,
    title: String,
}

impl OpenRouterClient {
    pub fn new(settings: &Settings) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.api_url.clone(),
            api_key: settings.api_key.clone(),
            referrer: settings.referrer.clone(),
            title: settings.title.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_request(
        &self,
        model: &str,
        messages: &[Message],
    ) -> Result<RequestBuilder, CompletionError> {
        let body = serde_json::to_vec(&ChatRequest { model, messages })?;

        Ok(self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .header("HTTP-Referer", &self.referrer)
            .header("X-Title", &self.title)
            .body(body))
    }

    /// Sends the full transcript and returns the text of the first choice.
    pub async fn complete(
        &self,
        messages: &[Message],
        model: &str,
    ) -> Result<String, CompletionError> {
        tracing::debug!(model, messages = messages.len(), "sending completion request");

        let response = self.build_request(model, messages)?.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body = decode_body(&bytes);

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::warn!(%status, "completion endpoint rejected credentials");
            return Err(CompletionError::Unauthorized { status, body });
        }

        if !status.is_success() {
            tracing::warn!(%status, "completion request failed");
            return Err(CompletionError::Status { status, body });
        }

        parse_reply(body)
    }
}

/// Extracts `choices[0].message.content`, treating any other shape as an
/// unexpected response.
fn parse_reply(body: String) -> Result<String, CompletionError> {
    let reply = serde_json::from_str::<ChatResponse>(&body)
        .ok()
        .and_then(|response| response.choices.into_iter().next())
        .map(|choice| choice.message.content);

    match reply {
        Some(content) => Ok(content),
        None => {
            tracing::warn!(len = body.len(), "completion response has unexpected shape");
            Err(CompletionError::UnexpectedResponse { raw: body })
        }
    }
}
