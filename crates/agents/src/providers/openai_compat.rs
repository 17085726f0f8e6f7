//! Transport for OpenAI-compatible `/chat/completions` endpoints.

use std::time::Duration;

use {
    anyhow::Context,
    async_trait::async_trait,
    secrecy::ExposeSecret,
    serde::{Deserialize, Serialize},
    tracing::{debug, trace},
};

use {
    super::{ChatTransport, CompletionRequest, HttpStatusError},
    crate::model::ChatMessage,
};

/// HTTP transport shared by every registry provider.
///
/// The request timeout is set on the client, so every attempt is bounded.
#[derive(Debug, Clone)]
pub struct OpenAiCompatTransport {
    client: reqwest::Client,
}

#[derive(Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ResponseBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ReplyMessage>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatTransport {
    /// Fails on a zero `timeout`, which would expire every request before it
    /// is sent.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        anyhow::ensure!(!timeout.is_zero(), "request timeout must be non-zero");
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

fn endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[async_trait]
impl ChatTransport for OpenAiCompatTransport {
    async fn complete(&self, request: &CompletionRequest<'_>) -> anyhow::Result<String> {
        let url = endpoint(request.base_url);
        let body = RequestBody {
            model: request.model,
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            provider = request.provider,
            model = request.model,
            messages_count = request.messages.len(),
            "chat completion request"
        );

        let http_resp = self
            .client
            .post(&url)
            .bearer_auth(request.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", request.provider))?;

        let status = http_resp.status();
        if !status.is_success() {
            let body = http_resp.text().await.unwrap_or_default();
            return Err(HttpStatusError {
                provider: request.provider.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let resp: ResponseBody = http_resp
            .json()
            .await
            .with_context(|| format!("invalid response from {}", request.provider))?;

        let choice = resp
            .choices
            .into_iter()
            .next()
            .with_context(|| format!("{} returned no choices", request.provider))?;
        let text = choice.message.and_then(|m| m.content).unwrap_or_default();
        trace!(provider = request.provider, len = text.len(), "chat completion reply");
        Ok(text)
    }
}
