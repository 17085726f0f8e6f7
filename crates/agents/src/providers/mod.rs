//! Upstream dispatch: the transport seam used by the router and the
//! OpenAI-compatible HTTP implementation.

pub mod openai_compat;

use {async_trait::async_trait, secrecy::Secret};

use crate::model::ChatMessage;

pub use openai_compat::OpenAiCompatTransport;

/// Everything needed for one upstream chat-completions call.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    /// Registry name, used for logging and error reporting.
    pub provider: &'a str,
    pub base_url: &'a str,
    pub api_key: &'a Secret<String>,
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Sends a single chat-completions request and returns the reply text.
///
/// Implementations must not retry; fallback across providers is the router's
/// job.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, request: &CompletionRequest<'_>) -> anyhow::Result<String>;
}

/// Non-2xx reply from an upstream chat API.
#[derive(Debug, thiserror::Error)]
#[error("{provider} API error HTTP {status}: {body}")]
pub struct HttpStatusError {
    pub provider: String,
    pub status: u16,
    pub body: String,
}

/// How an upstream failure looks, for logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    RateLimit,
    AuthError,
    ServerError,
    BillingExhausted,
    /// Prompt does not fit the model's context window.
    ContextWindow,
    InvalidRequest,
    /// Connect or read timeout.
    Timeout,
    Unknown,
}

/// Error codes in 4xx bodies that mean the prompt was too long.
const CONTEXT_LIMIT_CODES: &[&str] = &[
    "context_length_exceeded",
    "maximum context length",
    "context window",
    "too many tokens",
];

const BILLING_CODES: &[&str] = &["insufficient_quota", "billing", "credit"];

/// Classify an upstream error.
///
/// HTTP replies are judged by status, with the body consulted only to split
/// 4xx cases. Anything else is a transport failure.
#[must_use]
pub fn classify_error(err: &anyhow::Error) -> ProviderErrorKind {
    if let Some(http) = err.downcast_ref::<HttpStatusError>() {
        return classify_status(http.status, &http.body);
    }

    let timed_out = err.chain().any(|cause| {
        cause
            .downcast_ref::<reqwest::Error>()
            .is_some_and(reqwest::Error::is_timeout)
            || cause.to_string().to_lowercase().contains("timed out")
    });
    if timed_out {
        ProviderErrorKind::Timeout
    } else {
        ProviderErrorKind::Unknown
    }
}

fn classify_status(status: u16, body: &str) -> ProviderErrorKind {
    let body = body.to_lowercase();
    let mentions = |codes: &[&str]| codes.iter().any(|c| body.contains(c));

    match status {
        402 => ProviderErrorKind::BillingExhausted,
        429 if mentions(BILLING_CODES) => ProviderErrorKind::BillingExhausted,
        429 => ProviderErrorKind::RateLimit,
        401 | 403 => ProviderErrorKind::AuthError,
        408 | 504 => ProviderErrorKind::Timeout,
        500..=599 => ProviderErrorKind::ServerError,
        400..=499 if mentions(CONTEXT_LIMIT_CODES) => ProviderErrorKind::ContextWindow,
        400..=499 => ProviderErrorKind::InvalidRequest,
        _ => ProviderErrorKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, body: &str) -> anyhow::Error {
        HttpStatusError {
            provider: "groq".into(),
            status,
            body: body.into(),
        }
        .into()
    }

    #[test]
    fn status_decides_the_kind() {
        assert_eq!(classify_error(&http(429, "slow down")), ProviderErrorKind::RateLimit);
        assert_eq!(classify_error(&http(401, "")), ProviderErrorKind::AuthError);
        assert_eq!(classify_error(&http(502, "")), ProviderErrorKind::ServerError);
        assert_eq!(classify_error(&http(402, "")), ProviderErrorKind::BillingExhausted);
        assert_eq!(classify_error(&http(504, "")), ProviderErrorKind::Timeout);
    }

    #[test]
    fn digits_in_the_body_do_not_change_the_kind() {
        let err = http(400, r#"{"error":"max_tokens must be below 500"}"#);
        assert_eq!(classify_error(&err), ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn body_splits_4xx_cases() {
        let err = http(400, r#"{"error":{"code":"context_length_exceeded"}}"#);
        assert_eq!(classify_error(&err), ProviderErrorKind::ContextWindow);
        let err = http(429, r#"{"error":{"type":"insufficient_quota"}}"#);
        assert_eq!(classify_error(&err), ProviderErrorKind::BillingExhausted);
    }

    #[test]
    fn context_layers_keep_the_status() {
        let err = http(503, "").context("attempt 1");
        assert_eq!(classify_error(&err), ProviderErrorKind::ServerError);
    }

    #[test]
    fn transport_timeout_from_context_chain() {
        let err = anyhow::anyhow!("operation timed out").context("request to groq failed");
        assert_eq!(classify_error(&err), ProviderErrorKind::Timeout);
    }

    #[test]
    fn plain_text_errors_are_unknown() {
        let err = anyhow::anyhow!("HTTP 429 rate limit");
        assert_eq!(classify_error(&err), ProviderErrorKind::Unknown);
    }
}
