use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by [`crate::router::AiRouter`].
#[derive(Debug, Error)]
pub enum RouterError {
    /// `set_provider` named a provider that is not in the registry.
    #[error("unknown provider '{name}' (available: {})", available.join(", "))]
    InvalidProvider { name: String, available: Vec<String> },

    /// The forced provider has no usable API key.
    #[error("provider '{provider}' has no API key configured")]
    ProviderUnavailable { provider: String },

    /// No model could be resolved for the requested mode.
    #[error("no model configured for mode '{mode}' (checked: {})", providers.join(", "))]
    NoModelForMode { mode: String, providers: Vec<String> },

    /// The forced provider's single attempt failed.
    #[error("{provider} ({model}) failed: {source}")]
    ProviderCallFailed {
        provider: String,
        model: String,
        #[source]
        source: BoxError,
    },

    /// Every attempted provider failed; carries the last failure.
    #[error("all providers failed ({}); last error from {provider} ({model}): {source}", attempted.join(", "))]
    AllProvidersFailed {
        provider: String,
        model: String,
        attempted: Vec<String>,
        #[source]
        source: BoxError,
    },

    /// No provider in the fallback order has an API key.
    #[error("no AI provider has an API key configured")]
    NoProvidersConfigured,
}

pub type Result<T> = std::result::Result<T, RouterError>;
