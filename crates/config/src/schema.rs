//! Settings schema for the assistant (chat, router, memory, provider keys).
use std::{collections::HashMap, path::PathBuf};

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration, created once at startup and passed to constructors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JarvisConfig {
    pub chat: ChatConfig,
    pub router: RouterConfig,
    pub memory: MemoryConfig,
    pub providers: ProvidersConfig,
}

/// Chat session behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Mode the session starts in. Unknown names fall back to "pro".
    pub default_mode: String,
    /// Language assumed until the user's first message is classified.
    pub language: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_mode: "pro".into(),
            language: "uz".into(),
        }
    }
}

/// Request routing and upstream HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Path of the JSON models registry. Missing or malformed files fall back
    /// to the built-in registry.
    pub models_config_path: PathBuf,
    /// Upper bound on a single upstream attempt, in seconds.
    pub request_timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            models_config_path: PathBuf::from("config/models.json"),
            request_timeout_secs: 60,
            temperature: 0.7,
            max_tokens: 2048,
        }
    }
}

/// Conversation memory limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Number of messages kept in the conversation history.
    pub short_term_limit: usize,
    /// Whether past exchanges are stored and searched for prompt context.
    pub long_term: bool,
    /// Maximum number of stored exchanges; oldest are evicted first.
    pub long_term_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_limit: 50,
            long_term: true,
            long_term_limit: 1000,
        }
    }
}

/// Per-provider overrides keyed by provider name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    #[serde(flatten)]
    pub providers: HashMap<String, ProviderEntry>,
}

/// Overrides for a single provider.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEntry {
    /// Whether this provider may be used at all. Defaults to true.
    pub enabled: bool,

    /// API key; takes precedence over the provider's environment variables.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<Secret<String>>,
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderEntry {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
        }
    }
}

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

impl ProvidersConfig {
    /// Providers are enabled unless explicitly turned off.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.providers.get(name).is_none_or(|e| e.enabled)
    }

    pub fn get(&self, name: &str) -> Option<&ProviderEntry> {
        self.providers.get(name)
    }
}
