//! Provider registry: base URLs, per-mode model tables and the fallback order.
//!
//! The registry is read from a JSON document shaped like:
//!
//! ```json
//! {
//!   "providers": {
//!     "groq": {
//!       "base_url": "https://api.groq.com/openai/v1",
//!       "models": { "fast": "llama-3.1-8b-instant", "all": ["llama-3.1-8b-instant"] }
//!     }
//!   },
//!   "default_provider": "groq",
//!   "fallback_order": ["groq"]
//! }
//! ```
//!
//! When the file is missing or cannot be parsed, [`ModelsConfig::builtin`] is
//! used so the assistant works without any external configuration.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use {
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

use crate::validate::{self, Diagnostic};

/// Mode names every built-in provider defines a model for.
pub const MODEL_TIERS: &[&str] = &["fast", "code", "pro"];

/// Mode → model table for one provider, plus the optional `all` catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTable {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all: Vec<String>,
    #[serde(flatten)]
    pub modes: BTreeMap<String, String>,
}

impl ModelTable {
    /// Exact mode lookup. Empty entries count as missing.
    #[must_use]
    pub fn resolve(&self, mode: &str) -> Option<&str> {
        self.modes
            .get(mode)
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    }

    /// Every model the provider exposes: the `all` list when present,
    /// otherwise the distinct per-mode entries.
    #[must_use]
    pub fn catalogue(&self) -> Vec<&str> {
        if !self.all.is_empty() {
            return self.all.iter().map(String::as_str).collect();
        }
        let mut out: Vec<&str> = Vec::new();
        for model in self.modes.values().filter(|m| !m.is_empty()) {
            if !out.contains(&model.as_str()) {
                out.push(model);
            }
        }
        out
    }

    /// Modes that resolve to `model`.
    #[must_use]
    pub fn modes_for(&self, model: &str) -> Vec<&str> {
        self.modes
            .iter()
            .filter(|(_, m)| m.as_str() == model)
            .map(|(mode, _)| mode.as_str())
            .collect()
    }
}

/// One entry of the provider registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Base URL of an OpenAI-compatible chat API (without `/chat/completions`).
    pub base_url: String,
    #[serde(default)]
    pub models: ModelTable,
    /// Environment variables holding the API key, tried in order.
    /// Defaults to `<NAME>_API_KEY`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_key_env: Vec<String>,
}

impl ProviderSpec {
    /// Environment variables to consult for `name`'s key.
    #[must_use]
    pub fn key_env_vars(&self, name: &str) -> Vec<String> {
        if self.api_key_env.is_empty() {
            vec![default_key_env(name)]
        } else {
            self.api_key_env.clone()
        }
    }
}

fn default_key_env(name: &str) -> String {
    let upper: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{upper}_API_KEY")
}

/// The whole models registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub providers: BTreeMap<String, ProviderSpec>,
    #[serde(default)]
    pub default_provider: Option<String>,
    #[serde(default)]
    pub fallback_order: Vec<String>,
}

impl ModelsConfig {
    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&ProviderSpec> {
        self.providers.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registry names in stable (sorted) order.
    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Resolve the model for `(provider, mode)` with exact matching only.
    #[must_use]
    pub fn model_for(&self, provider: &str, mode: &str) -> Option<&str> {
        self.providers.get(provider)?.models.resolve(mode)
    }

    /// Built-in registry covering five OpenAI-compatible providers.
    #[must_use]
    pub fn builtin() -> Self {
        fn spec(base_url: &str, modes: [&str; 3], all: &[&str], env: &[&str]) -> ProviderSpec {
            let modes = MODEL_TIERS
                .iter()
                .zip(modes)
                .map(|(tier, model)| ((*tier).to_string(), model.to_string()))
                .collect();
            ProviderSpec {
                base_url: base_url.to_string(),
                models: ModelTable {
                    all: all.iter().map(|m| (*m).to_string()).collect(),
                    modes,
                },
                api_key_env: env.iter().map(|e| (*e).to_string()).collect(),
            }
        }

        let providers = BTreeMap::from([
            ("gemini".to_string(), spec(
                "https://generativelanguage.googleapis.com/v1beta/openai",
                [
                    "gemini-2.0-flash-lite",
                    "gemini-2.5-flash-preview-05-20",
                    "gemini-2.5-pro-preview-06-05",
                ],
                &[
                    "gemini-2.5-pro-preview-06-05",
                    "gemini-2.5-flash-preview-05-20",
                    "gemini-2.0-flash",
                    "gemini-2.0-flash-lite",
                ],
                &["GEMINI_API_KEY_1", "GEMINI_API_KEY_2", "GEMINI_API_KEY"],
            )),
            ("deepseek".to_string(), spec(
                "https://api.deepseek.com/v1",
                ["deepseek-chat", "deepseek-coder", "deepseek-reasoner"],
                &["deepseek-chat", "deepseek-coder", "deepseek-reasoner"],
                &["DEEPSEEK_API_KEY"],
            )),
            ("openrouter".to_string(), spec(
                "https://openrouter.ai/api/v1",
                [
                    "meta-llama/llama-3.1-8b-instruct:free",
                    "deepseek/deepseek-coder-v2",
                    "anthropic/claude-sonnet-4",
                ],
                &[
                    "anthropic/claude-sonnet-4",
                    "anthropic/claude-3.5-sonnet",
                    "google/gemini-2.5-pro-preview",
                    "google/gemini-2.5-flash-preview-05-20",
                    "deepseek/deepseek-coder-v2",
                    "deepseek/deepseek-r1",
                    "meta-llama/llama-3.1-8b-instruct:free",
                    "meta-llama/llama-3.3-70b-instruct",
                    "qwen/qwen-2.5-72b-instruct",
                    "mistralai/mistral-large-latest",
                ],
                &["OPENROUTER_API_KEY"],
            )),
            ("groq".to_string(), spec(
                "https://api.groq.com/openai/v1",
                [
                    "llama-3.1-8b-instant",
                    "llama-3.3-70b-versatile",
                    "llama-3.3-70b-versatile",
                ],
                &[
                    "llama-3.3-70b-versatile",
                    "llama-3.1-8b-instant",
                    "mixtral-8x7b-32768",
                    "gemma2-9b-it",
                ],
                &["GROQ_API_KEY"],
            )),
            ("huggingface".to_string(), spec(
                "https://api-inference.huggingface.co/v1",
                [
                    "mistralai/Mistral-7B-Instruct-v0.3",
                    "bigcode/starcoder2-15b",
                    "meta-llama/Meta-Llama-3-8B-Instruct",
                ],
                &[
                    "meta-llama/Meta-Llama-3-8B-Instruct",
                    "mistralai/Mistral-7B-Instruct-v0.3",
                    "bigcode/starcoder2-15b",
                    "microsoft/Phi-3-mini-4k-instruct",
                ],
                &["HUGGINGFACE_API_KEY"],
            )),
        ]);

        Self {
            providers,
            default_provider: Some("gemini".into()),
            fallback_order: ["gemini", "deepseek", "openrouter", "groq", "huggingface"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Where the active registry came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelsSource {
    File(PathBuf),
    /// Built-in registry; `reason` says why the file was not used.
    Builtin { reason: String },
}

/// A normalized registry plus the diagnostics produced while loading it.
#[derive(Debug, Clone)]
pub struct LoadedModels {
    pub config: ModelsConfig,
    pub source: ModelsSource,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadedModels {
    #[must_use]
    pub fn from_file(&self) -> bool {
        matches!(self.source, ModelsSource::File(_))
    }
}

/// Load the registry from `path`, falling back to the built-in registry when
/// the file is absent or malformed. Never fails.
pub fn load_models(path: &Path) -> LoadedModels {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))
        .and_then(|raw| {
            serde_json::from_str::<ModelsConfig>(&raw)
                .map_err(|e| format!("failed to parse {}: {e}", path.display()))
        });

    let (config, source) = match parsed {
        Ok(config) => {
            debug!(path = %path.display(), providers = config.providers.len(), "loaded models config");
            (config, ModelsSource::File(path.to_path_buf()))
        },
        Err(reason) => {
            if path.exists() {
                warn!(%reason, "models config unusable, using built-in registry");
            } else {
                debug!(path = %path.display(), "no models config file, using built-in registry");
            }
            (ModelsConfig::builtin(), ModelsSource::Builtin { reason })
        },
    };

    let (config, diagnostics) = validate::normalize_models(config);
    LoadedModels {
        config,
        source,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    #[test]
    fn builtin_covers_every_tier() {
        let cfg = ModelsConfig::builtin();
        assert_eq!(cfg.providers.len(), 5);
        for name in &cfg.fallback_order {
            let spec = cfg.provider(name).unwrap();
            for tier in MODEL_TIERS {
                assert!(spec.models.resolve(tier).is_some(), "{name} lacks {tier}");
            }
        }
        assert_eq!(cfg.fallback_order[0], "gemini");
    }

    #[test]
    fn model_table_reads_mixed_json() {
        let table: ModelTable = serde_json::from_str(
            r#"{"fast": "a", "pro": "b", "all": ["a", "b", "c"]}"#,
        )
        .unwrap();
        assert_eq!(table.resolve("fast"), Some("a"));
        assert_eq!(table.resolve("code"), None);
        assert_eq!(table.all.len(), 3);
        assert!(!table.modes.contains_key("all"));
    }

    #[test]
    fn resolve_is_exact_and_ignores_empty() {
        let table = ModelTable {
            all: vec![],
            modes: BTreeMap::from([
                ("pro".to_string(), "big".to_string()),
                ("fast".to_string(), String::new()),
            ]),
        };
        assert_eq!(table.resolve("pro"), Some("big"));
        assert_eq!(table.resolve("fast"), None);
        assert_eq!(table.resolve("PRO"), None);
        assert_eq!(table.resolve("study"), None);
    }

    #[test]
    fn catalogue_falls_back_to_mode_entries() {
        let table = ModelTable {
            all: vec![],
            modes: BTreeMap::from([
                ("code".to_string(), "m".to_string()),
                ("pro".to_string(), "m".to_string()),
                ("fast".to_string(), "s".to_string()),
            ]),
        };
        assert_eq!(table.catalogue(), vec!["m", "s"]);
        assert_eq!(table.modes_for("m"), vec!["code", "pro"]);
    }

    #[test]
    fn default_key_env_uppercases_name() {
        let spec = ProviderSpec {
            base_url: "http://localhost".into(),
            models: ModelTable::default(),
            api_key_env: vec![],
        };
        assert_eq!(spec.key_env_vars("together-ai"), vec!["TOGETHER_AI_API_KEY"]);
    }

    #[test]
    fn missing_file_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_models(&dir.path().join("models.json"));
        assert!(!loaded.from_file());
        assert_eq!(loaded.config, ModelsConfig::builtin());
    }

    #[test]
    fn malformed_file_uses_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let loaded = load_models(file.path());
        assert!(matches!(loaded.source, ModelsSource::Builtin { ref reason } if reason.contains("parse")));
        assert!(loaded.config.contains("groq"));
    }

    #[test]
    fn file_registry_replaces_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "providers": {{
                    "local": {{ "base_url": "http://127.0.0.1:8080/v1", "models": {{ "fast": "tiny" }} }}
                }},
                "default_provider": "local",
                "fallback_order": ["local"]
            }}"#
        )
        .unwrap();
        let loaded = load_models(file.path());
        assert!(loaded.from_file());
        assert_eq!(loaded.config.providers.len(), 1);
        assert_eq!(loaded.config.model_for("local", "fast"), Some("tiny"));
        assert_eq!(loaded.config.fallback_order, vec!["local"]);
    }
}
