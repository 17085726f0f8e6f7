//! Provider selection and fallback.
//!
//! `AiRouter` picks a provider and model for each request. With a forced
//! provider it makes exactly one attempt against that provider. Otherwise it
//! walks the registry's fallback order, skipping providers without a key or
//! without a model for the requested mode, and returns the first successful
//! reply.

use std::sync::Arc;

#[cfg(feature = "metrics")]
use std::time::Instant;

use tracing::{debug, warn};

#[cfg(feature = "metrics")]
use ::metrics::{counter, histogram};

#[cfg(feature = "metrics")]
use crate::metrics::{labels, llm as llm_metrics};

use {
    crate::{
        error::{Result, RouterError},
        model::ChatMessage,
        providers::{ChatTransport, CompletionRequest, classify_error},
    },
    jarvis_config::{KeyStore, ModelsConfig},
};

/// Provider or model choice: automatic, or pinned by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    Automatic,
    Forced(T),
}

impl<T> Selection<T> {
    #[must_use]
    pub fn forced(self) -> Option<T> {
        match self {
            Self::Automatic => None,
            Self::Forced(v) => Some(v),
        }
    }

    #[must_use]
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::Automatic)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Automatic => f.write_str("auto"),
            Self::Forced(v) => v.fmt(f),
        }
    }
}

/// What happened to one provider during an automatic-mode pass.
#[derive(Debug)]
pub enum AttemptOutcome {
    SkippedNoKey {
        provider: String,
    },
    SkippedNoModel {
        provider: String,
    },
    Failed {
        provider: String,
        model: String,
        error: anyhow::Error,
    },
}

/// Fold the outcomes of an exhausted automatic pass into one error.
///
/// The last failure wins. Without any failure, the result depends on whether
/// any provider had a key at all.
fn exhausted(mode: &str, outcomes: Vec<AttemptOutcome>) -> RouterError {
    let mut attempted = Vec::new();
    let mut keyed = Vec::new();
    let mut last_failure = None;

    for outcome in outcomes {
        match outcome {
            AttemptOutcome::SkippedNoKey { .. } => {},
            AttemptOutcome::SkippedNoModel { provider } => keyed.push(provider),
            AttemptOutcome::Failed {
                provider,
                model,
                error,
            } => {
                attempted.push(provider.clone());
                keyed.push(provider.clone());
                last_failure = Some((provider, model, error));
            },
        }
    }

    match last_failure {
        Some((provider, model, error)) => RouterError::AllProvidersFailed {
            provider,
            model,
            attempted,
            source: error.into(),
        },
        None if keyed.is_empty() => RouterError::NoProvidersConfigured,
        None => RouterError::NoModelForMode {
            mode: mode.to_string(),
            providers: keyed,
        },
    }
}

/// Routes chat requests across the configured providers.
///
/// Router state (forced provider and model) lives in memory for the lifetime
/// of the instance; each conversation owns its own router.
pub struct AiRouter {
    models: ModelsConfig,
    keys: KeyStore,
    transport: Arc<dyn ChatTransport>,
    forced_provider: Option<String>,
    forced_model: Option<String>,
}

impl std::fmt::Debug for AiRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiRouter")
            .field("providers", &self.models.providers.len())
            .field("keys", &self.keys)
            .field("forced_provider", &self.forced_provider)
            .field("forced_model", &self.forced_model)
            .finish_non_exhaustive()
    }
}

impl AiRouter {
    pub fn new(models: ModelsConfig, keys: KeyStore, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            models,
            keys,
            transport,
            forced_provider: None,
            forced_model: None,
        }
    }

    #[must_use]
    pub fn models(&self) -> &ModelsConfig {
        &self.models
    }

    #[must_use]
    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Pin every request to `name`. Leaves the forced model untouched.
    pub fn set_provider(&mut self, name: &str) -> Result<()> {
        if !self.models.contains(name) {
            return Err(RouterError::InvalidProvider {
                name: name.to_string(),
                available: self.models.provider_names().map(String::from).collect(),
            });
        }
        debug!(provider = name, "provider forced");
        self.forced_provider = Some(name.to_string());
        Ok(())
    }

    /// Pin every request to `model`. Not checked against any catalogue; an
    /// empty name counts as unset.
    pub fn set_model(&mut self, model: &str) {
        debug!(model, "model forced");
        self.forced_model = Some(model.to_string()).filter(|m| !m.is_empty());
    }

    /// Return to automatic provider and model selection.
    pub fn reset_auto(&mut self) {
        self.forced_provider = None;
        self.forced_model = None;
    }

    #[must_use]
    pub fn current_provider(&self) -> Selection<&str> {
        self.forced_provider
            .as_deref()
            .map_or(Selection::Automatic, Selection::Forced)
    }

    #[must_use]
    pub fn current_model(&self) -> Selection<&str> {
        self.forced_model
            .as_deref()
            .map_or(Selection::Automatic, Selection::Forced)
    }

    /// Providers with a usable key, in name order.
    #[must_use]
    pub fn list_available_providers(&self) -> Vec<String> {
        self.keys.available().map(String::from).collect()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Send `messages` to a provider and return the reply text.
    ///
    /// `mode` is a model tier (`fast`, `code`, `pro`); `model_override` beats
    /// the forced model, which beats the registry's per-mode entry.
    pub async fn route_request(
        &self,
        messages: &[ChatMessage],
        mode: &str,
        model_override: Option<&str>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let effective_model = model_override
            .filter(|m| !m.is_empty())
            .or(self.forced_model.as_deref());

        if let Some(provider) = self.forced_provider.as_deref() {
            return self
                .route_forced(
                    provider,
                    messages,
                    mode,
                    effective_model,
                    temperature,
                    max_tokens,
                )
                .await;
        }

        let mut outcomes = Vec::new();
        for provider in &self.models.fallback_order {
            let (Some(api_key), Some(spec)) =
                (self.keys.get(provider), self.models.provider(provider))
            else {
                debug!(provider = %provider, "skipping provider without key");
                outcomes.push(AttemptOutcome::SkippedNoKey {
                    provider: provider.clone(),
                });
                continue;
            };

            let Some(model) = effective_model.or_else(|| spec.models.resolve(mode)) else {
                debug!(provider = %provider, mode, "skipping provider without model for mode");
                outcomes.push(AttemptOutcome::SkippedNoModel {
                    provider: provider.clone(),
                });
                continue;
            };

            let request = CompletionRequest {
                provider,
                base_url: &spec.base_url,
                api_key,
                model,
                messages,
                temperature,
                max_tokens,
            };
            match self.dispatch(&request).await {
                Ok(text) => return Ok(text),
                Err(error) => {
                    warn!(
                        provider = %provider,
                        model,
                        error = %error,
                        kind = ?classify_error(&error),
                        "provider failed, trying next in fallback order"
                    );
                    outcomes.push(AttemptOutcome::Failed {
                        provider: provider.clone(),
                        model: model.to_string(),
                        error,
                    });
                },
            }
        }

        Err(exhausted(mode, outcomes))
    }

    async fn route_forced(
        &self,
        provider: &str,
        messages: &[ChatMessage],
        mode: &str,
        effective_model: Option<&str>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let (Some(api_key), Some(spec)) = (self.keys.get(provider), self.models.provider(provider))
        else {
            return Err(RouterError::ProviderUnavailable {
                provider: provider.to_string(),
            });
        };

        let Some(model) = effective_model.or_else(|| spec.models.resolve(mode)) else {
            return Err(RouterError::NoModelForMode {
                mode: mode.to_string(),
                providers: vec![provider.to_string()],
            });
        };

        let request = CompletionRequest {
            provider,
            base_url: &spec.base_url,
            api_key,
            model,
            messages,
            temperature,
            max_tokens,
        };
        self.dispatch(&request).await.map_err(|error| {
            warn!(
                provider,
                model,
                error = %error,
                kind = ?classify_error(&error),
                "forced provider failed"
            );
            RouterError::ProviderCallFailed {
                provider: provider.to_string(),
                model: model.to_string(),
                source: error.into(),
            }
        })
    }

    /// One upstream attempt, with metrics.
    async fn dispatch(&self, request: &CompletionRequest<'_>) -> anyhow::Result<String> {
        #[cfg(feature = "metrics")]
        let start = Instant::now();

        let result = self.transport.complete(request).await;

        #[cfg(feature = "metrics")]
        {
            let provider = request.provider.to_string();
            let model = request.model.to_string();
            histogram!(
                llm_metrics::COMPLETION_DURATION_SECONDS,
                labels::PROVIDER => provider.clone(),
                labels::MODEL => model.clone()
            )
            .record(start.elapsed().as_secs_f64());

            match &result {
                Ok(_) => counter!(
                    llm_metrics::COMPLETIONS_TOTAL,
                    labels::PROVIDER => provider,
                    labels::MODEL => model
                )
                .increment(1),
                Err(e) => counter!(
                    llm_metrics::COMPLETION_ERRORS_TOTAL,
                    labels::PROVIDER => provider,
                    labels::MODEL => model,
                    labels::ERROR_TYPE => format!("{:?}", classify_error(e))
                )
                .increment(1),
            }
        }

        if result.is_ok() {
            debug!(
                provider = request.provider,
                model = request.model,
                "provider replied"
            );
        }
        result
    }
}
