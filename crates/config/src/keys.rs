//! Provider API keys, resolved once at startup.

use std::collections::BTreeMap;

use {
    secrecy::{ExposeSecret, Secret},
    tracing::debug,
};

use crate::{models::ModelsConfig, schema::ProvidersConfig};

/// Resolved API keys keyed by provider name. Providers without a usable key
/// have no entry.
#[derive(Clone, Default)]
pub struct KeyStore {
    keys: BTreeMap<String, Secret<String>>,
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("providers", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl KeyStore {
    /// Resolve keys for every registry provider.
    ///
    /// A key from the settings file wins, then the provider's environment
    /// variables in order. Empty values are ignored and disabled providers get
    /// no key at all.
    #[must_use]
    pub fn from_env(models: &ModelsConfig, providers: &ProvidersConfig) -> Self {
        Self::resolve_with(models, providers, |name| std::env::var(name).ok())
    }

    fn resolve_with(
        models: &ModelsConfig,
        providers: &ProvidersConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut keys = BTreeMap::new();
        for (name, spec) in &models.providers {
            if !providers.is_enabled(name) {
                debug!(provider = %name, "provider disabled in settings");
                continue;
            }

            let from_settings = providers
                .get(name)
                .and_then(|e| e.api_key.as_ref())
                .map(|k| k.expose_secret().trim().to_string())
                .filter(|k| !k.is_empty());

            let key = from_settings.or_else(|| {
                spec.key_env_vars(name)
                    .iter()
                    .filter_map(|var| lookup(var))
                    .map(|v| v.trim().to_string())
                    .find(|v| !v.is_empty())
            });

            if let Some(key) = key {
                keys.insert(name.clone(), Secret::new(key));
            }
        }
        debug!(count = keys.len(), "resolved provider keys");
        Self { keys }
    }

    /// Build a store from literal `(provider, key)` pairs. Empty keys are
    /// dropped.
    #[must_use]
    pub fn from_pairs<I, N, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, K)>,
        N: Into<String>,
        K: Into<String>,
    {
        let keys = pairs
            .into_iter()
            .map(|(n, k)| (n.into(), k.into()))
            .filter(|(_, k)| !k.trim().is_empty())
            .map(|(n, k)| (n, Secret::new(k)))
            .collect();
        Self { keys }
    }

    #[must_use]
    pub fn get(&self, provider: &str) -> Option<&Secret<String>> {
        self.keys.get(provider)
    }

    #[must_use]
    pub fn has_key(&self, provider: &str) -> bool {
        self.keys.contains_key(provider)
    }

    /// Providers holding a key, in name order.
    pub fn available(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
