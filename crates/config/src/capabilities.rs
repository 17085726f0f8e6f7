use crate::{keys::KeyStore, models::LoadedModels, schema::JarvisConfig};

/// Optional features resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Past exchanges are stored and searched for prompt context.
    pub long_term_memory: bool,
    /// The models registry came from a file rather than the built-in table.
    pub models_file: bool,
    /// At least one provider has a usable key.
    pub any_provider_key: bool,
}

impl Capabilities {
    #[must_use]
    pub fn detect(config: &JarvisConfig, models: &LoadedModels, keys: &KeyStore) -> Self {
        Self {
            long_term_memory: config.memory.long_term && config.memory.long_term_limit > 0,
            models_file: models.from_file(),
            any_provider_key: !keys.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::models::{ModelsConfig, ModelsSource},
    };

    fn builtin() -> LoadedModels {
        LoadedModels {
            config: ModelsConfig::builtin(),
            source: ModelsSource::Builtin {
                reason: "missing".into(),
            },
            diagnostics: vec![],
        }
    }

    #[test]
    fn defaults_with_no_keys() {
        let caps = Capabilities::detect(&JarvisConfig::default(), &builtin(), &KeyStore::default());
        assert_eq!(caps, Capabilities {
            long_term_memory: true,
            models_file: false,
            any_provider_key: false,
        });
    }

    #[test]
    fn zero_limit_disables_long_term_memory() {
        let mut config = JarvisConfig::default();
        config.memory.long_term_limit = 0;
        let keys = KeyStore::from_pairs([("groq", "k")]);
        let caps = Capabilities::detect(&config, &builtin(), &keys);
        assert!(!caps.long_term_memory);
        assert!(caps.any_provider_key);
    }
}
