//! Startup wiring: settings, models registry, keys and capabilities, loaded
//! once and handed to the session.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use {
    anyhow::Context,
    jarvis_agents::{AiRouter, OpenAiCompatTransport},
    jarvis_chat::ChatSession,
    jarvis_config::{Capabilities, JarvisConfig, KeyStore, LoadedModels, ModelsSource},
    tracing::{info, warn},
};

pub struct App {
    pub config: JarvisConfig,
    pub models: LoadedModels,
    pub keys: KeyStore,
    pub capabilities: Capabilities,
}

impl App {
    /// Load settings from `config_path` (or discover them), then the models
    /// registry from `models_path` (or the settings' path).
    pub fn load(config_path: Option<&Path>, models_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                let mut config = jarvis_config::load_config(path)
                    .with_context(|| format!("failed to load settings from {}", path.display()))?;
                jarvis_config::apply_env_overrides(&mut config);
                config
            },
            None => jarvis_config::discover_and_load(),
        };
        if let Some(path) = models_path {
            config.router.models_config_path = path;
        }

        let models = jarvis_config::load_models(&config.router.models_config_path);
        for d in &models.diagnostics {
            warn!(category = d.category, path = %d.path, "{}", d.message);
        }
        if let ModelsSource::Builtin { reason } = &models.source {
            info!(%reason, "using built-in models registry");
        }

        let keys = KeyStore::from_env(&models.config, &config.providers);
        let capabilities = Capabilities::detect(&config, &models, &keys);
        info!(?capabilities, providers = ?keys.available().collect::<Vec<_>>(), "jarvis ready");

        Ok(Self {
            config,
            models,
            keys,
            capabilities,
        })
    }

    pub fn router(&self) -> anyhow::Result<AiRouter> {
        let transport =
            OpenAiCompatTransport::new(Duration::from_secs(self.config.router.request_timeout_secs))?;
        Ok(AiRouter::new(
            self.models.config.clone(),
            self.keys.clone(),
            Arc::new(transport),
        ))
    }

    pub fn session(&self) -> anyhow::Result<ChatSession> {
        Ok(ChatSession::new(
            self.router()?,
            &self.config,
            self.capabilities,
        ))
    }
}
