//! Settings loading and validation, the models registry, and provider keys.
//!
//! Settings files: `jarvis.toml`, `jarvis.yaml`, `jarvis.yml` or `jarvis.json`,
//! searched in `./` then `~/.config/jarvis/`. `${ENV_VAR}` placeholders are
//! expanded before parsing.

pub mod capabilities;
pub mod env_subst;
pub mod error;
pub mod keys;
pub mod loader;
pub mod models;
pub mod schema;
pub mod validate;

pub use {
    capabilities::Capabilities,
    error::{Error, Result},
    keys::KeyStore,
    loader::{apply_env_overrides, config_dir, discover_and_load, load_config},
    models::{
        LoadedModels, MODEL_TIERS, ModelTable, ModelsConfig, ModelsSource, ProviderSpec,
        load_models,
    },
    schema::{ChatConfig, JarvisConfig, MemoryConfig, ProviderEntry, ProvidersConfig, RouterConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
