use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::JarvisConfig,
};

/// Settings file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["jarvis.toml", "jarvis.yaml", "jarvis.yml", "jarvis.json"];

/// The user-global config directory (`~/.config/jarvis/` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "jarvis").map(|d| d.config_dir().to_path_buf())
}

/// Load settings from the given path (TOML, YAML or JSON by extension).
pub fn load_config(path: &Path) -> Result<JarvisConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    let config = parse_config(&raw, path)?;
    check_limits(&config)?;
    Ok(config)
}

/// Values that deserialize fine but would make the assistant unusable.
fn check_limits(config: &JarvisConfig) -> Result<()> {
    if config.router.request_timeout_secs == 0 {
        return Err(Error::message(
            "router.request_timeout_secs must be at least 1",
        ));
    }
    Ok(())
}

/// Load settings as an untyped value (used by validation).
pub fn load_config_value(path: &Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config_value(&raw, path)
}

/// Discover and load settings from standard locations, then apply
/// environment overrides.
///
/// Search order:
/// 1. `./jarvis.{toml,yaml,yml,json}`
/// 2. `<config dir>/jarvis.{toml,yaml,yml,json}`
///
/// A missing or unreadable file yields the defaults.
pub fn discover_and_load() -> JarvisConfig {
    let mut config = match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading settings");
            load_config(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "failed to load settings, using defaults");
                JarvisConfig::default()
            })
        },
        None => {
            debug!("no settings file found, using defaults");
            JarvisConfig::default()
        },
    };
    apply_env_overrides(&mut config);
    config
}

/// Apply `JARVIS_DEFAULT_MODE`, `MODELS_CONFIG_PATH` and
/// `JARVIS_REQUEST_TIMEOUT_SECS` on top of a loaded config.
pub fn apply_env_overrides(config: &mut JarvisConfig) {
    apply_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_overrides_with(config: &mut JarvisConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(mode) = get("JARVIS_DEFAULT_MODE") {
        config.chat.default_mode = mode.to_lowercase();
    }
    if let Some(path) = get("MODELS_CONFIG_PATH") {
        config.router.models_config_path = PathBuf::from(path);
    }
    if let Some(raw) = get("JARVIS_REQUEST_TIMEOUT_SECS") {
        match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => config.router.request_timeout_secs = secs,
            _ => warn!(value = %raw, "ignoring invalid JARVIS_REQUEST_TIMEOUT_SECS"),
        }
    }
}

/// First settings file found in the standard locations.
pub(crate) fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("toml")
}

fn parse_config(raw: &str, path: &Path) -> Result<JarvisConfig> {
    match extension(path) {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}

fn parse_config_value(raw: &str, path: &Path) -> Result<serde_json::Value> {
    match extension(path) {
        "toml" => {
            let v: toml::Value = toml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "yaml" | "yml" => {
            let v: serde_yaml::Value = serde_yaml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "json" => Ok(serde_json::from_str(raw)?),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}
