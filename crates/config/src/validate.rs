//! Configuration validation.
//!
//! Two entry points:
//! - [`validate`] checks the settings file for syntax errors, unknown fields
//!   and values that cannot be deserialized.
//! - [`normalize_models`] cleans up a models registry (unknown or duplicate
//!   fallback entries, dangling default provider, missing tiers) and reports
//!   what it changed.

use std::path::{Path, PathBuf};

use crate::{
    models::{MODEL_TIERS, ModelsConfig},
    schema::JarvisConfig,
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "unknown-provider",
    /// "fallback-order", "missing-model", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "router.request_timeout_secs"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating the settings file.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Known settings keys, per section. Sections whose keys are dynamic
/// (`providers`) map to the fields allowed inside each entry.
const SECTIONS: &[(&str, &[&str])] = &[
    ("chat", &["default_mode", "language"]),
    ("router", &[
        "models_config_path",
        "request_timeout_secs",
        "temperature",
        "max_tokens",
    ]),
    ("memory", &["short_term_limit", "long_term", "long_term_limit"]),
    ("providers", &["enabled", "api_key"]),
];

// ── Suggestions ─────────────────────────────────────────────────────────────

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Closest candidate within `max_distance` edits, if any.
fn suggest<'a>(
    needle: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    max_distance: usize,
) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|c| (c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

fn unknown_message(key: &str, hint: Option<&str>) -> String {
    match hint {
        Some(s) => format!("unknown field \"{key}\" (did you mean \"{s}\"?)"),
        None => format!("unknown field \"{key}\""),
    }
}

// ── Settings file ───────────────────────────────────────────────────────────

/// Validate the settings file at `path`, or the discovered one when `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => crate::loader::find_config_file(),
    };

    let Some(actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Info,
                "file-ref",
                "",
                "no settings file found; using defaults",
            )],
            config_path: None,
        };
    };

    let mut result = match crate::loader::load_config_value(&actual_path) {
        Ok(value) => validate_value(&value),
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                e.to_string(),
            )],
            config_path: None,
        },
    };
    result.config_path = Some(actual_path);
    result
}

/// Validate an already-parsed settings document.
#[must_use]
pub fn validate_value(value: &serde_json::Value) -> ValidationResult {
    let mut diagnostics = Vec::new();

    let Some(root) = value.as_object() else {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            "settings must be a table at the top level",
        ));
        return ValidationResult {
            diagnostics,
            config_path: None,
        };
    };

    let section_names = SECTIONS.iter().map(|(name, _)| *name);
    for (key, section) in root {
        let Some((_, fields)) = SECTIONS.iter().find(|(name, _)| *name == key.as_str()) else {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "unknown-field",
                key.clone(),
                unknown_message(key, suggest(key, section_names.clone(), 3)),
            ));
            continue;
        };

        let Some(table) = section.as_object() else {
            continue;
        };

        if key == "providers" {
            for (provider, entry) in table {
                for field in entry.as_object().into_iter().flat_map(|e| e.keys()) {
                    if !fields.contains(&field.as_str()) {
                        diagnostics.push(Diagnostic::new(
                            Severity::Error,
                            "unknown-field",
                            format!("providers.{provider}.{field}"),
                            unknown_message(field, suggest(field, fields.iter().copied(), 3)),
                        ));
                    }
                }
            }
            continue;
        }

        for field in table.keys() {
            if !fields.contains(&field.as_str()) {
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "unknown-field",
                    format!("{key}.{field}"),
                    unknown_message(field, suggest(field, fields.iter().copied(), 3)),
                ));
            }
        }
    }

    match serde_json::from_value::<JarvisConfig>(value.clone()) {
        Ok(config) => check_semantics(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_semantics(config: &JarvisConfig, diagnostics: &mut Vec<Diagnostic>) {
    if config.router.request_timeout_secs == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "router.request_timeout_secs",
            "timeout must be at least one second",
        ));
    }
    if !(0.0..=2.0).contains(&config.router.temperature) {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "type-error",
            "router.temperature",
            "temperature outside 0.0..=2.0 is rejected by most providers",
        ));
    }
    if config.memory.short_term_limit == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "type-error",
            "memory.short_term_limit",
            "a zero limit drops the conversation history on every turn",
        ));
    }
}

// ── Models registry ─────────────────────────────────────────────────────────

/// Normalize a models registry so that the fallback order only names
/// registered providers, each at most once.
///
/// A registry without a fallback order gets the default provider followed by
/// the remaining providers in name order. A given order is never widened: if
/// none of its entries are registered, automatic selection has no providers.
#[must_use]
pub fn normalize_models(mut config: ModelsConfig) -> (ModelsConfig, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    if config.providers.is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "unknown-provider",
            "providers",
            "models registry defines no providers",
        ));
    }

    for (name, spec) in &config.providers {
        if spec.base_url.trim().is_empty() {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "file-ref",
                format!("providers.{name}.base_url"),
                "base_url is empty; every request to this provider will fail",
            ));
        }
        for tier in MODEL_TIERS {
            if spec.models.resolve(tier).is_none() {
                diagnostics.push(Diagnostic::new(
                    Severity::Info,
                    "missing-model",
                    format!("providers.{name}.models.{tier}"),
                    format!("no \"{tier}\" model; provider is skipped in that mode"),
                ));
            }
        }
    }

    if let Some(default) = config.default_provider.clone()
        && !config.contains(&default)
    {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "unknown-provider",
            "default_provider",
            unknown_provider_message(&config, &default),
        ));
        config.default_provider = None;
    }

    let mut order: Vec<String> = Vec::with_capacity(config.fallback_order.len());
    for (i, name) in config.fallback_order.iter().enumerate() {
        let path = format!("fallback_order[{i}]");
        if !config.contains(name) {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                "unknown-provider",
                path,
                unknown_provider_message(&config, name),
            ));
        } else if order.contains(name) {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                "fallback-order",
                path,
                format!("\"{name}\" listed more than once; later entry ignored"),
            ));
        } else {
            order.push(name.clone());
        }
    }

    if order.is_empty() && !config.fallback_order.is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "fallback-order",
            "fallback_order",
            "no entry names a registered provider; automatic selection is disabled",
        ));
    } else if order.is_empty() && !config.providers.is_empty() {
        if let Some(default) = &config.default_provider {
            order.push(default.clone());
        }
        for name in config.providers.keys() {
            if !order.contains(name) {
                order.push(name.clone());
            }
        }
        diagnostics.push(Diagnostic::new(
            Severity::Info,
            "fallback-order",
            "fallback_order",
            format!("no fallback order given; using {}", order.join(", ")),
        ));
    }

    config.fallback_order = order;
    (config, diagnostics)
}

fn unknown_provider_message(config: &ModelsConfig, name: &str) -> String {
    match suggest(name, config.provider_names(), 3) {
        Some(s) => format!("unknown provider \"{name}\" (did you mean \"{s}\"?); ignored"),
        None => format!("unknown provider \"{name}\"; ignored"),
    }
}
