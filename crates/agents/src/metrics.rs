//! Metric names and label keys recorded by the router.
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op.

/// Completion metrics
pub mod llm {
    /// Total number of successful completions
    pub const COMPLETIONS_TOTAL: &str = "jarvis_llm_completions_total";
    /// Failed completion attempts
    pub const COMPLETION_ERRORS_TOTAL: &str = "jarvis_llm_completion_errors_total";
    /// Duration of a single upstream attempt in seconds
    pub const COMPLETION_DURATION_SECONDS: &str = "jarvis_llm_completion_duration_seconds";
}

/// Common label keys
pub mod labels {
    pub const PROVIDER: &str = "provider";
    pub const MODEL: &str = "model";
    pub const ERROR_TYPE: &str = "error_type";
}
