//! AI request routing: provider selection with fallback, the upstream
//! transport, assistant modes and prompt assembly.

pub mod error;
pub mod metrics;
pub mod model;
pub mod modes;
pub mod prompt;
pub mod providers;
pub mod router;

pub use {
    error::RouterError,
    model::{ChatMessage, Role},
    modes::{Mode, ModeManager},
    providers::{ChatTransport, CompletionRequest, OpenAiCompatTransport},
    router::{AiRouter, AttemptOutcome, Selection},
};
