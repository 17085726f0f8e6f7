//! Shared error helpers used across all jarvis crates.

pub mod error;

pub use error::FromMessage;
