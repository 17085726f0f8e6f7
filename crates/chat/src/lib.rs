//! Chat session layer: slash commands, reply language, conversation memory,
//! the study planner and text rendering on top of the AI router.

pub mod commands;
pub mod error;
pub mod language;
pub mod memory;
pub mod planner;
pub mod reminders;
pub mod render;
pub mod schedule;
pub mod session;
pub mod study;

pub use {
    commands::Command,
    error::{Error, Result},
    language::{Language, LanguageDetector},
    memory::{MemoryEntry, MemoryManager, MemoryStats},
    planner::{Homework, Planner, Priority, Task},
    reminders::Reminder,
    schedule::{Class, Schedule},
    session::{ChatSession, Clock, describe_error},
    study::StudyTracker,
};
