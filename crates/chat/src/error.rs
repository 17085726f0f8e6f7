use thiserror::Error;

/// Slash-command and planner failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown command '{0}'; type /help for the list of commands")]
    UnknownCommand(String),

    #[error("unexpected argument for {command}: {argument}")]
    UnexpectedArgument { command: String, argument: String },

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("invalid day '{0}', expected monday..sunday")]
    InvalidDay(String),

    #[error("invalid priority '{0}', expected low, medium, high or urgent")]
    InvalidPriority(String),

    #[error("invalid number of minutes '{0}'")]
    InvalidMinutes(String),

    #[error("class must end after it starts ({start}-{end})")]
    EmptyClass { start: String, end: String },

    #[error("no {kind} matches id '{id}'")]
    NotFound { kind: &'static str, id: String },

    #[error("no study session is running; start one with /study_start")]
    NoStudySession,
}

pub type Result<T> = std::result::Result<T, Error>;
