//! Slash commands understood by the chat session.

use chrono::{NaiveDate, NaiveTime, Weekday};

use crate::{
    error::{Error, Result},
    planner::{self, Priority},
    schedule,
    study::{self, DEFAULT_FOCUS_MINUTES},
};

/// Modes reachable through a dedicated shortcut (`/fast`, `/code`, ...).
const MODE_SHORTCUTS: &[&str] = &[
    "fast",
    "code",
    "pro",
    "study",
    "planner",
    "analytics",
    "automation",
];

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/fast`, `/code`, ... or `/mode <name>`.
    SwitchMode(String),
    /// `/default`: back to the configured default mode.
    DefaultMode,
    /// `/modes`, or `/mode` without a name.
    Modes,
    /// `/provider <name>` (also `/providers <name>`).
    Provider(String),
    /// `/provider` or `/providers` without a name.
    Providers,
    /// `/model <name...>` (also `/models <name...>`). The name may contain
    /// spaces.
    Model(String),
    /// `/model` or `/models` without a name.
    Models,
    Auto,
    Status,
    Clear,
    Help,
    AddHomework {
        subject: String,
        description: String,
        deadline: Option<NaiveDate>,
        priority: Priority,
    },
    DoneHomework(String),
    /// `/homework [subject]`: pending homework, or everything for a subject.
    Homework(Option<String>),
    AddTask {
        title: String,
        description: String,
        deadline: Option<NaiveDate>,
        priority: Priority,
        category: String,
    },
    DoneTask(String),
    Tasks,
    AddClass {
        name: String,
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
        location: String,
        teacher: String,
    },
    RemoveClass(String),
    /// `/schedule [day]`, today when no day is given.
    Schedule(Option<Weekday>),
    Week,
    Reminders,
    Today,
    /// `/stats`: homework and task totals.
    Stats,
    StudyStart(String),
    StudyEnd,
    StudyStats,
    /// `/focus [minutes]`: start the focus timer and switch to focus mode.
    Focus(i64),
    FocusStop,
    /// `/hw_help <subject> <description...>`.
    HomeworkHelp {
        subject: String,
        description: String,
    },
}

/// One line per command, shown by `/help`.
pub const HELP: &[(&str, &str)] = &[
    ("/fast /code /pro /study", "switch mode"),
    ("/planner /analytics /automation", "switch mode"),
    ("/default", "back to the default mode"),
    ("/mode <name>", "switch mode by name"),
    ("/modes", "list modes"),
    ("/provider <name>", "use only this provider"),
    ("/providers", "provider key status"),
    ("/model <name>", "use this model for every request"),
    ("/models", "list every provider's models"),
    ("/auto", "automatic provider and model selection"),
    ("/status", "current session state"),
    ("/clear", "forget the conversation history"),
    ("/help", "this list"),
    ("/add_hw <subject> <text> [YYYY-MM-DD] [priority]", "add homework"),
    ("/done_hw <id>", "mark homework done"),
    ("/homework [subject]", "pending homework"),
    ("/add_task <title> [text] [YYYY-MM-DD] [priority] [#category]", "add a task"),
    ("/done_task <id>", "mark a task done"),
    ("/tasks", "everything pending, by priority"),
    ("/add_class <name> <day> <HH:MM> <HH:MM> [room] [teacher]", "add a class"),
    ("/remove_class <id>", "remove a class"),
    ("/schedule [day]", "classes for a day"),
    ("/week", "weekly timetable"),
    ("/reminders", "what needs attention now"),
    ("/today", "today's overview"),
    ("/stats", "homework and task totals"),
    ("/study_start [subject]", "start a study session"),
    ("/study_end", "end the study session"),
    ("/study_stats", "study totals"),
    ("/focus [minutes]", "focus timer (default 25), switches to focus mode"),
    ("/focus stop", "stop the focus timer"),
    ("/hw_help <subject> <text>", "ask for help with homework"),
];

/// Parse `input` as a slash command.
///
/// Returns `None` when the input is ordinary chat text (does not start
/// with `/`).
pub fn parse(input: &str) -> Option<Result<Command>> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.split_whitespace();
    let head = parts.next()?.to_lowercase();
    let rest: Vec<&str> = parts.collect();
    let first = rest.first().map(|s| s.to_lowercase());

    let no_args = |cmd: Command| -> Result<Command> {
        match rest.first() {
            None => Ok(cmd),
            Some(arg) => Err(Error::UnexpectedArgument {
                command: head.clone(),
                argument: (*arg).to_string(),
            }),
        }
    };

    let name = head.trim_start_matches('/');
    let parsed = match name {
        _ if MODE_SHORTCUTS.contains(&name) => no_args(Command::SwitchMode(name.to_string())),
        "default" => no_args(Command::DefaultMode),
        "mode" => Ok(first.map_or(Command::Modes, Command::SwitchMode)),
        "modes" => no_args(Command::Modes),
        "provider" | "providers" => Ok(first.map_or(Command::Providers, Command::Provider)),
        "model" | "models" if rest.is_empty() => Ok(Command::Models),
        "model" | "models" => Ok(Command::Model(rest.join(" "))),
        "auto" => no_args(Command::Auto),
        "status" => no_args(Command::Status),
        "clear" => no_args(Command::Clear),
        "help" => no_args(Command::Help),
        "add_hw" => parse_add_homework(&rest),
        "done_hw" => one_arg(&rest, "/done_hw <id>").map(Command::DoneHomework),
        "homework" => Ok(Command::Homework(rest.first().map(|s| (*s).to_string()))),
        "add_task" => parse_add_task(&rest),
        "done_task" => one_arg(&rest, "/done_task <id>").map(Command::DoneTask),
        "tasks" => no_args(Command::Tasks),
        "add_class" => parse_add_class(&rest),
        "remove_class" => one_arg(&rest, "/remove_class <id>").map(Command::RemoveClass),
        "schedule" => match rest.as_slice() {
            [] => Ok(Command::Schedule(None)),
            [day] => schedule::parse_day(day).map(|d| Command::Schedule(Some(d))),
            _ => Err(Error::Usage("/schedule [day]")),
        },
        "week" => no_args(Command::Week),
        "reminders" => no_args(Command::Reminders),
        "today" => no_args(Command::Today),
        "stats" => no_args(Command::Stats),
        "study_start" => Ok(Command::StudyStart(rest.join(" "))),
        "study_end" => no_args(Command::StudyEnd),
        "study_stats" => no_args(Command::StudyStats),
        "focus" => match first.as_deref() {
            None => Ok(Command::Focus(DEFAULT_FOCUS_MINUTES)),
            Some("stop") => Ok(Command::FocusStop),
            Some(minutes) => study::parse_focus_minutes(minutes).map(Command::Focus),
        },
        "hw_help" => match rest.as_slice() {
            [subject, description @ ..] if !description.is_empty() => Ok(Command::HomeworkHelp {
                subject: (*subject).to_string(),
                description: description.join(" "),
            }),
            _ => Err(Error::Usage("/hw_help <subject> <description>")),
        },
        _ => Err(Error::UnknownCommand(head.clone())),
    };
    Some(parsed)
}

fn one_arg(rest: &[&str], usage: &'static str) -> Result<String> {
    match rest {
        [arg] => Ok((*arg).to_string()),
        _ => Err(Error::Usage(usage)),
    }
}

fn looks_like_date(word: &str) -> bool {
    let b = word.as_bytes();
    b.len() == 10 && b[4] == b'-' && b[7] == b'-'
}

/// Optional trailing fields shared by `/add_hw` and `/add_task`, peeled off
/// the end in reverse order: `[#category]`, `[priority]`, `[YYYY-MM-DD]`.
struct Trailing<'a> {
    words: &'a [&'a str],
    deadline: Option<NaiveDate>,
    priority: Priority,
    category: Option<String>,
}

fn split_trailing<'a>(mut words: &'a [&'a str]) -> Result<Trailing<'a>> {
    let mut category = None;
    if let [head @ .., last] = words
        && let Some(tag) = last.strip_prefix('#')
        && !tag.is_empty()
    {
        category = Some(tag.to_lowercase());
        words = head;
    }
    let mut priority = Priority::default();
    if let [head @ .., last] = words
        && let Ok(p) = last.parse::<Priority>()
    {
        priority = p;
        words = head;
    }
    let mut deadline = None;
    if let [head @ .., last] = words
        && looks_like_date(last)
    {
        deadline = Some(planner::parse_date(last)?);
        words = head;
    }
    Ok(Trailing {
        words,
        deadline,
        priority,
        category,
    })
}

fn parse_add_homework(rest: &[&str]) -> Result<Command> {
    const USAGE: &str = "/add_hw <subject> <description> [YYYY-MM-DD] [low|medium|high|urgent]";
    let [subject, tail @ ..] = rest else {
        return Err(Error::Usage(USAGE));
    };
    let trailing = split_trailing(tail)?;
    if trailing.words.is_empty() || trailing.category.is_some() {
        return Err(Error::Usage(USAGE));
    }
    Ok(Command::AddHomework {
        subject: (*subject).to_string(),
        description: trailing.words.join(" "),
        deadline: trailing.deadline,
        priority: trailing.priority,
    })
}

fn parse_add_task(rest: &[&str]) -> Result<Command> {
    let [title, tail @ ..] = rest else {
        return Err(Error::Usage(
            "/add_task <title> [description] [YYYY-MM-DD] [priority] [#category]",
        ));
    };
    let trailing = split_trailing(tail)?;
    Ok(Command::AddTask {
        title: (*title).to_string(),
        description: trailing.words.join(" "),
        deadline: trailing.deadline,
        priority: trailing.priority,
        category: trailing.category.unwrap_or_else(|| "general".to_string()),
    })
}

fn parse_add_class(rest: &[&str]) -> Result<Command> {
    let [name, day, start, end, extra @ ..] = rest else {
        return Err(Error::Usage(
            "/add_class <name> <day> <HH:MM> <HH:MM> [room] [teacher]",
        ));
    };
    Ok(Command::AddClass {
        name: (*name).to_string(),
        day: schedule::parse_day(day)?,
        start: schedule::parse_time(start)?,
        end: schedule::parse_time(end)?,
        location: extra.first().map(|s| (*s).to_string()).unwrap_or_default(),
        teacher: extra.get(1..).map(|t| t.join(" ")).unwrap_or_default(),
    })
}
