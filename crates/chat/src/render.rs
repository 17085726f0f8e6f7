//! Plain-text listings for providers, models, modes and the study planner.

use std::fmt::Write;

use {
    chrono::{Datelike, NaiveDateTime, Weekday},
    jarvis_agents::{AiRouter, ModeManager},
};

use crate::{
    planner::{Homework, PendingItem, Planner, PlannerStats, short_id},
    schedule::{Class, Schedule, day_name},
    study::{StudyStats, StudyTracker},
};

/// Pending homework shown by `/today`.
const TODAY_HOMEWORK_LIMIT: usize = 5;

/// One line per registry provider: key status and whether it is forced.
#[must_use]
pub fn provider_status(router: &AiRouter) -> String {
    let forced = router.current_provider().forced();
    let mut out = String::from("Providers:");
    for name in router.models().provider_names() {
        let status = if router.keys().has_key(name) {
            "API key set"
        } else {
            "no API key"
        };
        let marker = if forced == Some(name) {
            "  <- selected"
        } else {
            ""
        };
        let _ = write!(out, "\n  - {name}: {status}{marker}");
    }
    out
}

/// Every provider's model catalogue, with the modes each model serves.
#[must_use]
pub fn model_listing(router: &AiRouter) -> String {
    let mut out = String::new();
    for (name, spec) in &router.models().providers {
        let status = if router.keys().has_key(name) {
            "available"
        } else {
            "no API key"
        };
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = write!(out, "{} ({status})", name.to_uppercase());
        for model in spec.models.catalogue() {
            let modes = spec.models.modes_for(model);
            if modes.is_empty() {
                let _ = write!(out, "\n  - {model}");
            } else {
                let _ = write!(out, "\n  - {model} [{}]", modes.join(", "));
            }
        }
    }
    out
}

/// All modes, marking the current one.
#[must_use]
pub fn mode_listing(modes: &ModeManager) -> String {
    let current = modes.current().name;
    let mut out = String::from("Modes:");
    for mode in modes.list() {
        let marker = if mode.name == current {
            "  (current)"
        } else {
            ""
        };
        let _ = write!(out, "\n  /{} - {}{marker}", mode.name, mode.display_name);
    }
    out.push_str("\n\nSwitch with /mode <name> or /<name>.");
    out
}

/// Classes of one day, with the ids `/remove_class` takes.
#[must_use]
pub fn class_listing(day: Weekday, classes: &[&Class]) -> String {
    if classes.is_empty() {
        return format!("No classes on {}.", day_name(day));
    }
    let mut out = format!("Classes on {}:", day_name(day));
    for class in classes {
        let _ = write!(out, "\n  {} [{}]", class.line(), short_id(&class.id));
    }
    out
}

#[must_use]
pub fn week_listing(schedule: &Schedule) -> String {
    let week = schedule.weekly();
    if week.is_empty() {
        return "The timetable is empty. Add classes with /add_class.".to_string();
    }
    let mut out = String::from("Weekly timetable:");
    for (day, classes) in week {
        let _ = write!(out, "\n{}:", day_name(day));
        for class in classes {
            let _ = write!(out, "\n  {}", class.line());
        }
    }
    out
}

fn homework_line(hw: &Homework, now: NaiveDateTime) -> String {
    let mut line = format!("[{}] {}: {}", short_id(&hw.id), hw.subject, hw.description);
    if let Some(deadline) = hw.deadline {
        let _ = write!(line, " (due {deadline}, {})", hw.priority);
    } else {
        let _ = write!(line, " ({})", hw.priority);
    }
    if hw.completed {
        line.push_str(" done");
    } else if hw.is_overdue(now.date()) {
        line.push_str(" OVERDUE");
    }
    line
}

#[must_use]
pub fn homework_listing<'a>(
    title: &str,
    homework: impl IntoIterator<Item = &'a Homework>,
    now: NaiveDateTime,
) -> String {
    let mut out = format!("{title}:");
    let mut any = false;
    for hw in homework {
        let _ = write!(out, "\n  {}", homework_line(hw, now));
        any = true;
    }
    if !any {
        out.push_str(" none");
    }
    out
}

/// Pending homework and tasks, most important first.
#[must_use]
pub fn pending_listing(items: &[PendingItem<'_>]) -> String {
    if items.is_empty() {
        return "Nothing pending.".to_string();
    }
    let mut out = String::from("Pending, by priority:");
    for item in items {
        match item {
            PendingItem::Homework(hw) => {
                let _ = write!(
                    out,
                    "\n  [{}] homework {}: {} ({})",
                    short_id(&hw.id),
                    hw.subject,
                    hw.description,
                    hw.priority
                );
            },
            PendingItem::Task(task) => {
                let _ = write!(
                    out,
                    "\n  [{}] task {} #{} ({})",
                    short_id(&task.id),
                    task.title,
                    task.category,
                    task.priority
                );
                if !task.description.is_empty() {
                    let _ = write!(out, ": {}", task.description);
                }
                if let Some(deadline) = task.deadline {
                    let _ = write!(out, ", due {deadline}");
                }
            },
        }
    }
    out
}

#[must_use]
pub fn planner_stats(stats: &PlannerStats, warnings: &[String]) -> String {
    let mut out = format!(
        "Homework: {} total, {} done, {} pending, {} overdue\nTasks: {} total, {} done\nCompletion: \
         {:.1}%",
        stats.total_homework,
        stats.completed_homework,
        stats.pending_homework,
        stats.overdue_homework,
        stats.total_tasks,
        stats.completed_tasks,
        stats.completion_rate
    );
    for warning in warnings {
        let _ = write!(out, "\nWarning: {warning}");
    }
    out
}

#[must_use]
pub fn study_stats(stats: &StudyStats) -> String {
    if stats.sessions == 0 {
        return "No study sessions yet. Start one with /study_start <subject>.".to_string();
    }
    let mut out = format!(
        "Study: {} sessions, {} min ({:.1} h)",
        stats.sessions, stats.total_minutes, stats.total_hours
    );
    for (subject, minutes) in &stats.by_subject {
        let _ = write!(out, "\n  - {subject}: {minutes} min");
    }
    out
}

/// The `/today` overview: classes, pending homework, study time and
/// workload warnings.
#[must_use]
pub fn today_overview(
    now: NaiveDateTime,
    schedule: &Schedule,
    planner: &Planner,
    study: &StudyTracker,
) -> String {
    let today = now.date();
    let mut out = format!("Today: {today} {}", day_name(today.weekday()));

    let classes = schedule.day(today.weekday());
    if classes.is_empty() {
        out.push_str("\nClasses: none");
    } else {
        let _ = write!(out, "\nClasses ({}):", classes.len());
        for class in &classes {
            let _ = write!(out, "\n  {}", class.line());
        }
        if let Some(current) = schedule.current(now) {
            let _ = write!(out, "\nNow: {}", current.name);
        }
        if let Some((next, minutes)) = schedule.next(now) {
            let _ = write!(out, "\nNext: {} in {minutes} min", next.name);
        }
    }

    let pending: Vec<&Homework> = planner.pending_homework().collect();
    if pending.is_empty() {
        out.push_str("\nPending homework: none");
    } else {
        let _ = write!(out, "\nPending homework ({}):", pending.len());
        for hw in pending.iter().take(TODAY_HOMEWORK_LIMIT) {
            let _ = write!(out, "\n  - {}: {}", hw.subject, hw.description);
        }
    }

    let studied = study.minutes_on(today);
    if studied > 0 {
        let _ = write!(out, "\nStudied today: {studied} min");
    }
    for warning in planner.overload_warnings(today) {
        let _ = write!(out, "\nWarning: {warning}");
    }
    out
}
