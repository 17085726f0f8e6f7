//! Reminders derived from the timetable and the homework list at a given
//! moment.

use std::fmt::Write;

use chrono::{Days, NaiveDateTime};

use crate::{
    planner::{Planner, Priority},
    schedule::Schedule,
};

/// Minutes before a class starts when it is announced.
pub const PRE_CLASS_MINUTES: i64 = 15;
/// Minutes after a class ends during which the homework prompt is shown.
pub const POST_CLASS_MINUTES: i64 = 5;
/// Deadlines this many days away or closer get a reminder.
const DEADLINE_HORIZON_DAYS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    PreClass,
    PostClass,
    HomeworkDue,
    Overdue,
    Study,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub kind: ReminderKind,
    pub priority: Priority,
    pub message: String,
}

impl Reminder {
    /// Whether the user should act now rather than just take note.
    #[must_use]
    pub fn action_required(&self) -> bool {
        self.priority >= Priority::High
    }
}

/// Every reminder that applies at `now`.
#[must_use]
pub fn check_all(schedule: &Schedule, planner: &Planner, now: NaiveDateTime) -> Vec<Reminder> {
    let mut out = Vec::new();
    pre_class(schedule, now, &mut out);
    post_class(schedule, now, &mut out);
    deadlines(planner, now, &mut out);
    overdue(planner, now, &mut out);
    study(schedule, planner, now, &mut out);
    out
}

fn pre_class(schedule: &Schedule, now: NaiveDateTime, out: &mut Vec<Reminder>) {
    for (class, minutes) in schedule.needing_alert(now, PRE_CLASS_MINUTES) {
        let mut message = format!("{} starts in {minutes} min", class.name);
        if !class.location.is_empty() {
            let _ = write!(message, ", room {}", class.location);
        }
        if !class.teacher.is_empty() {
            let _ = write!(message, ", with {}", class.teacher);
        }
        message.push('.');
        out.push(Reminder {
            kind: ReminderKind::PreClass,
            priority: Priority::High,
            message,
        });
    }
}

fn post_class(schedule: &Schedule, now: NaiveDateTime, out: &mut Vec<Reminder>) {
    for class in schedule.just_ended(now, POST_CLASS_MINUTES) {
        out.push(Reminder {
            kind: ReminderKind::PostClass,
            priority: Priority::Medium,
            message: format!(
                "{} just ended. Any homework? Add it with /add_hw {} <description>.",
                class.name, class.name
            ),
        });
    }
}

fn deadlines(planner: &Planner, now: NaiveDateTime, out: &mut Vec<Reminder>) {
    let today = now.date();
    let tomorrow = today.checked_add_days(Days::new(1));
    let horizon = today.checked_add_days(Days::new(DEADLINE_HORIZON_DAYS));

    for hw in planner.pending_homework() {
        let Some(deadline) = hw.deadline else {
            continue;
        };
        let (priority, when) = if deadline == today {
            (Priority::Urgent, "is due TODAY")
        } else if Some(deadline) == tomorrow {
            (Priority::High, "is due tomorrow")
        } else if deadline > today && horizon.is_some_and(|h| deadline <= h) {
            (Priority::Medium, "is due within 3 days")
        } else {
            continue;
        };
        out.push(Reminder {
            kind: ReminderKind::HomeworkDue,
            priority,
            message: format!("{}: '{}' {when}.", hw.subject, hw.description),
        });
    }
}

fn overdue(planner: &Planner, now: NaiveDateTime, out: &mut Vec<Reminder>) {
    for hw in planner.overdue_homework(now.date()) {
        out.push(Reminder {
            kind: ReminderKind::Overdue,
            priority: Priority::Urgent,
            message: format!(
                "{}: '{}' is past its deadline. Do it as soon as possible.",
                hw.subject, hw.description
            ),
        });
    }
}

/// Once the last class of the day is over, nudge towards pending homework.
fn study(schedule: &Schedule, planner: &Planner, now: NaiveDateTime, out: &mut Vec<Reminder>) {
    let day = schedule.summary(now);
    if day.today_total == 0 || day.remaining > 0 {
        return;
    }
    let pending = planner.pending_homework().count();
    if pending > 0 {
        out.push(Reminder {
            kind: ReminderKind::Study,
            priority: Priority::Medium,
            message: format!("Classes are over for today. {pending} homework items are waiting."),
        });
    }
}

/// One line per reminder, most urgent first.
#[must_use]
pub fn format(reminders: &[Reminder]) -> String {
    if reminders.is_empty() {
        return "No reminders right now.".to_string();
    }
    let mut sorted: Vec<&Reminder> = reminders.iter().collect();
    sorted.sort_by_key(|r| std::cmp::Reverse(r.priority));
    let lines: Vec<String> = sorted
        .iter()
        .map(|r| format!("[{}] {}", r.priority, r.message))
        .collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{planner::parse_date, schedule::parse_time},
        chrono::{NaiveDate, Weekday},
    };

    /// Monday 2026-10-12.
    fn at(hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 12)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
    }

    fn schedule() -> Schedule {
        let mut s = Schedule::new();
        s.add_class(
            "math",
            Weekday::Mon,
            parse_time("09:00").unwrap(),
            parse_time("10:30").unwrap(),
            "A1",
            "Karimov",
        )
        .unwrap();
        s
    }

    fn kinds(reminders: &[Reminder]) -> Vec<ReminderKind> {
        reminders.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn class_start_and_end() {
        let s = schedule();
        let planner = Planner::new();

        let before = check_all(&s, &planner, at(8, 50));
        assert_eq!(kinds(&before), vec![ReminderKind::PreClass]);
        assert_eq!(before[0].message, "math starts in 10 min, room A1, with Karimov.");
        assert!(before[0].action_required());

        let after = check_all(&s, &planner, at(10, 33));
        assert_eq!(kinds(&after), vec![ReminderKind::PostClass]);
        assert!(after[0].message.contains("/add_hw math"));
        assert!(!after[0].action_required());

        assert!(check_all(&s, &planner, at(9, 30)).is_empty());
    }

    #[test]
    fn deadline_priorities() {
        let today = at(7, 0).date();
        let mut planner = Planner::new();
        for (desc, deadline) in [
            ("today", "2026-10-12"),
            ("tomorrow", "2026-10-13"),
            ("soon", "2026-10-15"),
            ("later", "2026-10-16"),
            ("late", "2026-10-11"),
        ] {
            planner.add_homework(
                "math",
                desc,
                Some(parse_date(deadline).unwrap()),
                Priority::Medium,
                today,
            );
        }
        planner.add_homework("art", "whenever", None, Priority::Low, today);

        let reminders = check_all(&Schedule::new(), &planner, at(7, 0));
        let got: Vec<(Priority, &str)> = reminders
            .iter()
            .map(|r| (r.priority, r.message.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (Priority::Urgent, "math: 'today' is due TODAY."),
                (Priority::High, "math: 'tomorrow' is due tomorrow."),
                (Priority::Medium, "math: 'soon' is due within 3 days."),
                (
                    Priority::Urgent,
                    "math: 'late' is past its deadline. Do it as soon as possible."
                ),
            ]
        );
    }

    #[test]
    fn study_nudge_after_last_class() {
        let s = schedule();
        let mut planner = Planner::new();
        assert!(check_all(&s, &planner, at(18, 0)).is_empty());

        planner.add_homework("math", "page 42", None, Priority::Medium, at(7, 0).date());
        assert_eq!(kinds(&check_all(&s, &planner, at(18, 0))), vec![ReminderKind::Study]);
        // Not while classes remain, and not on a day without classes.
        assert!(check_all(&s, &planner, at(9, 30)).is_empty());
        assert!(check_all(&Schedule::new(), &planner, at(18, 0)).is_empty());
    }

    #[test]
    fn format_puts_urgent_first() {
        assert_eq!(format(&[]), "No reminders right now.");

        let reminder = |priority: Priority, message: &str| Reminder {
            kind: ReminderKind::HomeworkDue,
            priority,
            message: message.to_string(),
        };
        let text = format(&[
            reminder(Priority::Medium, "b"),
            reminder(Priority::Urgent, "a"),
            reminder(Priority::Low, "d"),
            reminder(Priority::High, "c"),
        ]);
        assert_eq!(text, "[urgent] a\n[high] c\n[medium] b\n[low] d");
    }
}
