//! Study session tracking, the focus timer and the homework-help prompt.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Focus length when `/focus` is given no minutes.
pub const DEFAULT_FOCUS_MINUTES: i64 = 25;

/// Subject recorded when `/study_start` is given none.
pub const DEFAULT_SUBJECT: &str = "General";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySession {
    pub subject: String,
    pub started: NaiveDateTime,
    pub ended: NaiveDateTime,
}

impl StudySession {
    #[must_use]
    pub fn minutes(&self) -> i64 {
        (self.ended - self.started).num_minutes()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudyStats {
    pub sessions: usize,
    pub total_minutes: i64,
    /// Hours, one decimal.
    pub total_hours: f64,
    pub by_subject: BTreeMap<String, i64>,
}

/// What [`StudyTracker::check_focus`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    Inactive,
    Running { remaining_minutes: i64 },
    /// The timer ran out since the last check. Reported once.
    Finished { minutes: i64 },
}

#[derive(Debug, Clone, Copy)]
struct FocusTimer {
    started: NaiveDateTime,
    minutes: i64,
}

#[derive(Debug, Default)]
pub struct StudyTracker {
    finished: Vec<StudySession>,
    active: Option<(String, NaiveDateTime)>,
    focus: Option<FocusTimer>,
    focus_completed: u32,
}

impl StudyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session on `subject`. A session still running is ended and
    /// recorded first, and returned.
    pub fn start_session(&mut self, subject: &str, now: NaiveDateTime) -> Option<StudySession> {
        let previous = self.end_session(now).ok();
        let subject = subject.trim();
        let subject = if subject.is_empty() {
            DEFAULT_SUBJECT
        } else {
            subject
        };
        self.active = Some((subject.to_string(), now));
        previous
    }

    pub fn end_session(&mut self, now: NaiveDateTime) -> Result<StudySession> {
        let (subject, started) = self.active.take().ok_or(Error::NoStudySession)?;
        let session = StudySession {
            subject,
            started,
            ended: now.max(started),
        };
        self.finished.push(session.clone());
        Ok(session)
    }

    #[must_use]
    pub fn active_subject(&self) -> Option<&str> {
        self.active.as_ref().map(|(s, _)| s.as_str())
    }

    /// Totals over ended sessions.
    #[must_use]
    pub fn stats(&self) -> StudyStats {
        let mut stats = StudyStats {
            sessions: self.finished.len(),
            ..Default::default()
        };
        for session in &self.finished {
            let minutes = session.minutes();
            stats.total_minutes += minutes;
            *stats.by_subject.entry(session.subject.clone()).or_default() += minutes;
        }
        stats.total_hours = (stats.total_minutes as f64 / 6.0).round() / 10.0;
        stats
    }

    /// Minutes of ended sessions that started on `date`.
    #[must_use]
    pub fn minutes_on(&self, date: NaiveDate) -> i64 {
        self.finished
            .iter()
            .filter(|s| s.started.date() == date)
            .map(StudySession::minutes)
            .sum()
    }

    pub fn start_focus(&mut self, minutes: i64, now: NaiveDateTime) {
        self.focus = Some(FocusTimer {
            started: now,
            minutes,
        });
    }

    /// Stop the timer early. Returns the minutes it ran, or `None` when no
    /// timer was running.
    pub fn stop_focus(&mut self, now: NaiveDateTime) -> Option<i64> {
        self.focus
            .take()
            .map(|f| (now - f.started).num_minutes().max(0))
    }

    /// Remaining time of the running timer. A timer that has run out is
    /// cleared, counted as completed and reported as finished once.
    pub fn check_focus(&mut self, now: NaiveDateTime) -> FocusState {
        let Some(timer) = self.focus else {
            return FocusState::Inactive;
        };
        let remaining = timer.minutes - (now - timer.started).num_minutes();
        if remaining > 0 {
            return FocusState::Running {
                remaining_minutes: remaining,
            };
        }
        self.focus = None;
        self.focus_completed += 1;
        FocusState::Finished {
            minutes: timer.minutes,
        }
    }

    /// Minutes left on a running timer, without clearing a finished one.
    #[must_use]
    pub fn focus_remaining(&self, now: NaiveDateTime) -> Option<i64> {
        self.focus
            .map(|f| f.minutes - (now - f.started).num_minutes())
            .filter(|m| *m > 0)
    }

    #[must_use]
    pub fn focus_completed(&self) -> u32 {
        self.focus_completed
    }
}

/// Parse the `/focus` argument: a positive number of minutes.
pub fn parse_focus_minutes(s: &str) -> Result<i64> {
    match s.parse::<i64>() {
        Ok(m) if m > 0 => Ok(m),
        _ => Err(Error::InvalidMinutes(s.to_string())),
    }
}

/// User message asking for structured help with one homework item.
#[must_use]
pub fn homework_help_prompt(subject: &str, description: &str) -> String {
    format!(
        "Help me with this homework:\nSubject: {subject}\nTask: {description}\n\nPlease \
         provide:\n1. Clear explanation of the concept\n2. Step-by-step solution approach\n3. \
         Example if applicable\n4. Tips for similar problems"
    )
}

#[cfg(test)]
mod tests {
    use {super::*, chrono::Duration};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 12)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap()
    }

    #[test]
    fn sessions_add_up_by_subject() {
        let t0 = start();
        let mut study = StudyTracker::new();
        assert_eq!(study.end_session(t0), Err(Error::NoStudySession));

        study.start_session("math", t0);
        assert_eq!(study.active_subject(), Some("math"));
        let ended = study.end_session(t0 + Duration::minutes(45)).unwrap();
        assert_eq!(ended.minutes(), 45);

        study.start_session("  ", t0 + Duration::minutes(60));
        study.end_session(t0 + Duration::minutes(75)).unwrap();
        study.start_session("math", t0 + Duration::minutes(80));
        study.end_session(t0 + Duration::minutes(110)).unwrap();

        let stats = study.stats();
        assert_eq!(stats.sessions, 3);
        assert_eq!(stats.total_minutes, 90);
        assert_eq!(stats.total_hours, 1.5);
        assert_eq!(stats.by_subject["math"], 75);
        assert_eq!(stats.by_subject[DEFAULT_SUBJECT], 15);
        assert_eq!(study.minutes_on(t0.date()), 90);
        assert_eq!(study.active_subject(), None);
    }

    #[test]
    fn starting_again_records_the_running_session() {
        let t0 = start();
        let mut study = StudyTracker::new();
        assert!(study.start_session("math", t0).is_none());
        let previous = study
            .start_session("physics", t0 + Duration::minutes(20))
            .unwrap();
        assert_eq!(previous.subject, "math");
        assert_eq!(study.stats().sessions, 1);
        assert_eq!(study.active_subject(), Some("physics"));
    }

    #[test]
    fn focus_counts_down_and_finishes_once() {
        let t0 = start();
        let mut study = StudyTracker::new();
        assert_eq!(study.check_focus(t0), FocusState::Inactive);

        study.start_focus(25, t0);
        assert_eq!(study.focus_remaining(t0 + Duration::minutes(5)), Some(20));
        assert_eq!(study.focus_remaining(t0 + Duration::minutes(30)), None);
        assert_eq!(
            study.check_focus(t0 + Duration::minutes(10)),
            FocusState::Running {
                remaining_minutes: 15
            }
        );
        assert_eq!(
            study.check_focus(t0 + Duration::minutes(25)),
            FocusState::Finished { minutes: 25 }
        );
        assert_eq!(study.check_focus(t0 + Duration::minutes(26)), FocusState::Inactive);
        assert_eq!(study.focus_completed(), 1);
    }

    #[test]
    fn stopping_focus_reports_elapsed() {
        let t0 = start();
        let mut study = StudyTracker::new();
        assert_eq!(study.stop_focus(t0), None);
        study.start_focus(50, t0);
        assert_eq!(study.stop_focus(t0 + Duration::minutes(12)), Some(12));
        assert_eq!(study.check_focus(t0), FocusState::Inactive);
        assert_eq!(study.focus_completed(), 0);
    }

    #[test]
    fn focus_minutes_must_be_positive() {
        assert_eq!(parse_focus_minutes("40").unwrap(), 40);
        assert!(parse_focus_minutes("0").is_err());
        assert!(parse_focus_minutes("soon").is_err());
    }

    #[test]
    fn help_prompt_names_subject_and_task() {
        let prompt = homework_help_prompt("physics", "Newton's second law");
        assert!(prompt.starts_with("Help me with this homework:\nSubject: physics\nTask: Newton's second law\n"));
        assert!(prompt.ends_with("4. Tips for similar problems"));
    }
}
