//! Homework and general task tracking, kept in memory for the session.

use std::{fmt, str::FromStr};

use {chrono::NaiveDate, uuid::Uuid};

use crate::error::{Error, Result};

/// Pending items beyond which the workload counts as heavy.
const HEAVY_PENDING: usize = 5;
/// Overdue items beyond which the workload counts as heavy.
const HEAVY_OVERDUE: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// 1 (low) to 4 (urgent).
    #[must_use]
    pub fn score(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Urgent => 4,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(Error::InvalidPriority(s.to_string())),
        }
    }
}

/// Parse a `YYYY-MM-DD` deadline.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

/// First eight characters of a record id, the form shown to the user.
#[must_use]
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Homework {
    pub id: String,
    pub subject: String,
    pub description: String,
    pub assigned: NaiveDate,
    pub deadline: Option<NaiveDate>,
    pub priority: Priority,
    pub completed: bool,
}

impl Homework {
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.deadline.is_some_and(|d| d < today)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub deadline: Option<NaiveDate>,
    pub priority: Priority,
    pub category: String,
    pub completed: bool,
}

/// A pending homework or task, as listed by [`Planner::all_pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingItem<'a> {
    Homework(&'a Homework),
    Task(&'a Task),
}

impl PendingItem<'_> {
    #[must_use]
    pub fn priority(&self) -> Priority {
        match self {
            Self::Homework(h) => h.priority,
            Self::Task(t) => t.priority,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Homework(h) => &h.subject,
            Self::Task(t) => &t.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerStats {
    pub total_homework: usize,
    pub completed_homework: usize,
    pub pending_homework: usize,
    pub overdue_homework: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Percentage of all homework and tasks completed, one decimal.
    pub completion_rate: f64,
}

#[derive(Debug, Default)]
pub struct Planner {
    homework: Vec<Homework>,
    tasks: Vec<Task>,
}

impl Planner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_homework(
        &mut self,
        subject: &str,
        description: &str,
        deadline: Option<NaiveDate>,
        priority: Priority,
        today: NaiveDate,
    ) -> &Homework {
        self.homework.push(Homework {
            id: Uuid::new_v4().simple().to_string(),
            subject: subject.to_string(),
            description: description.to_string(),
            assigned: today,
            deadline,
            priority,
            completed: false,
        });
        &self.homework[self.homework.len() - 1]
    }

    /// Mark the first homework whose id starts with `prefix` as completed.
    pub fn complete_homework(&mut self, prefix: &str) -> Result<&Homework> {
        let hw = find_by_prefix(&mut self.homework, prefix, |h| &h.id).ok_or_else(|| {
            Error::NotFound {
                kind: "homework",
                id: prefix.to_string(),
            }
        })?;
        hw.completed = true;
        Ok(&*hw)
    }

    pub fn pending_homework(&self) -> impl Iterator<Item = &Homework> {
        self.homework.iter().filter(|h| !h.completed)
    }

    /// Every homework for `subject`, completed or not. Case-insensitive.
    pub fn homework_by_subject<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = &'a Homework> {
        self.homework
            .iter()
            .filter(move |h| h.subject.eq_ignore_ascii_case(subject))
    }

    pub fn overdue_homework(&self, today: NaiveDate) -> impl Iterator<Item = &Homework> {
        self.homework.iter().filter(move |h| h.is_overdue(today))
    }

    /// Pending homework due exactly on `date`.
    pub fn due_on(&self, date: NaiveDate) -> impl Iterator<Item = &Homework> {
        self.pending_homework()
            .filter(move |h| h.deadline == Some(date))
    }

    pub fn add_task(
        &mut self,
        title: &str,
        description: &str,
        deadline: Option<NaiveDate>,
        priority: Priority,
        category: &str,
    ) -> &Task {
        self.tasks.push(Task {
            id: Uuid::new_v4().simple().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            deadline,
            priority,
            category: category.to_string(),
            completed: false,
        });
        &self.tasks[self.tasks.len() - 1]
    }

    pub fn complete_task(&mut self, prefix: &str) -> Result<&Task> {
        let task = find_by_prefix(&mut self.tasks, prefix, |t| &t.id).ok_or_else(|| {
            Error::NotFound {
                kind: "task",
                id: prefix.to_string(),
            }
        })?;
        task.completed = true;
        Ok(&*task)
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completed)
    }

    /// Pending homework and tasks, highest priority first. Equal priorities
    /// keep insertion order, homework before tasks.
    #[must_use]
    pub fn all_pending(&self) -> Vec<PendingItem<'_>> {
        let mut items: Vec<PendingItem<'_>> = self
            .pending_homework()
            .map(PendingItem::Homework)
            .chain(self.pending_tasks().map(PendingItem::Task))
            .collect();
        items.sort_by_key(|i| std::cmp::Reverse(i.priority().score()));
        items
    }

    #[must_use]
    pub fn stats(&self, today: NaiveDate) -> PlannerStats {
        let total_homework = self.homework.len();
        let completed_homework = self.homework.iter().filter(|h| h.completed).count();
        let total_tasks = self.tasks.len();
        let completed_tasks = self.tasks.iter().filter(|t| t.completed).count();

        let total = total_homework + total_tasks;
        let completion_rate = if total == 0 {
            0.0
        } else {
            let rate = (completed_homework + completed_tasks) as f64 / total as f64 * 100.0;
            (rate * 10.0).round() / 10.0
        };

        PlannerStats {
            total_homework,
            completed_homework,
            pending_homework: total_homework - completed_homework,
            overdue_homework: self.overdue_homework(today).count(),
            total_tasks,
            completed_tasks,
            completion_rate,
        }
    }

    /// Warnings when the workload piles up: more than two overdue or more
    /// than five pending homework items.
    #[must_use]
    pub fn overload_warnings(&self, today: NaiveDate) -> Vec<String> {
        let stats = self.stats(today);
        let mut warnings = Vec::new();
        if stats.overdue_homework > HEAVY_OVERDUE {
            warnings.push(format!(
                "{} homework items are overdue. Clear them before taking on anything new.",
                stats.overdue_homework
            ));
        }
        if stats.pending_homework > HEAVY_PENDING {
            warnings.push(format!(
                "{} homework items are pending. Plan study blocks to work through them.",
                stats.pending_homework
            ));
        }
        warnings
    }
}

fn find_by_prefix<'a, T>(
    items: &'a mut [T],
    prefix: &str,
    id: impl Fn(&T) -> &String,
) -> Option<&'a mut T> {
    if prefix.is_empty() {
        return None;
    }
    let prefix = prefix.to_lowercase();
    items.iter_mut().find(|item| id(&**item).starts_with(&prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn priority_parses_and_scores() {
        assert_eq!("URGENT".parse::<Priority>().unwrap(), Priority::Urgent);
        assert_eq!(Priority::Low.score(), 1);
        assert_eq!(Priority::Urgent.score(), 4);
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(
            "asap".parse::<Priority>(),
            Err(Error::InvalidPriority("asap".into()))
        );
    }

    #[test]
    fn dates_must_be_iso() {
        assert!(parse_date("2026-10-16").is_ok());
        assert_eq!(
            parse_date("16.10.2026"),
            Err(Error::InvalidDate("16.10.2026".into()))
        );
    }

    #[test]
    fn homework_completes_by_id_prefix() {
        let today = date("2026-10-12");
        let mut planner = Planner::new();
        let id = planner
            .add_homework("math", "page 42", None, Priority::Medium, today)
            .id
            .clone();
        assert_eq!(id.len(), 32);

        let done = planner.complete_homework(short_id(&id)).unwrap();
        assert!(done.completed);
        assert_eq!(planner.pending_homework().count(), 0);

        assert!(matches!(
            planner.complete_homework("zzzz"),
            Err(Error::NotFound { kind: "homework", .. })
        ));
        assert!(planner.complete_homework("").is_err());
    }

    #[test]
    fn overdue_and_due_dates() {
        let today = date("2026-10-12");
        let mut planner = Planner::new();
        planner.add_homework("math", "late", Some(date("2026-10-10")), Priority::High, today);
        planner.add_homework("physics", "today", Some(today), Priority::Medium, today);
        planner.add_homework("art", "no deadline", None, Priority::Low, today);
        let done = planner
            .add_homework("math", "old", Some(date("2026-10-01")), Priority::Low, today)
            .id
            .clone();
        planner.complete_homework(&done).unwrap();

        let overdue: Vec<&str> = planner
            .overdue_homework(today)
            .map(|h| h.description.as_str())
            .collect();
        assert_eq!(overdue, vec!["late"]);
        assert_eq!(planner.due_on(today).count(), 1);
        assert_eq!(planner.homework_by_subject("MATH").count(), 2);
    }

    #[test]
    fn all_pending_orders_by_priority() {
        let today = date("2026-10-12");
        let mut planner = Planner::new();
        planner.add_homework("math", "a", None, Priority::Low, today);
        planner.add_task("call bank", "", None, Priority::Urgent, "general");
        planner.add_homework("physics", "b", None, Priority::High, today);

        let pending = planner.all_pending();
        let titles: Vec<&str> = pending.iter().map(PendingItem::title).collect();
        assert_eq!(titles, vec!["call bank", "physics", "math"]);
    }

    #[test]
    fn stats_count_everything() {
        let today = date("2026-10-12");
        let mut planner = Planner::new();
        assert_eq!(planner.stats(today).completion_rate, 0.0);

        planner.add_homework("math", "a", Some(date("2026-10-01")), Priority::Low, today);
        planner.add_homework("math", "b", None, Priority::Low, today);
        let task = planner.add_task("gym", "", None, Priority::Low, "health").id.clone();
        planner.complete_task(&task).unwrap();

        let stats = planner.stats(today);
        assert_eq!(stats.total_homework, 2);
        assert_eq!(stats.pending_homework, 2);
        assert_eq!(stats.overdue_homework, 1);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.completion_rate, 33.3);
    }

    #[test]
    fn overload_needs_more_than_the_thresholds() {
        let today = date("2026-10-12");
        let yesterday = date("2026-10-11");
        let mut planner = Planner::new();
        for i in 0..5 {
            let deadline = (i < 2).then_some(yesterday);
            planner.add_homework("math", "x", deadline, Priority::Medium, today);
        }
        assert!(planner.overload_warnings(today).is_empty());

        planner.add_homework("math", "x", Some(yesterday), Priority::Medium, today);
        let warnings = planner.overload_warnings(today);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("3 homework items are overdue"));
        assert!(warnings[1].starts_with("6 homework items are pending"));
    }
}
