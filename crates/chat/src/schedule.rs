//! Weekly class timetable and the time-of-day queries reminders run on.

use {
    chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday},
    uuid::Uuid,
};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub location: String,
    pub teacher: String,
}

impl Class {
    /// `HH:MM-HH:MM: name (location)`.
    #[must_use]
    pub fn line(&self) -> String {
        let location = if self.location.is_empty() {
            "-"
        } else {
            &self.location
        };
        format!(
            "{}-{}: {} ({location})",
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.name
        )
    }
}

/// How far through today's classes the day is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaySummary {
    pub today_total: usize,
    pub finished: usize,
    pub remaining: usize,
}

/// Accepts `monday`, `Mon`, `TUE`, ...
pub fn parse_day(s: &str) -> Result<Weekday> {
    s.parse::<Weekday>()
        .map_err(|_| Error::InvalidDay(s.to_string()))
}

pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| Error::InvalidTime(s.to_string()))
}

#[must_use]
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn minute_of_day(t: NaiveTime) -> i64 {
    i64::from(t.hour() * 60 + t.minute())
}

#[derive(Debug, Default)]
pub struct Schedule {
    classes: Vec<Class>,
}

impl Schedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(
        &mut self,
        name: &str,
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
        location: &str,
        teacher: &str,
    ) -> Result<&Class> {
        if end <= start {
            return Err(Error::EmptyClass {
                start: start.format("%H:%M").to_string(),
                end: end.format("%H:%M").to_string(),
            });
        }
        self.classes.push(Class {
            id: Uuid::new_v4().simple().to_string(),
            name: name.to_string(),
            day,
            start,
            end,
            location: location.to_string(),
            teacher: teacher.to_string(),
        });
        Ok(&self.classes[self.classes.len() - 1])
    }

    /// Remove the first class whose id starts with `prefix`.
    pub fn remove_class(&mut self, prefix: &str) -> Result<Class> {
        let prefix = prefix.to_lowercase();
        let index = self
            .classes
            .iter()
            .position(|c| !prefix.is_empty() && c.id.starts_with(&prefix))
            .ok_or_else(|| Error::NotFound {
                kind: "class",
                id: prefix.clone(),
            })?;
        Ok(self.classes.remove(index))
    }

    /// Classes on `day`, earliest first.
    #[must_use]
    pub fn day(&self, day: Weekday) -> Vec<&Class> {
        let mut classes: Vec<&Class> = self.classes.iter().filter(|c| c.day == day).collect();
        classes.sort_by_key(|c| c.start);
        classes
    }

    /// Every day that has classes, Monday first.
    #[must_use]
    pub fn weekly(&self) -> Vec<(Weekday, Vec<&Class>)> {
        let mut day = Weekday::Mon;
        let mut week = Vec::new();
        for _ in 0..7 {
            let classes = self.day(day);
            if !classes.is_empty() {
                week.push((day, classes));
            }
            day = day.succ();
        }
        week
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The class in progress at `now`, if any.
    #[must_use]
    pub fn current(&self, now: NaiveDateTime) -> Option<&Class> {
        let t = minute_of_day(now.time());
        self.day(now.weekday())
            .into_iter()
            .find(|c| minute_of_day(c.start) <= t && t < minute_of_day(c.end))
    }

    /// The next class today and the minutes until it starts.
    #[must_use]
    pub fn next(&self, now: NaiveDateTime) -> Option<(&Class, i64)> {
        let t = minute_of_day(now.time());
        self.day(now.weekday())
            .into_iter()
            .map(|c| (c, minute_of_day(c.start) - t))
            .find(|(_, until)| *until > 0)
    }

    /// Classes starting within `minutes_before`, with the minutes left.
    #[must_use]
    pub fn needing_alert(&self, now: NaiveDateTime, minutes_before: i64) -> Vec<(&Class, i64)> {
        let t = minute_of_day(now.time());
        self.day(now.weekday())
            .into_iter()
            .map(|c| (c, minute_of_day(c.start) - t))
            .filter(|(_, until)| 0 < *until && *until <= minutes_before)
            .collect()
    }

    /// Classes that ended within the last `minutes_ago`.
    #[must_use]
    pub fn just_ended(&self, now: NaiveDateTime, minutes_ago: i64) -> Vec<&Class> {
        let t = minute_of_day(now.time());
        self.day(now.weekday())
            .into_iter()
            .filter(|c| {
                let since = t - minute_of_day(c.end);
                0 < since && since <= minutes_ago
            })
            .collect()
    }

    #[must_use]
    pub fn summary(&self, now: NaiveDateTime) -> DaySummary {
        let t = minute_of_day(now.time());
        let today = self.day(now.weekday());
        let finished = today.iter().filter(|c| minute_of_day(c.end) <= t).count();
        DaySummary {
            today_total: today.len(),
            finished,
            remaining: today.len() - finished,
        }
    }
}
