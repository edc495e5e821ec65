//! Weekly training report for one athlete

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeMap;

use crate::{
    calendar::{CalendarError, week_of},
    workout::SetEntry,
};

/// An exercise line in the report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub name: String,
    pub sets: Vec<SetEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDay {
    pub date: NaiveDate,
    pub entries: Vec<ReportEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyReport {
    pub first_name: String,
    pub last_name: String,
    pub coach_name: Option<String>,
    pub generated_on: NaiveDate,
    pub days: Vec<ReportDay>,
}

impl ReportEntry {
    /// `reps | load` for each set, an em dash for blank sets
    pub fn set_cells(&self) -> Vec<String> {
        self.sets
            .iter()
            .map(|set| {
                if set.reps.trim().is_empty() && set.load().trim().is_empty() {
                    "—".to_string()
                } else {
                    format!("{} | {}", set.reps.trim(), set.load().trim())
                }
            })
            .collect()
    }
}

impl ReportDay {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn is_rest(&self) -> bool {
        self.entries.is_empty()
    }

    /// "Monday Jan 1"
    pub fn title(&self) -> String {
        format!("{} {}", weekday_name(self.weekday()), self.date.format("%b %-d"))
    }
}

impl WeeklyReport {
    /// Lay the scheduled workouts of the week containing `week_of_date` out
    /// Monday..Sunday. Dates outside that week are ignored.
    pub fn build(
        first_name: Option<&str>,
        last_name: Option<&str>,
        coach_name: Option<&str>,
        week_of_date: NaiveDate,
        generated_on: NaiveDate,
        scheduled: &BTreeMap<NaiveDate, Vec<ReportEntry>>,
    ) -> Result<Self, CalendarError> {
        let days = week_of(week_of_date)?
            .into_iter()
            .map(|date| ReportDay {
                date,
                entries: scheduled.get(&date).cloned().unwrap_or_default(),
            })
            .collect();

        Ok(Self {
            first_name: first_name.unwrap_or_default().trim().to_string(),
            last_name: last_name.unwrap_or_default().trim().to_string(),
            coach_name: coach_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            generated_on,
            days,
        })
    }

    pub fn athlete_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            "Unnamed".to_string()
        } else {
            full.to_string()
        }
    }

    /// `Athlete: Jane Doe | Coach: Sam | Jan 1, 2024`
    pub fn subtitle(&self) -> String {
        let coach = self
            .coach_name
            .as_deref()
            .map(|name| format!(" | Coach: {}", name))
            .unwrap_or_default();
        format!(
            "Athlete: {}{} | {}",
            self.athlete_name(),
            coach,
            self.generated_on.format("%b %-d, %Y")
        )
    }

    /// `MM.DD.YYYY.First.Last.Weekly Training Report`
    pub fn file_stem(&self) -> String {
        let first = if self.first_name.is_empty() {
            "Athlete"
        } else {
            &self.first_name
        };
        format!(
            "{}.{}.{}.Weekly Training Report",
            self.generated_on.format("%m.%d.%Y"),
            first,
            self.last_name
        )
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
