//! Daily time sheet records.
//!
//! Time entries come back under different shapes: reports wrap them as
//! `day_entry`, the daily sheet lists them bare, and the daily endpoints
//! answer with a bare [`Timer`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Model;
use crate::params;

/// A time entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DayEntry {
    pub id: u64,
    pub user_id: Option<u64>,
    pub project_id: Option<u64>,
    pub task_id: Option<u64>,
    pub spent_at: Option<NaiveDate>,
    pub hours: Option<Decimal>,
    pub hours_with_timer: Option<Decimal>,
    pub notes: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub timer_started_at: Option<DateTime<Utc>>,
    pub is_billed: Option<bool>,
    pub is_closed: Option<bool>,
    pub project: Option<String>,
    pub task: Option<String>,
    pub client: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for DayEntry {
    const ROOT: Option<&'static str> = Some("day_entry");
}

/// A user's entries for one day plus the projects they can log time to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Daily {
    pub for_day: Option<NaiveDate>,
    pub day_entries: Vec<DayEntry>,
    pub projects: Vec<DailyProject>,
}

impl Model for Daily {
    const ROOT: Option<&'static str> = None;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DailyProject {
    pub id: u64,
    pub name: Option<String>,
    pub code: Option<String>,
    pub billable: Option<bool>,
    pub client: Option<String>,
    pub client_id: Option<u64>,
    pub tasks: Vec<DailyTask>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DailyTask {
    pub id: u64,
    pub name: Option<String>,
    pub billable: Option<bool>,
}

/// An entry as returned by the daily endpoints, including timer state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Timer {
    pub id: u64,
    pub user_id: Option<u64>,
    pub project_id: Option<u64>,
    pub task_id: Option<u64>,
    pub spent_at: Option<NaiveDate>,
    pub hours: Option<Decimal>,
    pub notes: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub timer_started_at: Option<DateTime<Utc>>,
    pub hours_for_previously_running_timer: Option<Decimal>,
    pub project: Option<String>,
    pub task: Option<String>,
    pub client: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Timer {
    const ROOT: Option<&'static str> = None;
}

impl Timer {
    /// Whether the entry has a running timer.
    pub fn is_running(&self) -> bool {
        self.timer_started_at.is_some()
    }
}

/// Body of `daily/add` and `daily/update/{id}`. Sent without a root element.
///
/// Hours and clock times are pre-formatted strings: `"1.50"`, `"9:05am"`.
/// A single space in `hours` asks the service to start a timer.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DailyOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spent_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

const START_TIMER: &str = " ";

impl DailyOptions {
    fn entry(spent_at: NaiveDate, project_id: u64, task_id: u64) -> Self {
        Self {
            spent_at: Some(spent_at),
            project_id: Some(project_id),
            task_id: Some(task_id),
            ..Self::default()
        }
    }

    /// An entry with a fixed duration.
    pub fn with_hours(spent_at: NaiveDate, project_id: u64, task_id: u64, hours: Decimal) -> Self {
        Self::entry(spent_at, project_id, task_id).hours(hours)
    }

    /// An entry bounded by start and end clock times.
    pub fn with_times(
        spent_at: NaiveDate,
        project_id: u64,
        task_id: u64,
        started_at: NaiveTime,
        ended_at: NaiveTime,
    ) -> Self {
        Self::entry(spent_at, project_id, task_id).times(started_at, ended_at)
    }

    /// An entry that starts a running timer.
    pub fn timer(spent_at: NaiveDate, project_id: u64, task_id: u64) -> Self {
        Self {
            hours: Some(START_TIMER.to_string()),
            ..Self::entry(spent_at, project_id, task_id)
        }
    }

    pub fn hours(mut self, hours: Decimal) -> Self {
        self.hours = Some(params::hours(hours));
        self
    }

    pub fn times(mut self, started_at: NaiveTime, ended_at: NaiveTime) -> Self {
        self.started_at = Some(params::clock_time(started_at));
        self.ended_at = Some(params::clock_time(ended_at));
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Whether the options would start a timer.
    pub fn starts_timer(&self) -> bool {
        self.hours.as_deref() == Some(START_TIMER)
    }
}
