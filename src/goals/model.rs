//! Goal group data model and the submission payload.

use chrono::{Datelike, NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of weeks in a plan; every goal carries one task per week.
pub const WEEKS: usize = 12;

/// Stable identity for a draft goal, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GoalId(Uuid);

impl GoalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated, trimmed goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    pub name: String,
    pub tasks: [String; WEEKS],
}

/// A validated goal group, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalGroup {
    pub name: String,
    pub start_date: NaiveDate,
    pub goals: Vec<Goal>,
}

impl GoalGroup {
    /// Build the JSON body for `POST /goals/create`.
    pub fn to_request(&self) -> CreateGoalsRequest {
        CreateGoalsRequest {
            goal_group_name: self.name.clone(),
            start_date: iso_timestamp(self.start_date),
            goals: self
                .goals
                .iter()
                .map(|g| GoalPayload {
                    name: g.name.clone(),
                    tasks: g.tasks.to_vec(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalsRequest {
    pub goal_group_name: String,
    pub start_date: String,
    pub goals: Vec<GoalPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalPayload {
    pub name: String,
    pub tasks: Vec<String>,
}

/// UTC midnight of `date` with millisecond precision, e.g. `2025-07-14T00:00:00.000Z`.
pub fn iso_timestamp(date: NaiveDate) -> String {
    date.and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The next Monday on or after `today`.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let days_ahead = (7 - today.weekday().num_days_from_monday()) % 7;
    today + chrono::Days::new(u64::from(days_ahead))
}

/// Parse the `YYYY-MM-DD` text the date field holds.
pub fn parse_start_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}
