//! Response bodies returned by the goals backend.

use serde::{Deserialize, Serialize};

/// `POST /goals/create`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalsResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub auth_url: Option<String>,
}

/// `GET /goals/callback`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Error body the backend sends alongside a failing status.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub step: Option<String>,
}

/// `GET /Goals/week-calculator`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekProgress {
    pub message: String,
    pub start_date: String,
    pub current_date: String,
    pub progress_percentage: f64,
    pub weeks_completed: u32,
    pub weeks_remaining: u32,
    pub days_since_start: i64,
    #[serde(default)]
    pub next_week_starts_on: Option<String>,
    pub is_completed: bool,
    #[serde(default)]
    pub current_week: Option<u32>,
    #[serde(default)]
    pub total_weeks: Option<u32>,
}

/// Where the backend got its list data from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSource {
    CachedToken,
    #[serde(other)]
    Fresh,
}

/// `GET /goals/get-lists-from-cache`, `POST /goals/auth-with-code`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoLists {
    /// Absent on some cache-miss bodies; read as `false`
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub total_lists: usize,
    #[serde(default)]
    pub list_names: Vec<String>,
    #[serde(default = "default_source")]
    pub source: ListSource,
    #[serde(default)]
    pub token_cached: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_source() -> ListSource {
    ListSource::Fresh
}

impl TodoLists {
    pub fn from_cache(&self) -> bool {
        self.source == ListSource::CachedToken
    }
}

/// `GET /goals/auth`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_progress_from_backend_json() {
        let json = r#"{
            "currentWeek": 2,
            "message": "You are in week 2 of your 12 weeks.",
            "startDate": "14/07/2025",
            "currentDate": "22/07/2025",
            "totalWeeks": 12,
            "weeksCompleted": 2,
            "weeksRemaining": 10,
            "progressPercentage": 16.7,
            "daysSinceStart": 8,
            "isCompleted": false,
            "nextWeekStartsOn": "28/07/2025"
        }"#;

        let progress: WeekProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.weeks_completed, 2);
        assert_eq!(progress.weeks_remaining, 10);
        assert!((progress.progress_percentage - 16.7).abs() < f64::EPSILON);
        assert_eq!(progress.next_week_starts_on.as_deref(), Some("28/07/2025"));
        assert!(!progress.is_completed);
    }

    #[test]
    fn test_lists_source() {
        let cached: TodoLists = serde_json::from_str(
            r#"{"success":true,"totalLists":2,"listNames":["A","B"],"source":"cached_token","message":"ok"}"#,
        )
        .unwrap();
        assert!(cached.from_cache());
        assert_eq!(cached.list_names, vec!["A", "B"]);

        let fresh: TodoLists = serde_json::from_str(
            r#"{"success":true,"totalLists":0,"listNames":[],"source":"browser_and_cache","tokenCached":true}"#,
        )
        .unwrap();
        assert!(!fresh.from_cache());
        assert_eq!(fresh.token_cached, Some(true));
    }

    #[test]
    fn test_create_response_without_auth_url() {
        let resp: CreateGoalsResponse = serde_json::from_str(r#"{"message":"done"}"#).unwrap();
        assert_eq!(resp.message.as_deref(), Some("done"));
        assert!(resp.auth_url.is_none());
    }
}
