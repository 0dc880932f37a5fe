//! In-memory `GoalsApi` for tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;

use super::client::GoalsApi;
use super::error::ApiError;
use super::types::{
    AuthUrlResponse, CallbackResponse, CreateGoalsResponse, ListSource, TodoLists, WeekProgress,
};
use crate::goals::CreateGoalsRequest;

/// Canned answers; every call is recorded by name.
pub struct StubApi {
    pub create: Result<CreateGoalsResponse, ApiError>,
    pub callback: Result<CallbackResponse, ApiError>,
    pub progress: Result<WeekProgress, ApiError>,
    pub cached_lists: Result<Option<TodoLists>, ApiError>,
    pub auth_url: Result<AuthUrlResponse, ApiError>,
    pub code_lists: Result<TodoLists, ApiError>,
    pub calls: Mutex<Vec<String>>,
    pub submitted: Mutex<Vec<CreateGoalsRequest>>,
}

pub fn sample_lists(source: ListSource) -> TodoLists {
    TodoLists {
        success: true,
        total_lists: 2,
        list_names: vec!["Fitness".to_string(), "Reading".to_string()],
        source,
        token_cached: Some(true),
        message: Some("Lists retrieved".to_string()),
        error: None,
    }
}

pub fn sample_progress() -> WeekProgress {
    WeekProgress {
        message: "You are in week 2 of your 12 weeks.".to_string(),
        start_date: "14/07/2025".to_string(),
        current_date: "22/07/2025".to_string(),
        progress_percentage: 16.7,
        weeks_completed: 2,
        weeks_remaining: 10,
        days_since_start: 8,
        next_week_starts_on: Some("28/07/2025".to_string()),
        is_completed: false,
        current_week: Some(2),
        total_weeks: Some(12),
    }
}

impl Default for StubApi {
    fn default() -> Self {
        Self {
            create: Ok(CreateGoalsResponse {
                message: Some("Goals created".to_string()),
                auth_url: Some("https://login.example/authorize".to_string()),
            }),
            callback: Ok(CallbackResponse {
                message: Some("Authorized".to_string()),
                success: Some(true),
            }),
            progress: Ok(sample_progress()),
            cached_lists: Ok(None),
            auth_url: Ok(AuthUrlResponse {
                auth_url: "https://login.example/authorize".to_string(),
                message: None,
            }),
            code_lists: Ok(sample_lists(ListSource::Fresh)),
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }
}

impl StubApi {
    fn record(&self, call: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.to_string());
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl GoalsApi for StubApi {
    async fn create_goals(
        &self,
        request: &CreateGoalsRequest,
    ) -> Result<CreateGoalsResponse, ApiError> {
        self.record("create_goals");
        if let Ok(mut submitted) = self.submitted.lock() {
            submitted.push(request.clone());
        }
        self.create.clone()
    }

    async fn finalize_authorization(&self, _code: &str) -> Result<CallbackResponse, ApiError> {
        self.record("finalize_authorization");
        self.callback.clone()
    }

    async fn week_progress(&self, _start_date: NaiveDate) -> Result<WeekProgress, ApiError> {
        self.record("week_progress");
        self.progress.clone()
    }

    async fn lists_from_cache(&self) -> Result<Option<TodoLists>, ApiError> {
        self.record("lists_from_cache");
        self.cached_lists.clone()
    }

    async fn request_auth_url(&self) -> Result<AuthUrlResponse, ApiError> {
        self.record("request_auth_url");
        self.auth_url.clone()
    }

    async fn lists_with_code(&self, _code: &str) -> Result<TodoLists, ApiError> {
        self.record("lists_with_code");
        self.code_lists.clone()
    }
}
