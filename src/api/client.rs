//! Goals backend HTTP client
//!
//! Every GET carries a `_t` timestamp and no-store headers: the backend sits
//! behind caching infrastructure whose answers are not trusted.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{CACHE_CONTROL, EXPIRES, HeaderMap, HeaderValue, PRAGMA};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::error::ApiError;
use super::types::{
    AuthUrlResponse, CallbackResponse, CreateGoalsResponse, ServerErrorBody, TodoLists,
    WeekProgress,
};
use crate::config::ApiConfig;
use crate::goals::CreateGoalsRequest;

pub const CREATE_GOALS_PATH: &str = "/goals/create";
pub const CALLBACK_PATH: &str = "/goals/callback";
pub const WEEK_CALCULATOR_PATH: &str = "/Goals/week-calculator";
pub const LISTS_FROM_CACHE_PATH: &str = "/goals/get-lists-from-cache";
pub const AUTH_URL_PATH: &str = "/goals/auth";
pub const AUTH_WITH_CODE_PATH: &str = "/goals/auth-with-code";

/// Operations the app needs from the backend
#[async_trait]
pub trait GoalsApi: Send + Sync {
    async fn create_goals(
        &self,
        request: &CreateGoalsRequest,
    ) -> Result<CreateGoalsResponse, ApiError>;

    async fn finalize_authorization(&self, code: &str) -> Result<CallbackResponse, ApiError>;

    async fn week_progress(&self, start_date: NaiveDate) -> Result<WeekProgress, ApiError>;

    /// `Ok(None)` when the backend has no usable cached token.
    async fn lists_from_cache(&self) -> Result<Option<TodoLists>, ApiError>;

    async fn request_auth_url(&self) -> Result<AuthUrlResponse, ApiError>;

    async fn lists_with_code(&self, code: &str) -> Result<TodoLists, ApiError>;
}

/// Append a cache-busting `_t` parameter to `url`.
pub fn cache_busting_url(url: &str, timestamp_ms: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}_t={}", url, separator, timestamp_ms)
}

fn no_store_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    headers
}

/// Map a failing response body to `ApiError::Server`, keeping whatever
/// diagnostic context the backend included.
fn server_error(status: u16, body: &str) -> ApiError {
    let parsed: ServerErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error
        .or(parsed.message)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP error! status: {}", status)
            } else {
                crate::utils::truncate_str(trimmed, 200).to_string()
            }
        });
    ApiError::Server {
        status,
        step: parsed.step,
        message,
    }
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::with_base_url(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        if base_url.trim().is_empty() {
            return Err(ApiError::Config("base URL is empty".to_string()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Cache-busted URL for a GET to `path` (which may carry its own query).
    fn get_url(&self, path: &str) -> String {
        cache_busting_url(&self.endpoint(path), chrono::Utc::now().timestamp_millis())
    }

    async fn send_get(&self, path: &str) -> Result<Response, ApiError> {
        let url = self.get_url(path);
        tracing::debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .headers(no_store_headers())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        tracing::debug!("GET {} -> {}", path, response.status());
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(server_error(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl GoalsApi for ApiClient {
    async fn create_goals(
        &self,
        request: &CreateGoalsRequest,
    ) -> Result<CreateGoalsResponse, ApiError> {
        tracing::info!(
            "Submitting goal group '{}' with {} goal(s)",
            request.goal_group_name,
            request.goals.len()
        );
        let response = self
            .http
            .post(self.endpoint(CREATE_GOALS_PATH))
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn finalize_authorization(&self, code: &str) -> Result<CallbackResponse, ApiError> {
        let path = format!("{}?code={}", CALLBACK_PATH, urlencoding::encode(code.trim()));
        let response = self.send_get(&path).await?;
        let status = response.status().as_u16();
        let callback: CallbackResponse = Self::read_json(response).await?;
        if callback.success == Some(false) {
            return Err(ApiError::Server {
                status,
                step: None,
                message: callback
                    .message
                    .unwrap_or_else(|| "Authorization was rejected".to_string()),
            });
        }
        Ok(callback)
    }

    async fn week_progress(&self, start_date: NaiveDate) -> Result<WeekProgress, ApiError> {
        let path = format!(
            "{}?startDate={}",
            WEEK_CALCULATOR_PATH,
            start_date.format("%Y-%m-%d")
        );
        let response = self.send_get(&path).await?;
        Self::read_json(response).await
    }

    async fn lists_from_cache(&self) -> Result<Option<TodoLists>, ApiError> {
        let response = self.send_get(LISTS_FROM_CACHE_PATH).await?;
        let status = response.status();
        if !status.is_success() {
            tracing::info!("List cache lookup returned {}, treating as a miss", status);
            return Ok(None);
        }
        let lists: TodoLists = Self::read_json(response).await?;
        if lists.success {
            Ok(Some(lists))
        } else {
            tracing::info!("List cache lookup reported no cached token");
            Ok(None)
        }
    }

    async fn request_auth_url(&self) -> Result<AuthUrlResponse, ApiError> {
        let response = self.send_get(AUTH_URL_PATH).await?;
        Self::read_json(response).await
    }

    async fn lists_with_code(&self, code: &str) -> Result<TodoLists, ApiError> {
        let url = cache_busting_url(
            &self.endpoint(AUTH_WITH_CODE_PATH),
            chrono::Utc::now().timestamp_millis(),
        );
        let response = self
            .http
            .post(&url)
            .headers(no_store_headers())
            .json(&serde_json::json!({ "code": code.trim() }))
            .send()
            .await?;
        let status = response.status().as_u16();
        let lists: TodoLists = Self::read_json(response).await?;
        if !lists.success {
            return Err(ApiError::Server {
                status,
                step: None,
                message: lists
                    .error
                    .or(lists.message)
                    .unwrap_or_else(|| "Failed to fetch lists".to_string()),
            });
        }
        Ok(lists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::model::GoalPayload;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> ApiClient {
        ApiClient::with_base_url(&server.url(), Duration::from_secs(5)).unwrap()
    }

    fn request() -> CreateGoalsRequest {
        CreateGoalsRequest {
            goal_group_name: "Fitness".to_string(),
            start_date: "2025-07-14T00:00:00.000Z".to_string(),
            goals: vec![GoalPayload {
                name: "Run".to_string(),
                tasks: vec!["x".to_string(); 12],
            }],
        }
    }

    #[test]
    fn test_cache_busting_url() {
        assert_eq!(cache_busting_url("http://a/b", 42), "http://a/b?_t=42");
        assert_eq!(cache_busting_url("http://a/b?c=1", 42), "http://a/b?c=1&_t=42");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(matches!(
            ApiClient::with_base_url("  ", Duration::from_secs(1)),
            Err(ApiError::Config(_))
        ));
    }

    #[test]
    fn test_server_error_prefers_error_field() {
        let err = server_error(400, r#"{"error":"bad code","step":"exchange_code_for_token"}"#);
        assert_eq!(
            err,
            ApiError::Server {
                status: 400,
                step: Some("exchange_code_for_token".to_string()),
                message: "bad code".to_string()
            }
        );

        let err = server_error(502, "");
        assert!(err.to_string().contains("status: 502"));
    }

    #[tokio::test]
    async fn test_create_goals_posts_camel_case_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", CREATE_GOALS_PATH)
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJsonString(
                r#"{"goalGroupName":"Fitness","startDate":"2025-07-14T00:00:00.000Z"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"message":"Created","authUrl":"https://login.example/authorize"}"#)
            .create_async()
            .await;

        let resp = client(&server).create_goals(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(resp.message.as_deref(), Some("Created"));
        assert_eq!(resp.auth_url.as_deref(), Some("https://login.example/authorize"));
    }

    #[tokio::test]
    async fn test_create_goals_server_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", CREATE_GOALS_PATH)
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let err = client(&server).create_goals(&request()).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_connection_error() {
        // Nothing listens on port 9 (discard) in the test environment
        let client = ApiClient::with_base_url("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.create_goals(&request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Connection(_)));
    }

    #[tokio::test]
    async fn test_week_progress_sends_cache_busting_and_no_store() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", WEEK_CALCULATOR_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("startDate".into(), "2025-07-14".into()),
                Matcher::Regex(r"_t=\d+".into()),
            ]))
            .match_header("cache-control", "no-cache, no-store, must-revalidate")
            .match_header("pragma", "no-cache")
            .match_header("expires", "0")
            .with_status(200)
            .with_body(
                r#"{"message":"Week 2","startDate":"14/07/2025","currentDate":"22/07/2025",
                "progressPercentage":16.7,"weeksCompleted":2,"weeksRemaining":10,
                "daysSinceStart":8,"isCompleted":false}"#,
            )
            .create_async()
            .await;

        let start = NaiveDate::from_ymd_opt(2025, 7, 14).unwrap();
        let progress = client(&server).week_progress(start).await.unwrap();

        mock.assert_async().await;
        assert_eq!(progress.weeks_completed, 2);
        assert!(progress.next_week_starts_on.is_none());
    }

    #[tokio::test]
    async fn test_week_progress_bad_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", WEEK_CALCULATOR_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>cached page</html>")
            .create_async()
            .await;

        let start = NaiveDate::from_ymd_opt(2025, 7, 14).unwrap();
        let err = client(&server).week_progress(start).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_lists_from_cache_hit() {
        let mut server = mockito::Server::new_async().await;
        let hit = server
            .mock("GET", LISTS_FROM_CACHE_PATH)
            .match_query(Matcher::Regex(r"_t=\d+".into()))
            .with_status(200)
            .with_body(r#"{"success":true,"totalLists":1,"listNames":["Fitness"],"source":"cached_token","message":"ok"}"#)
            .create_async()
            .await;

        let lists = client(&server).lists_from_cache().await.unwrap().unwrap();
        hit.assert_async().await;
        assert!(lists.from_cache());
        assert_eq!(lists.list_names, vec!["Fitness"]);
    }

    #[tokio::test]
    async fn test_lists_from_cache_unsuccessful_body_is_miss() {
        let mut server = mockito::Server::new_async().await;
        let _miss = server
            .mock("GET", LISTS_FROM_CACHE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":false,"message":"no token"}"#)
            .create_async()
            .await;
        assert!(client(&server).lists_from_cache().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lists_from_cache_body_without_success_is_miss() {
        let mut server = mockito::Server::new_async().await;
        let _miss = server
            .mock("GET", LISTS_FROM_CACHE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error":"No cached token","message":"authorize first"}"#)
            .create_async()
            .await;
        assert!(client(&server).lists_from_cache().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lists_from_cache_http_error_is_miss() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", LISTS_FROM_CACHE_PATH)
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;
        assert!(client(&server).lists_from_cache().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_finalize_authorization_encodes_code() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", CALLBACK_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "M.a/b+c".into()),
                Matcher::Regex(r"_t=\d+".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"message":"Goals created in To Do"}"#)
            .create_async()
            .await;

        let resp = client(&server)
            .finalize_authorization("  M.a/b+c ")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(resp.message.as_deref(), Some("Goals created in To Do"));
    }

    #[tokio::test]
    async fn test_finalize_authorization_reports_step() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", CALLBACK_PATH)
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"success":false,"error":"No se pudo obtener el token de acceso","step":"exchange_code_for_token","codeProvided":true,"codeLength":12}"#)
            .create_async()
            .await;

        let err = client(&server).finalize_authorization("abc").await.unwrap_err();
        assert!(matches!(
            &err,
            ApiError::Server { status: 400, step: Some(step), .. } if step == "exchange_code_for_token"
        ));
        assert!(!err.diagnostics().is_empty());
    }

    #[tokio::test]
    async fn test_auth_url_and_code_exchange() {
        let mut server = mockito::Server::new_async().await;
        let auth = server
            .mock("GET", AUTH_URL_PATH)
            .match_query(Matcher::Regex(r"_t=\d+".into()))
            .with_status(200)
            .with_body(r#"{"authUrl":"https://login.example/authorize?x=1"}"#)
            .create_async()
            .await;
        let exchange = server
            .mock("POST", AUTH_WITH_CODE_PATH)
            .match_query(Matcher::Regex(r"_t=\d+".into()))
            .match_body(Matcher::Json(serde_json::json!({ "code": "abc" })))
            .with_status(200)
            .with_body(r#"{"success":true,"totalLists":2,"listNames":["A","B"],"source":"auth_code","tokenCached":true,"message":"ok"}"#)
            .create_async()
            .await;

        let client = client(&server);
        let url = client.request_auth_url().await.unwrap();
        assert_eq!(url.auth_url, "https://login.example/authorize?x=1");

        let lists = client.lists_with_code(" abc ").await.unwrap();
        assert_eq!(lists.total_lists, 2);
        assert!(!lists.from_cache());

        auth.assert_async().await;
        exchange.assert_async().await;
    }

    #[tokio::test]
    async fn test_code_exchange_unsuccessful_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", AUTH_WITH_CODE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":false,"error":"code expired"}"#)
            .create_async()
            .await;

        let err = client(&server).lists_with_code("abc").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 200,
                step: None,
                message: "code expired".to_string()
            }
        );
    }
}
