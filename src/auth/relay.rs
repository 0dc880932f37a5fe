//! Auth relay state machine and its driver.

use thiserror::Error;

use crate::api::{GoalsApi, TodoLists};

/// Where the relay currently stands
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Cached-token lookup not yet answered
    NoCache,
    /// Waiting for the backend to hand out an authorization URL
    AuthUrlRequested,
    /// URL known; the user authorizes out of band and pastes the code
    AwaitingPastedCode { auth_url: String },
    /// Code sent, waiting for the lists
    CodeSubmitted { auth_url: String },
    ListsDisplayed(TodoLists),
    Error { message: String },
}

impl AuthState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoCache => "NoCache",
            Self::AuthUrlRequested => "AuthUrlRequested",
            Self::AwaitingPastedCode { .. } => "AwaitingPastedCode",
            Self::CodeSubmitted { .. } => "CodeSubmitted",
            Self::ListsDisplayed(_) => "ListsDisplayed",
            Self::Error { .. } => "Error",
        }
    }

    /// A network request is outstanding in this state
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::NoCache | Self::AuthUrlRequested | Self::CodeSubmitted { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("invalid auth transition from {from} on {event}")]
    InvalidTransition { from: &'static str, event: &'static str },

    #[error("Please enter the authorization code")]
    EmptyCode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthRelay {
    state: AuthState,
}

impl Default for AuthRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthRelay {
    pub fn new() -> Self {
        Self {
            state: AuthState::NoCache,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// URL the user should open, when one is known
    pub fn auth_url(&self) -> Option<&str> {
        match &self.state {
            AuthState::AwaitingPastedCode { auth_url } | AuthState::CodeSubmitted { auth_url } => {
                Some(auth_url)
            }
            _ => None,
        }
    }

    fn invalid(&self, event: &'static str) -> RelayError {
        RelayError::InvalidTransition {
            from: self.state.name(),
            event,
        }
    }

    fn transition(&mut self, next: AuthState) {
        tracing::debug!("Auth relay: {} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    pub fn cache_hit(&mut self, lists: TodoLists) -> Result<(), RelayError> {
        match self.state {
            AuthState::NoCache => {
                self.transition(AuthState::ListsDisplayed(lists));
                Ok(())
            }
            _ => Err(self.invalid("cache_hit")),
        }
    }

    pub fn cache_missed(&mut self) -> Result<(), RelayError> {
        match self.state {
            AuthState::NoCache => {
                self.transition(AuthState::AuthUrlRequested);
                Ok(())
            }
            _ => Err(self.invalid("cache_missed")),
        }
    }

    pub fn auth_url_received(&mut self, auth_url: String) -> Result<(), RelayError> {
        match self.state {
            AuthState::AuthUrlRequested => {
                self.transition(AuthState::AwaitingPastedCode { auth_url });
                Ok(())
            }
            _ => Err(self.invalid("auth_url_received")),
        }
    }

    /// Accept a pasted code; returns the trimmed code to send.
    pub fn submit_code(&mut self, code: &str) -> Result<String, RelayError> {
        let AuthState::AwaitingPastedCode { auth_url } = &self.state else {
            return Err(self.invalid("submit_code"));
        };
        let code = code.trim();
        if code.is_empty() {
            return Err(RelayError::EmptyCode);
        }
        let auth_url = auth_url.clone();
        self.transition(AuthState::CodeSubmitted { auth_url });
        Ok(code.to_string())
    }

    pub fn lists_received(&mut self, lists: TodoLists) -> Result<(), RelayError> {
        match self.state {
            AuthState::CodeSubmitted { .. } => {
                self.transition(AuthState::ListsDisplayed(lists));
                Ok(())
            }
            _ => Err(self.invalid("lists_received")),
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), RelayError> {
        if !self.state.is_in_flight() {
            return Err(self.invalid("fail"));
        }
        self.transition(AuthState::Error {
            message: message.into(),
        });
        Ok(())
    }

    pub fn retry(&mut self) -> Result<(), RelayError> {
        match self.state {
            AuthState::Error { .. } => {
                self.transition(AuthState::AuthUrlRequested);
                Ok(())
            }
            _ => Err(self.invalid("retry")),
        }
    }
}

/// Run the cache lookup and, on a miss, fetch the authorization URL.
/// Leaves the relay in `ListsDisplayed`, `AwaitingPastedCode`, or `Error`.
pub async fn start(relay: &mut AuthRelay, api: &dyn GoalsApi) -> Result<(), RelayError> {
    match api.lists_from_cache().await {
        Ok(Some(lists)) => return relay.cache_hit(lists),
        Ok(None) => relay.cache_missed()?,
        Err(e) => return relay.fail(e.to_string()),
    }
    request_url(relay, api).await
}

/// Fetch the authorization URL from `AuthUrlRequested`.
pub async fn request_url(relay: &mut AuthRelay, api: &dyn GoalsApi) -> Result<(), RelayError> {
    match api.request_auth_url().await {
        Ok(resp) => relay.auth_url_received(resp.auth_url),
        Err(e) => relay.fail(e.to_string()),
    }
}

/// Submit a pasted code and record the outcome.
pub async fn exchange_code(
    relay: &mut AuthRelay,
    api: &dyn GoalsApi,
    code: &str,
) -> Result<(), RelayError> {
    let code = relay.submit_code(code)?;
    match api.lists_with_code(&code).await {
        Ok(lists) => relay.lists_received(lists),
        Err(e) => relay.fail(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ListSource, TodoLists};

    fn lists() -> TodoLists {
        TodoLists {
            success: true,
            total_lists: 1,
            list_names: vec!["Fitness".to_string()],
            source: ListSource::CachedToken,
            token_cached: None,
            message: Some("ok".to_string()),
            error: None,
        }
    }

    #[test]
    fn test_happy_path_through_code_exchange() {
        let mut relay = AuthRelay::new();
        relay.cache_missed().unwrap();
        assert_eq!(relay.state(), &AuthState::AuthUrlRequested);

        relay.auth_url_received("https://login.example".to_string()).unwrap();
        assert_eq!(relay.auth_url(), Some("https://login.example"));

        let code = relay.submit_code("  abc  ").unwrap();
        assert_eq!(code, "abc");
        assert!(matches!(relay.state(), AuthState::CodeSubmitted { .. }));

        relay.lists_received(lists()).unwrap();
        assert!(matches!(relay.state(), AuthState::ListsDisplayed(_)));
    }

    #[test]
    fn test_cache_hit_skips_authorization() {
        let mut relay = AuthRelay::new();
        relay.cache_hit(lists()).unwrap();
        assert!(matches!(relay.state(), AuthState::ListsDisplayed(_)));
        assert!(relay.cache_missed().is_err());
    }

    #[test]
    fn test_empty_code_keeps_waiting() {
        let mut relay = AuthRelay::new();
        relay.cache_missed().unwrap();
        relay.auth_url_received("u".to_string()).unwrap();

        assert_eq!(relay.submit_code("   "), Err(RelayError::EmptyCode));
        assert!(matches!(relay.state(), AuthState::AwaitingPastedCode { .. }));
    }

    #[test]
    fn test_failure_then_retry_returns_to_url_request() {
        let mut relay = AuthRelay::new();
        relay.cache_missed().unwrap();
        relay.auth_url_received("u".to_string()).unwrap();
        relay.submit_code("abc").unwrap();
        relay.fail("code expired").unwrap();
        assert_eq!(
            relay.state(),
            &AuthState::Error {
                message: "code expired".to_string()
            }
        );

        relay.retry().unwrap();
        assert_eq!(relay.state(), &AuthState::AuthUrlRequested);
    }

    #[test]
    fn test_out_of_order_transitions_rejected() {
        let mut relay = AuthRelay::new();
        assert_eq!(
            relay.submit_code("abc"),
            Err(RelayError::InvalidTransition {
                from: "NoCache",
                event: "submit_code"
            })
        );
        assert!(relay.lists_received(lists()).is_err());
        assert!(relay.retry().is_err());
        assert_eq!(relay.state(), &AuthState::NoCache);

        relay.cache_missed().unwrap();
        relay.auth_url_received("u".to_string()).unwrap();
        // Waiting on the user, nothing in flight to fail
        assert!(relay.fail("x").is_err());
    }

    mod driver {
        use super::super::*;
        use crate::api::stub::{StubApi, sample_lists};
        use crate::api::{ApiError, ListSource};

        #[tokio::test]
        async fn test_start_cache_hit() {
            let api = StubApi {
                cached_lists: Ok(Some(sample_lists(ListSource::CachedToken))),
                ..StubApi::default()
            };
            let mut relay = AuthRelay::new();
            start(&mut relay, &api).await.unwrap();

            assert!(matches!(relay.state(), AuthState::ListsDisplayed(l) if l.from_cache()));
            assert_eq!(api.calls(), vec!["lists_from_cache"]);
        }

        #[tokio::test]
        async fn test_start_miss_then_exchange() {
            let api = StubApi::default();
            let mut relay = AuthRelay::new();
            start(&mut relay, &api).await.unwrap();
            assert_eq!(relay.auth_url(), Some("https://login.example/authorize"));

            exchange_code(&mut relay, &api, "abc").await.unwrap();
            assert!(matches!(relay.state(), AuthState::ListsDisplayed(_)));
            assert_eq!(
                api.calls(),
                vec!["lists_from_cache", "request_auth_url", "lists_with_code"]
            );
        }

        #[tokio::test]
        async fn test_start_connection_error() {
            let api = StubApi {
                cached_lists: Err(ApiError::Connection("refused".to_string())),
                ..StubApi::default()
            };
            let mut relay = AuthRelay::new();
            start(&mut relay, &api).await.unwrap();
            assert!(matches!(relay.state(), AuthState::Error { message } if message.contains("refused")));
        }

        #[tokio::test]
        async fn test_exchange_failure_then_retry() {
            let api = StubApi {
                code_lists: Err(ApiError::Server {
                    status: 400,
                    step: None,
                    message: "code expired".to_string(),
                }),
                ..StubApi::default()
            };
            let mut relay = AuthRelay::new();
            start(&mut relay, &api).await.unwrap();
            exchange_code(&mut relay, &api, "abc").await.unwrap();
            assert!(matches!(relay.state(), AuthState::Error { .. }));

            relay.retry().unwrap();
            request_url(&mut relay, &api).await.unwrap();
            assert!(matches!(relay.state(), AuthState::AwaitingPastedCode { .. }));
        }
    }
}
