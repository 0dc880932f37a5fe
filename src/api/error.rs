//! API error types

use thiserror::Error;

use crate::error::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Request never got an HTTP answer (DNS, refused, timeout, TLS)
    #[error("connection failed: {0}")]
    Connection(String),

    /// The backend answered with a failing status or `success: false`
    #[error("server error (HTTP {status}): {message}")]
    Server {
        status: u16,
        step: Option<String>,
        message: String,
    },

    /// Body did not match the expected shape
    #[error("unexpected response from server: {0}")]
    Decode(String),

    #[error("invalid API configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Connection(_) => ErrorCode::Connection,
            Self::Server { .. } | Self::Decode(_) => ErrorCode::Server,
            Self::Config(_) => ErrorCode::Config,
        }
    }

    /// Hint lines for failures the backend is known to report.
    pub fn diagnostics(&self) -> Vec<String> {
        let mut hints = Vec::new();
        if let Self::Server { step, message, .. } = self {
            if message == "No se pudo obtener el token de acceso"
                || message.to_lowercase().contains("access token")
            {
                hints.push("The code-for-token exchange failed. Likely causes:".to_string());
                hints.push("  - the code expired (codes last about 10 minutes)".to_string());
                hints.push("  - the redirect URI does not match exactly".to_string());
                hints.push("  - wrong client id or client secret on the backend".to_string());
            }
            if step.as_deref() == Some("exchange_code_for_token") {
                hints.push("The failure happened while calling the identity provider token endpoint".to_string());
            }
        }
        hints
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}
