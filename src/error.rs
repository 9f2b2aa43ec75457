use http::StatusCode;
use thiserror::Error;


/// Which token call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Login,
    Refresh,
}

impl AuthStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStage::Login => "login",
            AuthStage::Refresh => "refresh",
        }
    }
}

/// Why a call was aborted before completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Cancelled,
    DeadlineExceeded,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Cancelled => f.write_str("cancelled"),
            CancelReason::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("authentication failed during {}: {source}", .stage.as_str())]
    Authentication {
        stage: AuthStage,
        #[source]
        source: Box<ClientError>,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("empty response body from {url}")]
    EmptyResponse { url: String },

    #[error("invalid request to {url}: {reason}")]
    InvalidRequest { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {} from {url}{}", .status.as_u16(), format_body(.body))]
    HttpStatus {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("max retries exceeded for {url} after {attempts} attempts: {source}")]
    RetryExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<ClientError>,
    },

    #[error("request to {url} aborted: {reason}")]
    Cancelled { url: String, reason: CancelReason },
}

fn format_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" - {}", body)
    }
}

impl ClientError {
    pub(crate) fn invalid_request(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidRequest { url: url.into(), reason: reason.to_string() }
    }

    /// Whether the retry loop would try again after this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport { .. } => true,
            ClientError::HttpStatus { status, .. } => {
                crate::resilience::retry::classify_status(*status)
                    == crate::resilience::retry::StatusClass::Retry
            }
            _ => false,
        }
    }

    /// HTTP status of the terminal or last observed response, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::HttpStatus { status, .. } => Some(*status),
            ClientError::RetryExhausted { source, .. }
            | ClientError::Authentication { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            ClientError::Cancelled { .. } => true,
            ClientError::Authentication { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}
