//! Error types for axiom-client.

use serde::Deserialize;

use crate::limit::{format_duration, Limit};

/// Result type alias for axiom-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for axiom-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this is a rate limit error, local or remote.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.kind, ErrorKind::Limit(_))
    }

    /// Returns true if this is an authentication or authorization error.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Unauthenticated | ErrorKind::Unauthorized
        )
    }

    /// Returns the limit snapshot if this is a rate limit error.
    pub fn limit(&self) -> Option<Limit> {
        match &self.kind {
            ErrorKind::Limit(err) => Some(err.limit),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// No access token configured.
    #[error("missing access token")]
    MissingAccessToken,

    /// A personal token is used against the hosted deployment without an
    /// organization id.
    #[error("missing organization id")]
    MissingOrganizationId,

    /// Authentication failed (HTTP 401).
    #[error("authentication failed, check credentials")]
    Unauthenticated,

    /// Authorization failed (HTTP 403).
    #[error("insufficient permissions for requested operation")]
    Unauthorized,

    /// An API token was presented on a route it cannot access.
    #[error("API token is not allowed on this route")]
    UnprivilegedToken,

    /// Error response from the API.
    #[error(transparent)]
    Api(ApiError),

    /// Rate limit exceeded, either reported by the server (HTTP 429) or
    /// detected locally before making the request.
    #[error(transparent)]
    Limit(LimitError),

    /// Invalid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// JSON encoding/decoding error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Writing the response body to the caller's sink failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Error response returned by the API on non-2xx status codes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("API error {status}: {message}")]
pub struct ApiError {
    /// HTTP status code, filled in from the response.
    #[serde(skip)]
    pub status: u16,
    /// Human readable error message.
    pub message: String,
    /// Trace id of the failed request, if the server reported one.
    #[serde(default)]
    pub trace_id: Option<String>,
}

/// Rate limit error carrying the quota snapshot that triggered it.
///
/// Produced both remotely (HTTP 429) and locally, when the client refuses to
/// send a request because the stored limit is exhausted and the reset time is
/// still in the future.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}: try again in {}", format_duration(.limit.reset_in()))]
pub struct LimitError {
    /// The limit that was exceeded.
    pub limit: Limit,
    /// Human readable error message.
    pub message: String,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_decode() {
            ErrorKind::Json(err.to_string())
        } else {
            ErrorKind::Connection(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use crate::limit::{LimitKind, LimitScope};

    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError {
            status: 400,
            message: "This is a Bad Request error".to_string(),
            trace_id: None,
        };
        assert_eq!(
            err.to_string(),
            "API error 400: This is a Bad Request error"
        );
    }

    #[test]
    fn test_api_error_deserialize() {
        let err: ApiError =
            serde_json::from_str(r#"{"message":"boom","trace_id":"abc123"}"#).unwrap();
        assert_eq!(err.status, 0);
        assert_eq!(err.message, "boom");
        assert_eq!(err.trace_id.as_deref(), Some("abc123"));

        // Unknown fields in error bodies are tolerated.
        let err: ApiError = serde_json::from_str(r#"{"message":"boom","code":7}"#).unwrap();
        assert_eq!(err.message, "boom");
        assert!(err.trace_id.is_none());
    }

    #[test]
    fn test_limit_error_display() {
        let err = LimitError {
            limit: Limit {
                scope: LimitScope::Anonymous,
                kind: LimitKind::Rate,
                limit: 1000,
                remaining: 0,
                reset: SystemTime::now() + Duration::from_secs(3599),
            },
            message: "rate limit exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "rate limit exceeded: try again in 59m58s");
    }

    #[test]
    fn test_limit_error_display_past_reset() {
        let err = LimitError {
            limit: Limit::default(),
            message: "rate limit exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "rate limit exceeded: try again in 0s");
    }

    #[test]
    fn test_error_is_rate_limited() {
        let err = Error::new(ErrorKind::Limit(LimitError {
            limit: Limit::default(),
            message: "rate limit exceeded".to_string(),
        }));
        assert!(err.is_rate_limited());
        assert_eq!(err.limit(), Some(Limit::default()));

        let err = Error::new(ErrorKind::Timeout);
        assert!(!err.is_rate_limited());
        assert_eq!(err.limit(), None);
    }

    #[test]
    fn test_error_is_auth_error() {
        assert!(Error::new(ErrorKind::Unauthenticated).is_auth_error());
        assert!(Error::new(ErrorKind::Unauthorized).is_auth_error());
        assert!(!Error::new(ErrorKind::UnprivilegedToken).is_auth_error());
    }

    #[test]
    fn test_error_kind_equality() {
        // Sentinel kinds compare by identity, structured kinds by value.
        assert_eq!(ErrorKind::Unauthenticated, ErrorKind::Unauthenticated);
        assert_ne!(ErrorKind::Unauthenticated, ErrorKind::Unauthorized);

        let api = |message: &str| {
            ErrorKind::Api(ApiError {
                status: 400,
                message: message.to_string(),
                trace_id: None,
            })
        };
        assert_eq!(api("boom"), api("boom"));
        assert_ne!(api("boom"), api("bang"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("not valid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err.kind, ErrorKind::Json(_)));
        assert!(err.source.is_some());
    }

    #[test]
    fn test_from_url_parse_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err.kind, ErrorKind::InvalidUrl(_)));
    }
}
