//! Error types for the crypto tracker data layer

use serde::Serialize;
use thiserror::Error;

/// Boxed source error for transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when talking to the market-data provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider answered with HTTP 429
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The request failed before any response was received
    #[error("Network unreachable: {0}")]
    Unreachable(#[source] BoxError),

    /// Provider answered with a non-2xx status other than 429
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Response body could not be read or decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Caller passed an argument outside the provider's accepted range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ProviderError {
    /// Creates an Unreachable error from any transport error
    pub fn unreachable(source: impl Into<BoxError>) -> Self {
        Self::Unreachable(source.into())
    }

    /// Creates an InvalidResponse error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Creates an InvalidParameter error
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Maps an HTTP status to the matching error
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 {
            Self::RateLimitExceeded
        } else {
            Self::HttpStatus { status, body }
        }
    }

    /// Classifies this error into the user-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::RateLimitExceeded => ErrorKind::RateLimited,
            ProviderError::Unreachable(_) => ErrorKind::NetworkUnavailable,
            ProviderError::HttpStatus { .. }
            | ProviderError::InvalidResponse(_)
            | ProviderError::InvalidParameter(_) => ErrorKind::Unclassified,
        }
    }

    /// Converts this error into the value the presentation layer renders
    pub fn to_display(&self) -> DisplayError {
        DisplayError::from(self.kind())
    }
}

/// User-facing failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Provider signalled a rate limit
    RateLimited,
    /// Transport failed before a response arrived
    NetworkUnavailable,
    /// Anything else
    Unclassified,
}

impl ErrorKind {
    /// Short title shown above the message
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::RateLimited => "Rate Limit Exceeded",
            ErrorKind::NetworkUnavailable => "Network Error",
            ErrorKind::Unclassified => "Error",
        }
    }

    /// Message intended for direct display
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::RateLimited => "Too many requests. Please wait a moment and try again.",
            ErrorKind::NetworkUnavailable => {
                "Unable to connect to the server. Please check your internet connection."
            }
            ErrorKind::Unclassified => "Something went wrong. Please try again later.",
        }
    }

    /// How loudly the presentation layer should render it
    pub fn severity(&self) -> Severity {
        match self {
            ErrorKind::RateLimited => Severity::Warning,
            ErrorKind::NetworkUnavailable | ErrorKind::Unclassified => Severity::Error,
        }
    }
}

/// Display severity of a classified error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// Classified error ready for rendering: title and message are verbatim UI text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayError {
    pub kind: ErrorKind,
    pub title: &'static str,
    pub message: &'static str,
    pub severity: Severity,
}

impl From<ErrorKind> for DisplayError {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            title: kind.title(),
            message: kind.message(),
            severity: kind.severity(),
        }
    }
}

impl From<&ProviderError> for DisplayError {
    fn from(err: &ProviderError) -> Self {
        err.to_display()
    }
}

impl std::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Errors from the persisted key-value storage
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be encoded
    #[error("Storage encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ProviderError::from_status(429, String::new()).kind(),
            ErrorKind::RateLimited
        );
        assert_eq!(
            ProviderError::from_status(500, "boom".into()).kind(),
            ErrorKind::Unclassified
        );
        assert_eq!(
            ProviderError::from_status(404, String::new()).kind(),
            ErrorKind::Unclassified
        );
    }

    #[test]
    fn test_unreachable_is_network_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ProviderError::unreachable(io);
        assert_eq!(err.kind(), ErrorKind::NetworkUnavailable);
        assert_eq!(err.to_display().title, "Network Error");
    }

    #[test]
    fn test_display_text_is_verbatim() {
        let display = ProviderError::RateLimitExceeded.to_display();
        assert_eq!(display.title, "Rate Limit Exceeded");
        assert_eq!(
            display.message,
            "Too many requests. Please wait a moment and try again."
        );
        assert_eq!(display.severity, Severity::Warning);

        let display = ProviderError::invalid_response("not json").to_display();
        assert_eq!(display.title, "Error");
        assert_eq!(display.message, "Something went wrong. Please try again later.");
        assert_eq!(display.severity, Severity::Error);
    }

    #[test]
    fn test_display_error_never_leaks_technical_text() {
        let err = ProviderError::HttpStatus {
            status: 503,
            body: "upstream connect error".into(),
        };
        let rendered = err.to_display().to_string();
        assert!(!rendered.contains("503"));
        assert!(!rendered.contains("upstream"));
    }
}
