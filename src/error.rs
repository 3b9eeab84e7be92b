//! Error types for SmartStudy
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for SmartStudy operations
///
/// The first four variants form the gateway failure taxonomy that view
/// controllers translate into user-visible fallback messages. The remaining
/// variants cover configuration and local I/O.
#[derive(Error, Debug)]
pub enum SmartStudyError {
    /// Transport or connectivity failure (DNS, refused connection, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The generation service rejected or failed the request (HTTP error,
    /// quota exhaustion, blocked prompt, malformed response body)
    #[error("Provider error: {0}")]
    Provider(String),

    /// A structured response could not be parsed against its declared schema
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// The request succeeded but the response carried no usable content
    #[error("Empty response from provider")]
    EmptyResponse,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Timeouts, connection failures and interrupted bodies are `Network`;
/// anything else reqwest reports is a `Provider` failure.
impl From<reqwest::Error> for SmartStudyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
            SmartStudyError::Network(err.to_string())
        } else if err.is_decode() {
            SmartStudyError::Provider(format!("Malformed provider response: {}", err))
        } else {
            SmartStudyError::Provider(err.to_string())
        }
    }
}

/// Coarse classification of a failure, used by view controllers to pick a
/// fallback rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport or connectivity failure
    Network,
    /// Service-side rejection or malformed response
    Provider,
    /// Structured payload did not match the schema
    SchemaViolation,
    /// No usable content
    EmptyResponse,
    /// Anything else (configuration, local I/O)
    Other,
}

impl ErrorKind {
    /// Classify an error by looking for a [`SmartStudyError`] in its chain
    ///
    /// # Examples
    ///
    /// ```
    /// use smartstudy::error::{ErrorKind, SmartStudyError};
    ///
    /// let err: anyhow::Error = SmartStudyError::EmptyResponse.into();
    /// assert_eq!(ErrorKind::of(&err), ErrorKind::EmptyResponse);
    /// ```
    pub fn of(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<SmartStudyError>() {
            Some(SmartStudyError::Network(_)) => ErrorKind::Network,
            Some(SmartStudyError::Provider(_)) => ErrorKind::Provider,
            Some(SmartStudyError::SchemaViolation(_)) => ErrorKind::SchemaViolation,
            Some(SmartStudyError::EmptyResponse) => ErrorKind::EmptyResponse,
            Some(_) => ErrorKind::Other,
            None => {
                if err.downcast_ref::<serde_json::Error>().is_some() {
                    ErrorKind::SchemaViolation
                } else {
                    ErrorKind::Other
                }
            }
        }
    }

    /// Whether the failure should degrade to an empty result instead of an
    /// error banner
    pub fn degrades_to_empty(self) -> bool {
        matches!(self, ErrorKind::SchemaViolation | ErrorKind::EmptyResponse)
    }
}

/// Result type alias for SmartStudy operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_display() {
        let error = SmartStudyError::Network("connection refused".to_string());
        assert_eq!(error.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_provider_error_display() {
        let error = SmartStudyError::Provider("quota exceeded".to_string());
        assert_eq!(error.to_string(), "Provider error: quota exceeded");
    }

    #[test]
    fn test_schema_violation_display() {
        let error = SmartStudyError::SchemaViolation("missing field `time`".to_string());
        assert_eq!(error.to_string(), "Schema violation: missing field `time`");
    }

    #[test]
    fn test_empty_response_display() {
        assert_eq!(
            SmartStudyError::EmptyResponse.to_string(),
            "Empty response from provider"
        );
    }

    #[test]
    fn test_config_error_display() {
        let error = SmartStudyError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: SmartStudyError = io_error.into();
        assert!(matches!(error, SmartStudyError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: SmartStudyError = yaml_error.into();
        assert!(matches!(error, SmartStudyError::Yaml(_)));
    }

    #[test]
    fn test_error_kind_classification() {
        let cases: Vec<(SmartStudyError, ErrorKind)> = vec![
            (SmartStudyError::Network("x".into()), ErrorKind::Network),
            (SmartStudyError::Provider("x".into()), ErrorKind::Provider),
            (
                SmartStudyError::SchemaViolation("x".into()),
                ErrorKind::SchemaViolation,
            ),
            (SmartStudyError::EmptyResponse, ErrorKind::EmptyResponse),
            (SmartStudyError::Config("x".into()), ErrorKind::Other),
        ];
        for (error, expected) in cases {
            let err: anyhow::Error = error.into();
            assert_eq!(ErrorKind::of(&err), expected);
        }
    }

    #[test]
    fn test_error_kind_survives_context() {
        let err = anyhow::Error::from(SmartStudyError::Network("reset".into()))
            .context("while summarizing");
        assert_eq!(ErrorKind::of(&err), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_reqwest_connect_failure_is_network() {
        // Nothing listens on the discard port
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:9")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(SmartStudyError::from(err), SmartStudyError::Network(_)));
    }

    #[tokio::test]
    async fn test_reqwest_builder_failure_is_provider() {
        let err = reqwest::Client::new()
            .get("not a url")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(SmartStudyError::from(err), SmartStudyError::Provider(_)));
    }

    #[test]
    fn test_raw_json_error_is_schema_violation() {
        let json_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: anyhow::Error = json_error.into();
        assert_eq!(ErrorKind::of(&err), ErrorKind::SchemaViolation);
    }

    #[test]
    fn test_degrades_to_empty() {
        assert!(ErrorKind::SchemaViolation.degrades_to_empty());
        assert!(ErrorKind::EmptyResponse.degrades_to_empty());
        assert!(!ErrorKind::Network.degrades_to_empty());
        assert!(!ErrorKind::Provider.degrades_to_empty());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmartStudyError>();
    }
}
