//! Gateway error handling
//!
//! Every remote call fails with one of a small set of typed outcomes so the
//! session layer can decide how to report it.

use thiserror::Error;

/// Errors returned by remote gateway calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response (DNS, connect, reset, timeout)
    #[error("Network failure: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    /// The requested resource does not exist
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// The configured API address cannot carry request paths
    #[error("Invalid API URL {url}: {details}")]
    InvalidUrl { url: String, details: String },

    /// The response body could not be decoded
    #[error("Invalid response from {path}: {details}")]
    Decode { path: String, details: String },
}

impl GatewayError {
    /// Classify a transport error from reqwest
    pub fn from_reqwest(error: reqwest::Error, path: &str) -> Self {
        if error.is_decode() {
            return GatewayError::Decode {
                path: path.to_string(),
                details: error.to_string(),
            };
        }
        if let Some(status) = error.status() {
            return GatewayError::from_status(status.as_u16(), String::new(), path);
        }
        GatewayError::Network(error.to_string())
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: String, path: &str) -> Self {
        if status == 404 {
            GatewayError::NotFound {
                path: path.to_string(),
            }
        } else {
            GatewayError::Server { status, body }
        }
    }

    /// Whether the resource was missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }

    /// Human-readable message the server attached to an error body
    ///
    /// Servers answer `{"message": "..."}` or `{"message": ["...", ...]}`;
    /// for lists the first entry is used.
    pub fn server_message(&self) -> Option<String> {
        let GatewayError::Server { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        match value.get("message")? {
            serde_json::Value::String(message) => Some(message.clone()),
            serde_json::Value::Array(messages) => messages
                .first()
                .and_then(|m| m.as_str())
                .map(str::to_string),
            _ => None,
        }
    }
}

/// Result type for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let err = GatewayError::from_status(404, String::new(), "/themes/x");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: /themes/x");

        let err = GatewayError::from_status(500, "boom".to_string(), "/biosites");
        assert_eq!(
            err,
            GatewayError::Server {
                status: 500,
                body: "boom".to_string()
            }
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_server_message_string() {
        let err = GatewayError::Server {
            status: 409,
            body: r#"{"message":"Email already registered"}"#.to_string(),
        };
        assert_eq!(
            err.server_message().as_deref(),
            Some("Email already registered")
        );
    }

    #[test]
    fn test_server_message_list() {
        let err = GatewayError::Server {
            status: 400,
            body: r#"{"message":["password too short","email invalid"]}"#.to_string(),
        };
        assert_eq!(err.server_message().as_deref(), Some("password too short"));
    }

    #[test]
    fn test_server_message_absent() {
        let err = GatewayError::Server {
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        };
        assert!(err.server_message().is_none());
        assert!(GatewayError::Network("refused".to_string())
            .server_message()
            .is_none());
    }
}
