//! # Client Error Types
//!
//! Error types for everything that touches the network, the disk or the
//! configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  Http {status, message} │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Decode                 │ │
//! │  │  ConfigLoad/Save│  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Session      │  │   Validation    │                              │
//! │  │                 │  │                 │                              │
//! │  │  NotAuthenticated│ │  Validation     │                              │
//! │  │  Storage        │  │  (from core)    │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! │                                                                         │
//! │  No category is retried: every failure goes straight to the user.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use livemart_core::ValidationError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Every failure the client layer can report.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration values failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Base URL or endpoint path could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the backend.
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend did not answer within the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The backend answered with a non-2xx status.
    #[error("Server returned {status}: {message}")]
    Http { status: u16, message: String },

    /// The backend's response body was not what we expected.
    #[error("Unexpected response: {0}")]
    Decode(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// The operation needs a logged-in user.
    #[error("Not logged in")]
    NotAuthenticated,

    /// Session file could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Client-side form validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string(),
            }
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<livemart_core::CoreError> for ClientError {
    fn from(err: livemart_core::CoreError) -> Self {
        match err {
            livemart_core::CoreError::Validation(inner) => ClientError::Validation(inner),
            other => ClientError::Decode(other.to_string()),
        }
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if logging in (again) could fix this error.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated | ClientError::Http { status: 401 | 403, .. }
        )
    }

    /// Returns true if the backend was reached and rejected or garbled the
    /// request.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, ClientError::Http { .. } | ClientError::Decode(_))
    }

    /// Returns true if the backend was never reached.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert!(ClientError::InvalidUrl("x".into()).is_config_error());
        assert!(ClientError::ConfigSaveFailed("disk full".into()).is_config_error());
        assert!(!ClientError::Timeout(30).is_config_error());

        assert!(ClientError::NotAuthenticated.is_auth_error());
        assert!(ClientError::Http { status: 401, message: "expired".into() }.is_auth_error());
        assert!(ClientError::Http { status: 403, message: "role".into() }.is_auth_error());
        assert!(!ClientError::Http { status: 500, message: "boom".into() }.is_auth_error());

        assert!(ClientError::Http { status: 500, message: "boom".into() }.is_backend_error());
        assert!(ClientError::Decode("bad json".into()).is_backend_error());
        assert!(ClientError::Timeout(30).is_transport_error());
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Http {
            status: 400,
            message: "Insufficient stock".into(),
        };
        assert_eq!(err.to_string(), "Server returned 400: Insufficient stock");
        assert_eq!(ClientError::Timeout(30).to_string(), "Request timed out after 30 seconds");
    }

    #[test]
    fn test_validation_is_transparent() {
        let err: ClientError = ValidationError::Required {
            field: "email".into(),
        }
        .into();
        assert_eq!(err.to_string(), "email is required");
    }
}
