//! # Command Error Type
//!
//! Unified error type for shell commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the LiveMart shell                     │
//! │                                                                         │
//! │  > cart checkout                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<String, ApiError>                                        │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Role check? ──── View denied ─────────────────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Validation? ──── ValidationError ─────────────► ApiError ─────►│  │
//! │  │         │                                          ▲            │  │
//! │  │         ▼                                          │            │  │
//! │  │  Backend? ─────── ClientError / CheckoutError ─────┘            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  error: [BACKEND_ERROR] Insufficient stock (HTTP 400)                   │
//! │  >  ◄── the shell keeps running                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use livemart_client::{CheckoutError, ClientError};
use livemart_core::{CoreError, ValidationError, View};

/// Notification shown when a command fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Input validation failed before any request was sent
    ValidationError,

    /// No session, or the session expired
    NotAuthenticated,

    /// The current role may not open the view behind the command
    Forbidden,

    /// Resource not found in the fetched catalog
    NotFound,

    /// The backend answered with an error status
    BackendError,

    /// The backend could not be reached
    NetworkError,

    /// Configuration is missing or invalid
    ConfigError,

    /// Session storage could not be read or written
    StorageError,

    /// Checkout stopped partway
    CheckoutFailed,

    /// Command line could not be parsed
    UsageError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotAuthenticated => "NOT_AUTHENTICATED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::BackendError => "BACKEND_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::CheckoutFailed => "CHECKOUT_FAILED",
            ErrorCode::UsageError => "USAGE_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::UsageError, message)
    }

    /// The access table sent the user back to the login view.
    pub fn redirected(view: View, logged_in: bool) -> Self {
        if logged_in {
            ApiError::new(
                ErrorCode::Forbidden,
                format!("Your role cannot open {}; log in with another account", view),
            )
        } else {
            ApiError::new(
                ErrorCode::NotAuthenticated,
                format!("Log in first ({} requires a session)", view),
            )
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id.to_string()),
            CoreError::NotInCart(id) => ApiError::not_found("Cart line", &id.to_string()),
            CoreError::InvalidAmount(amount) => {
                ApiError::validation(format!("Invalid amount: {}", amount))
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let code = match &err {
            ClientError::Validation(_) => ErrorCode::ValidationError,
            e if e.is_auth_error() => ErrorCode::NotAuthenticated,
            e if e.is_config_error() => ErrorCode::ConfigError,
            e if e.is_transport_error() => ErrorCode::NetworkError,
            ClientError::Decode(e) => {
                tracing::error!("Unexpected backend response: {}", e);
                ErrorCode::Internal
            }
            e if e.is_backend_error() => ErrorCode::BackendError,
            ClientError::Storage(_) => ErrorCode::StorageError,
            _ => ErrorCode::Internal,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let mut message = err.to_string();
        if err.is_partial() {
            let placed: Vec<String> = err
                .placed
                .iter()
                .map(|p| format!("{} (order #{})", p.line.name, p.order.id))
                .collect();
            message.push_str(&format!(
                ". Already placed: {}. The cart still holds every line; remove these before retrying",
                placed.join(", ")
            ));
        }
        ApiError::new(ErrorCode::CheckoutFailed, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_code_and_message() {
        let err = ApiError::not_found("Product", "42");
        assert_eq!(err.to_string(), "[NOT_FOUND] Product not found: 42");
    }

    #[test]
    fn test_client_errors_map_to_codes() {
        let http = ApiError::from(ClientError::Http {
            status: 400,
            message: "Insufficient stock".into(),
        });
        assert_eq!(http.code, ErrorCode::BackendError);
        assert!(http.message.contains("Insufficient stock"));

        let unauthorized = ApiError::from(ClientError::Http {
            status: 401,
            message: "expired".into(),
        });
        assert_eq!(unauthorized.code, ErrorCode::NotAuthenticated);

        assert_eq!(
            ApiError::from(ClientError::Timeout(30)).code,
            ErrorCode::NetworkError
        );
        assert_eq!(
            ApiError::from(ClientError::InvalidConfig("bad".into())).code,
            ErrorCode::ConfigError
        );
        assert_eq!(
            ApiError::from(ClientError::Storage("disk".into())).code,
            ErrorCode::StorageError
        );
    }

    #[test]
    fn test_validation_from_client_keeps_validation_code() {
        let err = ApiError::from(ClientError::Validation(ValidationError::Required {
            field: "email".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_redirect_message_depends_on_session() {
        assert_eq!(
            ApiError::redirected(View::CustomerOrders, false).code,
            ErrorCode::NotAuthenticated
        );
        assert_eq!(
            ApiError::redirected(View::CustomerOrders, true).code,
            ErrorCode::Forbidden
        );
    }
}
