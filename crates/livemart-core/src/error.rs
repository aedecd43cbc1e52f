//! # Error Types
//!
//! Domain-specific error types for livemart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  livemart-core errors (this file)                                      │
//! │  ├── CoreError        - Domain rule failures                           │
//! │  └── ValidationError  - Form input failures                            │
//! │                                                                         │
//! │  livemart-client errors (separate crate)                               │
//! │  └── ClientError      - Network, backend, storage, config failures     │
//! │                                                                         │
//! │  Shell errors (in app)                                                 │
//! │  └── ApiError         - The one-line notification the user sees        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError / ClientError → ApiError → User     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id is not in the fetched catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Line id is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(i64),

    /// A value could not be represented as money (overflow or NaN on the wire).
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any request leaves the client, so a malformed form never
/// costs a round trip.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., malformed email, OTP with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
