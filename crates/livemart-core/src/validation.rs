//! # Validation Module
//!
//! Form checks run before a request leaves the client.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Shell argument parsing (clap)                                │
//! │  ├── Types: ids are integers, prices are decimals                      │
//! │  └── Required arguments present                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Email / OTP / password shape                                      │
//! │  └── Product form rules (name, price, stock), quantity                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend REST API                                             │
//! │  ├── Account and OTP checks                                            │
//! │  └── Role and ownership checks                                         │
//! │                                                                         │
//! │  A failure at layer 2 costs no round trip.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use livemart_core::validation::{validate_email, validate_otp};
//!
//! assert!(validate_email("asha@example.com").is_ok());
//! assert!(validate_otp("12345a").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::NewProduct;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_PERSON_NAME_LEN: usize = 100;
const MAX_PRODUCT_NAME_LEN: usize = 200;
const MAX_QUERY_LEN: usize = 100;
const OTP_LEN: usize = 6;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Exactly one `@`, with something on both sides
/// - The domain contains a dot that is not its first or last character
///
/// ## Example
/// ```rust
/// use livemart_core::validation::validate_email;
///
/// assert!(validate_email("ravi@shop.in").is_ok());
/// assert!(validate_email("ravi@shop").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(required("email"));
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err(invalid("email", "missing @")),
    };

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("email", "expected name@domain"));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("email", "must not contain spaces"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("email", "domain must contain a dot"));
    }

    Ok(())
}

/// Validates a one-time passcode: exactly six ASCII digits.
pub fn validate_otp(otp: &str) -> ValidationResult<()> {
    let otp = otp.trim();

    if otp.is_empty() {
        return Err(required("otp"));
    }

    if otp.len() != OTP_LEN || !otp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("otp", "must be 6 digits"));
    }

    Ok(())
}

/// Validates a password. Strength rules live on the backend.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(required("password"));
    }
    Ok(())
}

/// Validates the display name given at registration.
pub fn validate_person_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(required("name"));
    }

    if name.chars().count() > MAX_PERSON_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PERSON_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use livemart_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Sona Masoori 10kg").is_ok());
/// assert!(validate_product_name("  ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(required("name"));
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a listing price. Free listings are not allowed.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a stock count.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

/// Runs every product-form rule on a listing before `POST /products/`.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_price(product.price)?;
    validate_stock(product.stock)?;
    Ok(())
}

/// Validates a search query and returns it trimmed.
///
/// An empty query is fine: it means "everything".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity typed by the user and narrows it to the cart's type.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  livemart cart add 12 --quantity 5                                      │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty < 1? → Error: "quantity must be positive"                │
/// │       │                                                                 │
/// │       ├── qty > MAX_LINE_QUANTITY? → Error: "too large"                │
/// │       │                                                                 │
/// │       └── OK → CartStore::add_item(&product, 5)                        │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<u32> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    u32::try_from(qty)
        .ok()
        .filter(|qty| *qty <= MAX_LINE_QUANTITY)
        .ok_or_else(|| {
            invalid(
                "quantity",
                &format!("too large (at most {})", MAX_LINE_QUANTITY),
            )
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("asha@example.com").is_ok());
        assert!(validate_email("  asha@example.co.in ").is_ok());

        assert_eq!(validate_email(""), Err(required("email")));
        assert!(validate_email("asha.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("asha@@example.com").is_err());
        assert!(validate_email("asha@example").is_err());
        assert!(validate_email("asha@example.").is_err());
        assert!(validate_email("as ha@example.com").is_err());
    }

    #[test]
    fn test_validate_otp() {
        assert!(validate_otp("042913").is_ok());
        assert!(validate_otp("42913").is_err());
        assert!(validate_otp("0429133").is_err());
        assert!(validate_otp("04a913").is_err());
        assert_eq!(validate_otp(""), Err(required("otp")));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter2").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_person_name() {
        assert!(validate_person_name("Asha Rao").is_ok());
        assert!(validate_person_name("").is_err());
        assert!(validate_person_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Basmati Rice").is_ok());
        assert!(validate_product_name(&"न".repeat(200)).is_ok());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price(Money::from_minor(1)).is_ok());
        assert!(validate_price(Money::zero()).is_err());
        assert!(validate_stock(0).is_ok());
        assert_eq!(
            validate_stock(-1),
            Err(ValidationError::Negative {
                field: "stock".to_string()
            })
        );
    }

    #[test]
    fn test_validate_new_product() {
        let mut product = NewProduct {
            name: "Toor Dal".to_string(),
            description: "1kg".to_string(),
            price: Money::from_major(90),
            stock: 10,
            category: None,
            delivery_time: None,
            image_url: None,
        };
        assert!(validate_new_product(&product).is_ok());

        product.stock = -5;
        assert!(validate_new_product(&product).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity(1), Ok(1));
        assert_eq!(validate_quantity(999), Ok(999));
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert_eq!(validate_quantity(10_000), Ok(10_000));
        assert!(validate_quantity(10_001).is_err());
        assert!(validate_quantity(2_000_000_000).is_err());
        assert!(validate_quantity(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  rice ").unwrap(), "rice");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }
}
