//! # Domain Types
//!
//! Wire and domain types shared by every LiveMart crate.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    NewOrder     │   │  OrderRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  product_id     │   │  id             │       │
//! │  │  name           │   │  quantity       │   │  quantity       │       │
//! │  │  price (Money)  │   │  total_price    │   │  total_price    │       │
//! │  │  product_type   │   └─────────────────┘   │  status         │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Role       │   │  OrderStatus    │   │   LoginGrant    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  customer       │   │  Pending        │   │  access_token   │       │
//! │  │  retailer       │   │  Shipped        │   │  role, email    │       │
//! │  │  wholesaler     │   │  Delivered      │   └─────────────────┘       │
//! │  └─────────────────┘   │  Cancelled      │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! The backend hands out integer ids. They are wrapped in [`ProductId`] so a
//! product id can never be passed where an order id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Identifiers
// =============================================================================

/// Backend product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend order identifier.
pub type OrderId = i64;

// =============================================================================
// Product
// =============================================================================

/// Which marketplace a product is listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Sold by retailers to customers.
    #[default]
    Retail,
    /// Sold by wholesalers to retailers.
    Wholesale,
    /// Any listing type this client does not know about.
    #[serde(other)]
    Unknown,
}

/// A product as returned by `GET /products/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    pub name: String,

    /// Unit price.
    pub price: Money,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    /// Units on hand. Older backends omit it.
    #[serde(default)]
    pub stock: i64,

    #[serde(default)]
    pub category: Option<String>,

    /// Free-text delivery estimate ("2-3 days").
    #[serde(default)]
    pub delivery_time: Option<String>,

    #[serde(default)]
    pub product_type: ProductKind,

    /// User id of the retailer or wholesaler who listed it.
    #[serde(default)]
    pub owner_id: Option<i64>,
}

impl Product {
    /// Creates a retail product with only the fields a cart cares about.
    pub fn new(id: ProductId, name: impl Into<String>, price: Money) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            description: None,
            image_url: None,
            stock: 0,
            category: None,
            delivery_time: None,
            product_type: ProductKind::Retail,
            owner_id: None,
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the listing type.
    pub fn with_kind(mut self, kind: ProductKind) -> Self {
        self.product_type = kind;
        self
    }

    /// Checks if stock covers the requested quantity.
    pub fn in_stock(&self, quantity: u32) -> bool {
        self.stock >= i64::from(quantity)
    }
}

/// Body of `POST /products/`.
///
/// `owner_id` and `product_type` are assigned by the backend from the
/// caller's token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// =============================================================================
// Role
// =============================================================================

/// The three kinds of account. Decides which views a user may open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Retailer,
    Wholesaler,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Customer, Role::Retailer, Role::Wholesaler];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Retailer => "retailer",
            Role::Wholesaler => "wholesaler",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: Role::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Fulfilment state of an order.
///
/// Wire values are capitalised (`"Shipped"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
    /// Listings may carry statuses this client cannot set ("Processing").
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Statuses a seller may move an order to.
    pub const SETTABLE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::SETTABLE
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::SETTABLE
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

/// Body of an order-creation request, one per cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price × quantity, computed client-side.
    pub total_price: Money,
}

/// An order as listed by the `/orders/*` endpoints.
///
/// Retail and wholesale listings differ slightly; every field that is not
/// present in both is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,

    #[serde(default)]
    pub product_id: Option<ProductId>,

    #[serde(default)]
    pub product_name: Option<String>,

    #[serde(default)]
    pub customer_email: Option<String>,

    #[serde(default)]
    pub retailer_id: Option<i64>,

    #[serde(default)]
    pub wholesaler_id: Option<i64>,

    pub quantity: u32,

    pub total_price: Money,

    #[serde(default)]
    pub status: OrderStatus,

    /// ISO-8601 timestamp, kept as the backend formatted it.
    #[serde(default, alias = "order_date")]
    pub created_at: Option<String>,
}

// =============================================================================
// Authentication
// =============================================================================

/// Successful response of `POST /auth/login/verify-otp`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginGrant {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub role: Role,
    pub email: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

// =============================================================================
// Cart Kind
// =============================================================================

/// Which of the two carts a line belongs to.
///
/// Also selects the order endpoint at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartKind {
    Retail,
    Wholesale,
}

impl fmt::Display for CartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartKind::Retail => f.write_str("retail"),
            CartKind::Wholesale => f.write_str("wholesale"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_decodes_backend_shape() {
        let json = r#"{
            "id": 3,
            "name": "Toor Dal 1kg",
            "description": "Unpolished",
            "price": 142.5,
            "owner_id": 9,
            "product_type": "wholesale"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id, ProductId(3));
        assert_eq!(product.price, Money::from_minor(14250));
        assert_eq!(product.stock, 0);
        assert_eq!(product.product_type, ProductKind::Wholesale);
        assert_eq!(product.category, None);
    }

    #[test]
    fn test_unknown_product_type_is_tolerated() {
        let json = r#"{"id": 1, "name": "x", "price": 1, "product_type": "bundle"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.product_type, ProductKind::Unknown);
    }

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("Retailer".parse::<Role>().unwrap(), Role::Retailer);
        assert_eq!(Role::Wholesaler.to_string(), "wholesaler");
        assert!(matches!(
            "admin".parse::<Role>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_order_status_wire_values() {
        assert_eq!(serde_json::to_string(&OrderStatus::Shipped).unwrap(), "\"Shipped\"");
        let status: OrderStatus = serde_json::from_str("\"Processing\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
        assert_eq!("delivered".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert!("Unknown".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_record_accepts_order_date() {
        let json = r#"{
            "id": 11,
            "customer_email": "asha@example.com",
            "product_id": 1,
            "quantity": 2,
            "total_price": 200.0,
            "order_date": "2025-11-02T10:00:00",
            "status": "Pending"
        }"#;
        let order: OrderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(order.created_at.as_deref(), Some("2025-11-02T10:00:00"));
        assert_eq!(order.total_price, Money::from_major(200));
        assert_eq!(order.product_id, Some(ProductId(1)));
    }

    #[test]
    fn test_new_order_body() {
        let order = NewOrder {
            product_id: ProductId(1),
            quantity: 2,
            total_price: Money::from_major(200),
        };
        let value = serde_json::to_value(order).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"product_id": 1, "quantity": 2, "total_price": 200.0})
        );
    }

    #[test]
    fn test_login_grant_defaults_token_type() {
        let json = r#"{"access_token": "abc", "role": "customer", "email": "a@b.co"}"#;
        let grant: LoginGrant = serde_json::from_str(json).unwrap();
        assert_eq!(grant.token_type, "bearer");
        assert_eq!(grant.role, Role::Customer);
    }
}
