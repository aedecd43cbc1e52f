//! # livemart-core: Pure Client Logic for LiveMart
//!
//! This crate holds every piece of storefront logic that does not need the
//! network: money math, the two cart stores, catalog filtering, the role →
//! view access table, and form validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      LiveMart Client Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 livemart-shell (CLI / REPL)                     │   │
//! │  │   login ──► products search ──► cart add ──► cart checkout      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            livemart-client (REST, session, checkout)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ livemart-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌────────┐ ┌────────┐ ┌─────────┐ ┌────────────┐  │   │
//! │  │   │ types  │ │ money  │ │  cart  │ │ catalog │ │ access     │  │   │
//! │  │   │Product │ │ Money  │ │CartStore│ │ filter │ │ route table│  │   │
//! │  │   │ Order  │ │        │ │ events │ │ fuzzy   │ │ validation │  │   │
//! │  │   └────────┘ └────────┘ └────────┘ └─────────┘ └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO FILES                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Role, OrderStatus, order records)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Retail and wholesale cart stores with change subscriptions
//! - [`catalog`] - Client-side product search and filtering
//! - [`access`] - Which roles may open which views
//! - [`error`] - Domain error types
//! - [`validation`] - Form validation
//!
//! ## Example Usage
//!
//! ```rust
//! use livemart_core::cart::CartStore;
//! use livemart_core::money::Money;
//! use livemart_core::types::{Product, ProductId};
//!
//! let mut cart = CartStore::retail();
//! let product = Product::new(ProductId(1), "Basmati Rice 5kg", Money::from_major(100));
//!
//! cart.add_item(&product, 1);
//! cart.add_item(&product, 1);
//!
//! assert_eq!(cart.line_count(), 1);
//! assert_eq!(cart.total_items(), 2);
//! assert_eq!(cart.total_price(), Money::from_major(200));
//! ```

pub mod access;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{authorize, authorize_path, Access, View};
pub use cart::{
    CartChange, CartEvent, CartLineItem, CartStore, CartSummary, IdentityPolicy, SubscriptionId,
};
pub use catalog::{CatalogFilter, PriceRange, SearchHistory};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Typo tolerance for catalog text search.
///
/// 0.0 demands an exact substring, 1.0 matches anything. 0.3 lets a
/// five-letter word carry one typo.
pub const FUZZY_THRESHOLD: f64 = 0.3;

/// Number of recent search queries remembered by [`SearchHistory`].
pub const SEARCH_HISTORY_LEN: usize = 5;

/// Upper bound of the default catalog price range, in major units.
pub const DEFAULT_MAX_PRICE: i64 = 1000;

/// Largest quantity a single `cart add` may request.
pub const MAX_LINE_QUANTITY: u32 = 10_000;
