//! # Cart Stores
//!
//! The retail and wholesale shopping carts.
//!
//! Both carts are the same [`CartStore`] type; they differ only in how an
//! incoming product is matched against existing lines ([`IdentityPolicy`]).
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  User Action              Store Method            State Change          │
//! │  ───────────              ────────────            ────────────          │
//! │                                                                         │
//! │  Add product ────────────► add_item() ──────────► qty += n  or  push   │
//! │                                                                         │
//! │  Remove product ─────────► remove_item() ───────► lines.remove(i)      │
//! │                                                                         │
//! │  Clear / checkout done ──► clear_cart() ────────► lines.clear()        │
//! │                                                                         │
//! │  Show cart ──────────────► total_items() ───────► (derived, read only) │
//! │                            total_price()                                │
//! │                                                                         │
//! │  Every effective mutation fires one CartEvent to each subscriber.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by identity key; adding an existing product bumps its
//!   quantity instead of adding a second line
//! - Every line has quantity ≥ 1
//! - Totals are computed on read, never stored
//! - Insertion order is display order

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::money::Money;
use crate::types::{CartKind, Product, ProductId};

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in a cart.
///
/// Name and price are captured when the product is first added. Later
/// catalog changes do not alter a line already in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    /// Unit price at the time the line was created.
    pub price: Money,
    /// Always ≥ 1.
    pub quantity: u32,
    pub kind: CartKind,
}

impl CartLineItem {
    /// Creates a line from a catalog product.
    pub fn from_product(product: &Product, quantity: u32, kind: CartKind) -> Self {
        CartLineItem {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
            kind,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Identity Policy
// =============================================================================

/// How an incoming product is matched to an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Same product id.
    ById,
    /// Same product id, or failing that the same product name.
    ///
    /// Used by the wholesale cart, where listings have been seen to come
    /// back with a fresh id for the same product.
    ByIdOrName,
}

impl From<CartKind> for IdentityPolicy {
    fn from(kind: CartKind) -> Self {
        match kind {
            CartKind::Retail => IdentityPolicy::ById,
            CartKind::Wholesale => IdentityPolicy::ByIdOrName,
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// What changed in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartChange {
    /// A line was created or its quantity raised. `quantity` is the line's
    /// new quantity.
    Added { id: ProductId, quantity: u32 },
    /// A line was removed.
    Removed { id: ProductId },
    /// The cart was emptied.
    Cleared,
}

/// Notification delivered to cart subscribers after each mutation.
///
/// Carries the post-mutation totals so a badge or summary can redraw without
/// locking the cart again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartEvent {
    pub kind: CartKind,
    pub change: CartChange,
    pub total_items: u64,
    pub total_price: Money,
}

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&CartEvent) + Send + Sync>;

// =============================================================================
// Cart Store
// =============================================================================

/// An in-memory shopping cart.
///
/// Lives for one session and is never persisted. Shared access goes through
/// `livemart_client::CartState`.
pub struct CartStore {
    kind: CartKind,
    policy: IdentityPolicy,
    lines: Vec<CartLineItem>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl CartStore {
    /// Creates an empty cart of the given kind.
    pub fn new(kind: CartKind) -> Self {
        CartStore {
            kind,
            policy: IdentityPolicy::from(kind),
            lines: Vec::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Creates an empty retail cart.
    pub fn retail() -> Self {
        Self::new(CartKind::Retail)
    }

    /// Creates an empty wholesale cart.
    pub fn wholesale() -> Self {
        Self::new(CartKind::Wholesale)
    }

    pub fn kind(&self) -> CartKind {
        self.kind
    }

    pub fn policy(&self) -> IdentityPolicy {
        self.policy
    }

    /// Adds `quantity` units of a product.
    ///
    /// ## Behavior
    /// - Matching line exists: its quantity goes up by `quantity`
    /// - No match: a new line is appended with `quantity`
    /// - `quantity == 0`: nothing happens
    ///
    /// Quantities saturate at `u32::MAX`.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        let new_quantity = match self.find_line(product) {
            Some(index) => {
                let line = &mut self.lines[index];
                if line.id != product.id {
                    warn!(
                        kind = %self.kind,
                        old_id = %line.id,
                        new_id = %product.id,
                        name = %product.name,
                        "Cart line matched by name only, adopting new product id"
                    );
                    line.id = product.id;
                }
                line.quantity = line.quantity.saturating_add(quantity);
                line.quantity
            }
            None => {
                self.lines
                    .push(CartLineItem::from_product(product, quantity, self.kind));
                quantity
            }
        };

        self.notify(CartChange::Added {
            id: product.id,
            quantity: new_quantity,
        });
    }

    /// Removes the line for `id`.
    ///
    /// Returns `false` (and notifies nobody) if no such line exists.
    pub fn remove_item(&mut self, id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);

        if self.lines.len() == before {
            return false;
        }

        self.notify(CartChange::Removed { id });
        true
    }

    /// Empties the cart.
    pub fn clear_cart(&mut self) {
        self.lines.clear();
        self.notify(CartChange::Cleared);
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Looks up a line by product id.
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities over all lines.
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Σ(price × quantity) over all lines.
    pub fn total_price(&self) -> Money {
        self.lines.iter().map(CartLineItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Registers a listener called after every effective mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&CartEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drops a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn find_line(&self, product: &Product) -> Option<usize> {
        let by_id = self.lines.iter().position(|line| line.id == product.id);

        match self.policy {
            IdentityPolicy::ById => by_id,
            IdentityPolicy::ByIdOrName => by_id.or_else(|| {
                self.lines
                    .iter()
                    .position(|line| line.name == product.name)
            }),
        }
    }

    fn notify(&self, change: CartChange) {
        if self.listeners.is_empty() {
            return;
        }

        let event = CartEvent {
            kind: self.kind,
            change,
            total_items: self.total_items(),
            total_price: self.total_price(),
        };

        for (_, listener) in &self.listeners {
            listener(&event);
        }
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::retail()
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("kind", &self.kind)
            .field("lines", &self.lines)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Cart totals for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub kind: CartKind,
    pub lines: Vec<CartLineItem>,
    pub line_count: usize,
    pub total_items: u64,
    pub total_price: Money,
}

impl From<&CartStore> for CartSummary {
    fn from(cart: &CartStore) -> Self {
        CartSummary {
            kind: cart.kind(),
            lines: cart.items().to_vec(),
            line_count: cart.line_count(),
            total_items: cart.total_items(),
            total_price: cart.total_price(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
