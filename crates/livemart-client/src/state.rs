//! # Cart State
//!
//! Shared handle to one cart store.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. Shell commands and the checkout coordinator both reach the same cart
//! 2. Only one of them should mutate it at a time
//! 3. Checkout runs on the tokio runtime while commands keep being accepted
//!
//! ## Locking Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  with_cart / with_cart_mut take a closure, so the guard can never       │
//! │  escape into an `.await`:                                               │
//! │                                                                         │
//! │   let lines = state.with_cart(|c| c.items().to_vec());  // lock, copy   │
//! │   for line in lines { gateway.place_order(..).await }   // no lock held │
//! │   state.with_cart_mut(|c| c.clear_cart());              // lock, clear  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use livemart_core::{CartKind, CartStore};

/// Cloneable handle to a cart store.
#[derive(Debug, Clone)]
pub struct CartState {
    kind: CartKind,
    cart: Arc<Mutex<CartStore>>,
}

impl CartState {
    /// Creates a handle over a new, empty cart.
    pub fn new(kind: CartKind) -> Self {
        CartState {
            kind,
            cart: Arc::new(Mutex::new(CartStore::new(kind))),
        }
    }

    pub fn retail() -> Self {
        Self::new(CartKind::Retail)
    }

    pub fn wholesale() -> Self {
        Self::new(CartKind::Wholesale)
    }

    pub fn kind(&self) -> CartKind {
        self.kind
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust
    /// use livemart_client::CartState;
    ///
    /// let state = CartState::retail();
    /// assert_eq!(state.with_cart(|cart| cart.total_items()), 0);
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartStore) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartStore) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}
