//! # Cart State
//!
//! The two carts of a shell session.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Command                   Cart                  Store Change           │
//! │  ───────                   ────                  ────────────           │
//! │                                                                         │
//! │  cart add 7 ─────────────► retail ─────────────► add_item(p, 1)         │
//! │                                                                         │
//! │  cart add 7 --wholesale ─► wholesale ──────────► add_item (id or name)  │
//! │                                                                         │
//! │  cart remove 7 ──────────► retail ─────────────► remove_item(7)         │
//! │                                                                         │
//! │  cart clear ─────────────► retail ─────────────► clear_cart()           │
//! │                                                                         │
//! │  cart checkout ──────────► retail ─────────────► CheckoutCoordinator    │
//! │                                                                         │
//! │  Every change is reported to the store's subscribers; the shell         │
//! │  subscribes a debug log line per change.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use livemart_client::CartState;
use livemart_core::{CartEvent, CartKind};

/// Retail and wholesale carts.
#[derive(Debug, Clone)]
pub struct Carts {
    retail: CartState,
    wholesale: CartState,
}

impl Carts {
    /// Creates both carts empty, with change logging attached.
    pub fn new() -> Self {
        let carts = Carts {
            retail: CartState::retail(),
            wholesale: CartState::wholesale(),
        };

        for cart in [&carts.retail, &carts.wholesale] {
            cart.with_cart_mut(|store| store.subscribe(log_change));
        }
        carts
    }

    pub fn get(&self, kind: CartKind) -> &CartState {
        match kind {
            CartKind::Retail => &self.retail,
            CartKind::Wholesale => &self.wholesale,
        }
    }

    pub fn retail(&self) -> &CartState {
        &self.retail
    }

    pub fn wholesale(&self) -> &CartState {
        &self.wholesale
    }
}

impl Default for Carts {
    fn default() -> Self {
        Self::new()
    }
}

fn log_change(event: &CartEvent) {
    debug!(
        kind = %event.kind,
        change = ?event.change,
        total_items = event.total_items,
        total_price = %event.total_price,
        "Cart changed"
    );
}
