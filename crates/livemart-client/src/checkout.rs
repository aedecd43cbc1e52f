//! # Checkout Coordinator
//!
//! Turns a cart into backend orders, one request per line.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         checkout(cart)                                  │
//! │                                                                         │
//! │  1. Snapshot lines (lock held only for the copy)                        │
//! │  2. Empty? ──► receipt with zero orders, no requests                    │
//! │  3. For each line, in cart order:                                       │
//! │       POST {product_id, quantity, total_price = price × quantity}       │
//! │       await the response before sending the next one                    │
//! │       │                                                                 │
//! │       ├── Ok  ──► record it, continue                                   │
//! │       └── Err ──► STOP. Cart untouched. Already-placed orders stay on   │
//! │                   the backend and are reported in CheckoutError.        │
//! │  4. All succeeded ──► clear the cart, return CheckoutReceipt            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Non-Atomic
//! There is no batch endpoint and no idempotency key. Retrying after a
//! partial failure re-submits the lines that already went through; the
//! `placed` list in [`CheckoutError`] tells the user which ones.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

use livemart_core::{CartKind, CartLineItem, NewOrder, OrderRecord};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::state::CartState;

// =============================================================================
// Order Gateway
// =============================================================================

/// Where checkout sends orders.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Places one order on the endpoint for `kind`.
    async fn place_order(&self, kind: CartKind, order: &NewOrder) -> ClientResult<OrderRecord>;
}

#[async_trait]
impl OrderGateway for ApiClient {
    async fn place_order(&self, kind: CartKind, order: &NewOrder) -> ClientResult<OrderRecord> {
        match kind {
            CartKind::Retail => self.create_retail_order(order).await,
            CartKind::Wholesale => self.create_wholesale_order(order).await,
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// One line that became an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub line: CartLineItem,
    pub order: OrderRecord,
}

/// Outcome of a fully successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    /// Correlates the log lines of one checkout run. Not sent to the backend.
    pub checkout_id: Uuid,
    pub kind: CartKind,
    pub orders: Vec<PlacedOrder>,
}

impl CheckoutReceipt {
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// A checkout that stopped partway.
#[derive(Debug, Error)]
#[error(
    "Checkout stopped at \"{}\" ({} of {} orders placed): {source}",
    .failed.name,
    .placed.len(),
    .total_lines
)]
pub struct CheckoutError {
    pub checkout_id: Uuid,
    /// Orders the backend accepted before the failure.
    pub placed: Vec<PlacedOrder>,
    /// The line whose request failed.
    pub failed: CartLineItem,
    /// Number of lines in the cart when checkout started.
    pub total_lines: usize,
    #[source]
    pub source: ClientError,
}

impl CheckoutError {
    /// True if some orders went through, so retrying would duplicate them.
    pub fn is_partial(&self) -> bool {
        !self.placed.is_empty()
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Drains a cart into the backend, sequentially.
pub struct CheckoutCoordinator<G: ?Sized> {
    gateway: Arc<G>,
}

impl<G: OrderGateway + ?Sized> CheckoutCoordinator<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        CheckoutCoordinator { gateway }
    }

    /// Places one order per cart line, then clears the cart.
    ///
    /// On the first failure the remaining lines are not sent and the cart is
    /// left exactly as it was.
    pub async fn checkout(&self, cart: &CartState) -> Result<CheckoutReceipt, CheckoutError> {
        let checkout_id = Uuid::new_v4();
        let kind = cart.kind();
        let lines = cart.with_cart(|c| c.items().to_vec());
        let total_lines = lines.len();

        if lines.is_empty() {
            info!(%checkout_id, %kind, "Checkout on empty cart, nothing to send");
            return Ok(CheckoutReceipt {
                checkout_id,
                kind,
                orders: Vec::new(),
            });
        }

        info!(%checkout_id, %kind, lines = total_lines, "Checkout started");

        let mut placed = Vec::with_capacity(total_lines);

        for (index, line) in lines.into_iter().enumerate() {
            let request = NewOrder {
                product_id: line.id,
                quantity: line.quantity,
                total_price: line.line_total(),
            };

            debug!(
                %checkout_id,
                step = index + 1,
                product_id = %line.id,
                quantity = line.quantity,
                total_price = %request.total_price,
                "Placing order"
            );

            match self.gateway.place_order(kind, &request).await {
                Ok(order) => placed.push(PlacedOrder { line, order }),
                Err(source) => {
                    error!(
                        %checkout_id,
                        step = index + 1,
                        product_id = %line.id,
                        placed = placed.len(),
                        error = %source,
                        "Checkout aborted, cart kept"
                    );
                    return Err(CheckoutError {
                        checkout_id,
                        placed,
                        failed: line,
                        total_lines,
                        source,
                    });
                }
            }
        }

        cart.with_cart_mut(|c| c.clear_cart());

        info!(%checkout_id, %kind, orders = placed.len(), "Checkout complete, cart cleared");
        Ok(CheckoutReceipt {
            checkout_id,
            kind,
            orders: placed,
        })
    }
}
