//! # Cart Commands
//!
//! Cart manipulation and checkout for both carts.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────────┐     ┌──────────┐   │
//! │  │  Empty   │────►│ In Cart  │────►│  Checkout    │────►│  Orders  │   │
//! │  │  Cart    │     │          │     │ (sequential) │     │  placed  │   │
//! │  └──────────┘     └──────────┘     └──────────────┘     └──────────┘   │
//! │       ▲                │                  │                   │        │
//! │       │           cart add           any line fails           │        │
//! │       │           cart remove             │                   │        │
//! │       │                │                  ▼                   │        │
//! │       │                │           cart unchanged,            │        │
//! │       │                │           placed orders reported     │        │
//! │       │                ▼                                      │        │
//! │       └──────────  cart clear  ◄──────────────────────────────┘        │
//! │                                   (cleared after success)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `--wholesale` selects the retailer's wholesale cart; without it the
//! customer's retail cart is used.

use std::fmt::Write as _;

use clap::{Args, Subcommand};
use tracing::debug;

use livemart_client::{CartState, CheckoutCoordinator, CheckoutReceipt};
use livemart_core::validation::validate_quantity;
use livemart_core::{CartKind, CartSummary, ProductId, View};

use super::product::load_catalog;
use super::{require, CommandResult};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, Args)]
pub struct CartTarget {
    /// Use the wholesale cart (retailers buying stock)
    #[arg(long)]
    pub wholesale: bool,
}

impl CartTarget {
    pub fn kind(&self) -> CartKind {
        if self.wholesale {
            CartKind::Wholesale
        } else {
            CartKind::Retail
        }
    }

    /// The view that owns this cart.
    pub fn view(&self) -> View {
        match self.kind() {
            CartKind::Retail => View::CustomerHome,
            CartKind::Wholesale => View::RetailerBuyWholesale,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Add a product by id
    Add {
        product_id: i64,

        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,

        #[command(flatten)]
        target: CartTarget,
    },

    /// Remove a product's line
    Remove {
        product_id: i64,

        #[command(flatten)]
        target: CartTarget,
    },

    /// Empty the cart
    Clear {
        #[command(flatten)]
        target: CartTarget,
    },

    /// Show lines and totals
    Show {
        #[command(flatten)]
        target: CartTarget,
    },

    /// Place one order per line
    Checkout {
        #[command(flatten)]
        target: CartTarget,
    },
}

pub async fn run(state: &AppState, cmd: CartCommand) -> CommandResult {
    match cmd {
        CartCommand::Add {
            product_id,
            quantity,
            target,
        } => {
            require(state, target.view())?;
            let quantity = validate_quantity(quantity)?;
            let id = ProductId(product_id);

            let product = match state.catalog.find(id) {
                Some(product) => product,
                None => {
                    load_catalog(state, false).await?;
                    state
                        .catalog
                        .find(id)
                        .ok_or_else(|| ApiError::not_found("Product", &id.to_string()))?
                }
            };

            let cart = state.carts.get(target.kind());
            cart.with_cart_mut(|c| c.add_item(&product, quantity));
            debug!(product_id = %id, quantity, kind = %target.kind(), "Added to cart");
            Ok(render_cart(cart))
        }
        CartCommand::Remove { product_id, target } => {
            require(state, target.view())?;
            let id = ProductId(product_id);
            let cart = state.carts.get(target.kind());

            if !cart.with_cart_mut(|c| c.remove_item(id)) {
                return Ok(format!("Product #{} was not in the cart", id));
            }
            Ok(render_cart(cart))
        }
        CartCommand::Clear { target } => {
            require(state, target.view())?;
            state.carts.get(target.kind()).with_cart_mut(|c| c.clear_cart());
            Ok("Cart cleared".to_string())
        }
        CartCommand::Show { target } => {
            require(state, target.view())?;
            Ok(render_cart(state.carts.get(target.kind())))
        }
        CartCommand::Checkout { target } => {
            require(state, target.view())?;
            let coordinator = CheckoutCoordinator::new(state.api.clone());
            let receipt = coordinator.checkout(state.carts.get(target.kind())).await?;
            Ok(render_receipt(&receipt))
        }
    }
}

fn render_cart(cart: &CartState) -> String {
    let summary = cart.with_cart(|c| CartSummary::from(c));
    if summary.lines.is_empty() {
        return format!("Your {} cart is empty", summary.kind);
    }

    let mut out = String::new();
    for line in &summary.lines {
        let _ = writeln!(
            out,
            "{:>6}  {:<32}  {:>4} x {:>10}  = {:>12}",
            line.id,
            line.name,
            line.quantity,
            line.price.to_string(),
            line.line_total().to_string()
        );
    }
    let _ = write!(
        out,
        "{} line(s), {} item(s), total {}",
        summary.line_count, summary.total_items, summary.total_price
    );
    out
}

fn render_receipt(receipt: &CheckoutReceipt) -> String {
    if receipt.is_empty() {
        return "Cart is empty, nothing to check out".to_string();
    }

    let mut out = String::new();
    for placed in &receipt.orders {
        let _ = writeln!(
            out,
            "Order #{}: {} x {} ({})",
            placed.order.id, placed.line.quantity, placed.line.name, placed.order.total_price
        );
    }
    let _ = write!(out, "{} order(s) placed, cart cleared", receipt.orders.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{state, state_as};
    use crate::error::ErrorCode;
    use livemart_core::{Money, Product, Role};

    fn add(product_id: i64, quantity: i64, wholesale: bool) -> CartCommand {
        CartCommand::Add {
            product_id,
            quantity,
            target: CartTarget { wholesale },
        }
    }

    fn seeded(role: Role) -> AppState {
        let state = state_as(role);
        state.catalog.replace(vec![
            Product::new(ProductId(1), "Basmati Rice", Money::from_major(100)),
            Product::new(ProductId(2), "Toor Dal", Money::from_minor(8950)),
        ]);
        state
    }

    #[tokio::test]
    async fn test_add_same_product_twice_merges() {
        let state = seeded(Role::Customer);

        run(&state, add(1, 1, false)).await.unwrap();
        let out = run(&state, add(1, 1, false)).await.unwrap();

        let cart = state.carts.retail();
        assert_eq!(cart.with_cart(|c| c.line_count()), 1);
        assert_eq!(cart.with_cart(|c| c.total_items()), 2);
        assert_eq!(cart.with_cart(|c| c.total_price()), Money::from_major(200));
        assert!(out.contains("total ₹200.00"));
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let state = seeded(Role::Customer);
        run(&state, add(1, 2, false)).await.unwrap();

        let out = run(
            &state,
            CartCommand::Remove {
                product_id: 99,
                target: CartTarget::default(),
            },
        )
        .await
        .unwrap();

        assert!(out.contains("was not in the cart"));
        assert_eq!(state.carts.retail().with_cart(|c| c.total_items()), 2);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let err = run(&seeded(Role::Customer), add(1, 0, false)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_wholesale_cart_is_for_retailers() {
        let err = run(&seeded(Role::Customer), add(1, 1, true)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let retailer = seeded(Role::Retailer);
        run(&retailer, add(2, 10, true)).await.unwrap();
        assert_eq!(retailer.carts.wholesale().with_cart(|c| c.total_items()), 10);
        assert!(retailer.carts.retail().with_cart(|c| c.is_empty()));
    }

    #[tokio::test]
    async fn test_cart_needs_login() {
        let err = run(
            &state(),
            CartCommand::Show {
                target: CartTarget::default(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_sends_nothing() {
        let out = run(
            &seeded(Role::Customer),
            CartCommand::Checkout {
                target: CartTarget::default(),
            },
        )
        .await
        .unwrap();
        assert_eq!(out, "Cart is empty, nothing to check out");
    }

    #[tokio::test]
    async fn test_clear_then_show() {
        let state = seeded(Role::Customer);
        run(&state, add(1, 3, false)).await.unwrap();
        run(
            &state,
            CartCommand::Clear {
                target: CartTarget::default(),
            },
        )
        .await
        .unwrap();

        let out = run(
            &state,
            CartCommand::Show {
                target: CartTarget::default(),
            },
        )
        .await
        .unwrap();
        assert_eq!(out, "Your retail cart is empty");
    }
}
