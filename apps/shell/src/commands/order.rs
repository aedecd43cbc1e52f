//! # Order Commands
//!
//! Each role sees its own order list; sellers can move an order through
//! Pending → Shipped → Delivered, or cancel it.
//!
//! | Command                 | Endpoint                       | View              |
//! |-------------------------|--------------------------------|-------------------|
//! | `orders mine`           | `GET /orders/my-orders`        | `/customer/orders`|
//! | `orders retailer`       | `GET /orders/retailer`         | `/retailer/orders`|
//! | `orders wholesale-mine` | `GET /orders/my-wholesale-orders` | `/retailer/orders`|
//! | `orders wholesaler`     | `GET /orders/wholesaler`       | `/wholesaler/orders`|
//! | `orders set-status`     | `PATCH /orders/{id}/status`    | retailer or wholesaler orders |

use std::fmt::Write as _;

use clap::Subcommand;
use tracing::info;

use livemart_core::{OrderId, OrderRecord, OrderStatus, View};

use super::{require, require_any, CommandResult};
use crate::state::AppState;

#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    /// Orders you placed as a customer
    Mine,

    /// Orders customers placed with you (retailer)
    Retailer,

    /// Orders retailers placed with you (wholesaler)
    Wholesaler,

    /// Wholesale orders you placed (retailer)
    WholesaleMine,

    /// Update an order's status
    SetStatus {
        order_id: OrderId,

        /// Pending, Shipped, Delivered or Cancelled
        status: OrderStatus,
    },
}

pub async fn run(state: &AppState, cmd: OrderCommand) -> CommandResult {
    let orders = match cmd {
        OrderCommand::Mine => {
            require(state, View::CustomerOrders)?;
            state.api.my_orders().await?
        }
        OrderCommand::Retailer => {
            require(state, View::RetailerOrders)?;
            state.api.retailer_orders().await?
        }
        OrderCommand::Wholesaler => {
            require(state, View::WholesalerOrders)?;
            state.api.wholesaler_orders().await?
        }
        OrderCommand::WholesaleMine => {
            require(state, View::RetailerOrders)?;
            state.api.my_wholesale_orders().await?
        }
        OrderCommand::SetStatus { order_id, status } => {
            require_any(state, &[View::RetailerOrders, View::WholesalerOrders])?;
            let ack = state.api.update_order_status(order_id, status).await?;
            info!(order_id, %status, "Order status updated");
            return Ok(ack
                .message
                .unwrap_or_else(|| format!("Order #{} is now {}", order_id, status)));
        }
    };

    Ok(render_orders(&orders))
}

fn render_orders(orders: &[OrderRecord]) -> String {
    if orders.is_empty() {
        return "No orders yet".to_string();
    }

    let mut out = format!(
        "{:>6}  {:<28}  {:>4}  {:>12}  {:<10}  {}\n",
        "ORDER", "PRODUCT", "QTY", "TOTAL", "STATUS", "PLACED"
    );
    for order in orders {
        let product = match (&order.product_name, order.product_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("#{}", id),
            (None, None) => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:>6}  {:<28}  {:>4}  {:>12}  {:<10}  {}",
            order.id,
            product,
            order.quantity,
            order.total_price.to_string(),
            order.status.to_string(),
            order.created_at.as_deref().unwrap_or("-")
        );
    }
    let _ = write!(out, "{} order(s)", orders.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::state_as;
    use crate::error::ErrorCode;
    use livemart_core::{Money, ProductId, Role};

    #[tokio::test]
    async fn test_customer_cannot_see_wholesaler_orders() {
        let err = run(&state_as(Role::Customer), OrderCommand::Wholesaler)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_customer_cannot_set_status() {
        let err = run(
            &state_as(Role::Customer),
            OrderCommand::SetStatus {
                order_id: 7,
                status: OrderStatus::Shipped,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn test_render_orders_prefers_product_name() {
        let order = OrderRecord {
            id: 12,
            product_id: Some(ProductId(3)),
            product_name: None,
            customer_email: None,
            retailer_id: None,
            wholesaler_id: None,
            quantity: 2,
            total_price: Money::from_major(200),
            status: OrderStatus::Shipped,
            created_at: Some("2024-05-01T10:00:00".to_string()),
        };
        let named = OrderRecord {
            product_name: Some("Basmati Rice".to_string()),
            ..order.clone()
        };

        let out = render_orders(&[order, named]);
        assert!(out.contains("#3"));
        assert!(out.contains("Basmati Rice"));
        assert!(out.contains("Shipped"));
        assert!(out.ends_with("2 order(s)"));
    }

    #[test]
    fn test_render_no_orders() {
        assert_eq!(render_orders(&[]), "No orders yet");
    }
}
