//! End-to-end storefront flows without a live backend: a logged-in session,
//! cart mutations, and checkout through an in-memory order gateway.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use livemart_client::{
    AuthSessionStore, CartState, CheckoutCoordinator, ClientError, ClientResult, DurableStorage,
    OrderGateway, SessionScopeStorage,
};
use livemart_core::{
    authorize, Access, CartKind, LoginGrant, Money, NewOrder, OrderRecord, OrderStatus, Product,
    ProductId, ProductKind, Role, View,
};

/// Accepts orders into a vector; rejects any product listed in `out_of_stock`.
#[derive(Default)]
struct InMemoryBackend {
    orders: Mutex<Vec<(CartKind, NewOrder)>>,
    out_of_stock: Vec<ProductId>,
}

#[async_trait]
impl OrderGateway for InMemoryBackend {
    async fn place_order(&self, kind: CartKind, order: &NewOrder) -> ClientResult<OrderRecord> {
        if self.out_of_stock.contains(&order.product_id) {
            return Err(ClientError::Http {
                status: 400,
                message: format!("Product {} is out of stock", order.product_id),
            });
        }

        let mut orders = self.orders.lock().unwrap();
        orders.push((kind, *order));
        Ok(OrderRecord {
            id: 100 + orders.len() as i64,
            product_id: Some(order.product_id),
            product_name: None,
            customer_email: Some("asha@example.com".to_string()),
            retailer_id: None,
            wholesaler_id: None,
            quantity: order.quantity,
            total_price: order.total_price,
            status: OrderStatus::Pending,
            created_at: None,
        })
    }
}

fn grant(role: Role) -> LoginGrant {
    LoginGrant {
        access_token: "token-abc".to_string(),
        token_type: "bearer".to_string(),
        role,
        email: "asha@example.com".to_string(),
    }
}

fn memory_session() -> AuthSessionStore {
    AuthSessionStore::new(
        Box::new(SessionScopeStorage::new()),
        Box::new(SessionScopeStorage::new()),
    )
}

fn temp_session_file() -> PathBuf {
    std::env::temp_dir()
        .join(format!("livemart-flow-{}", uuid::Uuid::new_v4()))
        .join("session.json")
}

#[tokio::test]
async fn customer_buys_the_same_product_twice() {
    let session = memory_session();
    session.login(grant(Role::Customer), false).unwrap();
    assert_eq!(authorize(View::CustomerHome, session.role()), Access::Granted);

    let cart = CartState::retail();
    let rice = Product::new(ProductId(1), "Basmati Rice", Money::from_major(100));
    cart.with_cart_mut(|c| {
        c.add_item(&rice, 1);
        c.add_item(&rice, 1);
    });
    assert_eq!(cart.with_cart(|c| c.line_count()), 1);
    assert_eq!(cart.with_cart(|c| c.total_price()), Money::from_major(200));

    let backend = Arc::new(InMemoryBackend::default());
    let receipt = CheckoutCoordinator::new(backend.clone())
        .checkout(&cart)
        .await
        .unwrap();

    let orders = backend.orders.lock().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].0, CartKind::Retail);
    assert_eq!(orders[0].1.quantity, 2);
    assert_eq!(orders[0].1.total_price, Money::from_major(200));
    assert_eq!(receipt.orders[0].order.id, 101);
    assert!(cart.with_cart(|c| c.is_empty()));
}

#[tokio::test]
async fn retailer_wholesale_checkout_stops_at_out_of_stock_line() {
    let session = memory_session();
    session.login(grant(Role::Retailer), false).unwrap();
    assert_eq!(
        authorize(View::RetailerBuyWholesale, session.role()),
        Access::Granted
    );

    let cart = CartState::wholesale();
    let products = [
        Product::new(ProductId(10), "Rice 25kg", Money::from_major(900)).with_kind(ProductKind::Wholesale),
        Product::new(ProductId(11), "Dal 25kg", Money::from_major(1500)).with_kind(ProductKind::Wholesale),
        Product::new(ProductId(12), "Salt 10kg", Money::from_minor(25050)).with_kind(ProductKind::Wholesale),
    ];
    cart.with_cart_mut(|c| {
        for product in &products {
            c.add_item(product, 5);
        }
    });

    let backend = Arc::new(InMemoryBackend {
        out_of_stock: vec![ProductId(11)],
        ..Default::default()
    });
    let err = CheckoutCoordinator::new(backend.clone())
        .checkout(&cart)
        .await
        .unwrap_err();

    // first line placed, second rejected, third never sent
    let orders = backend.orders.lock().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].0, CartKind::Wholesale);
    assert_eq!(orders[0].1.product_id, ProductId(10));

    assert!(err.is_partial());
    assert_eq!(err.failed.id, ProductId(11));
    assert!(err.source.is_backend_error());

    assert_eq!(cart.with_cart(|c| c.line_count()), 3);
    assert_eq!(cart.with_cart(|c| c.total_items()), 15);
}

#[tokio::test]
async fn wholesale_cart_merges_relisted_product_by_name() {
    let cart = CartState::wholesale();
    let old = Product::new(ProductId(20), "Sugar 50kg", Money::from_major(2000));
    let relisted = Product::new(ProductId(21), "Sugar 50kg", Money::from_major(2000));

    cart.with_cart_mut(|c| {
        c.add_item(&old, 2);
        c.add_item(&relisted, 3);
    });

    let backend = Arc::new(InMemoryBackend::default());
    CheckoutCoordinator::new(backend.clone())
        .checkout(&cart)
        .await
        .unwrap();

    let orders = backend.orders.lock().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].1.product_id, ProductId(21));
    assert_eq!(orders[0].1.quantity, 5);
}

#[test]
fn remembered_session_survives_restart_until_logout() {
    let path = temp_session_file();

    let first = AuthSessionStore::new(
        Box::new(DurableStorage::new(&path)),
        Box::new(SessionScopeStorage::new()),
    );
    first.login(grant(Role::Wholesaler), true).unwrap();
    assert!(path.exists());

    let second = AuthSessionStore::new(
        Box::new(DurableStorage::new(&path)),
        Box::new(SessionScopeStorage::new()),
    );
    let restored = second.restore().unwrap();
    assert_eq!(restored.role, Role::Wholesaler);
    assert!(restored.remembered);
    assert_eq!(
        authorize(View::WholesalerOrders, second.role()),
        Access::Granted
    );

    second.logout().unwrap();
    assert!(!path.exists());
    assert_eq!(
        authorize(View::WholesalerOrders, second.role()),
        Access::RedirectToLogin
    );

    let third = AuthSessionStore::new(
        Box::new(DurableStorage::new(&path)),
        Box::new(SessionScopeStorage::new()),
    );
    assert!(third.restore().is_none());

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn unremembered_session_is_not_written_to_disk() {
    let path = temp_session_file();
    let store = AuthSessionStore::new(
        Box::new(DurableStorage::new(&path)),
        Box::new(SessionScopeStorage::new()),
    );

    let info = store.login(grant(Role::Customer), false).unwrap();

    assert!(!info.remembered);
    assert!(store.is_authenticated());
    assert!(!path.exists());
}
