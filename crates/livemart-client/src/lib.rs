//! # livemart-client: Backend Access for LiveMart
//!
//! Everything that talks to the outside world: the REST API, the session
//! file, and the configuration file.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      livemart-client components                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 ClientConfig (config.toml + env)                 │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │AuthSessionStore│  │   ApiClient    │  │  CheckoutCoordinator   │    │
//! │  │                │  │                │  │                        │    │
//! │  │ token, role,   │─►│ reqwest, one   │◄─│ one order per cart     │    │
//! │  │ email          │  │ method per     │  │ line, sequential,      │    │
//! │  │ durable or     │  │ endpoint,      │  │ stops on first error   │    │
//! │  │ session scope  │  │ bearer hook    │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └───────────┬────────────┘    │
//! │     TokenSource            OrderGateway              │                 │
//! │                                                      ▼                  │
//! │                                          ┌────────────────────────┐    │
//! │                                          │ CartState              │    │
//! │                                          │ Arc<Mutex<CartStore>>  │    │
//! │                                          └────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`api`] - `ApiClient`, `TokenSource`
//! - [`checkout`] - `CheckoutCoordinator`, `OrderGateway`
//! - [`config`] - `ClientConfig` (file + environment)
//! - [`error`] - `ClientError`
//! - [`session`] - `AuthSessionStore` and its storages
//! - [`state`] - `CartState`, the shared cart handle
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use livemart_client::{ApiClient, AuthSessionStore, CartState, CheckoutCoordinator, ClientConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load_or_default(None);
//! let session = Arc::new(AuthSessionStore::from_config(&config)?);
//! let api = Arc::new(ApiClient::new(&config, session.clone())?);
//!
//! let cart = CartState::retail();
//! let coordinator = CheckoutCoordinator::new(api);
//! let receipt = coordinator.checkout(&cart).await?;
//! println!("{} orders placed", receipt.orders.len());
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{Ack, Anonymous, ApiClient, Registration, TokenSource};
pub use checkout::{CheckoutCoordinator, CheckoutError, CheckoutReceipt, OrderGateway, PlacedOrder};
pub use config::{ApiSettings, ClientConfig, StorageSettings};
pub use error::{ClientError, ClientResult};
pub use session::{
    AuthSessionStore, DurableStorage, SessionInfo, SessionScopeStorage, SessionStorage,
    StorageScope, StoredSession,
};
pub use state::CartState;
