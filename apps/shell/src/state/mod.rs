//! # State Module
//!
//! Everything a shell session keeps between commands.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         AppState                                        │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │ ClientConfig │  │ AuthSession  │  │  ApiClient   │  │   Carts    │  │
//! │  │              │  │ Store        │◄─│  (bearer via │  │ retail     │  │
//! │  │ base url,    │  │ token, role, │  │  TokenSource)│  │ wholesale  │  │
//! │  │ data dir     │  │ email        │  │              │  │ Arc<Mutex> │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ CatalogState: last fetched product list + search history         │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! In one-shot mode the state lives for a single command. In `livemart shell`
//! it lives until the user exits, which is what lets carts span commands.

mod cart;
mod catalog;

pub use cart::Carts;
pub use catalog::CatalogState;

use std::sync::Arc;

use livemart_client::{ApiClient, AuthSessionStore, ClientConfig, ClientResult};
use livemart_core::Role;

/// Shared state for every command.
pub struct AppState {
    pub config: ClientConfig,
    pub session: Arc<AuthSessionStore>,
    pub api: Arc<ApiClient>,
    pub carts: Carts,
    pub catalog: CatalogState,
}

impl AppState {
    /// Builds state from configuration, restoring a remembered session.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let session = Arc::new(AuthSessionStore::from_config(&config)?);
        Self::with_session(config, session)
    }

    /// Builds state around an existing session store.
    pub fn with_session(config: ClientConfig, session: Arc<AuthSessionStore>) -> ClientResult<Self> {
        let api = Arc::new(ApiClient::new(&config, session.clone())?);

        Ok(AppState {
            config,
            session,
            api,
            carts: Carts::new(),
            catalog: CatalogState::new(),
        })
    }

    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }
}
