//! # Commands Module
//!
//! Every command the shell understands.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (dispatch + access check)
//! ├── auth.rs     ◄─── login, register, logout, whoami
//! ├── product.rs  ◄─── list, search, categories, create
//! ├── cart.rs     ◄─── add, remove, clear, show, checkout
//! ├── order.rs    ◄─── order lists, status updates
//! └── config.rs   ◄─── show / save local configuration
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  > orders mine                                                          │
//! │         │                                                               │
//! │         │ clap                                                          │
//! │         ▼                                                               │
//! │  Command::Orders(OrderCommand::Mine)                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  require(state, View::CustomerOrders)  ◄── same table as the router     │
//! │         │                                                               │
//! │         ├── RedirectToLogin ──► Err(ApiError) ──► one-line notification │
//! │         │                                                               │
//! │         ▼ Granted                                                       │
//! │  state.api.my_orders().await ──► rendered text on stdout                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod cart;
pub mod config;
pub mod order;
pub mod product;

use clap::Subcommand;
use tracing::debug;

use livemart_core::{authorize, Role, View};

use crate::error::ApiError;
use crate::state::AppState;

/// Rendered output of a successful command.
pub type CommandResult = Result<String, ApiError>;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with email, password and an emailed one-time passcode
    #[command(subcommand)]
    Login(auth::LoginCommand),

    /// Create an account
    #[command(subcommand)]
    Register(auth::RegisterCommand),

    /// Forget the session everywhere it was stored
    Logout,

    /// Show who is logged in
    Whoami,

    /// Browse and list products
    #[command(subcommand)]
    Products(product::ProductCommand),

    /// Manage the retail or wholesale cart
    #[command(subcommand)]
    Cart(cart::CartCommand),

    /// View orders and update their status
    #[command(subcommand)]
    Orders(order::OrderCommand),

    /// Inspect or save the local configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Runs one command against the session state.
pub async fn execute(state: &AppState, command: Command) -> CommandResult {
    match command {
        Command::Login(cmd) => auth::login(state, cmd).await,
        Command::Register(cmd) => auth::register(state, cmd).await,
        Command::Logout => auth::logout(state),
        Command::Whoami => Ok(auth::whoami(state)),
        Command::Products(cmd) => product::run(state, cmd).await,
        Command::Cart(cmd) => cart::run(state, cmd).await,
        Command::Orders(cmd) => order::run(state, cmd).await,
        Command::Config(cmd) => config::run(state, cmd),
    }
}

/// Checks the access table and returns the session role.
pub(crate) fn require(state: &AppState, view: View) -> Result<Role, ApiError> {
    require_any(state, &[view])
}

/// Like [`require`], granted if any of `views` may be opened.
pub(crate) fn require_any(state: &AppState, views: &[View]) -> Result<Role, ApiError> {
    let role = state.role();
    let shown = views.first().copied().unwrap_or(View::Login);

    let granted = views.iter().any(|view| authorize(*view, role).is_granted());
    match role {
        Some(role) if granted => Ok(role),
        _ => {
            debug!(view = %shown, ?role, "Access denied, redirecting to login");
            Err(ApiError::redirected(shown, role.is_some()))
        }
    }
}
