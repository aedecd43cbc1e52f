//! # LiveMart Command-Line Entry Point
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        livemart (binary)                                │
//! │                                                                         │
//! │  main.rs ────► starts the tokio runtime, hands over to lib.rs           │
//! │                                                                         │
//! │  lib.rs ─────► logging, clap parsing, config, state, REPL               │
//! │                                                                         │
//! │  commands/ ──► login, products, cart, orders, config                    │
//! │                                                                         │
//! │  state/ ─────► AppState: session, API client, carts, catalog cache      │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  LiveMart REST backend (HTTP)                    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    livemart_shell::run().await
}
