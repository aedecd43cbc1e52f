//! # LiveMart Shell Library
//!
//! Command-line front end for the LiveMart storefront.
//!
//! ## Module Organization
//! ```text
//! livemart_shell/
//! ├── lib.rs          ◄─── You are here (CLI parsing, logging, REPL)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState (config, session, API client)
//! │   ├── cart.rs     ◄─── Retail + wholesale carts
//! │   └── catalog.rs  ◄─── Product cache + search history
//! ├── commands/
//! │   ├── mod.rs      ◄─── Dispatch + role check
//! │   ├── auth.rs     ◄─── login / register / logout / whoami
//! │   ├── product.rs  ◄─── products list / search / create
//! │   ├── cart.rs     ◄─── cart add / remove / clear / show / checkout
//! │   ├── order.rs    ◄─── orders *
//! │   └── config.rs   ◄─── config show / save
//! └── error.rs        ◄─── ApiError notifications
//! ```
//!
//! ## Two Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  livemart products list          One command, then exit.                │
//! │  ─────────────────────           Carts start empty and die with the     │
//! │                                  process; the session survives only     │
//! │                                  if it was remembered.                  │
//! │                                                                         │
//! │  livemart shell                  Read commands line by line.            │
//! │  ──────────────                  ┌──────────────────────────────────┐   │
//! │                                  │ livemart> login verify ...       │   │
//! │                                  │ livemart> cart add 3 -q 2        │   │
//! │                                  │ livemart> cart checkout          │   │
//! │                                  │ livemart> exit                   │   │
//! │                                  └──────────────────────────────────┘   │
//! │                                  Carts live until exit. A failing       │
//! │                                  command prints one line and the        │
//! │                                  shell keeps going.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use livemart_client::ClientConfig;

use commands::Command;
use error::ApiError;
use state::AppState;

const PROMPT: &str = "livemart> ";

#[derive(Debug, Parser)]
#[command(name = "livemart", version, about = "LiveMart storefront client")]
pub struct Cli {
    /// Config file (defaults to config.toml in the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: TopLevel,
}

#[derive(Debug, Subcommand)]
pub enum TopLevel {
    /// Interactive shell; carts are kept until you exit
    Shell,

    #[command(flatten)]
    Run(Command),
}

/// One line typed at the shell prompt.
#[derive(Debug, Parser)]
#[command(name = "livemart", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

/// Runs the command line application.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info, debug for livemart crates; RUST_LOG overrides      │
/// │                                                                         │
/// │  2. Parse Command Line ───────────────────────────────────────────────► │
/// │                                                                         │
/// │  3. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → config.toml → LIVEMART_* env → validate                │
/// │                                                                         │
/// │  4. Build State ──────────────────────────────────────────────────────► │
/// │     • restore a remembered session from session.json                    │
/// │     • ApiClient with the session as its bearer token source             │
/// │     • empty retail and wholesale carts                                  │
/// │                                                                         │
/// │  5. Run one command, or the interactive shell ────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    debug!(?cli.config, "Command line parsed");

    let state = match ClientConfig::load(cli.config).and_then(AppState::new) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("error: {}", ApiError::from(e));
            return ExitCode::FAILURE;
        }
    };

    match state.session.info() {
        Some(session) => info!(email = %session.email, role = %session.role, "Session restored"),
        None => debug!("No stored session"),
    }

    match cli.command {
        TopLevel::Shell => match repl(&state).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        },
        TopLevel::Run(command) => match commands::execute(&state, command).await {
            Ok(output) => {
                println!("{}", output);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=warn` - Quiet; only problems
/// - `RUST_LOG=livemart_client=trace` - Everything from the client crate
/// - Default: info, debug for livemart crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,livemart=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads commands from stdin until `exit`, `quit` or end of input.
pub async fn repl(state: &AppState) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("Interactive shell started");

    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }

        match handle_line(state, &line).await {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => {}
            Err(e) => eprintln!("error: {}", e),
        }
    }

    info!("Interactive shell closed");
    Ok(())
}

/// Parses and runs one shell line. `Ok(None)` for a blank line.
pub async fn handle_line(state: &AppState, line: &str) -> Result<Option<String>, ApiError> {
    let words = split_line(line)?;
    if words.is_empty() {
        return Ok(None);
    }

    let parsed = match ShellLine::try_parse_from(&words) {
        Ok(parsed) => parsed,
        Err(e) => {
            return match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                | ErrorKind::DisplayVersion => Ok(Some(e.to_string().trim_end().to_string())),
                _ => Err(ApiError::usage(first_line(&e.to_string()))),
            };
        }
    };

    commands::execute(state, parsed.command).await.map(Some)
}

/// Splits a line into words. Single or double quotes group words.
pub fn split_line(line: &str) -> Result<Vec<String>, ApiError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(ApiError::usage("Unclosed quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn first_line(message: &str) -> String {
    message
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{state, state_as};
    use crate::error::ErrorCode;
    use livemart_core::{Money, Product, ProductId, Role};

    #[test]
    fn test_split_line_with_quotes() {
        assert_eq!(
            split_line(r#"products search "basmati rice" --max 500"#).unwrap(),
            vec!["products", "search", "basmati rice", "--max", "500"]
        );
        assert_eq!(split_line("  ").unwrap(), Vec::<String>::new());
        assert_eq!(split_line("say ''").unwrap(), vec!["say", ""]);
        assert!(split_line("search \"rice").is_err());
    }

    #[test]
    fn test_cli_parses_one_shot_and_shell() {
        let cli = Cli::try_parse_from(["livemart", "cart", "show", "--wholesale"]).unwrap();
        assert!(matches!(cli.command, TopLevel::Run(Command::Cart(_))));

        let cli = Cli::try_parse_from(["livemart", "--config", "/tmp/x.toml", "shell"]).unwrap();
        assert!(matches!(cli.command, TopLevel::Shell));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
    }

    #[tokio::test]
    async fn test_blank_line_does_nothing() {
        assert_eq!(handle_line(&state(), "   ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_command_is_usage_error() {
        let err = handle_line(&state(), "teleport").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UsageError);
        assert!(!err.message.contains('\n'));
    }

    #[tokio::test]
    async fn test_help_is_output_not_error() {
        let out = handle_line(&state(), "help").await.unwrap().unwrap();
        assert!(out.contains("cart"));
    }

    #[tokio::test]
    async fn test_cart_survives_between_lines() {
        let state = state_as(Role::Customer);
        state
            .catalog
            .replace(vec![Product::new(ProductId(1), "Basmati Rice", Money::from_major(100))]);

        handle_line(&state, "cart add 1").await.unwrap();
        handle_line(&state, "cart add 1").await.unwrap();
        let shown = handle_line(&state, "cart show").await.unwrap().unwrap();

        assert!(shown.contains("1 line(s), 2 item(s), total ₹200.00"));
    }

    #[tokio::test]
    async fn test_failure_is_one_notification() {
        let err = handle_line(&state(), "orders mine").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
        assert!(err.to_string().starts_with("[NOT_AUTHENTICATED]"));
    }
}
