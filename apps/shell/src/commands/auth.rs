//! # Auth Commands
//!
//! Two-step login and registration, both finished with an emailed OTP.
//!
//! ```text
//! login request-otp asha@example.com
//!        │   POST /auth/login/request-otp
//!        ▼
//! login verify asha@example.com --password ... --otp 123456 [--remember]
//!        │   POST /auth/login/verify-otp ──► token, role, email
//!        ▼
//! AuthSessionStore::login(grant, remember)
//!        ├── --remember ──► session.json (survives restarts)
//!        └── otherwise ───► memory (this process only)
//! ```
//!
//! `--password` may be left out; the password is then read from
//! `LIVEMART_PASSWORD` so it stays out of the process list and history.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use clap::{Args, Subcommand};
use secrecy::SecretString;
use tracing::{info, warn};

use livemart_client::Registration;
use livemart_core::{Role, View};

use super::CommandResult;
use crate::error::ApiError;
use crate::state::AppState;

/// Environment variable consulted when `--password` is not given.
pub const PASSWORD_ENV: &str = "LIVEMART_PASSWORD";

/// A password typed on the command line. Never printed by `Debug`.
#[derive(Clone)]
pub struct Password(String);

impl FromStr for Password {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Password(s.to_string()))
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// Picks the `--password` flag, falling back to `lookup(PASSWORD_ENV)`.
fn resolve_password(
    flag: Option<Password>,
    lookup: impl FnOnce(&str) -> Option<String>,
) -> Result<SecretString, ApiError> {
    match flag {
        Some(Password(password)) => Ok(SecretString::from(password)),
        None => lookup(PASSWORD_ENV).map(SecretString::from).ok_or_else(|| {
            ApiError::usage(format!("--password is required unless {} is set", PASSWORD_ENV))
        }),
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[derive(Debug, Subcommand)]
pub enum LoginCommand {
    /// Email a one-time passcode
    RequestOtp {
        email: String,
    },

    /// Finish logging in with the emailed passcode
    Verify {
        email: String,

        /// Falls back to LIVEMART_PASSWORD
        #[arg(long)]
        password: Option<Password>,

        #[arg(long)]
        otp: String,

        /// Keep the session after the shell exits
        #[arg(long)]
        remember: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RegistrationArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    /// Falls back to LIVEMART_PASSWORD
    #[arg(long)]
    pub password: Option<Password>,

    /// customer, retailer or wholesaler
    #[arg(long, default_value = "customer")]
    pub role: Role,
}

impl RegistrationArgs {
    fn into_registration(
        self,
        lookup: impl FnOnce(&str) -> Option<String>,
    ) -> Result<Registration, ApiError> {
        Ok(Registration {
            password: resolve_password(self.password, lookup)?,
            name: self.name,
            email: self.email,
            role: self.role,
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum RegisterCommand {
    /// Send the registration form; the backend emails a passcode
    RequestOtp(RegistrationArgs),

    /// Finish registration with the emailed passcode
    Verify {
        #[command(flatten)]
        form: RegistrationArgs,

        #[arg(long)]
        otp: String,
    },
}

pub async fn login(state: &AppState, cmd: LoginCommand) -> CommandResult {
    match cmd {
        LoginCommand::RequestOtp { email } => {
            let ack = state.api.request_login_otp(&email).await?;
            Ok(ack
                .message
                .unwrap_or_else(|| format!("Passcode sent to {}", email.trim())))
        }
        LoginCommand::Verify {
            email,
            password,
            otp,
            remember,
        } => {
            let password = resolve_password(password, env_lookup)?;
            let grant = state.api.verify_login_otp(&email, &password, &otp).await?;
            let session = state.session.login(grant, remember)?;

            info!(role = %session.role, remembered = session.remembered, "Logged in");
            Ok(format!(
                "Logged in as {} ({}). Home: {}",
                session.email,
                session.role,
                View::home_for(session.role)
            ))
        }
    }
}

pub async fn register(state: &AppState, cmd: RegisterCommand) -> CommandResult {
    match cmd {
        RegisterCommand::RequestOtp(args) => {
            let form = args.into_registration(env_lookup)?;
            let ack = state.api.request_registration_otp(&form).await?;
            Ok(ack
                .message
                .unwrap_or_else(|| format!("Passcode sent to {}", form.email.trim())))
        }
        RegisterCommand::Verify { form, otp } => {
            let form = form.into_registration(env_lookup)?;
            state.api.verify_registration_otp(&form, &otp).await?;
            Ok(format!(
                "Registered {} as {}. Log in to continue",
                form.email.trim(),
                form.role
            ))
        }
    }
}

/// Clears the session and both carts. The carts are emptied even when the
/// stored session could not be removed.
pub fn logout(state: &AppState) -> CommandResult {
    let was = state.session.email();
    let cleared = state.session.logout();

    for cart in [state.carts.retail(), state.carts.wholesale()] {
        if !cart.with_cart(|c| c.is_empty()) {
            cart.with_cart_mut(|c| c.clear_cart());
        }
    }

    if let Err(e) = cleared {
        warn!(error = %e, "Session storage was not cleared");
        return Err(e.into());
    }

    Ok(match was {
        Some(email) => format!("Logged out {}", email),
        None => "Not logged in".to_string(),
    })
}

pub fn whoami(state: &AppState) -> String {
    match state.session.info() {
        Some(info) => format!(
            "{} ({}), {}",
            info.email,
            info.role,
            if info.remembered {
                "remembered on this device"
            } else {
                "this session only"
            }
        ),
        None => "Not logged in".to_string(),
    }
}
