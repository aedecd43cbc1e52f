//! # Config Commands
//!
//! Local configuration only; no view is involved and no session is needed.

use std::path::PathBuf;

use clap::Subcommand;
use tracing::debug;

use livemart_client::ClientConfig;

use super::CommandResult;
use crate::state::AppState;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write the effective configuration to a file
    Save {
        /// Defaults to the platform config directory
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub fn run(state: &AppState, cmd: ConfigCommand) -> CommandResult {
    debug!(?cmd, "config command");
    match cmd {
        ConfigCommand::Show => Ok(describe(&state.config)),
        ConfigCommand::Save { path } => {
            let shown = path
                .clone()
                .or_else(ClientConfig::default_config_path)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            state.config.save(path)?;
            Ok(format!("Configuration written to {}", shown))
        }
    }
}

fn describe(config: &ClientConfig) -> String {
    let path_or_dash = |p: Option<PathBuf>| {
        p.map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    format!(
        "api.base_url              = {}\n\
         api.timeout_secs          = {}\n\
         api.wholesale_order_path  = {}\n\
         storage.data_dir          = {}\n\
         session file              = {}\n\
         config file               = {}",
        config.api.base_url,
        config.api.timeout_secs,
        config.api.wholesale_order_path,
        path_or_dash(config.data_dir()),
        path_or_dash(config.session_file()),
        path_or_dash(ClientConfig::default_config_path()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::state;

    #[test]
    fn test_show_lists_api_settings() {
        let out = run(&state(), ConfigCommand::Show).unwrap();
        assert!(out.contains("api.base_url              = http://localhost:8000"));
        assert!(out.contains("/wholesalers/orders/"));
    }

    #[test]
    fn test_save_writes_toml() {
        let dir = std::env::temp_dir().join(format!("livemart-shell-{}", std::process::id()));
        let path = dir.join("config.toml");

        run(&state(), ConfigCommand::Save { path: Some(path.clone()) }).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("base_url"));
        let _ = std::fs::remove_dir_all(dir);
    }
}
