//! `vmfleet config` — show or change persistent settings.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::domain::error::ConfigError;
use crate::infra::config::YamlConfigStore;

/// Keys accepted by `config set`.
const VALID_KEYS: &str = "executor_url, inventory";

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Set a configuration value
    Set {
        /// Setting name (executor_url, inventory)
        key: String,
        /// New value
        value: String,
    },
}

/// Run `vmfleet config`.
///
/// # Errors
///
/// Returns an error for unknown keys or when the config file cannot be
/// read or written.
pub fn run(cmd: ConfigCommand, app: &AppContext) -> Result<()> {
    let store = YamlConfigStore;
    match cmd {
        ConfigCommand::Show => {
            let config = &app.config;
            if app.is_json() {
                println!("{}", serde_json::to_string_pretty(config)?);
                return Ok(());
            }
            app.output.kv("executor_url", &config.executor_url);
            app.output.kv("inventory  ", &config.inventory.display().to_string());
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            let mut config = store.load()?;
            match key.as_str() {
                "executor_url" => config.executor_url = value,
                "inventory" => config.inventory = PathBuf::from(value),
                _ => {
                    return Err(ConfigError::UnknownKey {
                        key,
                        valid: VALID_KEYS.to_owned(),
                    }
                    .into());
                }
            }
            store.save(&config)?;
            app.output.success("configuration updated");
            Ok(())
        }
    }
}
