//! Configuration file handling.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Persistent settings, stored as YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Base URL of the remote executor.
    #[serde(default = "default_executor_url")]
    pub executor_url: String,
    /// Path to the VM inventory file.
    #[serde(default = "default_inventory")]
    pub inventory: PathBuf,
}

fn default_executor_url() -> String {
    "http://127.0.0.1:5000".to_owned()
}

fn default_inventory() -> PathBuf {
    PathBuf::from("vm.csv")
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            executor_url: default_executor_url(),
            inventory: default_inventory(),
        }
    }
}

/// YAML-file-backed config store.
pub struct YamlConfigStore;

impl YamlConfigStore {
    /// Load the config, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<FleetConfig> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(FleetConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    /// Persist the config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn save(&self, config: &FleetConfig) -> Result<()> {
        let path = self.path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(config).context("cannot serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }

    /// Config file location: `VMFLEET_CONFIG` env override, else
    /// `~/.vmfleet/config.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error when the home directory cannot be determined.
    pub fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var("VMFLEET_CONFIG") {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".vmfleet").join("config.yaml"))
    }
}
