// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration persistence for kubeget
//!
//! All kubeget data is stored under ~/.kubeget/:
//! - ~/.kubeget/config.json - user configuration
//! - ~/.kubeget/cache/discovery/ - discovery snapshots per context
//! - ~/.kubeget/log/ - log files

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::kubernetes::{ConnectOptions, DiscoverySettings};

/// Get the base kubeget directory (~/.kubeget/)
pub fn base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".kubeget"))
        .context("Could not determine home directory")
}

fn default_discovery_ttl_secs() -> u64 {
    300
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_read_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// kubeget configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Context used when --context is not given (kubeconfig current context otherwise)
    #[serde(default)]
    pub default_context: Option<String>,
    /// Seconds a discovery snapshot is reused in memory
    #[serde(default = "default_discovery_ttl_secs")]
    pub discovery_ttl_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Persist discovery snapshots between runs
    #[serde(default = "default_true")]
    pub disk_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_context: None,
            discovery_ttl_secs: default_discovery_ttl_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            disk_cache: true,
        }
    }
}

impl Config {
    /// Load config from disk, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Remember `context` as the default and save to `path`
    pub fn set_default_context(&mut self, context: &str, path: &Path) -> Result<()> {
        self.default_context = Some(context.to_string());
        self.save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Get the config file path (~/.kubeget/config.json)
    pub fn config_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.json"))
    }

    /// Connection options, with an explicit context taking precedence over the saved one
    pub fn connect_options(&self, context: Option<&str>) -> ConnectOptions {
        ConnectOptions {
            context: context.map(String::from).or_else(|| self.default_context.clone()),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
        }
    }

    pub fn discovery_settings(&self) -> DiscoverySettings {
        DiscoverySettings {
            ttl: Duration::from_secs(self.discovery_ttl_secs),
            disk_cache: self.disk_cache,
        }
    }
}
