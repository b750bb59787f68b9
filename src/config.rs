// src/config.rs

//! TOML-driven configuration for the demo orchestration binary.
//!
//! The controller itself owns no file formats or CLI flags; this is
//! configuration for the demo harness only, loaded the same way
//! `WardenConfig::from_file` loads its TOML file.

use serde::Deserialize;

use crate::collaborators::GlobalSyncConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default)]
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncSection {
    #[serde(default = "default_node_count")]
    pub synchronous_node_count: u32,

    #[serde(default)]
    pub maximum_lag_on_syncnode: i64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            synchronous_node_count: default_node_count(),
            maximum_lag_on_syncnode: 0,
        }
    }
}

impl From<&SyncSection> for GlobalSyncConfig {
    fn from(section: &SyncSection) -> Self {
        Self {
            synchronous_node_count: section.synchronous_node_count,
            maximum_lag_on_syncnode: section.maximum_lag_on_syncnode,
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_node_count() -> u32 {
    1
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            sync: SyncSection::default(),
        }
    }
}

impl DemoConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DemoConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
