use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Potential head digits kept by the strategy.
    pub head_target: usize,
    /// Potential tail digits kept by the strategy.
    pub tail_target: usize,
    pub core_size: usize,
    pub max_xien3: usize,
    /// Cost of playing the whole batch of xiên 3 sets.
    pub stake: i64,
    /// Flat payout of one winning xiên 3 set.
    pub payout_per_hit: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            head_target: 5,
            tail_target: 7,
            core_size: 20,
            max_xien3: 100,
            stake: 1_000_000,
            payout_per_hit: 650_000,
        }
    }
}

pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Không thể đọc {:?}", path))?;
    let config: EngineConfig = serde_json::from_str(&json)
        .with_context(|| format!("JSON không hợp lệ trong {:?}", path))?;
    Ok(config)
}

pub fn save_config(config: &EngineConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
