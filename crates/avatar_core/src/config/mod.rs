//! # Engine configuration
//!
//! Tuning constants in one place: the fit cost model, history capacity,
//! warning sensitivity and the storage key. Defaults reproduce the shipped
//! behavior; a JSON file named by `AVATAR_ENGINE_CONFIG_PATH` can override
//! any subset.
//!
//! ```rust
//! use avatar_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.cost.latency_budget_ms, 72);
//! ```

use crate::avatar::DEFAULT_PRESET_DEVIATION_RATIO;
use crate::error::ConfigError;
use crate::fit::{FitCostModel, FIT_HISTORY_CAPACITY};
use crate::save::STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, fs};
use validator::Validate;

pub const CONFIG_PATH_ENV: &str = "AVATAR_ENGINE_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngineConfig {
    /// Fit tier cost model
    #[validate]
    pub cost: FitCostModel,
    /// Fit history cap (기본: 50)
    #[validate(range(min = 1, max = 10000))]
    pub history_capacity: u32,
    /// Share of a measurement range a value may drift from its preset before
    /// a warning (기본: 0.4)
    #[validate(range(min = 0.0, max = 1.0))]
    pub preset_deviation_ratio: f64,
    /// Key of the persisted state blob
    #[validate(length(min = 1, max = 128))]
    pub storage_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cost: FitCostModel::default(),
            history_capacity: FIT_HISTORY_CAPACITY as u32,
            preset_deviation_ratio: DEFAULT_PRESET_DEVIATION_RATIO,
            storage_key: STORAGE_KEY.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Defaults, or the file named by `AVATAR_ENGINE_CONFIG_PATH` when set
    pub fn from_env() -> Result<Self, ConfigError> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        let config = Self::from_file(Path::new(path))?;
        log::info!("Loaded engine config from {}='{}'", CONFIG_PATH_ENV, path);
        Ok(config)
    }

    /// Field ranges plus cross-field rules
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;

        if self.cost.l0_latency_ms > self.cost.latency_budget_ms {
            return Err(ConfigError::Inconsistent(format!(
                "l0_latency_ms ({}) must not exceed latency_budget_ms ({})",
                self.cost.l0_latency_ms, self.cost.latency_budget_ms
            )));
        }

        Ok(())
    }
}
