//! Harness configuration
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! frame_interval_ms = 16
//! number_epsilon = 0.001
//! log_filter = "info,kinema_animation=debug"
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use kinema_core::DEFAULT_NUMBER_EPSILON;
use serde::{Deserialize, Serialize};

/// Settings shared by every scenario a runner executes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Length of one clock step when advancing time
    pub frame_interval_ms: u64,
    /// Tolerance when comparing numeric style values
    pub number_epsilon: f32,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            number_epsilon: DEFAULT_NUMBER_EPSILON,
            log_filter: "info".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(input: &str) -> Result<Self> {
        let config: HarnessConfig = toml::from_str(input).context("Failed to parse harness config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 {
            anyhow::bail!("frame_interval_ms must be at least 1");
        }
        if !(self.number_epsilon.is_finite() && self.number_epsilon >= 0.0) {
            anyhow::bail!("number_epsilon must be a non-negative number");
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(HarnessConfig::from_toml("").unwrap(), HarnessConfig::default());
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = HarnessConfig::from_toml("frame_interval_ms = 8\n").unwrap();
        assert_eq!(config.frame_interval(), Duration::from_millis(8));
        assert_eq!(config.number_epsilon, DEFAULT_NUMBER_EPSILON);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_bundled_config_parses() {
        let config = HarnessConfig::from_toml(include_str!("../kinema.toml")).unwrap();
        assert_eq!(config.frame_interval_ms, 16);
        assert_eq!(config.log_filter, "info,kinema_animation=debug");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(HarnessConfig::from_toml("frame_interval_ms = 0").is_err());
        assert!(HarnessConfig::from_toml("number_epsilon = -1.0").is_err());
        assert!(HarnessConfig::from_toml("frame_interval_ms = \"fast\"").is_err());
    }
}
