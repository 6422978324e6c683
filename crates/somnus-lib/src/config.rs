use crate::error::{HypnoError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Sampling and epoch parameters for the sleep statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Sampling frequency of the displayed (possibly down-sampled) labels, Hz.
    #[serde(default = "default_sf")]
    pub sf: f64,
    /// Sampling frequency of the original recording, Hz.
    #[serde(default = "default_sfori")]
    pub sfori: f64,
    /// Epoch length in seconds.
    #[serde(default = "default_time_window")]
    pub time_window: f64,
}

fn default_sf() -> f64 {
    100.0
}

fn default_sfori() -> f64 {
    1000.0
}

fn default_time_window() -> f64 {
    30.0
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            sf: default_sf(),
            sfori: default_sfori(),
            time_window: default_time_window(),
        }
    }
}

impl StatsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| HypnoError::invalid(format!("config: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Epochs per minute.
    pub fn epochs_per_minute(&self) -> f64 {
        60.0 / self.time_window
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sfori.is_finite() && self.sfori > 0.0) {
            return Err(HypnoError::invalid(format!(
                "original sampling frequency must be positive, got {}",
                self.sfori
            )));
        }
        if !(self.time_window.is_finite() && self.time_window > 0.0) {
            return Err(HypnoError::invalid(format!(
                "epoch length must be positive, got {}",
                self.time_window
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg = StatsConfig::from_toml_str("time_window = 20.0\n").unwrap();
        assert_eq!(cfg.sf, 100.0);
        assert_eq!(cfg.sfori, 1000.0);
        assert_eq!(cfg.time_window, 20.0);
        assert_eq!(cfg.epochs_per_minute(), 3.0);
    }

    #[test]
    fn rejects_non_positive_window() {
        let cfg = StatsConfig {
            time_window: 0.0,
            ..StatsConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(HypnoError::InvalidParameter(_))
        ));
    }

    #[test]
    fn malformed_toml_is_invalid_parameter() {
        assert!(StatsConfig::from_toml_str("sf = \"fast\"").is_err());
    }
}
