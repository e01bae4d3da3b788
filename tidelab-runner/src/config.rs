//! Serializable run configuration.
//!
//! A `RunConfig` captures everything needed to reproduce a run: the
//! strategy parameters, the interval, and the symbol universe with its
//! fixed capital weights. `run_id()` is a content-addressed BLAKE3 hash of
//! the serialized config, so identical configs share an identifier.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tidelab_core::domain::Interval;
use tidelab_core::strategy::{ParamError, StrategyParams};

/// Content-addressed identifier of a run configuration.
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("config has no symbols")]
    NoSymbols,

    #[error("symbol '{symbol}' has non-positive weight {weight}")]
    BadWeight { symbol: String, weight: f64 },

    #[error("symbol '{symbol}' has non-positive quantity {quantity}")]
    BadQuantity { symbol: String, quantity: f64 },

    #[error(transparent)]
    Params(#[from] ParamError),
}

/// One traded symbol: its capital weight within the portfolio, the order
/// quantity used for intent generation, and an optional explicit CSV path
/// (defaults to `<data_dir>/<symbol>.csv`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub symbol: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_weight() -> f64 {
    1.0
}

fn default_quantity() -> f64 {
    1.0
}

impl SymbolSpec {
    pub fn csv_path(&self, data_dir: &Path) -> PathBuf {
        match &self.file {
            Some(file) => data_dir.join(file),
            None => data_dir.join(format!("{}.csv", self.symbol)),
        }
    }
}

/// Full run configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub strategy: StrategyParams,
    pub interval: Interval,
    pub symbols: Vec<SymbolSpec>,
}

impl RunConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config: RunConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        for spec in &self.symbols {
            // The comparisons also reject NaN and infinity, which TOML can
            // express (`weight = nan`).
            if !(spec.weight > 0.0 && spec.weight.is_finite()) {
                return Err(ConfigError::BadWeight {
                    symbol: spec.symbol.clone(),
                    weight: spec.weight,
                });
            }
            if !(spec.quantity > 0.0 && spec.quantity.is_finite()) {
                return Err(ConfigError::BadQuantity {
                    symbol: spec.symbol.clone(),
                    quantity: spec.quantity,
                });
            }
        }
        self.strategy.validate()?;
        Ok(())
    }

    /// Deterministic hash of this configuration. Two identical configs get
    /// the same id regardless of where they were loaded from.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_toml() -> &'static str {
        r#"
            interval = "4h"

            [strategy]
            ma_fast = 5
            ma_slow = 20
            ma_trend = 60
            stop_loss = 0.03

            [[symbols]]
            symbol = "BTCUSDT"
            weight = 0.6
            quantity = 0.01

            [[symbols]]
            symbol = "ETHUSDT"
            weight = 0.4
        "#
    }

    #[test]
    fn parses_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(sample_toml().as_bytes()).unwrap();
        file.flush().unwrap();

        let config = RunConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.interval, Interval::Hour4);
        assert_eq!(config.symbols.len(), 2);
        assert_eq!(config.strategy.ma_fast, 5);
        // Omitted quantity falls back to the default.
        assert_eq!(config.symbols[1].quantity, 1.0);
    }

    #[test]
    fn run_id_is_deterministic_and_content_sensitive() {
        let config: RunConfig = toml::from_str(sample_toml()).unwrap();
        assert_eq!(config.run_id(), config.run_id());

        let mut other = config.clone();
        other.strategy.ma_fast = 7;
        assert_ne!(config.run_id(), other.run_id());
    }

    #[test]
    fn rejects_empty_symbol_list() {
        let config: RunConfig = toml::from_str("interval = \"1d\"\nsymbols = []\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::NoSymbols)));
    }

    #[test]
    fn rejects_non_positive_weight() {
        let mut config: RunConfig = toml::from_str(sample_toml()).unwrap();
        config.symbols[0].weight = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::BadWeight { .. })));
    }

    #[test]
    fn rejects_non_finite_quantity() {
        // TOML parses `quantity = nan` without complaint; validation has
        // to catch it before the config reaches run_id() or a run.
        let mut config: RunConfig = toml::from_str(sample_toml()).unwrap();
        config.symbols[0].quantity = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadQuantity { .. })
        ));

        config.symbols[0].quantity = -0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadQuantity { .. })
        ));
    }

    #[test]
    fn invalid_strategy_fails_at_config_time() {
        let mut config: RunConfig = toml::from_str(sample_toml()).unwrap();
        config.strategy.ma_fast = 50;
        assert!(matches!(config.validate(), Err(ConfigError::Params(_))));
    }

    #[test]
    fn csv_path_defaults_to_symbol_name() {
        let spec = SymbolSpec {
            symbol: "BTCUSDT".into(),
            weight: 1.0,
            quantity: 1.0,
            file: None,
        };
        assert_eq!(
            spec.csv_path(Path::new("data")),
            PathBuf::from("data/BTCUSDT.csv")
        );
        let spec = SymbolSpec {
            file: Some(PathBuf::from("btc_4h.csv")),
            ..spec
        };
        assert_eq!(
            spec.csv_path(Path::new("data")),
            PathBuf::from("data/btc_4h.csv")
        );
    }
}
