//! Service Configuration Module
//!
//! Provides configuration loading for the pool engine. Sources are layered:
//! base TOML file, optional `environments/<name>.toml` overlay next to it,
//! then `LAUNCHPAD_*` environment variables.

use crate::service::{engine, logging, paths};
use amm::WithdrawBasis;
use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use types::{decimal_from_f64, AmmError};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LaunchpadConfig {
    /// Pool engine behaviour
    pub engine: EngineSettings,

    /// Log output
    pub logging: LoggingSettings,
}

/// Pool engine settings
///
/// Percentages are stored as floats for config ergonomics and converted to
/// `Decimal` through the accessors before they reach any arithmetic.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub fee_percent: f64,
    pub default_slippage_percent: f64,
    pub max_commit_retries: u32,
    pub withdraw_basis: WithdrawBasis,
    /// When set, deposits off the pool ratio by more than this are rejected
    pub deposit_ratio_tolerance_percent: Option<f64>,
    pub high_price_impact_percent: f64,
}

/// Logging settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info` or `pool_ledger=debug`
    pub level: String,
    pub json: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fee_percent: engine::FEE_PERCENT,
            default_slippage_percent: engine::DEFAULT_SLIPPAGE_PERCENT,
            max_commit_retries: engine::MAX_COMMIT_RETRIES,
            withdraw_basis: WithdrawBasis::default(),
            deposit_ratio_tolerance_percent: None,
            high_price_impact_percent: engine::HIGH_PRICE_IMPACT_PERCENT,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: logging::LEVEL.to_string(),
            json: logging::JSON,
        }
    }
}

impl EngineSettings {
    pub fn fee(&self) -> Result<Decimal, AmmError> {
        decimal_from_f64("fee_percent", self.fee_percent)
    }

    pub fn default_slippage(&self) -> Result<Decimal, AmmError> {
        decimal_from_f64("default_slippage_percent", self.default_slippage_percent)
    }

    pub fn high_price_impact(&self) -> Result<Decimal, AmmError> {
        decimal_from_f64("high_price_impact_percent", self.high_price_impact_percent)
    }

    pub fn deposit_ratio_tolerance(&self) -> Result<Option<Decimal>, AmmError> {
        self.deposit_ratio_tolerance_percent
            .map(|tolerance| decimal_from_f64("deposit_ratio_tolerance_percent", tolerance))
            .transpose()
    }

    /// Reject settings the engine cannot operate with
    pub fn validate(&self) -> Result<(), AmmError> {
        let fee = self.fee()?;
        if fee < Decimal::ZERO || fee >= Decimal::ONE_HUNDRED {
            return Err(AmmError::invalid_amount(
                "fee_percent",
                format!("{} is outside [0, 100)", fee),
            ));
        }

        let slippage = self.default_slippage()?;
        if slippage < Decimal::ZERO || slippage > Decimal::ONE_HUNDRED {
            return Err(AmmError::invalid_amount(
                "default_slippage_percent",
                format!("{} is outside [0, 100]", slippage),
            ));
        }

        if self.high_price_impact()? < Decimal::ZERO {
            return Err(AmmError::invalid_amount(
                "high_price_impact_percent",
                "must not be negative",
            ));
        }

        if let Some(tolerance) = self.deposit_ratio_tolerance()? {
            if tolerance < Decimal::ZERO {
                return Err(AmmError::invalid_amount(
                    "deposit_ratio_tolerance_percent",
                    "must not be negative",
                ));
            }
        }

        Ok(())
    }
}

impl LaunchpadConfig {
    /// Load configuration from files with environment overrides
    ///
    /// A missing base file is tolerated only when `base_path` is `None`;
    /// an explicit path must exist.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        Self::load_with_env(base_path, environment, None)
    }

    /// Same as [`LaunchpadConfig::load`] with an explicit variable map in
    /// place of the process environment
    pub fn load_with_env(
        base_path: Option<&Path>,
        environment: Option<&str>,
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let (base, required) = match base_path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(paths::DEFAULT_CONFIG_FILE), false),
        };
        debug!("Loading base config: {:?} (required: {})", base, required);

        let mut builder = Config::builder().add_source(File::from(base.as_path()).required(required));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(paths::ENVIRONMENTS_DIR)
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (LAUNCHPAD_ prefix)
        builder = builder.add_source(
            Environment::with_prefix(paths::ENV_PREFIX)
                .prefix_separator("_")
                .separator(paths::ENV_SEPARATOR)
                .try_parsing(true)
                .source(env_vars),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config
            .engine
            .validate()
            .context("Invalid engine settings")?;

        Ok(config)
    }

    /// Render as TOML, e.g. to seed a config file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(path: Option<&Path>, environment: Option<&str>) -> Result<LaunchpadConfig> {
    LaunchpadConfig::load(path, environment)
}
