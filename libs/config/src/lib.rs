//! # Launchpad Configuration
//!
//! Layered configuration and default values for the pool engine services.
//!
//! ## Features
//!
//! - **Engine Settings**: Fee, slippage default, commit retries, withdraw basis
//! - **Logging Settings**: `EnvFilter` level and JSON output switch
//! - **Defaults**: Constants used when no source sets a value
//!
//! ## Usage
//!
//! ```rust,no_run
//! use launchpad_config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("config/launchpad.toml")), Some("staging"))?;
//! let fee = config.engine.fee()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod service;
pub mod service_config;

// Re-export commonly used types
pub use service_config::{load_config, EngineSettings, LaunchpadConfig, LoggingSettings};
