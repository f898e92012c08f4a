//! Service configuration defaults
//!
//! Default values used when a setting is absent from every configuration
//! source.

/// Pool engine defaults
pub mod engine {
    /// Swap fee in percent, taken from the input side
    pub const FEE_PERCENT: f64 = 0.3;

    /// Slippage tolerance applied when a swap request omits one
    pub const DEFAULT_SLIPPAGE_PERCENT: f64 = 0.5;

    /// Compare-and-swap attempts before a mutation gives up
    pub const MAX_COMMIT_RETRIES: u32 = 3;

    /// Price impact at which quotes are flagged as high
    pub const HIGH_PRICE_IMPACT_PERCENT: f64 = 5.0;
}

/// Logging defaults
pub mod logging {
    pub const LEVEL: &str = "info";
    pub const JSON: bool = false;
}

/// Configuration file locations
pub mod paths {
    /// Base file read when no explicit path is given
    pub const DEFAULT_CONFIG_FILE: &str = "config/launchpad.toml";

    /// Directory, relative to the base file, holding `<environment>.toml` overlays
    pub const ENVIRONMENTS_DIR: &str = "environments";

    /// Environment variable prefix (`LAUNCHPAD_ENGINE__FEE_PERCENT=0.25`)
    pub const ENV_PREFIX: &str = "LAUNCHPAD";

    /// Separator between nested keys in environment variables
    pub const ENV_SEPARATOR: &str = "__";
}
