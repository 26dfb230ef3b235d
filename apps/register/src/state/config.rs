//! # Register Configuration
//!
//! Store details, pricing, data source and session role, loaded at startup.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults (this file)                                                │
//! │  2. register.toml (platform config dir, or --config PATH)               │
//! │  3. Environment variables (MESA_*)                                      │
//! │  4. validate()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example File
//! ```toml
//! [store]
//! name = "Mesa Downtown"
//! currency_symbol = "$"
//!
//! [pricing]
//! tax_rate_bps = 825
//!
//! [data]
//! source = "live"
//! api_url = "https://pos.example.com"
//! timeout_secs = 10
//!
//! [session]
//! role = "cashier"
//! ```
//!
//! Configuration is read-only after startup, so no mutex is needed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mesa_core::validation::validate_tax_rate;
use mesa_core::{Money, Rate, Role, DEFAULT_TAX_RATE_BPS};
use mesa_data::DataSourceKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Register configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub data: DataSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

/// Store details printed on receipts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub name: String,

    /// Address lines (for receipts)
    #[serde(default)]
    pub address: Vec<String>,

    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: "Mesa Dev Kitchen".to_string(),
            address: vec!["12 Market Lane".to_string()],
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Sales tax in basis points (800 = 8%)
    pub tax_rate_bps: u32,
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
        }
    }
}

/// Where catalog, customers and discounts come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    pub source: DataSourceKind,

    /// Backend base URL (live source only)
    pub api_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for DataSettings {
    /// Development default: built-in fixtures, so the register runs without a backend.
    fn default() -> Self {
        DataSettings {
            source: DataSourceKind::Fixture,
            api_url: "http://localhost:8080".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Role of the staff member running this register
    #[serde(default)]
    pub role: Role,
}

impl RegisterConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading register config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.name must not be empty".into()));
        }

        if self.store.currency_decimals > 4 {
            return Err(ConfigError::Invalid(
                "store.currency_decimals must be between 0 and 4".into(),
            ));
        }

        validate_tax_rate(self.tax_rate()).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.data.source == DataSourceKind::Live
            && !self.data.api_url.starts_with("http://")
            && !self.data.api_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid(format!(
                "data.api_url must start with http:// or https://, got: {}",
                self.data.api_url
            )));
        }

        if self.data.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "data.timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `MESA_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a key lookup.
    ///
    /// ## Variables
    /// - `MESA_STORE_NAME`: store name
    /// - `MESA_TAX_RATE`: tax rate as a percentage (e.g., "8.25")
    /// - `MESA_DATA_SOURCE`: "live" or "fixture"
    /// - `MESA_API_URL`: backend base URL
    /// - `MESA_ROLE`: session role
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("MESA_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(rate) = lookup("MESA_TAX_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) => {
                    debug!(rate = %rate, "Overriding tax rate from environment");
                    self.pricing.tax_rate_bps = Rate::from_percentage(pct).bps();
                }
                Err(_) => warn!(rate = %rate, "Ignoring unparseable MESA_TAX_RATE"),
            }
        }

        if let Some(source) = lookup("MESA_DATA_SOURCE") {
            match source.parse() {
                Ok(kind) => {
                    debug!(source = %source, "Overriding data source from environment");
                    self.data.source = kind;
                }
                Err(e) => warn!("Ignoring MESA_DATA_SOURCE: {}", e),
            }
        }

        if let Some(url) = lookup("MESA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.data.api_url = url;
        }

        if let Some(role) = lookup("MESA_ROLE") {
            match role.parse() {
                Ok(parsed) => self.session.role = parsed,
                Err(e) => warn!("Ignoring MESA_ROLE: {}", e),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "mesa", "register")
            .map(|dirs| dirs.config_dir().join("register.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn tax_rate(&self) -> Rate {
        Rate::from_bps(self.pricing.tax_rate_bps)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.data.timeout_secs)
    }

    pub fn role(&self) -> Role {
        self.session.role
    }

    /// Formats an amount with the store's currency settings.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::Money;
    /// use mesa_register::state::RegisterConfig;
    ///
    /// let config = RegisterConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let decimals = self.store.currency_decimals as u32;
        let sign = if cents < 0 { "-" } else { "" };
        let symbol = &self.store.currency_symbol;

        // Amounts are stored in hundredths; rescale for other precisions
        let scaled = match decimals {
            0 => (cents.abs() + 50) / 100,
            1 => (cents.abs() + 5) / 10,
            2 => cents.abs(),
            d => cents.abs() * 10_i64.pow(d - 2),
        };

        if decimals == 0 {
            return format!("{}{}{}", sign, symbol, scaled);
        }

        let divisor = 10_i64.pow(decimals);
        format!(
            "{}{}{}.{:0width$}",
            sign,
            symbol,
            scaled / divisor,
            scaled % divisor,
            width = decimals as usize
        )
    }
}
