//! Application configuration
//!
//! Read from `FACTURATION_*` environment variables (a `.env` file is loaded
//! first by the binary). Every field has a default, so an empty environment
//! gives a working setup rooted at `./documents`.

use serde::Deserialize;
use std::collections::HashMap;

use core_kernel::Currency;

use crate::error::AppError;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FACTURATION";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Directory where document files are saved
    pub documents_dir: String,
    /// Path of the ledger state file
    pub ledger_path: String,
    /// Default length of the recent documents list
    pub recent_limit: usize,
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
    /// Currency of new documents
    pub currency: Currency,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            documents_dir: "./documents".to_string(),
            ledger_path: "./documents/ledger.json".to_string(),
            recent_limit: 10,
            log_level: "info".to_string(),
            currency: Currency::TND,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, AppError> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Loads configuration from an explicit variable map, e.g.
    /// `FACTURATION_RECENT_LIMIT=5`
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, AppError> {
        Self::load(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(Some(vars)),
        )
    }

    fn load(environment: config::Environment) -> Result<Self, AppError> {
        let defaults = AppConfig::default();
        let config: AppConfig = config::Config::builder()
            .set_default("documents_dir", defaults.documents_dir)?
            .set_default("ledger_path", defaults.ledger_path)?
            .set_default("recent_limit", defaults.recent_limit as i64)?
            .set_default("log_level", defaults.log_level)?
            .set_default("currency", defaults.currency.code())?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the workflow cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.documents_dir.trim().is_empty() {
            return Err(AppError::configuration("documents_dir must not be empty"));
        }
        if self.ledger_path.trim().is_empty() {
            return Err(AppError::configuration("ledger_path must not be empty"));
        }
        if self.recent_limit == 0 {
            return Err(AppError::configuration("recent_limit must be at least 1"));
        }
        Ok(())
    }
}
