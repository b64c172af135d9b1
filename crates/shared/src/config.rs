//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::{Currency, Locale};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Sampling policy knobs.
    #[serde(default)]
    pub sampling: SamplingSettings,
    /// File-backed storage locations.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Display settings for amounts.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Sampling policy settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SamplingSettings {
    /// Ascending absolute-amount boundaries separating strata.
    #[serde(default = "default_stratum_boundaries")]
    pub stratum_boundaries: Vec<Decimal>,
    /// Percent of the residual population drawn after MUS key items.
    #[serde(default = "default_mus_residual_percent")]
    pub mus_residual_percent: Decimal,
    /// Minimum residual draw count (when the residual pool is non-empty).
    #[serde(default = "default_mus_min_residual")]
    pub mus_min_residual: usize,
    /// Maximum residual draw count.
    #[serde(default = "default_mus_max_residual")]
    pub mus_max_residual: usize,
    /// Seed used when a sampling request carries none.
    #[serde(default)]
    pub default_seed: Option<u64>,
}

fn default_stratum_boundaries() -> Vec<Decimal> {
    vec![
        Decimal::from(1_000),
        Decimal::from(10_000),
        Decimal::from(100_000),
    ]
}

fn default_mus_residual_percent() -> Decimal {
    Decimal::TEN
}

fn default_mus_min_residual() -> usize {
    1
}

fn default_mus_max_residual() -> usize {
    60
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            stratum_boundaries: default_stratum_boundaries(),
            mus_residual_percent: default_mus_residual_percent(),
            mus_min_residual: default_mus_min_residual(),
            mus_max_residual: default_mus_max_residual(),
            default_seed: None,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON input files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Directory holding persisted session state.
    #[serde(default = "default_session_dir")]
    pub session_dir: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_session_dir() -> String {
    "data/sessions".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            session_dir: default_session_dir(),
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Reporting currency.
    #[serde(default = "default_currency")]
    pub currency: Currency,
    /// Locale used when formatting amounts.
    #[serde(default)]
    pub locale: Locale,
}

fn default_currency() -> Currency {
    Currency::Nok
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            locale: Locale::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "auditdesk=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("AUDITDESK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(
            config.sampling.stratum_boundaries,
            vec![dec!(1000), dec!(10000), dec!(100000)]
        );
        assert_eq!(config.sampling.mus_residual_percent, dec!(10));
        assert_eq!(config.sampling.mus_min_residual, 1);
        assert_eq!(config.sampling.mus_max_residual, 60);
        assert_eq!(config.sampling.default_seed, None);
        assert_eq!(config.storage.data_dir, "data");
        assert_eq!(config.display.currency, Currency::Nok);
        assert_eq!(config.display.locale, Locale::NbNo);
        assert_eq!(config.logging.filter, "auditdesk=info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        temp_env::with_vars_unset(
            ["AUDITDESK__STORAGE__DATA_DIR", "AUDITDESK__LOGGING__JSON"],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.storage.data_dir, "data");
                assert!(!config.logging.json);
            },
        );
    }

    #[test]
    fn test_load_env_override() {
        temp_env::with_vars(
            [
                ("AUDITDESK__STORAGE__DATA_DIR", Some("/srv/audit")),
                ("AUDITDESK__LOGGING__FILTER", Some("auditdesk=debug")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.storage.data_dir, "/srv/audit");
                assert_eq!(config.logging.filter, "auditdesk=debug");
            },
        );
    }
}
