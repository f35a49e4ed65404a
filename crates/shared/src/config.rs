//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::money::Tolerance;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger rule configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

impl DatabaseConfig {
    /// Configuration for a throwaway in-memory SQLite database.
    ///
    /// SQLite memory databases live per connection, so the pool is pinned
    /// to a single connection.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        }
    }
}

/// Ledger rule configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Tolerance used when comparing monetary totals.
    #[serde(default = "default_amount_epsilon")]
    pub amount_epsilon: Decimal,
}

fn default_amount_epsilon() -> Decimal {
    Tolerance::CENT.value()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            amount_epsilon: default_amount_epsilon(),
        }
    }
}

impl LedgerConfig {
    /// Returns the configured money tolerance.
    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.amount_epsilon)
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
            .add_source(config::Environment::with_prefix("LEDGERLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("LEDGERLY__DATABASE__URL", Some("postgres://localhost/ledgerly")),
                ("LEDGERLY__DATABASE__MAX_CONNECTIONS", Some("4")),
                ("RUN_MODE", Some("test-none")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/ledgerly");
                assert_eq!(config.database.max_connections, 4);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(config.ledger.amount_epsilon, dec!(0.01));
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("LEDGERLY__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-none")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_in_memory_pins_single_connection() {
        let db = DatabaseConfig::in_memory();
        assert_eq!(db.max_connections, 1);
        assert!(db.url.starts_with("sqlite:"));
    }
}
