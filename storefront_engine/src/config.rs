use std::env;

use log::*;
use storefront_common::helpers::parse_or_default;

use crate::{db_types::Money, store_api::ledger_api::DEFAULT_MAX_TRANSACTION_AMOUNT};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// The largest amount a single deposit or withdrawal may move. Administrative credits are exempt.
    pub max_transaction_amount: Money,
    /// Queue depth for each event hook.
    pub event_buffer_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_transaction_amount: DEFAULT_MAX_TRANSACTION_AMOUNT,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key-value source. Invalid values are logged and replaced with the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let database_url = lookup("SF_DATABASE_URL").unwrap_or_else(|| {
            info!("🪛️ SF_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = parse_or_default(lookup("SF_DB_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS)
            .unwrap_or_else(|(e, default)| {
                error!("🪛️ Invalid SF_DB_MAX_CONNECTIONS. {e} Using the default, {default}, instead.");
                default
            });
        let max_transaction_amount =
            match parse_or_default(lookup("SF_MAX_TRANSACTION_AMOUNT"), DEFAULT_MAX_TRANSACTION_AMOUNT) {
                Ok(v) if v.is_positive() => v,
                Ok(v) => {
                    error!(
                        "🪛️ SF_MAX_TRANSACTION_AMOUNT must be positive, but was {v}. Using the default, \
                         {DEFAULT_MAX_TRANSACTION_AMOUNT}, instead."
                    );
                    DEFAULT_MAX_TRANSACTION_AMOUNT
                },
                Err((e, default)) => {
                    error!("🪛️ Invalid SF_MAX_TRANSACTION_AMOUNT. {e} Using the default, {default}, instead.");
                    default
                },
            };
        let event_buffer_size = parse_or_default(lookup("SF_EVENT_BUFFER_SIZE"), DEFAULT_EVENT_BUFFER_SIZE)
            .unwrap_or_else(|(e, default)| {
                error!("🪛️ Invalid SF_EVENT_BUFFER_SIZE. {e} Using the default, {default}, instead.");
                default
            });
        Self { database_url, max_connections, max_transaction_amount, event_buffer_size }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> EngineConfig {
        let vars = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]);
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_transaction_amount.to_string(), "10000.00");
    }

    #[test]
    fn values_are_read() {
        let config = config_from(&[
            ("SF_DATABASE_URL", "sqlite://tmp/shop.db"),
            ("SF_DB_MAX_CONNECTIONS", "12"),
            ("SF_MAX_TRANSACTION_AMOUNT", "250.50"),
            ("SF_EVENT_BUFFER_SIZE", "3"),
        ]);
        assert_eq!(config.database_url, "sqlite://tmp/shop.db");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.max_transaction_amount, Money::from_cents(25_050));
        assert_eq!(config.event_buffer_size, 3);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("SF_DB_MAX_CONNECTIONS", "lots"),
            ("SF_MAX_TRANSACTION_AMOUNT", "-10.00"),
            ("SF_EVENT_BUFFER_SIZE", "1.5"),
        ]);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.max_transaction_amount, Money::from_cents(1_000_000));
        assert_eq!(config.event_buffer_size, 25);

        let config = config_from(&[("SF_MAX_TRANSACTION_AMOUNT", "12.345")]);
        assert_eq!(config.max_transaction_amount, Money::from_cents(1_000_000));
    }
}
