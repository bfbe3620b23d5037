use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Immutable runtime configuration.
///
/// A configuration change (e.g., credentials entered or cleared) builds a
/// fresh [`Orchestrator`](crate::orchestration::Orchestrator) rather than
/// mutating a live one, so cached data can never leak across accounts.
#[derive(Debug, Clone)]
pub struct Config {
    /// Exchange API key; `None` together with a missing secret means demo
    /// mode (no collaborator, synthetic data only).
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: String,
    /// Starting balance baseline for income aggregation.
    pub starting_balance: f64,
    /// Maximum age of cached derived datasets.
    pub cache_ttl: Duration,
    /// Optional fixed seed for synthetic data; entropy-seeded when absent.
    pub synthetic_seed: Option<u64>,
}

pub const MAINNET_BASE_URL: &str = "https://fapi.binance.com";
pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";

const DEFAULT_STARTING_BALANCE: f64 = 10000.0;
const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let api_key = env_map.get("BINANCE_API_KEY").cloned().filter(|s| !s.is_empty());
        let api_secret = env_map
            .get("BINANCE_API_SECRET")
            .cloned()
            .filter(|s| !s.is_empty());

        let testnet = match env_map.get("BINANCE_TESTNET").map(|s| s.as_str()) {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "BINANCE_TESTNET".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let base_url = env_map.get("BINANCE_BASE_URL").cloned().unwrap_or_else(|| {
            if testnet {
                TESTNET_BASE_URL.to_string()
            } else {
                MAINNET_BASE_URL.to_string()
            }
        });

        let starting_balance = match env_map.get("STARTING_BALANCE") {
            None => DEFAULT_STARTING_BALANCE,
            Some(raw) => raw.parse::<f64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "STARTING_BALANCE".to_string(),
                    "must be a valid number".to_string(),
                )
            })?,
        };

        let cache_ttl_secs = match env_map.get("CACHE_TTL_SECS") {
            None => DEFAULT_CACHE_TTL_SECS,
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "CACHE_TTL_SECS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?,
        };

        let synthetic_seed = match env_map.get("SYNTHETIC_SEED") {
            None => None,
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "SYNTHETIC_SEED".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?),
        };

        Ok(Config {
            api_key,
            api_secret,
            base_url,
            starting_balance,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            synthetic_seed,
        })
    }

    /// Whether the exchange collaborator is configured at all.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.api_secret.is_some()
    }
}

impl Default for Config {
    /// Demo-mode configuration: no credentials, defaults everywhere.
    fn default() -> Self {
        Config {
            api_key: None,
            api_secret: None,
            base_url: MAINNET_BASE_URL.to_string(),
            starting_balance: DEFAULT_STARTING_BALANCE,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            synthetic_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_env_is_demo_mode() {
        let config = Config::from_env_map(HashMap::new()).unwrap();
        assert!(!config.has_credentials());
        assert_eq!(config.base_url, MAINNET_BASE_URL);
        assert_eq!(config.starting_balance, 10000.0);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(config.synthetic_seed.is_none());
    }

    #[test]
    fn test_credentials_require_both_parts() {
        let mut env_map = HashMap::new();
        env_map.insert("BINANCE_API_KEY".to_string(), "key".to_string());
        let config = Config::from_env_map(env_map.clone()).unwrap();
        assert!(!config.has_credentials());

        env_map.insert("BINANCE_API_SECRET".to_string(), "secret".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert!(config.has_credentials());
    }

    #[test]
    fn test_testnet_switches_base_url() {
        let mut env_map = HashMap::new();
        env_map.insert("BINANCE_TESTNET".to_string(), "true".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.base_url, TESTNET_BASE_URL);
    }

    #[test]
    fn test_explicit_base_url_wins() {
        let mut env_map = HashMap::new();
        env_map.insert("BINANCE_TESTNET".to_string(), "true".to_string());
        env_map.insert(
            "BINANCE_BASE_URL".to_string(),
            "http://localhost:9000".to_string(),
        );
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_invalid_testnet_flag() {
        let mut env_map = HashMap::new();
        env_map.insert("BINANCE_TESTNET".to_string(), "maybe".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(key, _)) => assert_eq!(key, "BINANCE_TESTNET"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_starting_balance() {
        let mut env_map = HashMap::new();
        env_map.insert("STARTING_BALANCE".to_string(), "lots".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(key, _)) => assert_eq!(key, "STARTING_BALANCE"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_synthetic_seed_parsed() {
        let mut env_map = HashMap::new();
        env_map.insert("SYNTHETIC_SEED".to_string(), "42".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.synthetic_seed, Some(42));
    }
}
