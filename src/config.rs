use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,

    // Periodic eviction of expired cards, disabled when unset or zero
    pub sweep_interval_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Self::from_source(&config)
    }

    pub fn from_source(config: &config::Config) -> Result<Self, config::ConfigError> {
        Ok(Self {
            host: optional(config, "host")?.unwrap_or_else(|| "127.0.0.1".to_string()),
            port: optional(config, "port")?.unwrap_or(8000),
            sweep_interval_secs: optional(config, "sweep_interval_secs")?,
        })
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reads `key`, treating only a missing key as absent
fn optional<T: DeserializeOwned>(
    config: &config::Config,
    key: &str,
) -> Result<Option<T>, config::ConfigError> {
    match config.get(key) {
        Ok(value) => Ok(Some(value)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let source = config::Config::builder().build().unwrap();
        let config = Config::from_source(&source).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert!(config.sweep_interval().is_none());
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_overrides() {
        let source = config::Config::builder()
            .set_override("host", "0.0.0.0")
            .unwrap()
            .set_override("port", 9090_i64)
            .unwrap()
            .set_override("sweep_interval_secs", 3600_i64)
            .unwrap()
            .build()
            .unwrap();
        let config = Config::from_source(&source).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:9090");
        assert_eq!(config.sweep_interval(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_zero_interval_disables_sweeper() {
        let source = config::Config::builder()
            .set_override("sweep_interval_secs", 0_i64)
            .unwrap()
            .build()
            .unwrap();
        let config = Config::from_source(&source).unwrap();

        assert_eq!(config.sweep_interval_secs, Some(0));
        assert!(config.sweep_interval().is_none());
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let source = config::Config::builder()
            .set_override("port", "notaport")
            .unwrap()
            .build()
            .unwrap();

        assert!(Config::from_source(&source).is_err());
    }

    #[test]
    fn test_invalid_sweep_interval_is_an_error() {
        let source = config::Config::builder()
            .set_override("sweep_interval_secs", "soon")
            .unwrap()
            .build()
            .unwrap();

        assert!(Config::from_source(&source).is_err());
    }
}
