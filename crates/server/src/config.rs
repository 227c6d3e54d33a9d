//! Environment-driven service configuration.
//!
//! Values come from the process environment (after loading a `.env` file
//! if one exists). Every key has a default except `ADMIN_API_KEY`; without
//! it the admin endpoints answer 503.

use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub admin_api_key: Option<String>,
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
    pub default_alpha: f32,
    pub n_factors: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            debug: false,
            admin_api_key: None,
            data_dir: PathBuf::from("data"),
            models_dir: PathBuf::from("models"),
            default_alpha: pipeline::DEFAULT_ALPHA,
            n_factors: sources::DEFAULT_N_FACTORS,
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_environment(config::Environment::default().try_parsing(true))
    }

    /// Build from an explicit environment source (tests supply a map here).
    pub fn from_environment(environment: config::Environment) -> Result<Self> {
        let defaults = Self::default();
        let config = config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("debug", defaults.debug)?
            .set_default("data_dir", defaults.data_dir.display().to_string())?
            .set_default("models_dir", defaults.models_dir.display().to_string())?
            .set_default("default_alpha", f64::from(defaults.default_alpha))?
            .set_default("n_factors", defaults.n_factors as i64)?
            .add_source(environment)
            .build()?;

        let mut config: Config = config.try_deserialize()?;
        config.admin_api_key = config
            .admin_api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("PORT must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&self.default_alpha) {
            return Err(anyhow!("DEFAULT_ALPHA must be between 0 and 1"));
        }
        if !(sources::MIN_N_FACTORS..=sources::MAX_N_FACTORS).contains(&self.n_factors) {
            return Err(anyhow!(
                "N_FACTORS must be between {} and {}",
                sources::MIN_N_FACTORS,
                sources::MAX_N_FACTORS
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn interactions_path(&self) -> PathBuf {
        self.data_dir.join(data_loader::INTERACTIONS_FILE)
    }

    /// Default tracing filter for this configuration
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> config::Environment {
        let map: config::Map<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::default().try_parsing(true).source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_environment(env(&[])).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
        assert!(!config.debug);
        assert!(config.admin_api_key.is_none());
        assert_eq!(config.n_factors, 50);
        assert!((config.default_alpha - 0.6).abs() < 1e-6);
        assert_eq!(config.interactions_path(), PathBuf::from("data/interactions.csv"));
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_environment(env(&[
            ("PORT", "9100"),
            ("DEBUG", "true"),
            ("ADMIN_API_KEY", "secret"),
            ("DEFAULT_ALPHA", "0.25"),
            ("MODELS_DIR", "/tmp/models"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9100);
        assert!(config.debug);
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.admin_api_key.as_deref(), Some("secret"));
        assert!((config.default_alpha - 0.25).abs() < 1e-6);
        assert_eq!(config.models_dir, PathBuf::from("/tmp/models"));
    }

    #[test]
    fn test_blank_admin_key_disables_admin() {
        let config = Config::from_environment(env(&[("ADMIN_API_KEY", "  ")])).unwrap();
        assert!(config.admin_api_key.is_none());
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        assert!(Config::from_environment(env(&[("DEFAULT_ALPHA", "1.5")])).is_err());
    }
}
