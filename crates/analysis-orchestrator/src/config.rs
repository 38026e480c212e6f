use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Max documents processed at once
    pub concurrency: usize,
    /// Also recompute target prices on each run
    pub refresh_valuations: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            refresh_valuations: false,
        }
    }
}

impl OrchestratorConfig {
    /// Read `RATING_CONCURRENCY` and `RATING_REFRESH_VALUATIONS`, loading `.env` first.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let concurrency: usize = env::var("RATING_CONCURRENCY")
            .unwrap_or_else(|_| DEFAULT_CONCURRENCY.to_string())
            .parse()
            .context("RATING_CONCURRENCY must be a positive integer")?;
        if concurrency == 0 {
            anyhow::bail!("RATING_CONCURRENCY must be at least 1");
        }

        let refresh_valuations: bool = env::var("RATING_REFRESH_VALUATIONS")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .context("RATING_REFRESH_VALUATIONS must be true or false")?;

        Ok(Self {
            concurrency,
            refresh_valuations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.concurrency, 4);
        assert!(!config.refresh_valuations);
    }

    // Single test touching the environment so parallel tests cannot race on it.
    #[test]
    fn test_from_env() {
        env::set_var("RATING_CONCURRENCY", "8");
        env::set_var("RATING_REFRESH_VALUATIONS", "true");
        let config = OrchestratorConfig::from_env().unwrap();
        assert_eq!(config.concurrency, 8);
        assert!(config.refresh_valuations);

        env::set_var("RATING_CONCURRENCY", "0");
        assert!(OrchestratorConfig::from_env().is_err());

        env::set_var("RATING_CONCURRENCY", "many");
        assert!(OrchestratorConfig::from_env().is_err());

        env::remove_var("RATING_CONCURRENCY");
        env::remove_var("RATING_REFRESH_VALUATIONS");
        let config = OrchestratorConfig::from_env().unwrap();
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    }
}
