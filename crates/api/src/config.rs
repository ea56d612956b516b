use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use fetch::{HttpSource, RetryPolicy};

pub const CONFIG_PATH_VAR: &str = "RESULTS_CONFIG";
pub const PRESET_VAR: &str = "RESULTS_PRESET";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: HttpSource,
    pub server: ServerConfig,
    pub concurrency: ConcurrencyConfig,
    pub retry: RetryConfig,
    pub detection: DetectionConfig,
    /// Serve saved pages from this directory instead of the live site.
    pub fixtures_dir: Option<PathBuf>,
    pub include_trace: bool,
    pub log_json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Hall tickets fetched at once within a batch; 1 keeps batches sequential.
    pub max_concurrent_fetches: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub sentinels: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 1,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 5000,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sentinels: extract::DEFAULT_SENTINELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: HttpSource::default(),
            server: ServerConfig::default(),
            concurrency: ConcurrencyConfig::default(),
            retry: RetryConfig::default(),
            detection: DetectionConfig::default(),
            fixtures_dir: None,
            include_trace: false,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Sequential, patient, gentle on the results site.
    pub fn polite() -> Self {
        Self {
            concurrency: ConcurrencyConfig {
                max_concurrent_fetches: 1,
            },
            retry: RetryConfig {
                max_retries: 3,
                initial_backoff_ms: 2000,
                max_backoff_ms: 20000,
            },
            ..Self::default()
        }
    }

    pub fn fast() -> Self {
        Self {
            concurrency: ConcurrencyConfig {
                max_concurrent_fetches: 8,
            },
            retry: RetryConfig {
                max_retries: 1,
                initial_backoff_ms: 250,
                max_backoff_ms: 1000,
            },
            ..Self::default()
        }
    }

    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "default" => Ok(Self::default()),
            "polite" => Ok(Self::polite()),
            "fast" => Ok(Self::fast()),
            other => anyhow::bail!("Unknown preset: {other} (expected default, polite or fast)"),
        }
    }

    /// The JSON file named by `RESULTS_CONFIG` (or the `RESULTS_PRESET`
    /// preset when unset), then env overrides.
    pub fn load() -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(&env)
    }

    pub fn load_from(env: &HashMap<String, String>) -> Result<Self> {
        let mut config = match (env.get(CONFIG_PATH_VAR), env.get(PRESET_VAR)) {
            (Some(path), _) => Self::from_file(path)?,
            (None, Some(preset)) => Self::preset(preset)?,
            (None, None) => Self::default(),
        };
        config.apply_env(env)?;

        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config file: {path}"))
    }

    pub fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<()> {
        if let Some(url) = env.get("RESULTS_SOURCE_URL") {
            self.source.url = url.clone();
        }
        if let Some(addr) = env.get("RESULTS_BIND_ADDR") {
            self.server.bind_addr = addr.clone();
        }
        if let Some(dir) = env.get("RESULTS_FIXTURES_DIR") {
            self.fixtures_dir = Some(PathBuf::from(dir));
        }
        if let Some(n) = env.get("RESULTS_MAX_CONCURRENT") {
            self.concurrency.max_concurrent_fetches = n
                .parse()
                .with_context(|| format!("RESULTS_MAX_CONCURRENT is not a number: {n}"))?;
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_retries,
            self.retry.initial_backoff_ms,
            self.retry.max_backoff_ms,
        )
    }
}
