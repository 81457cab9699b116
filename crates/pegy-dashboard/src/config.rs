//! Configuration for the dashboard

use crate::error::{DashboardError, Result};
use pegy_core::YieldBasis;
use pegy_llm::providers::OpenAIConfig;
use pegy_utils::{env_parse, env_var};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Unit of the dividend term in the PEGY denominator
    pub yield_basis: YieldBasis,

    /// Timeout for a single Yahoo Finance request
    pub request_timeout: Duration,

    /// Maximum Yahoo Finance requests per minute
    pub rate_limit_per_minute: u32,

    /// How long a computed tab stays cached
    pub batch_cache_ttl: Duration,

    /// Directory of cached AI summaries
    pub summary_cache_dir: PathBuf,

    /// Chat completion model
    pub llm_model: String,

    /// Chat completion endpoint base URL (provider default when unset)
    pub llm_api_base: Option<String>,

    /// API key for the completion endpoint
    #[serde(skip_serializing)]
    pub llm_api_key: Option<String>,

    /// Timeout for a completion request, in seconds
    pub llm_timeout_secs: u64,

    pub llm_temperature: f32,

    pub llm_max_tokens: usize,

    /// Newline or comma separated list of S&P 500 constituents
    pub snp500_file: Option<PathBuf>,

    /// Tickers shown on the "User Defined" tab
    pub user_tickers: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            yield_basis: YieldBasis::default(),
            request_timeout: Duration::from_secs(30),
            rate_limit_per_minute: 120,
            batch_cache_ttl: Duration::from_secs(3600), // 1 hour
            summary_cache_dir: PathBuf::from("cache/summaries"),
            llm_model: "gpt-4o-mini".to_string(),
            llm_api_base: None,
            llm_api_key: None,
            llm_timeout_secs: 30,
            llm_temperature: 0.2,
            llm_max_tokens: 400,
            snp500_file: None,
            user_tickers: vec!["MSFT".to_string()],
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit_per_minute == 0 {
            return Err(DashboardError::Config(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() || self.llm_timeout_secs == 0 {
            return Err(DashboardError::Config("timeouts must be greater than 0".to_string()));
        }

        if self.llm_max_tokens == 0 {
            return Err(DashboardError::Config(
                "llm_max_tokens must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(DashboardError::Config(format!(
                "llm_temperature must be within 0..=2, got {}",
                self.llm_temperature
            )));
        }

        if self.llm_model.trim().is_empty() {
            return Err(DashboardError::Config("llm_model must not be empty".to_string()));
        }

        Ok(())
    }

    /// Completion endpoint settings; fails when no API key is configured
    pub fn openai_config(&self) -> Result<OpenAIConfig> {
        let key = self.llm_api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            DashboardError::Config(
                "OPENAI_API_KEY not set in environment. Export your key and retry.".to_string(),
            )
        })?;

        let mut config = OpenAIConfig::new(key).with_timeout(self.llm_timeout_secs);
        if let Some(base) = &self.llm_api_base {
            config = config.with_api_base(base.as_str());
        }
        Ok(config)
    }
}

/// Builder for DashboardConfig
///
/// Values resolve as explicit setter, then environment (when
/// [`Self::with_env`] was called), then default.
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    yield_basis: Option<YieldBasis>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
    batch_cache_ttl: Option<Duration>,
    summary_cache_dir: Option<PathBuf>,
    llm_model: Option<String>,
    llm_api_base: Option<String>,
    llm_api_key: Option<String>,
    llm_timeout_secs: Option<u64>,
    llm_temperature: Option<f32>,
    llm_max_tokens: Option<usize>,
    snp500_file: Option<PathBuf>,
    user_tickers: Option<Vec<String>>,
}

impl DashboardConfigBuilder {
    pub fn yield_basis(mut self, basis: YieldBasis) -> Self {
        self.yield_basis = Some(basis);
        self
    }

    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    pub fn batch_cache_ttl(mut self, duration: Duration) -> Self {
        self.batch_cache_ttl = Some(duration);
        self
    }

    pub fn summary_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.summary_cache_dir = Some(dir.into());
        self
    }

    pub fn llm_model(mut self, model: impl Into<String>) -> Self {
        self.llm_model = Some(model.into());
        self
    }

    pub fn llm_api_base(mut self, base: impl Into<String>) -> Self {
        self.llm_api_base = Some(base.into());
        self
    }

    pub fn llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.llm_api_key = Some(key.into());
        self
    }

    pub fn llm_timeout_secs(mut self, secs: u64) -> Self {
        self.llm_timeout_secs = Some(secs);
        self
    }

    pub fn llm_temperature(mut self, temperature: f32) -> Self {
        self.llm_temperature = Some(temperature);
        self
    }

    pub fn llm_max_tokens(mut self, max_tokens: usize) -> Self {
        self.llm_max_tokens = Some(max_tokens);
        self
    }

    pub fn snp500_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.snp500_file = Some(path.into());
        self
    }

    pub fn user_tickers(mut self, tickers: Vec<String>) -> Self {
        self.user_tickers = Some(tickers);
        self
    }

    /// Fill unset values from the environment
    pub fn with_env(mut self) -> Self {
        self.llm_api_key = self.llm_api_key.or_else(|| env_var("OPENAI_API_KEY"));
        self.llm_api_base = self.llm_api_base.or_else(|| env_var("OPENAI_API_BASE"));
        self.llm_model = self.llm_model.or_else(|| env_var("OPENAI_MODEL"));
        self.summary_cache_dir = self
            .summary_cache_dir
            .or_else(|| env_var("PEGY_SUMMARY_CACHE_DIR").map(PathBuf::from));
        self.snp500_file = self
            .snp500_file
            .or_else(|| env_var("PEGY_SNP500_FILE").map(PathBuf::from));
        self.yield_basis = self.yield_basis.or_else(|| env_parse("PEGY_YIELD_BASIS"));
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashboardConfig> {
        let defaults = DashboardConfig::default();

        let config = DashboardConfig {
            yield_basis: self.yield_basis.unwrap_or(defaults.yield_basis),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
            batch_cache_ttl: self.batch_cache_ttl.unwrap_or(defaults.batch_cache_ttl),
            summary_cache_dir: self.summary_cache_dir.unwrap_or(defaults.summary_cache_dir),
            llm_model: self.llm_model.unwrap_or(defaults.llm_model),
            llm_api_base: self.llm_api_base,
            llm_api_key: self.llm_api_key,
            llm_timeout_secs: self.llm_timeout_secs.unwrap_or(defaults.llm_timeout_secs),
            llm_temperature: self.llm_temperature.unwrap_or(defaults.llm_temperature),
            llm_max_tokens: self.llm_max_tokens.unwrap_or(defaults.llm_max_tokens),
            snp500_file: self.snp500_file,
            user_tickers: self.user_tickers.unwrap_or(defaults.user_tickers),
        };

        config.validate()?;
        Ok(config)
    }
}
