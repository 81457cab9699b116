//! AI company summaries
//!
//! Summaries are produced by a chat-completion model from a JSON-only prompt
//! and memoized per symbol in an injected [`Cache`], normally a
//! [`pegy_core::FileCache`] so they survive restarts.

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::prompts::{SUMMARY_SYSTEM_PROMPT, company_summary_prompt};
use pegy_core::Cache;
use pegy_llm::{CompletionRequest, LLMProvider, Message, StopReason};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of core products kept
pub const MAX_CORE_PRODUCTS: usize = 5;

/// Short structured description of a company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySummary {
    #[serde(rename = "Overview", default)]
    pub overview: String,

    #[serde(rename = "Core Products", default)]
    pub core_products: Vec<String>,

    #[serde(rename = "Vision", default)]
    pub vision: String,

    #[serde(rename = "Accomplishment", default)]
    pub accomplishment: String,

    #[serde(rename = "Why", default)]
    pub why: String,
}

impl CompanySummary {
    /// Parse a summary document, rejecting one with no recognised field set
    fn from_value(value: Value) -> Result<Self> {
        let mut summary: Self = serde_json::from_value(value)?;
        if summary.is_empty() {
            return Err(DashboardError::Summary(
                "summary has none of the expected fields".to_string(),
            ));
        }
        summary.core_products.truncate(MAX_CORE_PRODUCTS);
        Ok(summary)
    }

    /// True when every field is blank
    pub fn is_empty(&self) -> bool {
        self.overview.trim().is_empty()
            && self.core_products.iter().all(|p| p.trim().is_empty())
            && self.vision.trim().is_empty()
            && self.accomplishment.trim().is_empty()
            && self.why.trim().is_empty()
    }
}

/// Generates and caches [`CompanySummary`] values
pub struct SummaryGenerator {
    provider: Option<Arc<dyn LLMProvider>>,
    cache: Arc<dyn Cache>,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl SummaryGenerator {
    /// `provider` may be `None` when no API key is configured; cached
    /// summaries are still served
    pub fn new(
        provider: Option<Arc<dyn LLMProvider>>,
        cache: Arc<dyn Cache>,
        config: &DashboardConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }

    /// Cached summary for `symbol`, if any
    pub async fn get_cached_summary(&self, symbol: &str) -> Option<CompanySummary> {
        let key = normalize(symbol);
        let value = self.cache.get(&key).await?;
        match CompanySummary::from_value(value) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Ignoring unreadable cached summary for {}: {}", key, e);
                None
            }
        }
    }

    /// Summary for `symbol`, from the cache or freshly generated
    pub async fn generate(&self, symbol: &str, company_name: Option<&str>) -> Result<CompanySummary> {
        let symbol = normalize(symbol);

        if let Some(summary) = self.get_cached_summary(&symbol).await {
            debug!("Using cached summary for {}", symbol);
            return Ok(summary);
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            DashboardError::Config(
                "OPENAI_API_KEY not set in environment. Export your key and retry.".to_string(),
            )
        })?;

        let summary = self
            .request_summary(provider.as_ref(), &symbol, company_name)
            .await
            .map_err(|e| {
                if let DashboardError::Llm(inner) = &e {
                    if inner.is_transient() {
                        warn!("Transient completion failure for {}, a later retry may succeed", symbol);
                    }
                }
                DashboardError::Summary(format!("AI summary generation failed for {symbol}: {e}"))
            })?;

        if let Err(e) = self.cache.put(&symbol, serde_json::to_value(&summary)?).await {
            warn!("Failed to cache summary for {}: {}", symbol, e);
        }

        info!("Generated AI summary for {} with {}", symbol, provider.name());
        Ok(summary)
    }

    async fn request_summary(
        &self,
        provider: &dyn LLMProvider,
        symbol: &str,
        company_name: Option<&str>,
    ) -> Result<CompanySummary> {
        let prompt = company_summary_prompt(symbol, company_name)?;

        let request = CompletionRequest::builder(&self.model)
            .system(SUMMARY_SYSTEM_PROMPT)
            .add_message(Message::user(prompt))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        let response = provider.complete(request).await?;
        if response.stop_reason == StopReason::MaxTokens {
            warn!("Summary for {} hit the token limit; JSON may be cut short", symbol);
        }
        let value = extract_json(response.message.text())?;
        CompanySummary::from_value(value)
    }

    /// Drop the cached summary for `symbol`, or every summary when `None`
    ///
    /// Returns how many entries were removed.
    pub async fn clear_cache(&self, symbol: Option<&str>) -> Result<usize> {
        let removed = match symbol {
            Some(symbol) => usize::from(self.cache.remove(&normalize(symbol)).await?),
            None => self.cache.clear().await?,
        };
        info!("Cleared {} cached summaries", removed);
        Ok(removed)
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Parse model output as JSON, falling back to the span between the first
/// `{` and the last `}`
pub fn extract_json(text: &str) -> Result<Value> {
    match serde_json::from_str(text.trim()) {
        Ok(value) => Ok(value),
        Err(direct) => {
            let span = text
                .find('{')
                .zip(text.rfind('}'))
                .filter(|(start, end)| start < end)
                .map(|(start, end)| &text[start..=end]);
            match span {
                Some(candidate) => Ok(serde_json::from_str(candidate)?),
                None => Err(direct.into()),
            }
        }
    }
}
