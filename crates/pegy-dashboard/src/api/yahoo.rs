//! Yahoo Finance quoteSummary client
//!
//! Yahoo requires a session cookie plus a matching "crumb" token on every
//! quoteSummary call. The crumb is fetched lazily, shared across requests
//! and refreshed once when Yahoo answers 401.

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use pegy_core::{MarketDataSource, RawFundamentals};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const MODULES: &str = "price,summaryDetail,defaultKeyStatistics,earningsTrend,indexTrend";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Analyst period holding the one-year-forward estimate
const NEXT_YEAR: &str = "+1y";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Yahoo Finance API client
pub struct YahooFinanceClient {
    client: Client,
    crumb: RwLock<Option<String>>,
    rate_limiter: SharedRateLimiter,
}

impl YahooFinanceClient {
    /// Create a client honouring the configured timeout and rate limit
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()?;

        let quota = Quota::per_minute(
            NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            client,
            crumb: RwLock::new(None),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Fetch the raw PEGY inputs for one symbol
    #[instrument(skip(self))]
    pub async fn get_fundamentals(&self, symbol: &str) -> Result<RawFundamentals> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(DashboardError::DataUnavailable {
                symbol,
                reason: "empty symbol".to_string(),
            });
        }

        let body = self.quote_summary(&symbol).await?;
        parse_quote_summary(&symbol, &body)
    }

    async fn quote_summary(&self, symbol: &str) -> Result<String> {
        let response = self.send_quote_summary(symbol).await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Yahoo rejected the crumb for {}, refreshing", symbol);
            self.invalidate_crumb().await;
            self.send_quote_summary(symbol).await?
        } else {
            response
        };

        let status = response.status();
        let body = response.text().await?;

        // 404 carries a JSON error body ("Quote not found for symbol")
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(body);
        }

        Err(DashboardError::YahooFinance(format!("HTTP {status} for {symbol}")))
    }

    async fn send_quote_summary(&self, symbol: &str) -> Result<reqwest::Response> {
        let crumb = self.crumb().await?;
        self.rate_limiter.until_ready().await;

        debug!("GET quoteSummary {}", symbol);
        let response = self
            .client
            .get(format!("{QUOTE_SUMMARY_URL}/{symbol}"))
            .query(&[("modules", MODULES), ("crumb", crumb.as_str())])
            .send()
            .await?;
        Ok(response)
    }

    async fn crumb(&self) -> Result<String> {
        if let Some(crumb) = self.crumb.read().await.clone() {
            return Ok(crumb);
        }

        let mut slot = self.crumb.write().await;
        if let Some(crumb) = slot.clone() {
            return Ok(crumb);
        }

        // The cookie endpoint answers 404 but still sets the session cookie
        self.rate_limiter.until_ready().await;
        let _ = self.client.get(COOKIE_URL).send().await?;

        self.rate_limiter.until_ready().await;
        let response = self.client.get(CRUMB_URL).send().await?;
        let status = response.status();
        let crumb = response.text().await?.trim().to_string();

        if !status.is_success() || crumb.is_empty() || crumb.contains('<') {
            return Err(DashboardError::YahooFinance(format!(
                "could not obtain crumb (HTTP {status})"
            )));
        }

        debug!("Obtained Yahoo crumb");
        *slot = Some(crumb.clone());
        Ok(crumb)
    }

    async fn invalidate_crumb(&self) {
        *self.crumb.write().await = None;
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn fetch(&self, symbol: &str) -> pegy_core::Result<RawFundamentals> {
        Ok(self.get_fundamentals(symbol).await?)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    price: Option<PriceModule>,
    summary_detail: Option<ValuationModule>,
    default_key_statistics: Option<ValuationModule>,
    earnings_trend: Option<TrendModule>,
    index_trend: Option<IndexTrendModule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValuationModule {
    #[serde(rename = "forwardPE")]
    forward_pe: Option<YahooNumber>,
    dividend_yield: Option<YahooNumber>,
}

impl ValuationModule {
    fn forward_pe(&self) -> Option<f64> {
        self.forward_pe.as_ref().and_then(YahooNumber::value)
    }

    fn dividend_yield(&self) -> Option<f64> {
        self.dividend_yield.as_ref().and_then(YahooNumber::value)
    }
}

#[derive(Debug, Deserialize)]
struct TrendModule {
    #[serde(default)]
    trend: Vec<TrendEntry>,
}

#[derive(Debug, Deserialize)]
struct IndexTrendModule {
    #[serde(default)]
    estimates: Vec<TrendEntry>,
}

#[derive(Debug, Deserialize)]
struct TrendEntry {
    #[serde(default)]
    period: String,
    growth: Option<YahooNumber>,
}

/// `{"raw": 0.12, "fmt": "12%"}`; Yahoo sends `{}` or a string such as
/// `"Infinity"` when there is no usable number
#[derive(Debug, Deserialize)]
struct YahooNumber {
    #[serde(default)]
    raw: Option<serde_json::Value>,
}

impl YahooNumber {
    fn value(&self) -> Option<f64> {
        self.raw.as_ref()?.as_f64().filter(|v| v.is_finite())
    }
}

fn next_year_growth(entries: &[TrendEntry]) -> Option<f64> {
    entries
        .iter()
        .find(|e| e.period == NEXT_YEAR)
        .and_then(|e| e.growth.as_ref())
        .and_then(YahooNumber::value)
}

/// Map a quoteSummary response body onto [`RawFundamentals`]
///
/// A response without an earnings trend is an error: there is no growth
/// estimate to build a PEGY from. Every other field may be missing.
pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<RawFundamentals> {
    let envelope: Envelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.quote_summary.error {
        let reason = error
            .description
            .or(error.code)
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(DashboardError::DataUnavailable {
            symbol: symbol.to_string(),
            reason,
        });
    }

    let result = envelope
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| DashboardError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "empty quoteSummary result".to_string(),
        })?;

    let earnings_trend = result.earnings_trend.ok_or_else(|| DashboardError::DataUnavailable {
        symbol: symbol.to_string(),
        reason: "no earnings trend".to_string(),
    })?;

    let forward_pe = result
        .summary_detail
        .as_ref()
        .and_then(ValuationModule::forward_pe)
        .or_else(|| {
            result
                .default_key_statistics
                .as_ref()
                .and_then(ValuationModule::forward_pe)
        });
    let dividend_yield = result
        .summary_detail
        .as_ref()
        .and_then(ValuationModule::dividend_yield);

    let company_name = result
        .price
        .and_then(|p| p.long_name.or(p.short_name))
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    Ok(RawFundamentals {
        symbol: symbol.to_string(),
        company_name,
        forward_pe,
        dividend_yield_fraction: dividend_yield,
        stock_growth_1y_fraction: next_year_growth(&earnings_trend.trend),
        index_growth_1y_fraction: result
            .index_trend
            .and_then(|t| next_year_growth(&t.estimates)),
    })
}
