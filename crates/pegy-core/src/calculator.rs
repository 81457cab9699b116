//! PEGY derivation and batch calculation
//!
//! PEGY = |forward P/E| / (1Y EPS growth % + dividend term)

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::cache::Cache;
use crate::error::Result;
use crate::metrics::{PegyRow, RawFundamentals, TickerMetrics, YieldBasis, nonzero};

/// Source of raw market fields for a ticker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the raw fundamentals for one symbol
    async fn fetch(&self, symbol: &str) -> Result<RawFundamentals>;
}

/// Derives [`TickerMetrics`] from [`RawFundamentals`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PegyCalculator {
    yield_basis: YieldBasis,
}

impl PegyCalculator {
    pub fn new(yield_basis: YieldBasis) -> Self {
        Self { yield_basis }
    }

    pub fn yield_basis(&self) -> YieldBasis {
        self.yield_basis
    }

    /// Derive one metrics row. Pure; never fails.
    pub fn derive(&self, raw: &RawFundamentals) -> TickerMetrics {
        let forward_pe = nonzero(raw.forward_pe);
        let dividend_fraction = nonzero(raw.dividend_yield_fraction);
        let dividend_pct = dividend_fraction.map_or(0.0, |d| d * 100.0);
        let growth_1y_pct = nonzero(raw.stock_growth_1y_fraction).map(|g| g * 100.0);
        let index_growth_1y_pct = nonzero(raw.index_growth_1y_fraction).map(|g| g * 100.0);

        let dividend_term = match self.yield_basis {
            YieldBasis::Fraction => dividend_fraction.unwrap_or(0.0),
            YieldBasis::Percent => dividend_pct,
        };

        let pegy_1y = match (forward_pe, growth_1y_pct) {
            (Some(pe), Some(growth)) => pegy(pe, growth + dividend_term),
            _ => None,
        };

        let growth_vs_index = growth_1y_pct
            .zip(index_growth_1y_pct)
            .map(|(stock, index)| stock / index);

        TickerMetrics {
            symbol: raw.symbol.trim().to_uppercase(),
            company_name: raw.company_name.clone(),
            forward_pe,
            growth_1y_pct,
            index_growth_1y_pct,
            dividend_pct,
            pegy_1y,
            growth_vs_index,
        }
    }

    /// Calculate one row per symbol, in input order
    ///
    /// Tickers are fetched one at a time. A failing ticker becomes a
    /// [`PegyRow::Error`] and the batch carries on.
    pub async fn calculate_batch<S>(&self, symbols: &[String], source: &S) -> Vec<PegyRow>
    where
        S: MarketDataSource + ?Sized,
    {
        info!("Calculating PEGY for {} tickers", symbols.len());

        let mut rows = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let row = match source.fetch(symbol).await {
                Ok(mut raw) => {
                    if raw.symbol.is_empty() {
                        raw.symbol.clone_from(symbol);
                    }
                    PegyRow::Metrics(self.derive(&raw))
                }
                Err(e) => {
                    warn!("Failed to calculate PEGY for {}: {}", symbol, e);
                    PegyRow::error(symbol.clone(), e.to_string())
                }
            };
            rows.push(row);
        }

        let failed = rows.iter().filter(|r| r.is_error()).count();
        info!("Calculated {} rows ({} failed)", rows.len(), failed);
        rows
    }

    /// Like [`Self::calculate_batch`], memoized under `key` in `cache`
    ///
    /// Cache failures are logged and otherwise ignored.
    pub async fn calculate_batch_cached<S, C>(
        &self,
        key: &str,
        symbols: &[String],
        source: &S,
        cache: &C,
    ) -> Vec<PegyRow>
    where
        S: MarketDataSource + ?Sized,
        C: Cache + ?Sized,
    {
        if let Some(value) = cache.get(key).await {
            match serde_json::from_value::<Vec<PegyRow>>(value) {
                Ok(rows) => {
                    debug!("Batch cache hit for {}", key);
                    return rows;
                }
                Err(e) => warn!("Discarding unreadable batch cache entry {}: {}", key, e),
            }
        }
        debug!("Batch cache miss for {}", key);

        let rows = self.calculate_batch(symbols, source).await;

        match serde_json::to_value(&rows) {
            Ok(value) => {
                if let Err(e) = cache.put(key, value).await {
                    warn!("Failed to store batch {}: {}", key, e);
                }
            }
            Err(e) => warn!("Failed to serialize batch {}: {}", key, e),
        }

        rows
    }
}

/// Ratio of |forward P/E| to a strictly positive denominator
fn pegy(forward_pe: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| forward_pe.abs() / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::error::PegyError;
    use crate::metrics::{Column, round_to};
    use std::time::Duration;

    fn calc() -> PegyCalculator {
        PegyCalculator::default()
    }

    #[test]
    fn test_reference_example() {
        let raw = RawFundamentals::new("msft")
            .with_forward_pe(20.0)
            .with_dividend_yield(0.02)
            .with_stock_growth(0.10);
        let m = calc().derive(&raw);

        assert_eq!(m.symbol, "MSFT");
        assert!((m.dividend_pct - 2.0).abs() < 1e-9);
        assert!((m.growth_1y_pct.unwrap() - 10.0).abs() < 1e-9);
        let pegy = m.pegy_1y.unwrap();
        assert!((pegy - 20.0 / 10.02).abs() < 1e-9);
        assert_eq!(m.display_value(Column::Pegy1y), Some(2.0));
    }

    #[test]
    fn test_percent_yield_basis() {
        let raw = RawFundamentals::new("KO")
            .with_forward_pe(24.0)
            .with_dividend_yield(0.03)
            .with_stock_growth(0.05);
        let m = PegyCalculator::new(YieldBasis::Percent).derive(&raw);
        // 24 / (5 + 3)
        assert!((m.pegy_1y.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_pegy_matches_formula() {
        let cases = [(15.0, 0.2, 0.0), (42.5, 0.35, 0.011), (8.0, 0.04, 0.065)];
        for (pe, growth, dividend) in cases {
            let raw = RawFundamentals::new("X")
                .with_forward_pe(pe)
                .with_stock_growth(growth)
                .with_dividend_yield(dividend);
            let m = calc().derive(&raw);
            let expected = round_to(pe / (growth * 100.0 + dividend), 2);
            assert_eq!(m.display_value(Column::Pegy1y), Some(expected));
        }
    }

    #[test]
    fn test_pegy_absent_without_inputs() {
        let no_pe = RawFundamentals::new("A").with_stock_growth(0.1);
        assert_eq!(calc().derive(&no_pe).pegy_1y, None);

        let zero_pe = RawFundamentals::new("A").with_forward_pe(0.0).with_stock_growth(0.1);
        assert_eq!(calc().derive(&zero_pe).pegy_1y, None);

        let no_growth = RawFundamentals::new("A").with_forward_pe(18.0);
        let m = calc().derive(&no_growth);
        assert_eq!(m.pegy_1y, None);
        assert_eq!(m.growth_1y_pct, None);

        let zero_growth = RawFundamentals::new("A").with_forward_pe(18.0).with_stock_growth(0.0);
        assert_eq!(calc().derive(&zero_growth).growth_1y_pct, None);
    }

    #[test]
    fn test_negative_forward_pe_uses_absolute_value() {
        let raw = RawFundamentals::new("LOSS")
            .with_forward_pe(-30.0)
            .with_stock_growth(0.15);
        let m = calc().derive(&raw);
        assert_eq!(m.forward_pe, Some(-30.0));
        let pegy = m.pegy_1y.unwrap();
        assert!(pegy >= 0.0);
        assert!((pegy - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_denominator_has_no_pegy() {
        let shrinking = RawFundamentals::new("DOWN")
            .with_forward_pe(12.0)
            .with_stock_growth(-0.2);
        let m = calc().derive(&shrinking);
        assert_eq!(m.pegy_1y, None);
        assert!((m.growth_1y_pct.unwrap() + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_dividend_defaults_to_zero() {
        let raw = RawFundamentals::new("TSLA").with_forward_pe(90.0).with_stock_growth(0.3);
        let m = calc().derive(&raw);
        assert_eq!(m.dividend_pct, 0.0);
        assert_eq!(m.display_value(Column::DividendPct), None);
    }

    #[test]
    fn test_growth_vs_index() {
        let raw = RawFundamentals::new("NVDA")
            .with_forward_pe(35.0)
            .with_stock_growth(0.5)
            .with_index_growth(0.125);
        let m = calc().derive(&raw);
        assert!((m.index_growth_1y_pct.unwrap() - 12.5).abs() < 1e-9);
        assert!((m.growth_vs_index.unwrap() - 4.0).abs() < 1e-9);

        let no_index = RawFundamentals::new("NVDA").with_stock_growth(0.5).with_index_growth(0.0);
        assert_eq!(calc().derive(&no_index).growth_vs_index, None);

        let no_stock = RawFundamentals::new("NVDA").with_index_growth(0.1);
        assert_eq!(calc().derive(&no_stock).growth_vs_index, None);
    }

    fn mock_source() -> MockMarketDataSource {
        let mut source = MockMarketDataSource::new();
        source.expect_fetch().returning(|symbol| match symbol {
            "BAD" => Err(PegyError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no earnings trend".to_string(),
            }),
            _ => Ok(RawFundamentals::new(symbol)
                .with_forward_pe(20.0)
                .with_stock_growth(0.1)),
        });
        source
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let source = mock_source();
        let symbols = vec!["AAPL".to_string(), "BAD".to_string(), "MSFT".to_string()];

        let rows = calc().calculate_batch(&symbols, &source).await;

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].symbol(), "AAPL");
        assert!(rows[0].metrics().is_some());
        assert!(rows[1].is_error());
        assert_eq!(rows[1].symbol(), "BAD");
        assert!(rows[1].error_message().unwrap().contains("no earnings trend"));
        assert_eq!(rows[2].symbol(), "MSFT");
        assert!(rows[2].metrics().unwrap().pegy_1y.is_some());
    }

    #[tokio::test]
    async fn test_batch_fills_missing_symbol() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_fetch()
            .returning(|_| Ok(RawFundamentals::default().with_forward_pe(10.0)));

        let rows = calc().calculate_batch(&["amd".to_string()], &source).await;
        assert_eq!(rows[0].symbol(), "AMD");
    }

    #[tokio::test]
    async fn test_cached_batch_fetches_once() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_fetch()
            .times(2)
            .returning(|symbol| Ok(RawFundamentals::new(symbol).with_forward_pe(10.0)));
        let cache = MemoryCache::new(Duration::from_secs(60));
        let symbols = vec!["V".to_string(), "WMT".to_string()];

        let first = calc()
            .calculate_batch_cached("df_Watchlist", &symbols, &source, &cache)
            .await;
        let second = calc()
            .calculate_batch_cached("df_Watchlist", &symbols, &source, &cache)
            .await;

        assert_eq!(first, second);
        assert_eq!(second.len(), 2);
    }
}
