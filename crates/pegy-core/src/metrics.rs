//! Row-level data model: raw inputs, derived metrics and table columns

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PegyError;

/// Treat absent, zero and NaN alike as "no value".
///
/// Market data providers report a missing estimate either by omitting the
/// field or by sending `0`, so every optional input goes through here before
/// it is used.
pub fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// Round to `places` decimals, ties to even
///
/// Halfway cases are judged on the scaled binary value, so `2.675` (stored
/// just below the tie) rounds down to `2.67` and `0.125` rounds to `0.12`.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Raw market fields for one ticker, as handed over by a data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFundamentals {
    /// Ticker symbol as requested
    pub symbol: String,
    /// Company display name, when the provider knows it
    pub company_name: Option<String>,
    /// Forward price/earnings ratio
    pub forward_pe: Option<f64>,
    /// Trailing dividend yield as a fraction (0.02 for 2%)
    pub dividend_yield_fraction: Option<f64>,
    /// Analyst 1-year EPS growth estimate as a fraction
    pub stock_growth_1y_fraction: Option<f64>,
    /// Benchmark index 1-year growth estimate as a fraction
    pub index_growth_1y_fraction: Option<f64>,
}

impl RawFundamentals {
    /// Create an empty record for `symbol`
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    pub fn with_forward_pe(mut self, forward_pe: f64) -> Self {
        self.forward_pe = Some(forward_pe);
        self
    }

    pub fn with_dividend_yield(mut self, fraction: f64) -> Self {
        self.dividend_yield_fraction = Some(fraction);
        self
    }

    pub fn with_stock_growth(mut self, fraction: f64) -> Self {
        self.stock_growth_1y_fraction = Some(fraction);
        self
    }

    pub fn with_index_growth(mut self, fraction: f64) -> Self {
        self.index_growth_1y_fraction = Some(fraction);
        self
    }
}

/// Derived valuation metrics for one ticker
///
/// Values are stored unrounded; use [`TickerMetrics::display_value`] for the
/// rounded presentation figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMetrics {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub forward_pe: Option<f64>,
    pub growth_1y_pct: Option<f64>,
    pub index_growth_1y_pct: Option<f64>,
    pub dividend_pct: f64,
    pub pegy_1y: Option<f64>,
    pub growth_vs_index: Option<f64>,
}

impl TickerMetrics {
    /// Rounded numeric value for a column, `None` when the cell is blank
    ///
    /// Growth figures keep four decimals, everything else two. A zero dividend
    /// is shown blank.
    pub fn display_value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Symbol => None,
            Column::ForwardPe => self.forward_pe.map(|v| round_to(v, 2)),
            Column::Growth1y => self.growth_1y_pct.map(|v| round_to(v, 4)),
            Column::GrowthVsIndex => self.growth_vs_index.map(|v| round_to(v, 4)),
            Column::DividendPct => nonzero(Some(self.dividend_pct)).map(|v| round_to(v, 2)),
            Column::Pegy1y => self.pegy_1y.map(|v| round_to(v, 2)),
        }
    }

    /// Text of a column cell, `None` when blank
    pub fn format_cell(&self, column: Column) -> Option<String> {
        match column {
            Column::Symbol => Some(self.symbol.clone()),
            _ => self
                .display_value(column)
                .map(|v| format!("{v:.prec$}", prec = column.decimals())),
        }
    }
}

/// One entry of a batch: derived metrics or the reason the ticker failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PegyRow {
    Metrics(TickerMetrics),
    Error {
        ticker: String,
        error_message: String,
    },
}

impl PegyRow {
    /// Build an error row
    pub fn error(ticker: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            ticker: ticker.into(),
            error_message: message.into(),
        }
    }

    /// Ticker symbol of the row, error or not
    pub fn symbol(&self) -> &str {
        match self {
            Self::Metrics(m) => &m.symbol,
            Self::Error { ticker, .. } => ticker,
        }
    }

    pub fn metrics(&self) -> Option<&TickerMetrics> {
        match self {
            Self::Metrics(m) => Some(m),
            Self::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Metrics(_) => None,
            Self::Error { error_message, .. } => Some(error_message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Rounded PEGY as displayed; this is the value the row is colored by
    pub fn display_pegy(&self) -> Option<f64> {
        self.metrics().and_then(|m| m.display_value(Column::Pegy1y))
    }
}

/// Unit of the dividend term added to growth in the PEGY denominator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YieldBasis {
    /// Raw yield fraction (0.02), reproducing the historical dashboard figures
    #[default]
    Fraction,
    /// Yield in percentage points (2.0), the same unit as growth
    Percent,
}

impl fmt::Display for YieldBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fraction => write!(f, "fraction"),
            Self::Percent => write!(f, "percent"),
        }
    }
}

impl FromStr for YieldBasis {
    type Err = PegyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fraction" | "raw" => Ok(Self::Fraction),
            "percent" | "pct" | "%" => Ok(Self::Percent),
            other => Err(PegyError::Parse(format!(
                "unknown yield basis '{other}' (expected 'fraction' or 'percent')"
            ))),
        }
    }
}

/// Columns of the PEGY table, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Symbol,
    ForwardPe,
    Growth1y,
    GrowthVsIndex,
    DividendPct,
    Pegy1y,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Symbol,
        Column::ForwardPe,
        Column::Growth1y,
        Column::GrowthVsIndex,
        Column::DividendPct,
        Column::Pegy1y,
    ];

    /// Header label
    pub fn label(self) -> &'static str {
        match self {
            Self::Symbol => "Symbol",
            Self::ForwardPe => "Forward P/E",
            Self::Growth1y => "Growth 1Y %",
            Self::GrowthVsIndex => "Growth 1Y / S&P 500",
            Self::DividendPct => "Dividend %",
            Self::Pegy1y => "PEGY-1Y",
        }
    }

    /// Decimals shown for the column
    pub fn decimals(self) -> usize {
        match self {
            Self::Growth1y | Self::GrowthVsIndex => 4,
            _ => 2,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Column {
    type Err = PegyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if let Some(column) = Self::ALL
            .iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
        {
            return Ok(*column);
        }

        match wanted.to_ascii_lowercase().as_str() {
            "symbol" | "ticker" => Ok(Self::Symbol),
            "pe" | "forward-pe" | "forward_pe" => Ok(Self::ForwardPe),
            "growth" | "growth-1y" | "growth_1y" => Ok(Self::Growth1y),
            "vs-index" | "growth-vs-index" | "growth_vs_index" => Ok(Self::GrowthVsIndex),
            "dividend" | "yield" => Ok(Self::DividendPct),
            "pegy" | "pegy-1y" | "pegy_1y" => Ok(Self::Pegy1y),
            other => Err(PegyError::Parse(format!("unknown column '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TickerMetrics {
        TickerMetrics {
            symbol: "MSFT".to_string(),
            company_name: None,
            forward_pe: Some(31.456),
            growth_1y_pct: Some(12.345_678),
            index_growth_1y_pct: Some(8.0),
            dividend_pct: 0.0,
            pegy_1y: Some(2.547_9),
            growth_vs_index: Some(1.543_209_75),
        }
    }

    #[test]
    fn test_nonzero() {
        assert_eq!(nonzero(None), None);
        assert_eq!(nonzero(Some(0.0)), None);
        assert_eq!(nonzero(Some(f64::NAN)), None);
        assert_eq!(nonzero(Some(-0.5)), Some(-0.5));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.996, 2), 2.0);
        assert_eq!(round_to(12.345_678, 4), 12.3457);
        assert_eq!(round_to(-1.234, 1), -1.2);
    }

    #[test]
    fn test_round_to_ties_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(-0.125, 2), -0.12);
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(2.5, 0), 2.0);
    }

    #[test]
    fn test_display_rounding() {
        let m = sample();
        assert_eq!(m.display_value(Column::ForwardPe), Some(31.46));
        assert_eq!(m.display_value(Column::Growth1y), Some(12.3457));
        assert_eq!(m.display_value(Column::GrowthVsIndex), Some(1.5432));
        assert_eq!(m.display_value(Column::Pegy1y), Some(2.55));
        // zero dividend renders blank
        assert_eq!(m.display_value(Column::DividendPct), None);
        assert_eq!(m.display_value(Column::Symbol), None);
    }

    #[test]
    fn test_format_cell() {
        let m = sample();
        assert_eq!(m.format_cell(Column::Symbol).as_deref(), Some("MSFT"));
        assert_eq!(m.format_cell(Column::ForwardPe).as_deref(), Some("31.46"));
        assert_eq!(m.format_cell(Column::Growth1y).as_deref(), Some("12.3457"));
        assert_eq!(m.format_cell(Column::DividendPct), None);
    }

    #[test]
    fn test_row_accessors() {
        let row = PegyRow::Metrics(sample());
        assert_eq!(row.symbol(), "MSFT");
        assert!(!row.is_error());
        assert_eq!(row.display_pegy(), Some(2.55));

        let err = PegyRow::error("BAD", "no data");
        assert_eq!(err.symbol(), "BAD");
        assert!(err.is_error());
        assert_eq!(err.error_message(), Some("no data"));
        assert!(err.metrics().is_none());
        assert_eq!(err.display_pegy(), None);
    }

    #[test]
    fn test_row_serialization() {
        let err = PegyRow::error("BAD", "boom");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["ticker"], "BAD");
        assert_eq!(json["error_message"], "boom");

        let row = PegyRow::Metrics(sample());
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["kind"], "metrics");
        let back: PegyRow = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_column_parsing() {
        assert_eq!("PEGY-1Y".parse::<Column>().unwrap(), Column::Pegy1y);
        assert_eq!("forward p/e".parse::<Column>().unwrap(), Column::ForwardPe);
        assert_eq!("dividend".parse::<Column>().unwrap(), Column::DividendPct);
        assert!("price".parse::<Column>().is_err());
    }

    #[test]
    fn test_yield_basis_parsing() {
        assert_eq!(YieldBasis::default(), YieldBasis::Fraction);
        assert_eq!("Percent".parse::<YieldBasis>().unwrap(), YieldBasis::Percent);
        assert_eq!("raw".parse::<YieldBasis>().unwrap(), YieldBasis::Fraction);
        assert!("basis-points".parse::<YieldBasis>().is_err());
    }
}
