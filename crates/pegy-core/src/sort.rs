//! Table sorting
//!
//! Missing values and error rows always sort last, whatever the direction.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::PegyError;
use crate::metrics::{Column, PegyRow};

/// Label of the default sort option
pub const ABS_PEGY_LABEL: &str = "PEGY-1Y (abs)";

/// What to sort by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    /// Absolute PEGY value
    #[default]
    AbsPegy,
    Column(Column),
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AbsPegy => ABS_PEGY_LABEL,
            Self::Column(c) => c.label(),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortKey {
    type Err = PegyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case(ABS_PEGY_LABEL)
            || matches!(
                wanted.to_ascii_lowercase().as_str(),
                "abs" | "abs-pegy" | "pegy-abs"
            )
        {
            return Ok(Self::AbsPegy);
        }
        wanted.parse().map(Self::Column)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "Ascending"),
            Self::Descending => write!(f, "Descending"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = PegyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(PegyError::Parse(format!("unknown sort order '{other}'"))),
        }
    }
}

enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

fn sort_value(row: &PegyRow, key: SortKey) -> Option<SortValue<'_>> {
    let metrics = row.metrics()?;
    match key {
        SortKey::AbsPegy => metrics.display_value(Column::Pegy1y).map(|v| SortValue::Number(v.abs())),
        SortKey::Column(Column::Symbol) => Some(SortValue::Text(&metrics.symbol)),
        SortKey::Column(column) => metrics.display_value(column).map(SortValue::Number),
    }
}

/// Stable in-place sort of a batch
pub fn sort_rows(rows: &mut [PegyRow], key: SortKey, order: SortOrder) {
    rows.sort_by(|a, b| match (sort_value(a, key), sort_value(b, key)) {
        (Some(x), Some(y)) => {
            let ordering = x.compare(&y);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TickerMetrics;

    fn row(symbol: &str, pegy: Option<f64>, forward_pe: Option<f64>) -> PegyRow {
        PegyRow::Metrics(TickerMetrics {
            symbol: symbol.to_string(),
            company_name: None,
            forward_pe,
            growth_1y_pct: None,
            index_growth_1y_pct: None,
            dividend_pct: 0.0,
            pegy_1y: pegy,
            growth_vs_index: None,
        })
    }

    fn symbols(rows: &[PegyRow]) -> Vec<&str> {
        rows.iter().map(PegyRow::symbol).collect()
    }

    fn batch() -> Vec<PegyRow> {
        vec![
            row("A", Some(2.5), Some(30.0)),
            PegyRow::error("ERR", "boom"),
            row("B", None, Some(10.0)),
            row("C", Some(-0.5), None),
            row("D", Some(1.2), Some(20.0)),
        ]
    }

    #[test]
    fn test_abs_pegy_ascending() {
        let mut rows = batch();
        sort_rows(&mut rows, SortKey::AbsPegy, SortOrder::Ascending);
        assert_eq!(symbols(&rows), vec!["C", "D", "A", "ERR", "B"]);
    }

    #[test]
    fn test_missing_last_when_descending() {
        let mut rows = batch();
        sort_rows(&mut rows, SortKey::AbsPegy, SortOrder::Descending);
        assert_eq!(symbols(&rows), vec!["A", "D", "C", "ERR", "B"]);
    }

    #[test]
    fn test_sort_by_column() {
        let mut rows = batch();
        sort_rows(&mut rows, SortKey::Column(Column::ForwardPe), SortOrder::Ascending);
        assert_eq!(symbols(&rows), vec!["B", "D", "A", "ERR", "C"]);

        sort_rows(&mut rows, SortKey::Column(Column::Symbol), SortOrder::Descending);
        assert_eq!(symbols(&rows), vec!["D", "C", "B", "A", "ERR"]);
    }

    #[test]
    fn test_signed_pegy_column() {
        let mut rows = batch();
        sort_rows(&mut rows, SortKey::Column(Column::Pegy1y), SortOrder::Ascending);
        assert_eq!(symbols(&rows), vec!["C", "D", "A", "ERR", "B"]);
    }

    #[test]
    fn test_parsing() {
        assert_eq!("PEGY-1Y (abs)".parse::<SortKey>().unwrap(), SortKey::AbsPegy);
        assert_eq!("abs".parse::<SortKey>().unwrap(), SortKey::AbsPegy);
        assert_eq!(
            "Dividend %".parse::<SortKey>().unwrap(),
            SortKey::Column(Column::DividendPct)
        );
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
