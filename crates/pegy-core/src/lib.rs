//! PEGY valuation core
//!
//! PEGY = forward P/E ÷ (1Y EPS growth % + dividend yield). This crate holds
//! the pieces of the dashboard that do not talk to the outside world:
//!
//! - [`PegyCalculator`]: derives a [`TickerMetrics`] row from raw market
//!   fields and runs sequential batches over a [`MarketDataSource`]
//! - [`gradient`]: maps a PEGY value to a background/text color pair
//! - [`Cache`]: key/value capability injected into batches and summaries
//! - [`sort_rows`]: table ordering with missing values last
//!
//! # Example
//!
//! ```
//! use pegy_core::{PegyCalculator, RawFundamentals, gradient};
//!
//! let raw = RawFundamentals::new("msft")
//!     .with_forward_pe(20.0)
//!     .with_dividend_yield(0.02)
//!     .with_stock_growth(0.10);
//!
//! let metrics = PegyCalculator::default().derive(&raw);
//! assert_eq!(metrics.symbol, "MSFT");
//!
//! let style = gradient::style_for(metrics.pegy_1y);
//! assert!(!style.is_plain());
//! ```

pub mod cache;
pub mod calculator;
pub mod error;
pub mod gradient;
pub mod metrics;
pub mod sort;

pub use cache::{Cache, FileCache, MemoryCache};
pub use calculator::{MarketDataSource, PegyCalculator};
pub use error::{PegyError, Result};
pub use gradient::{CellStyle, Region, Rgb, TextColor, style_for, style_for_text};
pub use metrics::{Column, PegyRow, RawFundamentals, TickerMetrics, YieldBasis, nonzero, round_to};
pub use sort::{SortKey, SortOrder, sort_rows};
