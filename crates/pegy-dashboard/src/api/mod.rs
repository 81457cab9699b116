//! Market data API clients

pub mod yahoo;

pub use yahoo::YahooFinanceClient;
