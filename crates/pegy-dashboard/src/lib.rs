//! PEGY ratio dashboard
//!
//! Terminal front end over [`pegy_core`]:
//!
//! - [`api::YahooFinanceClient`]: forward P/E, dividend yield and analyst
//!   growth estimates from Yahoo Finance quoteSummary
//! - [`categories`]: the dashboard tabs and their ticker lists
//! - [`render`]: comfy-table output with gradient-painted PEGY cells
//! - [`summary`]: AI company summaries cached on disk
//! - [`session::DashboardSession`]: tab, sort and cache state behind the
//!   `pegy` binary and its interactive commands
//!
//! # Example
//!
//! ```rust,ignore
//! use pegy_dashboard::{DashboardConfig, DashboardSession};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DashboardConfig::builder().with_env().build()?;
//!     let session = DashboardSession::from_config(&config).await?;
//!     println!("{}", session.render_active().await);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod categories;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompts;
pub mod render;
pub mod session;
pub mod summary;

pub use api::YahooFinanceClient;
pub use categories::{Category, TickerUniverse};
pub use commands::Command;
pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
pub use render::Styling;
pub use session::{DashboardSession, Reply, TabView};
pub use summary::{CompanySummary, SummaryGenerator};
