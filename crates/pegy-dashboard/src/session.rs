//! Dashboard session state and command handling

use crate::api::YahooFinanceClient;
use crate::categories::{Category, TickerUniverse, load_ticker_file};
use crate::commands::Command;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::render::{
    Styling, render_footer, render_header, render_sort_line, render_summary, render_tab_bar,
    render_table,
};
use crate::summary::{CompanySummary, SummaryGenerator};
use pegy_core::{
    Cache, FileCache, MarketDataSource, MemoryCache, PegyCalculator, PegyRow, SortKey, SortOrder,
    sort_rows,
};
use pegy_llm::LLMProvider;
use pegy_llm::providers::OpenAIProvider;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the caller should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this text
    Output(String),
    /// Leave the REPL
    Exit,
}

/// Rows behind one tab
#[derive(Debug, Clone, PartialEq)]
pub enum TabView {
    /// The tab has no tickers
    Empty { category: Category, message: String },
    /// Sorted batch
    Rows { category: Category, rows: Vec<PegyRow> },
}

/// One user's view of the dashboard
pub struct DashboardSession {
    calculator: PegyCalculator,
    source: Arc<dyn MarketDataSource>,
    batches: Arc<dyn Cache>,
    summaries: SummaryGenerator,
    universe: TickerUniverse,
    active: Category,
    sort_key: SortKey,
    sort_order: SortOrder,
    styling: Styling,
}

impl DashboardSession {
    pub fn new(
        calculator: PegyCalculator,
        source: Arc<dyn MarketDataSource>,
        batches: Arc<dyn Cache>,
        summaries: SummaryGenerator,
        universe: TickerUniverse,
    ) -> Self {
        Self {
            calculator,
            source,
            batches,
            summaries,
            universe,
            active: Category::Watchlist,
            sort_key: SortKey::default(),
            sort_order: SortOrder::default(),
            styling: Styling::default(),
        }
    }

    /// Wire Yahoo Finance, the batch and summary caches and, when an API key
    /// is configured, the completion provider
    pub async fn from_config(config: &DashboardConfig) -> Result<Self> {
        let source: Arc<dyn MarketDataSource> = Arc::new(YahooFinanceClient::new(config)?);
        let batches: Arc<dyn Cache> = Arc::new(MemoryCache::new(config.batch_cache_ttl));

        let provider: Option<Arc<dyn LLMProvider>> = match config.openai_config() {
            Ok(openai) => Some(Arc::new(OpenAIProvider::with_config(openai)?)),
            Err(e) => {
                warn!("AI summaries limited to cached entries: {}", e);
                None
            }
        };
        let summary_cache: Arc<dyn Cache> = Arc::new(FileCache::new(&config.summary_cache_dir));
        let summaries = SummaryGenerator::new(provider, summary_cache, config);

        let snp500 = match &config.snp500_file {
            Some(path) => load_ticker_file(path).await.unwrap_or_else(|e| {
                warn!("Could not load S&P 500 list from {}: {}", path.display(), e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        let universe = TickerUniverse::new(config.user_tickers.clone(), snp500);

        Ok(Self::new(
            PegyCalculator::new(config.yield_basis),
            source,
            batches,
            summaries,
            universe,
        ))
    }

    pub fn with_styling(mut self, styling: Styling) -> Self {
        self.styling = styling;
        self
    }

    pub fn active(&self) -> Category {
        self.active
    }

    pub fn select(&mut self, category: Category) {
        debug!("Switching to tab {}", category.label());
        self.active = category;
    }

    pub fn set_sort(&mut self, key: SortKey, order: SortOrder) {
        self.sort_key = key;
        self.sort_order = order;
    }

    /// Calculate (or recall) and sort the rows of `category`
    pub async fn load(&self, category: Category) -> TabView {
        let tickers = self.universe.tickers(category);
        if tickers.is_empty() {
            return TabView::Empty {
                category,
                message: category.empty_message().to_string(),
            };
        }

        let mut rows = self
            .calculator
            .calculate_batch_cached(
                &category.cache_key(),
                &tickers,
                self.source.as_ref(),
                self.batches.as_ref(),
            )
            .await;
        sort_rows(&mut rows, self.sort_key, self.sort_order);

        TabView::Rows { category, rows }
    }

    /// Full screen for the active tab
    pub async fn render_active(&self) -> String {
        let body = match self.load(self.active).await {
            TabView::Empty { message, .. } => format!("ℹ️  {message}"),
            TabView::Rows { rows, .. } => render_table(&rows, self.styling).to_string(),
        };

        format!(
            "{}\n\n{}\n{}\n\n{}\n\n{}",
            render_header(),
            render_tab_bar(self.active),
            render_sort_line(self.sort_key, self.sort_order),
            body,
            render_footer()
        )
    }

    /// Forget the active tab's cached batch; returns whether one existed
    pub async fn refresh(&self) -> Result<bool> {
        let key = self.active.cache_key();
        let existed = self.batches.remove(&key).await?;
        info!("Refreshing {} (cached: {})", self.active.label(), existed);
        Ok(existed)
    }

    /// Replace the user-defined tickers and drop that tab's cached batch
    pub async fn set_user_tickers(&mut self, symbols: &[String]) -> Result<()> {
        self.universe.set_user_tickers(&symbols.join(","));
        self.batches.remove(&Category::UserDefined.cache_key()).await?;
        Ok(())
    }

    /// AI summary for `symbol`, named after the company when a loaded batch knows it
    pub async fn summary(&self, symbol: &str) -> Result<CompanySummary> {
        let company_name = self.company_name(symbol).await;
        self.summaries.generate(symbol, company_name.as_deref()).await
    }

    async fn company_name(&self, symbol: &str) -> Option<String> {
        for category in Category::ALL {
            let Some(value) = self.batches.get(&category.cache_key()).await else {
                continue;
            };
            let Ok(rows) = serde_json::from_value::<Vec<PegyRow>>(value) else {
                continue;
            };
            let name = rows
                .iter()
                .filter_map(PegyRow::metrics)
                .find(|m| m.symbol.eq_ignore_ascii_case(symbol))
                .and_then(|m| m.company_name.clone());
            if name.is_some() {
                return name;
            }
        }
        None
    }

    /// Run one command
    pub async fn handle(&mut self, command: Command) -> Result<Reply> {
        let output = match command {
            Command::Show => self.render_active().await,
            Command::Tabs => Category::ALL
                .iter()
                .map(|c| {
                    let marker = if *c == self.active { "*" } else { " " };
                    format!("{marker} {} {}", c.position(), c.label())
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Tab { category } => {
                self.select(category);
                self.render_active().await
            }
            Command::Sort { key, order } => {
                self.set_sort(key, order.unwrap_or(self.sort_order));
                self.render_active().await
            }
            Command::Refresh => {
                self.refresh().await?;
                self.render_active().await
            }
            Command::Tickers { symbols } => {
                self.set_user_tickers(&symbols).await?;
                self.select(Category::UserDefined);
                self.render_active().await
            }
            Command::Summary { symbol } => {
                let summary = self.summary(&symbol).await?;
                render_summary(&symbol, &summary)
            }
            Command::ClearSummary { symbol } => {
                let removed = self.summaries.clear_cache(symbol.as_deref()).await?;
                format!("Cleared {removed} cached AI summaries")
            }
            Command::Help => Command::help_text().to_string(),
            Command::Exit => return Ok(Reply::Exit),
        };
        Ok(Reply::Output(output))
    }
}
