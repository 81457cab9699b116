//! Ticker categories shown as dashboard tabs

use crate::error::{DashboardError, Result};
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::info;

pub const WATCHLIST: &[&str] = &[
    "ONDS", "OSCR", "PLTR", "RDW", "AVGO", "COST", "INTC", "AMD", "WMT", "V", "DDOG", "SNOW",
    "COIN", "RDDT", "CRWV",
];

pub const MAGNIFICENT_7: &[&str] = &[
    "AAPL", "AMZN", "ASML", "GOOGL", "META", "MSFT", "NFLX", "NVDA", "ORCL", "TSLA", "TSM",
];

pub const AI_ENERGY: &[&str] = &["CCJ", "CEG", "OKLO"];

pub const QUANTUM_COMPUTING: &[&str] = &["IONQ", "RGTI", "QBTS", "QUBT"];

pub const ROBOTICS: &[&str] = &["SYM", "ISRG"];

pub const SPACE_TECHNOLOGY: &[&str] = &["ASTS", "LMT", "PL", "RKLB"];

static UNSAFE_KEY_CHARS: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_]+"));

/// One dashboard tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Watchlist,
    UserDefined,
    Magnificent7,
    AiEnergy,
    QuantumComputing,
    Robotics,
    SpaceTechnology,
    Snp500,
    Portfolio,
}

impl Category {
    /// Tabs in display order
    pub const ALL: [Category; 9] = [
        Self::Watchlist,
        Self::UserDefined,
        Self::Magnificent7,
        Self::AiEnergy,
        Self::QuantumComputing,
        Self::Robotics,
        Self::SpaceTechnology,
        Self::Snp500,
        Self::Portfolio,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Watchlist => "📋 Watchlist",
            Self::UserDefined => "📝 User Defined",
            Self::Magnificent7 => "⭐ Magnificent 7",
            Self::AiEnergy => "⚡ YOLO - AI Energy",
            Self::QuantumComputing => "🧬 YOLO - Quantum Computing",
            Self::Robotics => "🤖 YOLO - Robotics",
            Self::SpaceTechnology => "🚀 YOLO - Space Technology",
            Self::Snp500 => "📈 S&P 500 Constituents",
            Self::Portfolio => "Portfolio",
        }
    }

    /// Short name accepted on the command line
    pub fn slug(self) -> &'static str {
        match self {
            Self::Watchlist => "watchlist",
            Self::UserDefined => "user",
            Self::Magnificent7 => "mags",
            Self::AiEnergy => "ai-energy",
            Self::QuantumComputing => "quantum",
            Self::Robotics => "robotics",
            Self::SpaceTechnology => "space",
            Self::Snp500 => "snp500",
            Self::Portfolio => "portfolio",
        }
    }

    /// 1-based position in the tab bar
    pub fn position(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).map_or(0, |i| i + 1)
    }

    /// Key of this tab's batch in the batch cache
    pub fn cache_key(self) -> String {
        format!("df_{}", safe_key(self.label()))
    }

    /// Built-in tickers, `None` for tabs filled at runtime
    pub fn builtin(self) -> Option<Vec<String>> {
        let owned = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
        match self {
            Self::Watchlist => {
                let mut tickers = owned(WATCHLIST);
                tickers.sort();
                Some(tickers)
            }
            Self::Magnificent7 => Some(owned(MAGNIFICENT_7)),
            Self::AiEnergy => Some(owned(AI_ENERGY)),
            Self::QuantumComputing => Some(owned(QUANTUM_COMPUTING)),
            Self::Robotics => Some(owned(ROBOTICS)),
            Self::SpaceTechnology => Some(owned(SPACE_TECHNOLOGY)),
            Self::Portfolio => Some(
                [MAGNIFICENT_7, AI_ENERGY, QUANTUM_COMPUTING, ROBOTICS, SPACE_TECHNOLOGY]
                    .concat()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            ),
            Self::UserDefined | Self::Snp500 => None,
        }
    }

    /// Message shown instead of a table when the tab has no tickers
    pub fn empty_message(self) -> &'static str {
        match self {
            Self::UserDefined => "No user-defined tickers provided. Pass --tickers to add some.",
            Self::Snp500 => "S&P 500 constituents not configured. Set PEGY_SNP500_FILE.",
            _ => "No tickers in this tab.",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = DashboardError;

    /// Accepts a 1-based position, a slug, or (part of) a label
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        if let Ok(n) = wanted.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i).copied())
                .ok_or_else(|| DashboardError::Config(format!("no tab number {n}")));
        }

        let lower = wanted.to_lowercase();
        Self::ALL
            .iter()
            .find(|c| c.slug() == lower)
            .or_else(|| {
                Self::ALL
                    .iter()
                    .find(|c| !lower.is_empty() && c.label().to_lowercase().contains(&lower))
            })
            .copied()
            .ok_or_else(|| DashboardError::Config(format!("unknown tab '{wanted}'")))
    }
}

/// Label with every run of characters outside `[0-9A-Za-z_]` replaced by `_`
pub fn safe_key(label: &str) -> String {
    match UNSAFE_KEY_CHARS.as_ref() {
        Ok(re) => re.replace_all(label, "_").into_owned(),
        Err(_) => label.to_string(),
    }
}

/// Split a comma/whitespace separated list into uppercase tickers
pub fn parse_tickers(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Read a ticker list file, one or more tickers per line
pub async fn load_ticker_file(path: &Path) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path).await?;
    let tickers = parse_tickers(&text);
    info!("Loaded {} tickers from {}", tickers.len(), path.display());
    Ok(tickers)
}

/// Tickers behind every tab
#[derive(Debug, Clone, Default)]
pub struct TickerUniverse {
    user: Vec<String>,
    snp500: Vec<String>,
}

impl TickerUniverse {
    pub fn new(user: Vec<String>, snp500: Vec<String>) -> Self {
        let mut user: Vec<String> = user
            .iter()
            .flat_map(|t| parse_tickers(t))
            .collect();
        user.sort();
        user.dedup();
        Self { user, snp500 }
    }

    pub fn set_user_tickers(&mut self, input: &str) {
        *self = Self::new(vec![input.to_string()], std::mem::take(&mut self.snp500));
    }

    pub fn user_tickers(&self) -> &[String] {
        &self.user
    }

    pub fn tickers(&self, category: Category) -> Vec<String> {
        match category {
            Category::UserDefined => self.user.clone(),
            Category::Snp500 => self.snp500.clone(),
            other => other.builtin().unwrap_or_default(),
        }
    }
}
