//! Interactive command parsing

use crate::categories::{Category, parse_tickers};
use crate::error::{DashboardError, Result};
use pegy_core::{SortKey, SortOrder};

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Redraw the active tab
    Show,
    /// List the tabs
    Tabs,
    /// Switch tab
    Tab { category: Category },
    /// Change sorting; the direction is kept when omitted
    Sort {
        key: SortKey,
        order: Option<SortOrder>,
    },
    /// Drop the active tab's cached batch and redraw
    Refresh,
    /// Replace the user-defined tickers
    Tickers { symbols: Vec<String> },
    /// AI summary for a company
    Summary { symbol: String },
    /// Drop one cached summary, or all of them
    ClearSummary { symbol: Option<String> },
    Help,
    Exit,
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(DashboardError::Command("Empty input".to_string()));
        }

        let Some(body) = input.strip_prefix('/') else {
            return Err(DashboardError::Command(format!(
                "Unknown input '{input}'. Commands start with '/', try /help"
            )));
        };

        let parts: Vec<&str> = body.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Err(DashboardError::Command("Empty command".to_string()));
        };

        match cmd.to_lowercase().as_str() {
            "show" | "s" => Ok(Command::Show),
            "tabs" => Ok(Command::Tabs),
            "tab" | "t" => {
                if args.is_empty() {
                    return Err(DashboardError::Command(
                        "Missing tab number or name for tab command".to_string(),
                    ));
                }
                let category = args.join(" ").parse()?;
                Ok(Command::Tab { category })
            }
            "sort" => {
                let (order, key_parts) = match args.split_last() {
                    Some((last, rest)) => match last.parse::<SortOrder>() {
                        Ok(order) => (Some(order), rest),
                        Err(_) => (None, args),
                    },
                    None => (None, args),
                };
                if key_parts.is_empty() {
                    return Err(DashboardError::Command(
                        "Missing column for sort command".to_string(),
                    ));
                }
                let key = key_parts.join(" ").parse()?;
                Ok(Command::Sort { key, order })
            }
            "refresh" | "r" => Ok(Command::Refresh),
            "tickers" => Ok(Command::Tickers {
                symbols: parse_tickers(&args.join(",")),
            }),
            "summary" | "ai" => {
                let symbol = args.first().ok_or_else(|| {
                    DashboardError::Command("Missing symbol for summary command".to_string())
                })?;
                Ok(Command::Summary {
                    symbol: symbol.to_uppercase(),
                })
            }
            "clear-summary" | "clear" => Ok(Command::ClearSummary {
                symbol: args.first().map(|s| s.to_uppercase()),
            }),
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(DashboardError::Command(format!("Unknown command: /{cmd}"))),
        }
    }

    /// Help text listing every command
    pub fn help_text() -> &'static str {
        "PEGY Dashboard Commands:\n\
        /show                     - Redraw the active tab\n\
        /tabs                     - List tabs\n\
        /tab <n|name>             - Switch tab\n\
        /sort <column> [asc|desc] - Sort the table\n\
        /refresh                  - Recalculate the active tab\n\
        /tickers <SYM,...>        - Set the user-defined tickers\n\
        /summary <SYM>            - AI company summary\n\
        /clear-summary [SYM]      - Drop cached AI summaries\n\
        /help                     - Show help\n\
        /exit                     - Exit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pegy_core::Column;

    #[test]
    fn test_parse_tab() {
        assert_eq!(
            Command::parse("/tab 3").unwrap(),
            Command::Tab {
                category: Category::Magnificent7
            }
        );
        assert_eq!(
            Command::parse("/t ai energy").unwrap(),
            Command::Tab {
                category: Category::AiEnergy
            }
        );
        assert!(Command::parse("/tab").is_err());
        assert!(Command::parse("/tab 42").is_err());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(
            Command::parse("/sort Dividend % desc").unwrap(),
            Command::Sort {
                key: SortKey::Column(Column::DividendPct),
                order: Some(SortOrder::Descending),
            }
        );
        assert_eq!(
            Command::parse("/sort abs").unwrap(),
            Command::Sort {
                key: SortKey::AbsPegy,
                order: None,
            }
        );
        assert!(Command::parse("/sort desc").is_err());
        assert!(Command::parse("/sort").is_err());
    }

    #[test]
    fn test_parse_summary_commands() {
        assert_eq!(
            Command::parse("/summary nvda").unwrap(),
            Command::Summary {
                symbol: "NVDA".to_string()
            }
        );
        assert_eq!(
            Command::parse("/clear-summary").unwrap(),
            Command::ClearSummary { symbol: None }
        );
        assert_eq!(
            Command::parse("/clear aapl").unwrap(),
            Command::ClearSummary {
                symbol: Some("AAPL".to_string())
            }
        );
        assert!(Command::parse("/summary").is_err());
    }

    #[test]
    fn test_parse_tickers() {
        assert_eq!(
            Command::parse("/tickers msft, aapl nvda").unwrap(),
            Command::Tickers {
                symbols: vec!["MSFT".to_string(), "AAPL".to_string(), "NVDA".to_string()]
            }
        );
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(Command::parse("/EXIT").unwrap(), Command::Exit);
        assert_eq!(Command::parse("/?").unwrap(), Command::Help);
        assert_eq!(Command::parse("/refresh").unwrap(), Command::Refresh);
        assert!(Command::parse("").is_err());
        assert!(Command::parse("hello").is_err());
        assert!(Command::parse("/frobnicate").is_err());
    }
}
