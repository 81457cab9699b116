//! Prompt templates for AI company summaries

use crate::error::Result;
use minijinja::{Environment, context};

/// System message for summary requests
pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a concise analyst.";

const COMPANY_SUMMARY_TEMPLATE: &str = r#"You are an expert company analyst. Produce a JSON object (no extra text) with the following keys for the company identified by the symbol `{{ symbol }}` and name `{{ display_name }}`:

- "Overview": short (1-2 sentences) description not copied from stock/ticker fields.
- "Core Products": an array of top 5 products/services (strings).
- "Vision": one-sentence future-looking statement.
- "Accomplishment": one-sentence notable accomplishment.
- "Why": one or two sentences answering whether someone should own this business and why.

Return valid JSON only, for example:
{
  "Overview": "...",
  "Core Products": ["p1", "p2", "p3", "p4", "p5"],
  "Vision": "...",
  "Accomplishment": "...",
  "Why": "..."
}"#;

/// Render the user prompt for a company summary
///
/// `company_name` falls back to the symbol when unknown.
pub fn company_summary_prompt(symbol: &str, company_name: Option<&str>) -> Result<String> {
    let display_name = company_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(symbol);

    let env = Environment::new();
    Ok(env.render_str(
        COMPANY_SUMMARY_TEMPLATE,
        context! { symbol => symbol, display_name => display_name },
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_symbol_and_name() {
        let prompt = company_summary_prompt("AAPL", Some("Apple Inc.")).unwrap();
        assert!(prompt.contains("symbol `AAPL`"));
        assert!(prompt.contains("name `Apple Inc.`"));
        assert!(prompt.contains("\"Core Products\""));
        assert!(prompt.contains("Return valid JSON only"));
    }

    #[test]
    fn test_prompt_field_instructions() {
        let prompt = company_summary_prompt("AAPL", None).unwrap();
        assert!(prompt.contains("not copied from stock/ticker fields"));
        assert!(prompt.contains("top 5 products/services"));
        assert!(prompt.contains("future-looking statement"));
        assert!(prompt.contains("whether someone should own this business and why"));
    }

    #[test]
    fn test_prompt_falls_back_to_symbol() {
        let prompt = company_summary_prompt("RKLB", None).unwrap();
        assert!(prompt.contains("name `RKLB`"));

        let prompt = company_summary_prompt("RKLB", Some("  ")).unwrap();
        assert!(prompt.contains("name `RKLB`"));
    }
}
