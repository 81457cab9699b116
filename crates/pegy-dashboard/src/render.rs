//! Terminal rendering of the dashboard

use crate::categories::Category;
use crate::summary::CompanySummary;
use comfy_table::presets::UTF8_FULL;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use pegy_core::{CellStyle, Column, PegyRow, Rgb, SortKey, SortOrder, style_for};

pub const TITLE: &str = "📊 PEGY Ratio Dashboard";
pub const CAPTION: &str = "PEGY = P/E ÷ (EPS Growth + Dividend Yield)";
pub const DATA_SOURCE: &str = "Data source: Yahoo Finance (near-real-time)";

const QUICK_INTERPRETATION: [&str; 4] = [
    "PEGY < 1 → potentially undervalued vs growth + yield",
    "PEGY ≈ 1–2 → fairly valued",
    "PEGY > 3 → expensive relative to growth",
    "PEGY blank → missing P/E or growth, or growth + dividend ≤ 0 (shrinking earnings)",
];

/// Placeholder for a blank cell
const BLANK: &str = "—";

/// Whether ANSI colors are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Styling {
    /// Follow terminal detection
    #[default]
    Auto,
    Always,
    Never,
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

fn paint(cell: Cell, style: CellStyle) -> Cell {
    match style {
        CellStyle::Plain => cell,
        CellStyle::Painted { background, text } => {
            cell.bg(to_color(background)).fg(to_color(text.rgb()))
        }
    }
}

/// Build the PEGY table; `#`, `Symbol` and `PEGY-1Y` carry the gradient
///
/// An `Error` column is appended only when the batch has error rows.
pub fn render_table(rows: &[PegyRow], styling: Styling) -> Table {
    let with_errors = rows.iter().any(PegyRow::is_error);

    let mut header = vec![Cell::new("#")];
    header.extend(Column::ALL.iter().map(|c| Cell::new(c.label())));
    if with_errors {
        header.push(Cell::new("Error"));
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    match styling {
        Styling::Auto => {}
        Styling::Always => {
            table.enforce_styling();
        }
        Styling::Never => {
            table.force_no_tty();
        }
    }

    for (index, row) in rows.iter().enumerate() {
        let style = style_for(row.display_pegy());
        let mut cells = vec![paint(Cell::new(index + 1), style)];

        match row {
            PegyRow::Metrics(metrics) => {
                for column in Column::ALL {
                    let text = metrics.format_cell(column).unwrap_or_else(|| BLANK.to_string());
                    let cell = match column {
                        Column::Symbol => paint(Cell::new(text), style),
                        Column::Pegy1y => {
                            paint(Cell::new(text).set_alignment(CellAlignment::Right), style)
                        }
                        _ => Cell::new(text).set_alignment(CellAlignment::Right),
                    };
                    cells.push(cell);
                }
                if with_errors {
                    cells.push(Cell::new(""));
                }
            }
            PegyRow::Error {
                ticker,
                error_message,
            } => {
                cells.push(Cell::new(ticker));
                cells.extend((1..Column::ALL.len()).map(|_| Cell::new(BLANK)));
                cells.push(Cell::new(error_message).fg(Color::Red));
            }
        }

        table.add_row(cells);
    }

    table
}

/// Tab bar with the active tab bracketed
pub fn render_tab_bar(active: Category) -> String {
    Category::ALL
        .iter()
        .map(|c| {
            if *c == active {
                format!("[{} {}]", c.position(), c.label())
            } else {
                format!(" {} {} ", c.position(), c.label())
            }
        })
        .collect::<Vec<_>>()
        .join("│")
}

pub fn render_header() -> String {
    format!("{TITLE}\n{CAPTION}")
}

pub fn render_sort_line(key: SortKey, order: SortOrder) -> String {
    format!("Sort by: {key} ({order})")
}

/// Interpretation guide and data source
pub fn render_footer() -> String {
    let mut out = String::from("Quick interpretation:\n");
    for line in QUICK_INTERPRETATION {
        out.push_str("  • ");
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(DATA_SOURCE);
    out
}

pub fn render_summary(symbol: &str, summary: &CompanySummary) -> String {
    let mut out = format!("🤖 AI summary: {}\n\n", symbol.trim().to_uppercase());

    push_section(&mut out, "Overview", &summary.overview);
    if !summary.core_products.is_empty() {
        out.push_str("Core Products\n");
        for product in &summary.core_products {
            out.push_str(&format!("  • {product}\n"));
        }
        out.push('\n');
    }
    push_section(&mut out, "Vision", &summary.vision);
    push_section(&mut out, "Accomplishment", &summary.accomplishment);
    push_section(&mut out, "Why", &summary.why);

    out.trim_end().to_string()
}

/// Titled paragraph; blank bodies are skipped
fn push_section(out: &mut String, title: &str, body: &str) {
    let body = body.trim();
    if !body.is_empty() {
        out.push_str(&format!("{title}\n  {body}\n\n"));
    }
}
