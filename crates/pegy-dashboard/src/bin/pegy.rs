//! PEGY Ratio Dashboard CLI
//!
//! # Usage
//!
//! ```bash
//! # One-shot table of the Magnificent 7, most expensive first
//! cargo run --bin pegy -p pegy-dashboard -- --tab mags --sort abs --desc
//!
//! # Interactive session with AI summaries
//! export OPENAI_API_KEY="sk-..."
//! cargo run --bin pegy -p pegy-dashboard -- --interactive
//! ```

use clap::Parser;
use pegy_core::{SortKey, SortOrder, YieldBasis};
use pegy_dashboard::render::render_summary;
use pegy_dashboard::{Category, Command, DashboardConfig, DashboardSession, Reply, Styling};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pegy", version, about = "PEGY ratio dashboard")]
struct Args {
    /// Comma-separated tickers for the "User Defined" tab
    #[arg(long)]
    tickers: Option<String>,

    /// Tab to show: number, short name or label
    #[arg(long, default_value = "watchlist")]
    tab: String,

    /// Sort column, or "abs" for absolute PEGY
    #[arg(long, default_value = "abs")]
    sort: String,

    /// Sort descending
    #[arg(long)]
    desc: bool,

    /// Unit of the dividend term: fraction or percent
    #[arg(long)]
    yield_basis: Option<YieldBasis>,

    /// File listing the S&P 500 constituents
    #[arg(long)]
    snp500_file: Option<PathBuf>,

    /// Print the AI summary for this symbol
    #[arg(long)]
    summary: Option<String>,

    /// Disable colors
    #[arg(long)]
    no_color: bool,

    /// Start an interactive session
    #[arg(short, long)]
    interactive: bool,
}

fn build_config(args: &Args) -> pegy_dashboard::Result<DashboardConfig> {
    let mut builder = DashboardConfig::builder();
    if let Some(tickers) = &args.tickers {
        builder = builder.user_tickers(vec![tickers.clone()]);
    }
    if let Some(basis) = args.yield_basis {
        builder = builder.yield_basis(basis);
    }
    if let Some(path) = &args.snp500_file {
        builder = builder.snp500_file(path);
    }
    builder.with_env().build()
}

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                    📊 PEGY Ratio Dashboard                   ║
║                                                              ║
║  Commands:                                                   ║
║    /tab <n|name>          - Switch tab                       ║
║    /sort <col> [asc|desc] - Sort the table                   ║
║    /summary <SYM>         - AI company summary               ║
║    /help                  - Show help                        ║
║    /exit                  - Exit                             ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

async fn run_repl(session: &mut DashboardSession) -> anyhow::Result<()> {
    print_banner();
    println!("{}\n", session.render_active().await);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("pegy> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let command = match Command::parse(input) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("❌ {}\n", e);
                continue;
            }
        };

        match session.handle(command).await {
            Ok(Reply::Output(text)) => println!("{}\n", text),
            Ok(Reply::Exit) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => eprintln!("❌ {}\n", e),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pegy_utils::init_tracing("warn,pegy_dashboard=info");

    let args = Args::parse();
    let config = build_config(&args)?;

    let styling = if args.no_color {
        Styling::Never
    } else {
        Styling::Auto
    };
    let mut session = DashboardSession::from_config(&config).await?.with_styling(styling);

    let category: Category = args.tab.parse()?;
    let key: SortKey = args.sort.parse()?;
    let order = if args.desc {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    session.select(category);
    session.set_sort(key, order);

    if let Some(symbol) = &args.summary {
        let summary = session.summary(symbol).await?;
        println!("{}\n", render_summary(symbol, &summary));
        if !args.interactive {
            return Ok(());
        }
    }

    if args.interactive {
        run_repl(&mut session).await
    } else {
        println!("{}", session.render_active().await);
        Ok(())
    }
}
