use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use sentinel::core::log::init_logging;
use sentinel::core::quote::HistoryPeriod;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for sentinel::AppCommand {
    fn from(cmd: Commands) -> sentinel::AppCommand {
        match cmd {
            Commands::Quote { symbols } => sentinel::AppCommand::Quote { symbols },
            Commands::History {
                symbol,
                period,
                rows,
            } => sentinel::AppCommand::History {
                symbol,
                period,
                rows,
            },
            Commands::News { symbol, limit } => sentinel::AppCommand::News { symbol, limit },
            Commands::Watch {
                symbol,
                interval,
                count,
            } => sentinel::AppCommand::Watch {
                symbol,
                interval_secs: interval,
                count: count.map(|n| n as usize),
            },
            Commands::Fundamentals { symbol } => sentinel::AppCommand::Fundamentals { symbol },
            Commands::Boardroom { symbol } => sentinel::AppCommand::Boardroom { symbol },
            Commands::Consensus => sentinel::AppCommand::Consensus,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show live quotes for one or more symbols
    Quote {
        /// Ticker symbols; defaults to the configured symbol
        symbols: Vec<String>,
    },
    /// Show daily history with derived statistics
    History {
        symbol: Option<String>,
        /// One of 1mo, 3mo, 6mo, 1y, 2y, 5y, max
        #[arg(short, long, default_value_t = HistoryPeriod::OneYear)]
        period: HistoryPeriod,
        /// Number of most recent bars to list
        #[arg(short, long, default_value_t = 10)]
        rows: usize,
    },
    /// Show recent headlines
    News {
        symbol: Option<String>,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Refresh a quote on a fixed interval until interrupted
    Watch {
        symbol: Option<String>,
        /// Seconds between refreshes; defaults to the configured interval
        #[arg(short, long)]
        interval: Option<u64>,
        /// Stop after this many updates
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
    },
    /// Company profile and valuation figures
    Fundamentals { symbol: Option<String> },
    /// One-month analyst debate for a symbol
    Boardroom { symbol: Option<String> },
    /// Scenario consensus over the configured analyst panel
    Consensus,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => sentinel::cli::setup::setup(),
        Some(cmd) => sentinel::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
