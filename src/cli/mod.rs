use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "tadawul")]
#[command(version, about = "Saudi Tadawul stock portfolio tracker")]
#[command(
    long_about = "Track your Tadawul stock holdings across brokers with live prices, \
                  consolidated positions, Excel import/export, and RSI-based signals."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage recorded transactions
    Holdings {
        #[command(subcommand)]
        action: HoldingsCommands,
    },

    /// Portfolio views
    Portfolio {
        #[command(subcommand)]
        action: PortfolioCommands,
    },

    /// Import holdings from an Excel workbook
    Import {
        /// Path to the .xlsx file
        file: String,

        /// Preview only, don't save to the store
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Export current positions to an Excel workbook
    Export {
        /// Destination .xlsx path
        file: String,
    },

    /// Write a starter import template
    Template {
        /// Destination .xlsx path
        file: String,
    },

    /// Price data management
    Prices {
        #[command(subcommand)]
        action: PriceCommands,
    },

    /// RSI buy/sell signals for held (or named) stocks
    Signals {
        /// Evaluate a single symbol instead of the whole portfolio
        symbol: Option<String>,
    },

    /// Tadawul reference database
    Stocks {
        #[command(subcommand)]
        action: StockCommands,
    },
}

#[derive(Subcommand)]
pub enum HoldingsCommands {
    /// Record a buy: `holdings add 2222 100 35.50 --broker alrajhi`
    Add {
        /// Tadawul symbol, e.g. 2222
        symbol: String,

        /// Number of shares
        #[arg(allow_negative_numbers = true)]
        quantity: String,

        /// Price paid per share, in riyals
        #[arg(allow_negative_numbers = true)]
        price: String,

        /// Broker holding the shares
        #[arg(short, long)]
        broker: Option<String>,

        /// Purchase date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List recorded transactions
    List,

    /// Remove a transaction by id
    Remove { id: u64 },
}

#[derive(Subcommand)]
pub enum PortfolioCommands {
    /// Consolidate, price, and display the portfolio
    Show {
        /// Use cached prices only, never the network
        #[arg(long)]
        offline: bool,
    },
}

#[derive(Subcommand)]
pub enum PriceCommands {
    /// Refresh cached prices for every held symbol
    Update,

    /// Show the cached prices and their age
    Show,
}

#[derive(Subcommand)]
pub enum StockCommands {
    /// Search by symbol, company name, or sector
    Search { query: String },

    /// List companies grouped by sector
    Sectors,
}
