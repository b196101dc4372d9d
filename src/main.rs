mod commands;
mod render;
mod utils;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use schoolcal_core::{YearMonth, month_index};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schoolcal")]
#[command(about = "Browse the school calendar: monthly grid, event list and day details")]
struct Cli {
    /// School API base URL (overrides config and SCHOOLCAL_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Less log output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a month grid with event counts and the month's event list
    Month {
        /// Month to show ("2024-07" or "July 2024"); defaults to the current month
        month: Option<String>,

        /// Print the loaded month as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the events of a single day
    Day {
        /// Date (YYYY-MM-DD)
        date: String,
    },
    /// Expand raw event records from a JSON file without contacting the API
    Expand {
        /// JSON file holding an array of event records
        #[arg(short, long)]
        file: PathBuf,

        /// Month the records belong to ("July", "2024-07" or "July 2024")
        #[arg(short, long)]
        month: String,

        /// Year, when --month is only a month name; defaults to the current year
        #[arg(short, long)]
        year: Option<i32>,

        /// Print the expanded events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Page through months interactively
    Browse {
        /// Month to start at; defaults to the current month
        month: Option<String>,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show where the config lives and the effective settings
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    match cli.command {
        Commands::Month { month, json } => {
            let month = resolve_month(month.as_deref())?;
            commands::month::run(cli.api_url, month, json).await
        }
        Commands::Day { date } => {
            let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .map_err(|_| anyhow!("Invalid date '{}'. Expected YYYY-MM-DD", date))?;
            commands::day::run(cli.api_url, date).await
        }
        Commands::Expand {
            file,
            month,
            year,
            json,
        } => {
            let month = parse_month_with_year(&month, year)?;
            let zone = commands::load_config(cli.api_url)?.date_zone()?;
            commands::expand::run(&file, month, zone, json)
        }
        Commands::Browse { month } => {
            let month = resolve_month(month.as_deref())?;
            commands::browse::run(cli.api_url, month).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => commands::config::init(force),
            ConfigAction::Show => commands::config::show(cli.api_url),
        },
    }
}

fn init_tracing(verbose: u8, quiet: u8) -> Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The given month, or the current one.
fn resolve_month(arg: Option<&str>) -> Result<YearMonth> {
    match arg {
        Some(text) => parse_month_with_year(text, None),
        None => Ok(YearMonth::from_date(today())?),
    }
}

/// Accepts "2024-07", "July 2024", or a bare month name paired with `year`
/// (current year when absent).
fn parse_month_with_year(text: &str, year: Option<i32>) -> Result<YearMonth> {
    if let Ok(month) = text.parse::<YearMonth>() {
        return Ok(month);
    }

    let index = month_index(text).map_err(|_| {
        anyhow!(
            "Invalid month '{}'. Use a month name (\"July\"), \"2024-07\" or \"July 2024\"",
            text
        )
    })?;
    let year = year.unwrap_or_else(|| today().year());
    Ok(YearMonth::new(year, index)?)
}
