//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// postercal - the club's monthly poster calendar, in your terminal
#[derive(Debug, Parser)]
#[command(name = "postercal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "POSTERCAL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    // --- Feed flags ---
    /// Upstream ICS feed URL
    #[arg(long, env = "CALENDAR_ICS_URL", global = true)]
    pub feed_url: Option<String>,

    /// Read the feed from a local .ics file instead of the network
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Feed request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the command to run; `show` with defaults when none is given.
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Show(ShowArgs::default()))
    }
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show a month of events (default)
    Show(ShowArgs),

    /// List every parsed event, undated ones included
    Events {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the details of one event
    Detail {
        /// Day of the event (YYYY-MM-DD)
        #[arg(value_parser = parse_day)]
        date: NaiveDate,

        /// Event title; the first event of the day when omitted or unknown
        title: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Run the feed proxy in the foreground
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Cache lifetime and advertised max-age, in seconds
        #[arg(long)]
        max_age: Option<u64>,

        /// Log in JSON lines
        #[arg(long)]
        json_logs: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options of the `show` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ShowArgs {
    /// Month to show (YYYY-MM); defaults to the current month
    #[arg(long, value_parser = parse_month)]
    pub month: Option<NaiveDate>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show a compact day grid instead of the agenda
    #[arg(long, conflicts_with = "json")]
    pub grid: bool,

    /// Maximum title length (truncated with ellipsis)
    #[arg(long)]
    pub max_title_length: Option<usize>,
}

/// Configuration actions.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| format!("invalid month '{}', expected YYYY-MM", value))
}

/// Parses a `YYYY-MM-DD` day key.
pub fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", value))
}
