use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::query::FilterQuery;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Dashboard queries over usage events loaded from CSV exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "usage-dashboard",
    about = "Dashboard queries over usage events loaded from CSV exports",
    version
)]
pub struct Settings {
    /// Directory holding the source CSV files
    #[arg(long, env = "DATA_PATH", default_value = "/app/data", global = true)]
    pub data_path: PathBuf,

    /// Logging level
    #[arg(
        long,
        env = "LOG_LEVEL",
        default_value = "INFO",
        value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"],
        global = true
    )]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Operation to run against the loaded snapshot.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the dashboard summary as JSON
    Summary,
    /// Print one page of matching events as JSON
    Search(FilterArgs),
    /// Write matching events to a CSV or JSON file
    Export(ExportArgs),
    /// Print service information as JSON
    Health,
}

/// Filter flags shared by `search` and `export`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Earliest creation date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub start_date: Option<String>,

    /// Latest creation date (YYYY-MM-DD), inclusive through 23:59:59
    #[arg(long)]
    pub end_date: Option<String>,

    /// Comma-separated company ids
    #[arg(long, value_delimiter = ',')]
    pub company_ids: Vec<String>,

    /// Comma-separated event types
    #[arg(long, value_delimiter = ',')]
    pub event_types: Vec<String>,

    /// Case-insensitive text search over content, attribute, value and company
    #[arg(long)]
    pub search: Option<String>,

    /// Page size (defaults to 50)
    #[arg(long, allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Number of matches to skip
    #[arg(long, allow_negative_numbers = true)]
    pub offset: Option<i64>,
}

/// Flags for the `export` subcommand.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ExportArgs {
    /// Output format: csv or json
    #[arg(long, default_value = "csv")]
    pub format: String,

    /// Directory the export file is written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and apply `--debug`.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from_args(args: Vec<OsString>) -> Self {
        let mut settings = Settings::parse_from(args);

        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<FilterArgs> for FilterQuery {
    fn from(args: FilterArgs) -> Self {
        FilterQuery {
            start_date: args.start_date,
            end_date: args.end_date,
            company_ids: args.company_ids,
            event_types: args.event_types,
            search_text: args.search,
            limit: args.limit,
            offset: args.offset,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
