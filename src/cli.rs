//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// SalesDash - sales KPIs and chart data from CSV records
///
/// Filters sales records by product and date range, then reports total
/// revenue, quantity sold, average ticket, a per-product breakdown and a
/// per-date time series.
///
/// Examples:
///   salesdash --data sales.csv
///   salesdash --data sales.csv --product Widget --metric quantity
///   salesdash --data data/ --start 2024-01-01 --end 2024-03-31 --format json
///   salesdash --data sales.csv --list-products
///   salesdash --init-config
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// CSV file or directory of CSV files to load
    ///
    /// Defaults to the `[data] path` setting, or sales.csv.
    #[arg(short, long, value_name = "PATH", env = "SALESDASH_DATA")]
    pub data: Option<PathBuf>,

    /// Product to report on, or "all"
    #[arg(short, long, value_name = "NAME")]
    pub product: Option<String>,

    /// First day of the range (inclusive, YYYY-MM-DD)
    ///
    /// Defaults to the earliest date in the dataset.
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last day of the range (inclusive, YYYY-MM-DD)
    ///
    /// Defaults to the latest date in the dataset.
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Metric driving the chart series: total_value or quantity
    #[arg(short, long, value_name = "KEY")]
    pub metric: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .salesdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// `chrono` format of the Date column (e.g. %d/%m/%Y)
    #[arg(long, value_name = "FORMAT")]
    pub date_format: Option<String>,

    /// Skip malformed CSV rows instead of failing
    #[arg(long)]
    pub skip_invalid_rows: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the products and date range found in the data, then exit
    #[arg(long)]
    pub list_products: bool,

    /// Exit with code 2 when no records match the filters
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Generate a default .salesdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Report file name used when neither `--output` nor the config sets one.
    pub fn default_output(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "sales_report.md",
            OutputFormat::Json => "sales_report.json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref product) = self.product {
            if product.trim().is_empty() {
                return Err("Product must not be empty (use \"all\" for every product)".to_string());
            }
        }

        if let Some(ref data) = self.data {
            if !data.exists() {
                return Err(format!("Data path does not exist: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on command-line verbosity flags.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
