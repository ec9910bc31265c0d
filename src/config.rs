//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.salesdash.toml` files.

use crate::cli::{Args, OutputFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".salesdash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Default request values.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report output path; defaults to `sales_report.md` or
    /// `sales_report.json` depending on the output format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Enable verbose logging by default (`--quiet` still wins).
    #[serde(default)]
    pub verbose: bool,
}

/// Where and how sales data is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV file or directory of CSV files.
    #[serde(default = "default_data_path")]
    pub path: String,

    /// `chrono` format of the `Date` column.
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// File extensions considered when `path` is a directory.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Skip malformed rows (logged) instead of failing the load.
    #[serde(default)]
    pub skip_invalid_rows: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            date_format: default_date_format(),
            extensions: default_extensions(),
            skip_invalid_rows: false,
        }
    }
}

fn default_data_path() -> String {
    "sales.csv".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["csv".to_string()]
}

/// Values used when the command line leaves a request field unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Product selector; `all` selects every product.
    #[serde(default = "default_product")]
    pub product: String,

    /// Metric key: `total_value` or `quantity`.
    #[serde(default = "default_metric")]
    pub metric: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            product: default_product(),
            metric: default_metric(),
        }
    }
}

fn default_product() -> String {
    crate::models::ALL_PRODUCTS.to_string()
}

fn default_metric() -> String {
    "total_value".to_string()
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Symbol prefixed to monetary amounts.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Rows in the grouped "Top Products" table (0 disables it).
    #[serde(default = "default_top_products")]
    pub top_products: usize,

    /// Include the per-product and per-date tables.
    #[serde(default = "default_true")]
    pub include_series: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            top_products: default_top_products(),
            include_series: true,
        }
    }
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_top_products() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.salesdash.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref data) = args.data {
            self.data.path = data.display().to_string();
        }
        if let Some(ref product) = args.product {
            self.defaults.product = product.clone();
        }
        if let Some(ref metric) = args.metric {
            self.defaults.metric = metric.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if let Some(ref format) = args.date_format {
            self.data.date_format = format.clone();
        }

        if args.skip_invalid_rows {
            self.data.skip_invalid_rows = true;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Where the report is written for the given output format.
    pub fn output_path(&self, format: OutputFormat) -> PathBuf {
        match self.general.output {
            Some(ref output) => PathBuf::from(output),
            None => PathBuf::from(format.default_output()),
        }
    }

    /// Effective log level: `--quiet` first, then `--verbose` or
    /// `[general] verbose`, else INFO.
    pub fn log_level(&self, args: &Args) -> tracing::Level {
        if !args.quiet && self.general.verbose {
            tracing::Level::DEBUG
        } else {
            args.log_level()
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
