//! SalesDash - sales KPIs and chart data from CSV records
//!
//! A CLI tool that loads sales records, filters them by product and
//! date range, and reports KPIs plus per-product and per-date series.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad config, load failure, invalid request, etc.)
//!   2 - No records matched the filters and --fail-on-empty was set

mod analysis;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod report;

use anyhow::{bail, Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use loader::{DatasetLoader, LoadConfig};
use models::{Dataset, ProductFilter, Request};
use report::SalesReport;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config comes first so `[general] verbose` can raise the log level
    let (config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(config.log_level(&args));

    info!("SalesDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    match run(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .salesdash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE_NAME);
    println!("   Edit it to set the data path, default filters and report options.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load, compute and render. Returns the exit code (0 or 2).
fn run(args: Args, mut config: Config) -> Result<i32> {
    let start_time = Instant::now();

    config.merge_with_args(&args);

    // Step 1: Load the dataset once; it is read-only from here on
    let data_path = PathBuf::from(&config.data.path);
    let mut load_config = LoadConfig::from(&config.data);
    load_config.show_progress = !args.quiet;

    let loaded = DatasetLoader::new(load_config)
        .load(&data_path)
        .with_context(|| format!("Failed to load sales data from {}", data_path.display()))?;

    info!(
        "Loaded {} records from {} file(s)",
        loaded.dataset.len(),
        loaded.files_read
    );
    if loaded.rows_skipped > 0 {
        warn!(
            "Skipped {} of {} rows with invalid data",
            loaded.rows_skipped, loaded.rows_read
        );
    }

    let dataset = loaded.dataset;
    if dataset.is_empty() {
        warn!("No sales records found in {}", data_path.display());
    }

    if args.list_products {
        print_dataset_overview(&dataset);
        return Ok(0);
    }

    // Step 2: Build the request from flags, config defaults and data bounds
    let request = build_request(&args, &config, &dataset)?;
    debug!("Request: {:?}", request);

    // Step 3: Compute
    let result = analysis::compute(&dataset, &request)?;

    // Step 4: Render
    let sales_report = SalesReport::new(&request, &result);
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&sales_report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&sales_report, &config.report),
    };

    let output_path = config.output_path(args.format);
    report::write_report(&output, &output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if !args.quiet {
        println!("\n📊 Sales Summary ({}):", request.product_filter);
        println!("   {} to {}", request.start_date, request.end_date);
        for line in report::kpi_lines(&result, &config.report) {
            println!("   {}", line);
        }
        println!("   Matching records: {}", result.record_count);
        println!("   Duration: {:.3}s", start_time.elapsed().as_secs_f64());
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    if args.fail_on_empty && result.is_empty() {
        eprintln!("\n⛔ No records matched the selected filters (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Resolve every request field, falling back to config and then the data.
fn build_request(args: &Args, config: &Config, dataset: &Dataset) -> Result<Request> {
    let bounds = dataset.date_bounds();

    let (start_date, end_date) = match (args.start, args.end, bounds) {
        (Some(start), Some(end), _) => (start, end),
        (start, end, Some((min, max))) => (start.unwrap_or(min), end.unwrap_or(max)),
        (_, _, None) => bail!("Dataset is empty; pass both --start and --end"),
    };

    let product_filter = ProductFilter::from(config.defaults.product.as_str());
    if let ProductFilter::Product(ref name) = product_filter {
        if !dataset.products().contains(&name.as_str()) {
            warn!("Product '{}' does not appear in the data", name);
        }
    }

    Ok(Request::new(
        product_filter,
        start_date,
        end_date,
        config.defaults.metric.clone(),
    ))
}

/// Handle --list-products: print the selectable products and date range.
fn print_dataset_overview(dataset: &Dataset) {
    let products = dataset.products();

    println!("\n📦 Products ({}):", products.len());
    for product in &products {
        println!("   - {}", product);
    }

    match dataset.date_bounds() {
        Some((min, max)) => println!("\n📅 Date range: {} to {}", min, max),
        None => println!("\n📅 No records loaded."),
    }
}

/// Where the configuration came from, reported once logging is up.
#[derive(Debug)]
enum ConfigSource {
    Explicit(PathBuf),
    Default,
    Builtin,
    Unreadable(String),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::Default => info!("Loaded default config from {}", config::CONFIG_FILE_NAME),
            ConfigSource::Builtin => debug!("No config file found, using defaults"),
            ConfigSource::Unreadable(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` must load; a broken default file falls back to
/// the built-in settings.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::Default)),
        Ok(None) => Ok((Config::default(), ConfigSource::Builtin)),
        Err(e) => Ok((Config::default(), ConfigSource::Unreadable(format!("{:#}", e)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use error::EngineError;
    use models::Record;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Record::new(date("2024-01-05"), "Widget", 2, dec!(20.0)),
            Record::new(date("2024-01-02"), "Gadget", 1, dec!(15.0)),
        ])
    }

    #[test]
    fn test_build_request_defaults_to_data_bounds() {
        let request = build_request(&Args::default(), &Config::default(), &dataset()).unwrap();

        assert_eq!(request.product_filter, ProductFilter::All);
        assert_eq!(request.start_date, date("2024-01-02"));
        assert_eq!(request.end_date, date("2024-01-05"));
        assert_eq!(request.metric, "total_value");
    }

    #[test]
    fn test_build_request_uses_args() {
        let args = Args {
            start: Some(date("2024-01-03")),
            product: Some("Widget".to_string()),
            metric: Some("quantity".to_string()),
            ..Args::default()
        };
        let mut config = Config::default();
        config.merge_with_args(&args);

        let request = build_request(&args, &config, &dataset()).unwrap();

        assert_eq!(request.product_filter, ProductFilter::from("Widget"));
        assert_eq!(request.start_date, date("2024-01-03"));
        assert_eq!(request.end_date, date("2024-01-05"));
        assert_eq!(request.metric, "quantity");
    }

    #[test]
    fn test_build_request_empty_dataset_needs_range() {
        assert!(build_request(&Args::default(), &Config::default(), &Dataset::default()).is_err());

        let args = Args {
            start: Some(date("2024-01-01")),
            end: Some(date("2024-01-31")),
            ..Args::default()
        };
        assert!(build_request(&args, &Config::default(), &Dataset::default()).is_ok());
    }

    #[test]
    fn test_fixture_end_to_end() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/sales.csv");
        let loaded = DatasetLoader::new(LoadConfig::default()).load(&path).unwrap();

        let request = Request::new(
            ProductFilter::All,
            date("2024-01-01"),
            date("2024-01-31"),
            "total_value",
        );
        let result = analysis::compute(&loaded.dataset, &request).unwrap();

        assert_eq!(result.record_count, loaded.dataset.len() - 1);
        assert!(result.per_date_series.windows(2).all(|w| w[0].date < w[1].date));
    }

    fn write_sales_csv(dir: &Path) -> PathBuf {
        let path = dir.join("sales.csv");
        std::fs::write(
            &path,
            "Date,Product,Quantity,Total Value\n\
             2024-01-02,Widget,2,20.00\n\
             2024-01-03,Gadget,1,15.50\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_run_writes_report_and_exits_zero() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("report.json");
        let args = Args {
            data: Some(write_sales_csv(temp.path())),
            output: Some(output.clone()),
            format: OutputFormat::Json,
            quiet: true,
            fail_on_empty: true,
            ..Args::default()
        };

        assert_eq!(run(args, Config::default()).unwrap(), 0);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["result"]["record_count"], 2);
    }

    #[test]
    fn test_run_fail_on_empty_exits_two() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("report.md");
        let args = Args {
            data: Some(write_sales_csv(temp.path())),
            start: Some(date("2023-06-01")),
            end: Some(date("2023-06-30")),
            output: Some(output.clone()),
            quiet: true,
            fail_on_empty: true,
            ..Args::default()
        };

        assert_eq!(run(args.clone(), Config::default()).unwrap(), 2);
        assert!(output.exists());

        let lenient = Args {
            fail_on_empty: false,
            ..args
        };
        assert_eq!(run(lenient, Config::default()).unwrap(), 0);
    }

    #[test]
    fn test_run_rejects_unknown_metric_from_config_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(config::CONFIG_FILE_NAME),
            "[defaults]\nmetric = \"unknown_field\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(temp.path()).unwrap().unwrap();
        let output = temp.path().join("report.md");
        let args = Args {
            data: Some(write_sales_csv(temp.path())),
            output: Some(output.clone()),
            quiet: true,
            ..Args::default()
        };

        let err = run(args, config).unwrap_err();

        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::InvalidMetric("unknown_field".to_string()))
        );
        assert!(!output.exists());
    }

    #[test]
    fn test_load_config_explicit_path_must_parse() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.toml");
        std::fs::write(&path, "[general\n").unwrap();
        let args = Args {
            config: Some(path),
            ..Args::default()
        };

        assert!(load_config(&args).is_err());
    }
}
