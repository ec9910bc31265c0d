//! Report generation.
//!
//! Renders a [`ResultBundle`] as console KPI cards, a Markdown document or
//! JSON. All currency and number formatting lives here, not in the engine.

use super::format::{format_count, format_currency, format_number, format_optional_currency};
use crate::analysis::top_products;
use crate::config::ReportConfig;
use crate::models::{Metric, Request, ResultBundle};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;

/// Everything needed to render one report.
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport<'a> {
    /// The request that produced the result.
    pub request: &'a Request,
    /// The computed result.
    pub result: &'a ResultBundle,
}

impl<'a> SalesReport<'a> {
    pub fn new(request: &'a Request, result: &'a ResultBundle) -> Self {
        Self { request, result }
    }
}

/// KPI lines for the console.
pub fn kpi_lines(result: &ResultBundle, config: &ReportConfig) -> Vec<String> {
    let symbol = &config.currency_symbol;
    vec![
        format!("Total Revenue: {}", format_currency(result.total_revenue, symbol)),
        format!("Total Quantity Sold: {}", format_count(result.total_quantity)),
        format!(
            "Average Ticket: {}",
            format_optional_currency(result.average_ticket, symbol)
        ),
    ]
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SalesReport<'_>, config: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# Sales Dashboard\n\n");
    output.push_str(&generate_filters_section(report.request, report.result));
    output.push_str(&generate_kpi_section(report.result, config));

    if report.result.is_empty() {
        output.push_str("No sales records match the selected filters.\n\n");
    } else if config.include_series {
        output.push_str(&generate_product_section(report.result, config));
        output.push_str(&generate_top_products_section(report.result, config));
        output.push_str(&generate_time_series_section(report.result, config));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the applied filters section.
fn generate_filters_section(request: &Request, result: &ResultBundle) -> String {
    let mut section = String::new();

    section.push_str("## Filters\n\n");
    section.push_str(&format!("- **Product:** {}\n", request.product_filter));
    section.push_str(&format!(
        "- **Date Range:** {} to {}\n",
        request.start_date.format("%Y-%m-%d"),
        request.end_date.format("%Y-%m-%d")
    ));
    section.push_str(&format!("- **Metric:** {}\n", result.metric));
    section.push_str(&format!("- **Matching Records:** {}\n", result.record_count));
    section.push('\n');

    section
}

/// Generate the KPI table.
fn generate_kpi_section(result: &ResultBundle, config: &ReportConfig) -> String {
    let symbol = &config.currency_symbol;
    let mut section = String::new();

    section.push_str("## Key Figures\n\n");
    section.push_str("| Total Revenue | Total Quantity Sold | Average Ticket |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        format_currency(result.total_revenue, symbol),
        format_count(result.total_quantity),
        format_optional_currency(result.average_ticket, symbol)
    ));

    section
}

/// Generate the per-product table, one row per matching record.
fn generate_product_section(result: &ResultBundle, config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {} per Product\n\n", result.metric));
    section.push_str(&format!("| Product | {} |\n", result.metric));
    section.push_str("|:---|---:|\n");

    for point in &result.per_product_series {
        section.push_str(&format!(
            "| {} | {} |\n",
            point.product,
            format_metric(result.metric, point.value, config)
        ));
    }
    section.push('\n');

    section
}

/// Generate the grouped top-products table.
fn generate_top_products_section(result: &ResultBundle, config: &ReportConfig) -> String {
    if config.top_products == 0 {
        return String::new();
    }

    let top = top_products(&result.per_product_series, config.top_products);
    let mut section = String::new();

    section.push_str("### Top Products\n\n");
    section.push_str(&format!("| # | Product | {} |\n", result.metric));
    section.push_str("|:---:|:---|---:|\n");

    for (i, (product, value)) in top.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            i + 1,
            product,
            format_metric(result.metric, *value, config)
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-date time series table.
fn generate_time_series_section(result: &ResultBundle, config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {} Over Time\n\n", result.metric));
    section.push_str(&format!("| Date | {} |\n", result.metric));
    section.push_str("|:---|---:|\n");

    for point in &result.per_date_series {
        section.push_str(&format!(
            "| {} | {} |\n",
            point.date.format("%Y-%m-%d"),
            format_metric(result.metric, point.value, config)
        ));
    }
    section.push('\n');

    section
}

fn format_metric(metric: Metric, value: Decimal, config: &ReportConfig) -> String {
    match metric {
        Metric::TotalValue => format_currency(value, &config.currency_symbol),
        Metric::Quantity => format_number(value),
    }
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by SalesDash*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SalesReport<'_>) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DatePoint, ProductFilter, ProductPoint};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn create_test_request() -> Request {
        Request::new(ProductFilter::All, date("2024-01-01"), date("2024-01-02"), "total_value")
    }

    fn create_test_result() -> ResultBundle {
        ResultBundle {
            metric: Metric::TotalValue,
            record_count: 3,
            total_revenue: dec!(1535.0),
            total_quantity: 4,
            average_ticket: Some(dec!(511.6666666666666666666666667)),
            per_product_series: vec![
                ProductPoint { product: "Widget".to_string(), value: dec!(20.0) },
                ProductPoint { product: "Gadget".to_string(), value: dec!(15.0) },
                ProductPoint { product: "Gadget".to_string(), value: dec!(1500.0) },
            ],
            per_date_series: vec![
                DatePoint { date: date("2024-01-01"), value: dec!(20.0) },
                DatePoint { date: date("2024-01-02"), value: dec!(1515.0) },
            ],
        }
    }

    fn empty_result() -> ResultBundle {
        ResultBundle {
            metric: Metric::Quantity,
            record_count: 0,
            total_revenue: Decimal::ZERO,
            total_quantity: 0,
            average_ticket: None,
            per_product_series: Vec::new(),
            per_date_series: Vec::new(),
        }
    }

    #[test]
    fn test_kpi_lines() {
        let lines = kpi_lines(&create_test_result(), &ReportConfig::default());

        assert_eq!(lines[0], "Total Revenue: $1,535.00");
        assert_eq!(lines[1], "Total Quantity Sold: 4");
        assert_eq!(lines[2], "Average Ticket: $511.67");
    }

    #[test]
    fn test_kpi_lines_empty() {
        let lines = kpi_lines(&empty_result(), &ReportConfig::default());

        assert_eq!(lines[0], "Total Revenue: $0.00");
        assert_eq!(lines[2], "Average Ticket: n/a");
    }

    #[test]
    fn test_generate_markdown_report() {
        let request = create_test_request();
        let result = create_test_result();
        let markdown =
            generate_markdown_report(&SalesReport::new(&request, &result), &ReportConfig::default());

        assert!(markdown.contains("# Sales Dashboard"));
        assert!(markdown.contains("- **Product:** All Products"));
        assert!(markdown.contains("## Key Figures"));
        assert!(markdown.contains("## Total Value per Product"));
        assert!(markdown.contains("### Top Products"));
        assert!(markdown.contains("| 1 | Gadget | $1,515.00 |"));
        assert!(markdown.contains("## Total Value Over Time"));
        assert!(markdown.contains("| 2024-01-02 | $1,515.00 |"));
    }

    #[test]
    fn test_generate_markdown_report_empty() {
        let request = create_test_request();
        let result = empty_result();
        let markdown =
            generate_markdown_report(&SalesReport::new(&request, &result), &ReportConfig::default());

        assert!(markdown.contains("No sales records match"));
        assert!(!markdown.contains("Over Time"));
    }

    #[test]
    fn test_generate_markdown_without_series() {
        let request = create_test_request();
        let result = create_test_result();
        let config = ReportConfig {
            include_series: false,
            ..ReportConfig::default()
        };

        let markdown = generate_markdown_report(&SalesReport::new(&request, &result), &config);

        assert!(markdown.contains("## Key Figures"));
        assert!(!markdown.contains("per Product"));
    }

    #[test]
    fn test_generate_json_report() {
        let request = create_test_request();
        let result = empty_result();
        let json = generate_json_report(&SalesReport::new(&request, &result)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["request"]["product_filter"], "all");
        assert_eq!(value["request"]["start_date"], "2024-01-01");
        assert_eq!(value["result"]["metric"], "quantity");
        assert!(value["result"]["average_ticket"].is_null());
        assert!(value["result"]["per_date_series"].as_array().unwrap().is_empty());
    }
}
