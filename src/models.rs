//! Data models for the sales dashboard.
//!
//! This module contains the core data structures shared by the loader,
//! the aggregation engine and the report renderer.

use crate::error::EngineError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Textual form of the "all products" selector.
pub const ALL_PRODUCTS: &str = "all";

/// A single sales transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Calendar date of the sale.
    pub date: NaiveDate,
    /// Product identifier.
    pub product: String,
    /// Units sold.
    pub quantity: u64,
    /// Monetary value of the transaction.
    pub total_value: Decimal,
}

impl Record {
    pub fn new(date: NaiveDate, product: impl Into<String>, quantity: u64, total_value: Decimal) -> Self {
        Self {
            date,
            product: product.into(),
            quantity,
            total_value,
        }
    }

    /// Returns the value of the given metric for this record.
    pub fn metric_value(&self, metric: Metric) -> Decimal {
        match metric {
            Metric::Quantity => Decimal::from(self.quantity),
            Metric::TotalValue => self.total_value,
        }
    }
}

/// Read-only handle over the loaded sales records.
///
/// Loaded once at startup and passed by reference into every computation.
/// Records keep their load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct product identifiers in first-seen order.
    pub fn products(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.product.as_str())
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Earliest and latest record dates, or `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }
}

/// Numeric field that drives the per-product and per-date series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Quantity,
    TotalValue,
}

impl Metric {
    /// Human-readable label, matching the source column name.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Quantity => "Quantity",
            Metric::TotalValue => "Total Value",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Metric {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "quantity" => Ok(Metric::Quantity),
            "total_value" => Ok(Metric::TotalValue),
            _ => Err(EngineError::InvalidMetric(s.to_string())),
        }
    }
}

/// Product selector: every product, or exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ProductFilter {
    #[default]
    All,
    Product(String),
}

impl ProductFilter {
    pub fn matches(&self, product: &str) -> bool {
        match self {
            ProductFilter::All => true,
            ProductFilter::Product(p) => p == product,
        }
    }
}

impl From<&str> for ProductFilter {
    fn from(s: &str) -> Self {
        if s == ALL_PRODUCTS {
            ProductFilter::All
        } else {
            ProductFilter::Product(s.to_string())
        }
    }
}

impl From<String> for ProductFilter {
    fn from(s: String) -> Self {
        if s == ALL_PRODUCTS {
            ProductFilter::All
        } else {
            ProductFilter::Product(s)
        }
    }
}

impl From<ProductFilter> for String {
    fn from(filter: ProductFilter) -> Self {
        match filter {
            ProductFilter::All => ALL_PRODUCTS.to_string(),
            ProductFilter::Product(p) => p,
        }
    }
}

impl fmt::Display for ProductFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductFilter::All => write!(f, "All Products"),
            ProductFilter::Product(p) => write!(f, "{}", p),
        }
    }
}

/// A single aggregation request, built by the caller from user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Which products to include.
    pub product_filter: ProductFilter,
    /// Inclusive lower date bound.
    pub start_date: NaiveDate,
    /// Inclusive upper date bound.
    pub end_date: NaiveDate,
    /// Raw metric key; resolved and validated by the engine.
    pub metric: String,
}

impl Request {
    pub fn new(
        product_filter: impl Into<ProductFilter>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        metric: impl Into<String>,
    ) -> Self {
        Self {
            product_filter: product_filter.into(),
            start_date,
            end_date,
            metric: metric.into(),
        }
    }
}

/// One bar of the per-product chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPoint {
    pub product: String,
    pub value: Decimal,
}

/// One point of the per-date time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Everything derived from one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBundle {
    /// Metric that drove both series.
    pub metric: Metric,
    /// Number of records in the filtered set.
    pub record_count: usize,
    /// Sum of `total_value` over the filtered set.
    pub total_revenue: Decimal,
    /// Sum of `quantity` over the filtered set.
    pub total_quantity: u64,
    /// Mean `total_value`; `None` when the filtered set is empty.
    pub average_ticket: Option<Decimal>,
    /// One entry per filtered record, in dataset order.
    pub per_product_series: Vec<ProductPoint>,
    /// Metric summed per date, ascending by date.
    pub per_date_series: Vec<DatePoint>,
}

impl ResultBundle {
    /// Whether the filtered set was empty.
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
