//! Record filtering and grouping.
//!
//! Small pure helpers shared by the engine and the report renderer.

use crate::error::EngineError;
use crate::models::{DatePoint, Metric, ProductFilter, ProductPoint, Record};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Records dated within `[start, end]` that match the product filter,
/// in dataset order.
pub fn filter_records<'a>(
    records: &'a [Record],
    product_filter: &ProductFilter,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| start <= r.date && r.date <= end)
        .filter(|r| product_filter.matches(&r.product))
        .collect()
}

/// Checked `Decimal` sum.
pub fn sum_decimal(
    values: impl IntoIterator<Item = Decimal>,
    what: &'static str,
) -> Result<Decimal, EngineError> {
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).ok_or(EngineError::Overflow(what))
    })
}

/// Checked `u64` sum.
pub fn sum_count(values: impl IntoIterator<Item = u64>, what: &'static str) -> Result<u64, EngineError> {
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v).ok_or(EngineError::Overflow(what)))
}

/// Sum of the metric per date, ascending by date.
pub fn sum_by_date(records: &[&Record], metric: Metric) -> Result<Vec<DatePoint>, EngineError> {
    let mut grouped: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for record in records {
        let total = grouped.entry(record.date).or_default();
        *total = total
            .checked_add(record.metric_value(metric))
            .ok_or(EngineError::Overflow("per-date series"))?;
    }

    Ok(grouped
        .into_iter()
        .map(|(date, value)| DatePoint { date, value })
        .collect())
}

/// One point per record, keeping record order.
pub fn per_record_points(records: &[&Record], metric: Metric) -> Vec<ProductPoint> {
    records
        .iter()
        .map(|r| ProductPoint {
            product: r.product.clone(),
            value: r.metric_value(metric),
        })
        .collect()
}

/// Total value per product, highest first.
///
/// Ties are broken by product name so the output is stable. Totals saturate
/// at `Decimal::MAX`.
pub fn product_totals(points: &[ProductPoint]) -> Vec<(String, Decimal)> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();

    for point in points {
        let total = totals.entry(point.product.as_str()).or_default();
        *total = total.saturating_add(point.value);
    }

    let mut totals: Vec<_> = totals
        .into_iter()
        .map(|(product, value)| (product.to_string(), value))
        .collect();

    totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    totals
}

/// Top `n` products by grouped total.
pub fn top_products(points: &[ProductPoint], n: usize) -> Vec<(String, Decimal)> {
    let mut totals = product_totals(points);
    totals.truncate(n);
    totals
}
