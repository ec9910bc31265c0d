//! The filter-and-aggregate engine.
//!
//! [`compute`] is a pure function: it reads the dataset, never mutates it,
//! and performs no I/O, so it can be called concurrently against one shared
//! `&Dataset`.

use super::aggregator::{filter_records, per_record_points, sum_by_date, sum_count, sum_decimal};
use crate::error::EngineError;
use crate::models::{Dataset, Metric, Request, ResultBundle};
use rust_decimal::Decimal;
use tracing::debug;

/// Compute KPIs and chart series for a single request.
///
/// An empty filtered set is not an error: the totals are zero, the average
/// ticket is `None`, and both series are empty. Totals that do not fit the
/// numeric types fail with [`EngineError::Overflow`].
pub fn compute(dataset: &Dataset, request: &Request) -> Result<ResultBundle, EngineError> {
    let metric: Metric = request.metric.parse()?;

    if request.start_date > request.end_date {
        return Err(EngineError::InvalidDateRange {
            start: request.start_date,
            end: request.end_date,
        });
    }

    let filtered = filter_records(
        dataset.records(),
        &request.product_filter,
        request.start_date,
        request.end_date,
    );

    debug!(
        "Filtered {} of {} records (product: {}, {}..={})",
        filtered.len(),
        dataset.len(),
        request.product_filter,
        request.start_date,
        request.end_date
    );

    let total_revenue = sum_decimal(filtered.iter().map(|r| r.total_value), "total revenue")?;
    let total_quantity = sum_count(filtered.iter().map(|r| r.quantity), "total quantity")?;

    let average_ticket = if filtered.is_empty() {
        None
    } else {
        Some(total_revenue / Decimal::from(filtered.len()))
    };

    Ok(ResultBundle {
        metric,
        record_count: filtered.len(),
        total_revenue,
        total_quantity,
        average_ticket,
        per_product_series: per_record_points(&filtered, metric),
        per_date_series: sum_by_date(&filtered, metric)?,
    })
}
