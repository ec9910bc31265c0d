//! CSV row parsing.
//!
//! Expected columns are `Date`, `Product`, `Quantity` and `Total Value`, in
//! any order. Extra columns are ignored.

use super::LoadConfig;
use crate::error::{LoadError, RowError};
use crate::models::Record;
use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

const DATE_COLUMN: &str = "Date";
const PRODUCT_COLUMN: &str = "Product";
const QUANTITY_COLUMN: &str = "Quantity";
const TOTAL_VALUE_COLUMN: &str = "Total Value";

/// Records parsed from one file.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub records: Vec<Record>,
    pub rows_read: usize,
    pub rows_skipped: usize,
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    product: usize,
    quantity: usize,
    total_value: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord, path: &Path) -> Result<Self, LoadError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
                .ok_or_else(|| LoadError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })
        };

        Ok(Self {
            date: find(DATE_COLUMN)?,
            product: find(PRODUCT_COLUMN)?,
            quantity: find(QUANTITY_COLUMN)?,
            total_value: find(TOTAL_VALUE_COLUMN)?,
        })
    }
}

/// Parse one CSV file according to `config`.
pub fn parse_file(path: &Path, config: &LoadConfig) -> Result<ParseOutcome, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let columns = Columns::resolve(&headers, path)?;

    let mut outcome = ParseOutcome::default();

    for (idx, result) in reader.records().enumerate() {
        // Line 1 is the header
        let line = idx as u64 + 2;
        outcome.rows_read += 1;

        let parsed = result
            .map_err(|e| RowError::Malformed(e.to_string()))
            .and_then(|row| parse_row(&row, columns, &config.date_format));

        match parsed {
            Ok(record) => outcome.records.push(record),
            Err(err) if config.skip_invalid_rows => {
                warn!("Skipping {}:{}: {}", path.display(), line, err);
                outcome.rows_skipped += 1;
            }
            Err(source) => {
                return Err(LoadError::InvalidRow {
                    path: path.to_path_buf(),
                    line,
                    source,
                });
            }
        }
    }

    Ok(outcome)
}

fn parse_row(row: &StringRecord, columns: Columns, date_format: &str) -> Result<Record, RowError> {
    let field = |idx: usize, name: &'static str| {
        row.get(idx)
            .filter(|v| !v.is_empty())
            .ok_or(RowError::MissingValue(name))
    };

    let date_text = field(columns.date, DATE_COLUMN)?;
    let date = NaiveDate::parse_from_str(date_text, date_format).map_err(|_| RowError::InvalidDate {
        text: date_text.to_string(),
        format: date_format.to_string(),
    })?;

    let product = field(columns.product, PRODUCT_COLUMN)?;

    let quantity_text = field(columns.quantity, QUANTITY_COLUMN)?;
    let quantity = parse_quantity(quantity_text)?;

    let value_text = field(columns.total_value, TOTAL_VALUE_COLUMN)?;
    let total_value = Decimal::from_str(value_text).map_err(|_| RowError::InvalidNumber {
        column: TOTAL_VALUE_COLUMN,
        text: value_text.to_string(),
    })?;
    if total_value.is_sign_negative() && !total_value.is_zero() {
        return Err(RowError::NegativeValue {
            column: TOTAL_VALUE_COLUMN,
            text: value_text.to_string(),
        });
    }

    Ok(Record::new(date, product, quantity, total_value))
}

fn parse_quantity(text: &str) -> Result<u64, RowError> {
    if let Ok(quantity) = text.parse::<u64>() {
        return Ok(quantity);
    }

    match text.parse::<i64>() {
        Ok(n) if n < 0 => Err(RowError::NegativeValue {
            column: QUANTITY_COLUMN,
            text: text.to_string(),
        }),
        _ => Err(RowError::InvalidNumber {
            column: QUANTITY_COLUMN,
            text: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(body: &str) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sales.csv");
        fs::write(&path, body).unwrap();
        (temp, path)
    }

    #[test]
    fn test_parse_reordered_columns_and_whitespace() {
        let (_temp, path) = write_csv(
            "Product , Total Value, Date ,Quantity,Region\n\
             Widget , 20.50 , 2024-01-01 , 2 ,North\n",
        );

        let outcome = parse_file(&path, &LoadConfig::default()).unwrap();

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.product, "Widget");
        assert_eq!(record.quantity, 2);
        assert_eq!(record.total_value, dec!(20.50));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_missing_column() {
        let (_temp, path) = write_csv("Date,Product,Quantity\n2024-01-01,Widget,2\n");

        let err = parse_file(&path, &LoadConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            LoadError::MissingColumn { column: "Total Value", .. }
        ));
    }

    #[test]
    fn test_invalid_row_strict() {
        let (_temp, path) = write_csv(
            "Date,Product,Quantity,Total Value\n\
             2024-01-01,Widget,2,20.0\n\
             not-a-date,Gadget,1,15.0\n",
        );

        let err = parse_file(&path, &LoadConfig::default()).unwrap_err();

        match err {
            LoadError::InvalidRow { line, source, .. } => {
                assert_eq!(line, 3);
                assert_eq!(
                    source,
                    RowError::InvalidDate {
                        text: "not-a-date".to_string(),
                        format: "%Y-%m-%d".to_string(),
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_row_error_kinds() {
        let columns = Columns {
            date: 0,
            product: 1,
            quantity: 2,
            total_value: 3,
        };
        let parse = |fields: &[&str]| parse_row(&StringRecord::from(fields.to_vec()), columns, "%Y-%m-%d");

        assert_eq!(
            parse(&["2024-01-01", "", "1", "1.0"]),
            Err(RowError::MissingValue("Product"))
        );
        assert_eq!(
            parse(&["2024-01-01", "Widget", "-2", "1.0"]),
            Err(RowError::NegativeValue {
                column: "Quantity",
                text: "-2".to_string(),
            })
        );
        assert_eq!(
            parse(&["2024-01-01", "Widget", "two", "1.0"]),
            Err(RowError::InvalidNumber {
                column: "Quantity",
                text: "two".to_string(),
            })
        );
        assert_eq!(
            parse(&["2024-01-01", "Widget", "2", "abc"]),
            Err(RowError::InvalidNumber {
                column: "Total Value",
                text: "abc".to_string(),
            })
        );
        assert_eq!(
            parse(&["2024-01-01", "Widget", "2", "-0.01"]),
            Err(RowError::NegativeValue {
                column: "Total Value",
                text: "-0.01".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_rows_skipped() {
        let (_temp, path) = write_csv(
            "Date,Product,Quantity,Total Value\n\
             2024-01-01,Widget,2,20.0\n\
             2024-01-02,Gadget,-1,15.0\n\
             2024-01-03,Gadget,1,-15.0\n\
             2024-01-04,,1,15.0\n\
             2024-01-05,Gadget,1,15.0\n",
        );
        let config = LoadConfig {
            skip_invalid_rows: true,
            ..LoadConfig::default()
        };

        let outcome = parse_file(&path, &config).unwrap();

        assert_eq!(outcome.rows_read, 5);
        assert_eq!(outcome.rows_skipped, 3);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn test_custom_date_format() {
        let (_temp, path) = write_csv("Date,Product,Quantity,Total Value\n01/31/2024,Widget,1,9.99\n");
        let config = LoadConfig {
            date_format: "%m/%d/%Y".to_string(),
            ..LoadConfig::default()
        };

        let outcome = parse_file(&path, &config).unwrap();

        assert_eq!(
            outcome.records[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
    }
}
