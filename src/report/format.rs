//! Number formatting for display.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format a monetary amount as `$1,234.56`.
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}{}", sign, symbol, group_decimal(&rounded.abs().to_string()))
}

/// Format an optional amount, rendering `None` as `n/a`.
pub fn format_optional_currency(amount: Option<Decimal>, symbol: &str) -> String {
    match amount {
        Some(value) => format_currency(value, symbol),
        None => "n/a".to_string(),
    }
}

/// Format a decimal with thousands separators and no trailing zeros.
pub fn format_number(value: Decimal) -> String {
    let normalized = value.normalize();
    let sign = if normalized.is_sign_negative() && !normalized.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}", sign, group_decimal(&normalized.abs().to_string()))
}

/// Format an integer with thousands separators.
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

fn group_decimal(text: &str) -> String {
    match text.split_once('.') {
        Some((int_part, frac)) => format!("{}.{}", group_thousands(int_part), frac),
        None => group_thousands(text),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
