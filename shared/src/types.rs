//! Common types and display helpers used across the dashboard

use rust_decimal::{Decimal, RoundingStrategy};

/// Fraction digits shown for money in summaries and prompts
pub const AMOUNT_DISPLAY_DECIMALS: u32 = 2;

/// Format a money amount with thousands separators, e.g. `1234567.5` becomes
/// `1,234,567.5`. Trailing fraction zeros are dropped.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(AMOUNT_DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    if rounded.is_zero() {
        return "0".to_string();
    }

    let text = rounded.abs().to_string();
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut formatted = String::with_capacity(text.len() + text.len() / 3 + 1);
    if rounded.is_sign_negative() {
        formatted.push('-');
    }
    formatted.push_str(&group_thousands(integer));
    if let Some(fraction) = fraction {
        formatted.push('.');
        formatted.push_str(fraction);
    }
    formatted
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_amount_grouping() {
        assert_eq!(format_amount(dec("0")), "0");
        assert_eq!(format_amount(dec("999")), "999");
        assert_eq!(format_amount(dec("1000")), "1,000");
        assert_eq!(format_amount(dec("1234567.5")), "1,234,567.5");
        assert_eq!(format_amount(dec("100000")), "100,000");
    }

    #[test]
    fn test_format_amount_rounding() {
        assert_eq!(format_amount(dec("12.345")), "12.35");
        assert_eq!(format_amount(dec("12.50")), "12.5");
        assert_eq!(format_amount(dec("0.004")), "0");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(dec("-2500.25")), "-2,500.25");
    }
}
