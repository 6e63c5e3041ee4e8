//! Display formatting for market fields.
//!
//! Every formatter accepts an optional value and renders `"N/A"` when the
//! provider sent `null` (or a non-finite number), so a sparse row never
//! breaks rendering.

use chrono::{DateTime, Utc};

use crate::types::TimeRange;

/// Placeholder for missing values
pub const NOT_AVAILABLE: &str = "N/A";

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Inserts `,` between every group of three integer digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats `abs_value` with `decimals` places and grouped integer digits.
fn grouped_fixed(abs_value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, abs_value);
    match fixed.split_once('.') {
        Some((int_part, frac)) => format!("{}.{}", group_thousands(int_part), frac),
        None => group_thousands(&fixed),
    }
}

fn sign_prefix(value: f64) -> &'static str {
    if value < 0.0 {
        "-"
    } else {
        ""
    }
}

/// USD price: `$43,250.12`, or six decimals below one dollar in magnitude (`$0.000123`).
pub fn format_price(price: Option<f64>) -> String {
    let Some(price) = finite(price) else {
        return NOT_AVAILABLE.to_string();
    };
    let decimals = if price.abs() < 1.0 { 6 } else { 2 };
    format!("{}${}", sign_prefix(price), grouped_fixed(price.abs(), decimals))
}

/// Compact magnitude: `$1.23T`, `$4.56B`, `$7.89M`, `$1.00K`, `$12.34`.
pub fn format_market_cap(value: Option<f64>) -> String {
    let Some(value) = finite(value) else {
        return NOT_AVAILABLE.to_string();
    };
    let abs = value.abs();
    let sign = sign_prefix(value);
    if abs >= 1e12 {
        format!("{}${:.2}T", sign, abs / 1e12)
    } else if abs >= 1e9 {
        format!("{}${:.2}B", sign, abs / 1e9)
    } else if abs >= 1e6 {
        format!("{}${:.2}M", sign, abs / 1e6)
    } else if abs >= 1e3 {
        format!("{}${:.2}K", sign, abs / 1e3)
    } else {
        format!("{}${:.2}", sign, abs)
    }
}

/// Trading volume uses the same compact notation as market cap.
pub fn format_volume(volume: Option<f64>) -> String {
    format_market_cap(volume)
}

/// Signed percentage with two decimals: `+2.35%`, `-0.87%`.
pub fn format_percentage(percentage: Option<f64>) -> String {
    let Some(pct) = finite(percentage) else {
        return NOT_AVAILABLE.to_string();
    };
    let sign = if pct >= 0.0 { '+' } else { '-' };
    format!("{}{:.2}%", sign, pct.abs())
}

/// Whole number with thousands separators: `19,600,000`.
pub fn format_number(number: Option<f64>) -> String {
    let Some(number) = finite(number) else {
        return NOT_AVAILABLE.to_string();
    };
    let rounded = number.round();
    format!("{}{}", sign_prefix(rounded), grouped_fixed(rounded.abs(), 0))
}

/// `Jan 15, 2024`
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// 24-hour `HH:MM`
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

/// Axis label for a chart point, granularity chosen by the range
pub fn chart_label(timestamp: DateTime<Utc>, range: TimeRange) -> String {
    let pattern = match range {
        TimeRange::OneDay => "%H:%M",
        TimeRange::SevenDays => "%a, %b %-d",
        TimeRange::OneMonth => "%b %-d",
        TimeRange::OneYear => "%b %y",
    };
    timestamp.format(pattern).to_string()
}

/// Direction of a percentage move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    Up,
    Down,
    Unknown,
}

impl ChangeDirection {
    pub fn from_percentage(percentage: Option<f64>) -> Self {
        match finite(percentage) {
            Some(p) if p >= 0.0 => ChangeDirection::Up,
            Some(_) => ChangeDirection::Down,
            None => ChangeDirection::Unknown,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ChangeDirection::Up => "↗",
            ChangeDirection::Down => "↘",
            ChangeDirection::Unknown => "•",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(43250.123)), "$43,250.12");
        assert_eq!(format_price(Some(1.0)), "$1.00");
        assert_eq!(format_price(Some(0.000123)), "$0.000123");
        assert_eq!(format_price(Some(1234567.891)), "$1,234,567.89");
        assert_eq!(format_price(Some(-12.5)), "-$12.50");
        assert_eq!(format_price(Some(-0.5)), "-$0.500000");
        assert_eq!(format_price(None), "N/A");
        assert_eq!(format_price(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn test_format_market_cap() {
        assert_eq!(format_market_cap(Some(1.234e12)), "$1.23T");
        assert_eq!(format_market_cap(Some(4.567e9)), "$4.57B");
        assert_eq!(format_market_cap(Some(7_890_000.0)), "$7.89M");
        assert_eq!(format_market_cap(Some(1_000.0)), "$1.00K");
        assert_eq!(format_market_cap(Some(12.5)), "$12.50");
        assert_eq!(format_market_cap(None), "N/A");
        assert_eq!(format_volume(Some(2.5e9)), "$2.50B");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Some(2.346)), "+2.35%");
        assert_eq!(format_percentage(Some(-0.87)), "-0.87%");
        assert_eq!(format_percentage(Some(0.0)), "+0.00%");
        assert_eq!(format_percentage(None), "N/A");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(Some(19_600_000.4)), "19,600,000");
        assert_eq!(format_number(Some(999.0)), "999");
        assert_eq!(format_number(Some(-1234.0)), "-1,234");
        assert_eq!(format_number(Some(0.0)), "0");
        assert_eq!(format_number(None), "N/A");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }

    #[test]
    fn test_date_and_chart_labels() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 14, 5, 0).unwrap();
        assert_eq!(format_date(ts), "Jan 15, 2024");
        assert_eq!(format_time(ts), "14:05");
        assert_eq!(chart_label(ts, TimeRange::OneDay), "14:05");
        assert_eq!(chart_label(ts, TimeRange::SevenDays), "Mon, Jan 15");
        assert_eq!(chart_label(ts, TimeRange::OneMonth), "Jan 15");
        assert_eq!(chart_label(ts, TimeRange::OneYear), "Jan 24");
    }

    #[test]
    fn test_change_direction() {
        assert_eq!(ChangeDirection::from_percentage(Some(1.0)).icon(), "↗");
        assert_eq!(ChangeDirection::from_percentage(Some(0.0)), ChangeDirection::Up);
        assert_eq!(ChangeDirection::from_percentage(Some(-1.0)).icon(), "↘");
        assert_eq!(ChangeDirection::from_percentage(None).icon(), "•");
    }
}
