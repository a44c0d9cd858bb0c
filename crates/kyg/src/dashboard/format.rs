use chrono::NaiveDate;

use super::domain::{display_date, DetailValue};

/// Detail label whose numeric value is a ratio rather than an amount.
pub const RATIO_LABEL: &str = "Ratio";

/// `financialCapability` -> `Financial Capability`.
///
/// Shared by every component that prints a track header.
pub fn display_track_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (index, ch) in key.chars().enumerate() {
        if index == 0 {
            out.extend(ch.to_uppercase());
        } else {
            if ch.is_uppercase() {
                out.push(' ');
            }
            out.push(ch);
        }
    }
    out
}

/// Upper-cases the first character only.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `$520,000`; fractional amounts keep two decimals.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round();
    let whole = format!("{:.0}", (cents / 100.0).trunc());
    let fraction = (cents % 100.0) as u64;

    let mut out = String::new();
    if negative && cents > 0.0 {
        out.push('-');
    }
    out.push('$');
    out.push_str(&group_thousands(&whole));
    if fraction != 0 {
        out.push_str(&format!(".{fraction:02}"));
    }
    out
}

pub fn format_ratio(value: f64) -> String {
    format!("{value:.2}")
}

pub fn format_detail_value(label: &str, value: &DetailValue) -> String {
    match value {
        DetailValue::Number(number) => match number.as_f64() {
            Some(amount) if label == RATIO_LABEL => format_ratio(amount),
            Some(amount) => format_currency(amount),
            None => number.to_string(),
        },
        DetailValue::Text(text) => text.clone(),
    }
}

/// `Label: value` line used in detail breakdowns.
pub fn format_detail(label: &str, value: &DetailValue) -> String {
    format!("{label}: {}", format_detail_value(label, value))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `31/12/2024`, the format dates cross the boundary in.
pub fn format_date(date: NaiveDate) -> String {
    date.format(display_date::FORMAT).to_string()
}

/// Score as the payload carries it: `9.1`, `10`.
pub fn format_score(score: f64) -> String {
    format!("{score}")
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
