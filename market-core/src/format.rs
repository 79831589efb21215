use chrono::{DateTime, Utc};

/// Price as US dollars with thousands separators, e.g. `$1,234.5`.
///
/// Keeps at most two fraction digits and drops trailing zeros.
pub fn format_price(price: f64) -> String {
    format_usd(price, 2)
}

/// Whole-dollar price, as shown on listing cards.
pub fn format_price_rounded(price: f64) -> String {
    format_usd(price, 0)
}

fn format_usd(price: f64, max_fraction: usize) -> String {
    if !price.is_finite() {
        return "$0".to_string();
    }

    let fixed = format!("{:.*}", max_fraction, price.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if price < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    if fraction.is_empty() {
        format!("{}${}", sign, grouped)
    } else {
        format!("{}${}.{}", sign, grouped, fraction)
    }
}

/// `January 5, 2024`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// `Jan 5, 2024`
pub fn format_date_short(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Card date: `Today`, `Yesterday`, `3 days ago`, then the short date.
pub fn format_relative_date(date: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let days = (*now - *date).num_days().abs();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        _ => format_date_short(date),
    }
}

/// Ten-digit numbers become `(555) 123-4567`; anything else is returned as is.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        phone.to_string()
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
