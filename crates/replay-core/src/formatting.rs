//! Presentation-time number formatting.
//!
//! All rounding of derived minute/hour/day values happens here, when a value
//! is turned into display text. Aggregation keeps full precision internally
//! so chained computations never compound rounding error.

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use replay_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Handle the sign separately so the thousands grouping works on the
    // absolute value.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Round to the requested decimal places.
    // Add a tiny epsilon (half ULP at the target precision) before rounding
    // to avoid IEEE 754 binary-representation issues at exact midpoints.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let int_str = integer_part.to_string();
    let grouped = group_thousands(&int_str);

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50". Strip the leading "0".
        let decimal_digits = &frac_str[1..];
        format!("{}{}", grouped, decimal_digits)
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Round a value to two decimal places.
///
/// Chart tooltips and summary lines show two decimals; this is the single
/// place that policy lives.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a minute count for display, e.g. `"1,234.50 min"`.
pub fn format_minutes(minutes: f64) -> String {
    format!("{} min", format_number(minutes, 2))
}

/// Format an hour count for display, e.g. `"20.58 h"`.
pub fn format_hours(hours: f64) -> String {
    format!("{} h", format_number(hours, 2))
}

/// The summary phrase shown at the top of the dashboard.
///
/// # Examples
///
/// ```
/// use replay_core::formatting::listening_time_phrase;
///
/// assert_eq!(
///     listening_time_phrase(7_200_000),
///     "Time played: 120.00 minutes, which is 2.00 hours, which is 0.08 days"
/// );
/// ```
pub fn listening_time_phrase(total_ms: u64) -> String {
    let minutes = total_ms as f64 / 60_000.0;
    let hours = total_ms as f64 / 3_600_000.0;
    let days = hours / 24.0;
    format!(
        "Time played: {} minutes, which is {} hours, which is {} days",
        format_number(minutes, 2),
        format_number(hours, 2),
        format_number(days, 2)
    )
}

/// Insert `,` separators every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let chars: Vec<char> = digits.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(1_000_000.0, 0), "1,000,000");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1_000.0, 0), "1,000");
    }

    #[test]
    fn test_format_number_decimals() {
        assert_eq!(format_number(2.0, 2), "2.00");
        assert_eq!(format_number(0.005, 2), "0.01");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-1234.5, 1), "-1,234.5");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.0), 2.0);
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(0.333), 0.33);
    }

    #[test]
    fn test_format_minutes_and_hours() {
        assert_eq!(format_minutes(2.0), "2.00 min");
        assert_eq!(format_hours(1234.567), "1,234.57 h");
    }

    #[test]
    fn test_listening_time_phrase_zero() {
        assert_eq!(
            listening_time_phrase(0),
            "Time played: 0.00 minutes, which is 0.00 hours, which is 0.00 days"
        );
    }

    #[test]
    fn test_listening_time_phrase_two_minutes() {
        // 120000 ms -> 2 minutes.
        let phrase = listening_time_phrase(120_000);
        assert!(phrase.contains("2.00 minutes"));
        assert!(phrase.contains("0.03 hours"));
    }
}
