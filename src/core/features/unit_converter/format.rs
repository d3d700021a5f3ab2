// Display formatting for conversion results

const EXPONENTIAL_LOW: f64 = 0.000001;
const EXPONENTIAL_HIGH: f64 = 1_000_000.0;
const MAX_FRACTION_DIGITS: usize = 3;

// Helper to add thousands separators to a string of digits
fn add_thousands_separators(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*ch);
    }
    result.chars().rev().collect()
}

/// Exponential notation with two fraction digits and an explicit exponent sign.
///
/// Examples: 1234567 -> "1.23e+6", 0.0000001234 -> "1.23e-7"
fn format_exponential(value: f64) -> String {
    let raw = format!("{:.2e}", value);
    match raw.split_once('e') {
        Some((mantissa, exponent)) if exponent.starts_with('-') => {
            format!("{}e{}", mantissa, exponent)
        }
        Some((mantissa, exponent)) => format!("{}e+{}", mantissa, exponent),
        None => raw,
    }
}

/// Format a result for display.
///
/// Zero prints as "0"; very small or very large magnitudes go exponential;
/// everything else gets grouping commas and at most three decimals with
/// trailing zeros stripped. Examples: 130000.0 -> "130,000", 12.5 -> "12.5",
/// 2.2046244 -> "2.205".
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_positive() { "Infinity".to_string() } else { "-Infinity".to_string() };
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude < EXPONENTIAL_LOW || magnitude >= EXPONENTIAL_HIGH {
        return format_exponential(value);
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, magnitude);
    let (integer_str, decimal_str) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let trimmed_decimal = decimal_str.trim_end_matches('0');

    let mut formatted = add_thousands_separators(integer_str);
    if !trimmed_decimal.is_empty() {
        formatted.push('.');
        formatted.push_str(trimmed_decimal);
    }

    // 0.0004 rounds to "0"; don't print "-0"
    if value.is_sign_negative() && formatted != "0" {
        formatted.insert(0, '-');
    }
    formatted
}
