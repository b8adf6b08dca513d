/// Parses a decimal written with either `.` or `,` as the fractional separator.
pub fn normalize_decimal(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse::<f64>().ok()
}

/// Converts a Fahrenheit reading to whole degrees Celsius.
///
/// Halves round away from zero (`f64::round`), so 33.8°F (1.0°C) and
/// 34.7°F (1.5°C) give 1 and 2.
pub fn to_celsius(fahrenheit: &str) -> Option<i64> {
    let f = normalize_decimal(fahrenheit)?;
    let c = ((f - 32.0) * 5.0 / 9.0).round();
    if c.is_finite() {
        Some(c as i64)
    }
    else {
        None
    }
}
