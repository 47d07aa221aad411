/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats an amount as `$1,234.56`.
pub fn format_currency(value: f64) -> String {
    let rounded = round2(value.abs());
    let text = format!("{:.2}", rounded);
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && rounded > 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}
