/// Formats an amount with two decimals and the configured currency code.
/// Non-finite values render as zero.
pub fn format_amount(value: f64, currency: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{:.2} {}", value, currency)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}
