// crates/l1menu/src/format.rs

//! Canonical text rendering of decimal fields.

/// Minimum field width of a rendered decimal.
const DECIMAL_WIDTH: usize = 23;

/// Digits after the decimal point of the mantissa.
const DECIMAL_PRECISION: usize = 16;

/// Renders `value` the way C's `printf("%+23.16E")` does.
///
/// The sign is always shown and the exponent carries its own sign and at
/// least two digits, e.g. `+6.3000000000000000E+01`. Infinity and NaN are
/// right-aligned in the same 23-character field.
pub fn format_decimal(value: f64) -> String {
    let sign = if value.is_sign_negative() { '-' } else { '+' };

    if value.is_nan() {
        return format!("{:>width$}", format!("{}NAN", sign), width = DECIMAL_WIDTH);
    }
    if value.is_infinite() {
        return format!("{:>width$}", format!("{}INF", sign), width = DECIMAL_WIDTH);
    }

    // Rust yields "6.3000000000000000e1"; split mantissa and exponent.
    let rendered = format!("{:.prec$e}", value.abs(), prec = DECIMAL_PRECISION);
    let (mantissa, exponent) = rendered.split_once('e').unwrap_or((rendered.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let exponent_sign = if exponent < 0 { '-' } else { '+' };

    let text = format!(
        "{}{}E{}{:02}",
        sign,
        mantissa,
        exponent_sign,
        exponent.unsigned_abs()
    );
    format!("{:>width$}", text, width = DECIMAL_WIDTH)
}
