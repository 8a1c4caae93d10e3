//! Impedance Labels

/// Significant digits used when rendering frequencies in labels
pub const LABEL_SIGNIFICANT_DIGITS: usize = 5;

/// Render a value with `digits` significant digits, `%g` style
///
/// Fixed notation is used while the decimal exponent lies in `[-4, digits)`,
/// scientific notation otherwise; trailing zeros are removed either way.
pub fn format_significant(value: f64, digits: usize) -> String {
    let digits = digits.max(1);
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Scientific rendering rounds first, so the exponent accounts for carries (99999.9 -> 1e5)
    let scientific = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Label for the real impedance at a frequency, e.g. `Z_re(10Hz)`
pub fn real_label(frequency: f64) -> String {
    format!(
        "Z_re({}Hz)",
        format_significant(frequency, LABEL_SIGNIFICANT_DIGITS)
    )
}

/// Label for the imaginary impedance at a frequency, e.g. `Z_im(10Hz)`
pub fn imaginary_label(frequency: f64) -> String {
    format!(
        "Z_im({}Hz)",
        format_significant(frequency, LABEL_SIGNIFICANT_DIGITS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_notation() {
        assert_eq!(format_significant(0.5, 5), "0.5");
        assert_eq!(format_significant(100.0, 5), "100");
        assert_eq!(format_significant(1000.0, 5), "1000");
        assert_eq!(format_significant(0.21544, 5), "0.21544");
        assert_eq!(format_significant(15848.93, 5), "15849");
        assert_eq!(format_significant(0.0001, 5), "0.0001");
        assert_eq!(format_significant(-2.5, 5), "-2.5");
    }

    #[test]
    fn test_rounding_carries_into_exponent() {
        assert_eq!(format_significant(19999.99, 5), "20000");
        assert_eq!(format_significant(99999.9, 5), "1e+05");
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(format_significant(123456.0, 5), "1.2346e+05");
        assert_eq!(format_significant(0.00001, 5), "1e-05");
        assert_eq!(format_significant(0.000012345, 5), "1.2345e-05");
    }

    #[test]
    fn test_labels() {
        assert_eq!(real_label(10.0), "Z_re(10Hz)");
        assert_eq!(imaginary_label(0.31623), "Z_im(0.31623Hz)");
        assert_eq!(format_significant(0.0, 5), "0");
    }
}
