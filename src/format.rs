//! Brazilian number formatting: `.` groups thousands, `,` marks decimals.

/// Insert `.` every three digits of an unsigned digit string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

pub fn format_int(value: i64) -> String {
    let grouped = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn format_float(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{},{frac}", group_thousands(int_part)),
        None => format!("{sign}{}", group_thousands(int_part)),
    }
}

/// Fraction as a percentage, e.g. `0.14` -> `14,00%`.
pub fn format_pct(fraction: f64) -> String {
    format!("{}%", format_float(fraction * 100.0, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_int() {
        assert_eq!(format_int(0), "0");
        assert_eq!(format_int(999), "999");
        assert_eq!(format_int(25461), "25.461");
        assert_eq!(format_int(1234567), "1.234.567");
        assert_eq!(format_int(-3511), "-3.511");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(25461.07, 2), "25.461,07");
        assert_eq!(format_float(0.5, 1), "0,5");
        assert_eq!(format_float(1234.0, 0), "1.234");
        assert_eq!(format_float(-1234.5, 2), "-1.234,50");
        assert_eq!(format_float(-0.001, 2), "0,00");
        assert_eq!(format_float(f64::NAN, 2), "-");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(0.14), "14,00%");
        assert_eq!(format_pct(-0.1), "-10,00%");
    }
}
