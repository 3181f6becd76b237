//! Number formatting for the es-ES locale.

pub const PLACEHOLDER: &str = "—";

/// Formats with exactly two decimals, `,` as decimal separator and `.`
/// grouping. Like the es-ES locale, four-digit integers are left ungrouped
/// and exact ties round away from zero.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let fixed = fixed_two_decimals(value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let negative = value < 0.0 && fixed.chars().any(|ch| ch.is_ascii_digit() && ch != '0');

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    out.push(',');
    out.push_str(frac_part);
    out
}

pub fn format_optional(value: Option<f64>) -> String {
    value
        .map(format_number)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn format_euros(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{} €", format_number(value)),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Percent as the backend sent it, without rounding.
pub fn format_percent(value: f64) -> String {
    format!("{value}%")
}

fn fixed_two_decimals(abs: f64) -> String {
    // Exact decimal expansion; a tie is `x.xx5` followed only by zeros.
    let exact = format!("{abs:.60}");
    let frac = exact.split_once('.').map_or("", |(_, frac)| frac);
    let tie = frac.len() > 3
        && frac.as_bytes()[2] == b'5'
        && frac[3..].bytes().all(|digit| digit == b'0');
    if tie {
        format!("{:.2}", abs + 0.001)
    } else {
        format!("{abs:.2}")
    }
}

fn group_thousands(digits: &str) -> String {
    if digits.len() < 5 {
        return digits.to_string();
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_decimals_with_spanish_separators() {
        assert_eq!(format_number(869.944), "869,94");
        assert_eq!(format_number(150000.0), "150.000,00");
        assert_eq!(format_number(1234567.891), "1.234.567,89");
        assert_eq!(format_number(0.5), "0,50");
    }

    #[test]
    fn exact_ties_round_away_from_zero() {
        assert_eq!(format_number(0.125), "0,13");
        assert_eq!(format_number(0.625), "0,63");
        assert_eq!(format_number(-0.125), "-0,13");
        assert_eq!(format_number(12345.875), "12.345,88");
        // 1.005 is stored just below the tie.
        assert_eq!(format_number(1.005), "1,00");
    }

    #[test]
    fn four_digit_integers_are_not_grouped() {
        assert_eq!(format_number(1234.5), "1234,50");
        assert_eq!(format_number(9999.999), "10.000,00");
    }

    #[test]
    fn negative_values_keep_sign_unless_zero() {
        assert_eq!(format_number(-79.05), "-79,05");
        assert_eq!(format_number(-12345.0), "-12.345,00");
        assert_eq!(format_number(-0.001), "0,00");
    }

    #[test]
    fn missing_values_use_placeholder() {
        assert_eq!(format_optional(None), PLACEHOLDER);
        assert_eq!(format_number(f64::NAN), PLACEHOLDER);
        assert_eq!(format_euros(Some(1000.0)), "1000,00 €");
        assert_eq!(format_euros(None), PLACEHOLDER);
    }

    #[test]
    fn percent_is_raw() {
        assert_eq!(format_percent(38.5), "38.5%");
        assert_eq!(format_percent(40.0), "40%");
    }
}
