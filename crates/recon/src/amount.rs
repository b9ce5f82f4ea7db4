use once_cell::sync::Lazy;
use regex::Regex;
use remitmatch_core::Cell;

static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?(\d+(\.\d+)?|\.\d+)").unwrap());

/// Normalize an amount cell to a float.
///
/// Numbers pass through unchanged. Text keeps only digits, `.` and `-`, then
/// the longest leading float is parsed (`"1.2.3"` → 1.2); nothing parseable
/// yields 0. Booleans, date-times, empty and absent cells yield 0.
pub fn parse_amount(cell: Option<&Cell>) -> f64 {
    match cell {
        Some(Cell::Number(n)) => *n,
        Some(Cell::Text(s)) => parse_amount_text(s),
        _ => 0.0,
    }
}

pub fn parse_amount_text(s: &str) -> f64 {
    let stripped: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    LEADING_FLOAT
        .find(&stripped)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Round half up to two decimals by scaling, rounding and descaling.
pub fn round_cents(x: f64) -> f64 {
    (x * 100.0 + 0.5).floor() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn text(s: &str) -> f64 {
        parse_amount(Some(&Cell::text(s)))
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(parse_amount(Some(&Cell::Number(12.345))), 12.345);
        assert_eq!(parse_amount(Some(&Cell::Number(-3.0))), -3.0);
    }

    #[test]
    fn text_is_stripped_then_parsed() {
        assert_eq!(text("30.25 USD"), 30.25);
        assert_eq!(text("$1,234.50"), 1234.5);
        assert_eq!(text("-45"), -45.0);
        assert_eq!(text("USD -7.10"), -7.1);
        assert_eq!(text(".5"), 0.5);
    }

    #[test]
    fn leading_prefix_wins() {
        assert_eq!(text("1.2.3"), 1.2);
        assert_eq!(text("10-20"), 10.0);
    }

    #[test]
    fn unparseable_text_is_zero() {
        assert_eq!(text("n/a"), 0.0);
        assert_eq!(text(""), 0.0);
        assert_eq!(text("-"), 0.0);
        assert_eq!(text("--5"), 0.0);
    }

    #[test]
    fn other_types_are_zero() {
        let dt = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(parse_amount(None), 0.0);
        assert_eq!(parse_amount(Some(&Cell::Empty)), 0.0);
        assert_eq!(parse_amount(Some(&Cell::Bool(true))), 0.0);
        assert_eq!(parse_amount(Some(&Cell::DateTime(dt))), 0.0);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_cents(39.25), 39.25);
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(-0.125), -0.12);
        assert_eq!(round_cents(30.0), 30.0);
        assert_eq!(round_cents(0.1 + 0.2), 0.3);
    }
}
