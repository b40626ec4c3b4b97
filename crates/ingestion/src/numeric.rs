//! Tolerant numeric field parsing

/// Parse an optional text token into a number.
///
/// Never fails: a missing token, a blank token, any spelling of `NaN`, or
/// anything that does not parse as `f64` all come back as `None`.
pub fn parse_number(token: Option<&str>) -> Option<f64> {
    let trimmed = token?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_blank() {
        assert_eq!(parse_number(None), None);
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(Some("   ")), None);
    }

    #[test]
    fn test_nan_any_case() {
        assert_eq!(parse_number(Some("NaN")), None);
        assert_eq!(parse_number(Some("nan")), None);
        assert_eq!(parse_number(Some(" NAN ")), None);
    }

    #[test]
    fn test_trimmed_value() {
        assert_eq!(parse_number(Some(" 123.5 ")), Some(123.5));
        assert_eq!(parse_number(Some("37000")), Some(37000.0));
        assert_eq!(parse_number(Some("-6.2")), Some(-6.2));
    }

    #[test]
    fn test_garbage_is_absent() {
        assert_eq!(parse_number(Some("abc")), None);
        assert_eq!(parse_number(Some("12,5")), None);
        assert_eq!(parse_number(Some("1.2.3")), None);
        assert_eq!(parse_number(Some("\u{0}\u{fffd}")), None);
    }
}
