use regex::Regex;
use std::sync::LazyLock;

/// A stack count is nothing but ASCII digits.
const COUNT_PATTERN: &str = r"^[0-9]+$";

static COUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(COUNT_PATTERN).expect("count pattern is valid"));

/// Interprets OCR output as a stack count.
///
/// Surrounding whitespace is ignored. Anything else that is not a digit, an
/// empty string, zero, or a value that overflows yields `None`.
pub fn parse_stack_count(text: &str) -> Option<u32> {
    let text = text.trim();
    if !COUNT_REGEX.is_match(text) {
        return None;
    }
    text.parse::<u32>().ok().filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stack_count() {
        assert_eq!(parse_stack_count("12"), Some(12));
        assert_eq!(parse_stack_count(" 7\n"), Some(7));
        assert_eq!(parse_stack_count("007"), Some(7));
    }

    #[test]
    fn test_parse_stack_count_rejects_garbage() {
        assert_eq!(parse_stack_count("12a"), None);
        assert_eq!(parse_stack_count(""), None);
        assert_eq!(parse_stack_count("   "), None);
        assert_eq!(parse_stack_count("1 2"), None);
        assert_eq!(parse_stack_count("-4"), None);
        assert_eq!(parse_stack_count("x"), None);
    }

    #[test]
    fn test_parse_stack_count_rejects_zero_and_overflow() {
        assert_eq!(parse_stack_count("0"), None);
        assert_eq!(parse_stack_count("000"), None);
        assert_eq!(parse_stack_count("99999999999999"), None);
    }
}
