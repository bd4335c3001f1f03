//! Version ordering
//!
//! Versions are opaque decimal strings. Two versions that both parse as
//! unsigned integers compare numerically, so "10" sorts after "9". Anything
//! else falls back to plain string ordering, which also makes every version
//! newer than the empty cursor.

use std::cmp::Ordering;

/// Compares two version strings
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Returns true when `candidate` should be reported to a caller holding `cursor`
pub fn is_not_older(candidate: &str, cursor: &str) -> bool {
    compare_versions(candidate, cursor) != Ordering::Less
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ordering() {
        assert_eq!(compare_versions("124", "123"), Ordering::Greater);
        assert_eq!(compare_versions("123", "123"), Ordering::Equal);
        assert_eq!(compare_versions("10", "9"), Ordering::Greater);
        assert_eq!(compare_versions("9", "10"), Ordering::Less);
    }

    #[test]
    fn test_non_numeric_falls_back_to_string_ordering() {
        assert_eq!(compare_versions("b", "a"), Ordering::Greater);
        assert_eq!(compare_versions("1.2", "1.10"), Ordering::Greater);
    }

    #[test]
    fn test_empty_cursor_accepts_everything() {
        assert!(is_not_older("1", ""));
        assert!(is_not_older("", ""));
    }

    #[test]
    fn test_is_not_older() {
        assert!(is_not_older("124", "123"));
        assert!(is_not_older("123", "123"));
        assert!(!is_not_older("122", "123"));
    }
}
