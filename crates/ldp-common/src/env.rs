//! Typed environment variable helpers
//!
//! Connection parameters and tuning knobs are read from the process
//! environment rather than hard-coded. These helpers keep the parsing and
//! error reporting in one place so callers get a consistent failure message
//! naming the offending variable.

use anyhow::{Context, Result};
use std::str::FromStr;

/// Read a string variable, falling back to `default` when unset or empty.
pub fn string_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => default.to_string(),
    }
}

/// Read and parse a variable, falling back to `default` when unset.
///
/// An unset variable is fine; a set-but-unparseable one is a configuration
/// error and is reported as such.
pub fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => val
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, val)),
        _ => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_string_or_unset() {
        assert_eq!(string_or("LDP_TEST_UNSET_STRING", "fallback"), "fallback");
    }

    #[test]
    fn test_string_or_set() {
        std::env::set_var("LDP_TEST_SET_STRING", "value");
        assert_eq!(string_or("LDP_TEST_SET_STRING", "fallback"), "value");
        std::env::remove_var("LDP_TEST_SET_STRING");
    }

    #[test]
    fn test_parse_or_unset_uses_default() {
        assert_eq!(parse_or("LDP_TEST_UNSET_USIZE", 5000usize).unwrap(), 5000);
    }

    #[test]
    fn test_parse_or_set() {
        std::env::set_var("LDP_TEST_SET_USIZE", "250");
        assert_eq!(parse_or("LDP_TEST_SET_USIZE", 5000usize).unwrap(), 250);
        std::env::remove_var("LDP_TEST_SET_USIZE");
    }

    #[test]
    fn test_parse_or_invalid_is_error() {
        std::env::set_var("LDP_TEST_BAD_USIZE", "not-a-number");
        let err = parse_or("LDP_TEST_BAD_USIZE", 0usize).unwrap_err();
        assert!(err.to_string().contains("LDP_TEST_BAD_USIZE"));
        std::env::remove_var("LDP_TEST_BAD_USIZE");
    }
}
