//! The `"{PREFIX} Nº {seq:03}/{year}"` code format.

use std::sync::LazyLock;

use regex::Regex;

/// Separator between the prefix and the number.
const NUMBER_MARK: &str = " Nº";

static SEQUENTIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Nº (\d+)/").expect("sequential pattern is valid"));

/// Formatting and parsing of document codes.
pub struct DocumentCode;

impl DocumentCode {
    /// Format a code. The sequential is zero-padded to at least three digits.
    pub fn format(prefix: &str, sequential: i32, year: i32) -> String {
        format!("{prefix}{NUMBER_MARK} {sequential:03}/{year}")
    }

    /// The prefix of a formatted code: everything before the last `" Nº"`.
    ///
    /// Codes that do not contain the mark yield an empty prefix.
    pub fn prefix_of(code: &str) -> &str {
        code.rfind(NUMBER_MARK).map_or("", |end| &code[..end])
    }

    /// The sequential digits of a formatted code, as written.
    pub fn sequential_digits(code: &str) -> Option<&str> {
        SEQUENTIAL_RE
            .captures(code)?
            .get(1)
            .map(|m| m.as_str())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(DocumentCode::format("MEM", 1, 2024), "MEM Nº 001/2024");
        assert_eq!(DocumentCode::format("OFC", 42, 2023), "OFC Nº 042/2023");
        assert_eq!(DocumentCode::format("MEM", 1234, 2024), "MEM Nº 1234/2024");
    }

    #[test]
    fn test_prefix_of() {
        assert_eq!(DocumentCode::prefix_of("OFC Nº 005/2024"), "OFC");
        assert_eq!(DocumentCode::prefix_of("DIR ADM Nº 005/2024"), "DIR ADM");
        assert_eq!(DocumentCode::prefix_of("X-1"), "");
        assert_eq!(DocumentCode::prefix_of(""), "");
    }

    #[test]
    fn test_sequential_digits() {
        assert_eq!(DocumentCode::sequential_digits("MEM Nº 007/2024"), Some("007"));
        assert_eq!(DocumentCode::sequential_digits("X-1"), None);
    }

    proptest! {
        #[test]
        fn prop_format_round_trips_prefix_and_number(
            prefix in "[A-Z]{1,5}( [A-Z]{1,5})?",
            sequential in 1i32..100_000,
            year in 1900i32..3000,
        ) {
            let code = DocumentCode::format(&prefix, sequential, year);
            prop_assert_eq!(DocumentCode::prefix_of(&code), prefix.as_str());
            let digits = DocumentCode::sequential_digits(&code).unwrap();
            prop_assert!(digits.len() >= 3);
            prop_assert_eq!(digits.parse::<i32>().unwrap(), sequential);
            let suffix = format!("/{}", year);
            prop_assert!(code.ends_with(&suffix));
        }
    }
}
