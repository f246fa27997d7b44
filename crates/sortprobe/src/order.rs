//! Order Comparator
//!
//! Computes the order a correctly sorted column must have, under one of two
//! comparison modes.
//!
//! ## Collation
//!
//! Lexicographic mode is ordinal and case-sensitive: strings compare by
//! Unicode scalar value, exactly as `str`'s `Ord` does. `"Zed"` sorts before
//! `"adams"`. Fixtures must use the same rule.
//!
//! ## Numeric normalization
//!
//! Every character outside `[0-9.]` is removed and the residual is parsed as
//! `f64`. `"$1,250.00"` becomes `1250.0`. A residual that is empty or not a
//! number (`"N/A"`, `"1.2.3"`) is a [`SortProbeError::UnparsableValue`],
//! never a silent zero. Signs are stripped along with everything else.
//!
//! ## Tie policy
//!
//! Ascending is a stable sort, so equal keys keep their observed relative
//! order. Descending is always the exact reverse of ascending.

use crate::result::{SortProbeError, SortProbeResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Comparison mode for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Ordinal text order
    #[default]
    Lexicographic,
    /// Parsed-number order
    Numeric,
}

impl SortMode {
    /// Mode name as used in suite files
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lexicographic => "lexicographic",
            Self::Numeric => "numeric",
        }
    }

    /// Compare two sequences for equality under this mode
    ///
    /// Lexicographic compares the text. Numeric compares parsed values, so
    /// `"$5"` and `"5.00"` are interchangeable.
    pub fn matches(&self, observed: &[String], expected: &[String]) -> SortProbeResult<bool> {
        match self {
            Self::Lexicographic => Ok(observed == expected),
            Self::Numeric => {
                if observed.len() != expected.len() {
                    return Ok(false);
                }
                for (a, b) in observed.iter().zip(expected) {
                    if parse_numeric(a)? != parse_numeric(b)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn non_numeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9.]").expect("static pattern is valid"))
}

/// Parse a raw cell into its numeric sort key
///
/// # Errors
///
/// Returns [`SortProbeError::UnparsableValue`] when nothing parsable remains
/// after stripping non-numeric characters.
pub fn parse_numeric(raw: &str) -> SortProbeResult<f64> {
    let residual = non_numeric().replace_all(raw, "");
    if residual.is_empty() {
        return Err(SortProbeError::UnparsableValue {
            raw: raw.to_string(),
        });
    }
    residual
        .parse::<f64>()
        .map_err(|_| SortProbeError::UnparsableValue {
            raw: raw.to_string(),
        })
}

/// Expected ascending and descending orderings of a value sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedOrder {
    /// Values in ascending order
    pub ascending: Vec<String>,
    /// Values in descending order (reverse of `ascending`)
    pub descending: Vec<String>,
}

/// Compute the expected orderings of `values` under `mode`
///
/// # Errors
///
/// Returns [`SortProbeError::UnparsableValue`] in numeric mode if any value
/// fails normalization.
pub fn expected_order(values: &[String], mode: SortMode) -> SortProbeResult<ExpectedOrder> {
    let ascending = match mode {
        SortMode::Lexicographic => {
            let mut sorted = values.to_vec();
            sorted.sort();
            sorted
        }
        SortMode::Numeric => {
            let mut keyed = values
                .iter()
                .map(|v| parse_numeric(v).map(|key| (key, v)))
                .collect::<SortProbeResult<Vec<_>>>()?;
            keyed.sort_by(|(a, _), (b, _)| a.total_cmp(b));
            keyed.into_iter().map(|(_, v)| v.clone()).collect()
        }
    };

    let mut descending = ascending.clone();
    descending.reverse();

    Ok(ExpectedOrder {
        ascending,
        descending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_currency() {
            assert_eq!(parse_numeric("$40.50").unwrap(), 40.5);
            assert_eq!(parse_numeric("$1,250.00").unwrap(), 1250.0);
        }

        #[test]
        fn test_plain_integer() {
            assert_eq!(parse_numeric("42").unwrap(), 42.0);
            assert_eq!(parse_numeric("  7  ").unwrap(), 7.0);
        }

        #[test]
        fn test_na_is_unparsable() {
            let err = parse_numeric("N/A").unwrap_err();
            assert!(matches!(err, SortProbeError::UnparsableValue { ref raw } if raw == "N/A"));
        }

        #[test]
        fn test_empty_is_unparsable() {
            assert!(parse_numeric("").is_err());
        }

        #[test]
        fn test_multiple_dots_is_unparsable() {
            assert!(parse_numeric("1.2.3").is_err());
            assert!(parse_numeric(".").is_err());
        }

        #[test]
        fn test_sign_is_stripped() {
            assert_eq!(parse_numeric("-3").unwrap(), 3.0);
        }
    }

    mod lexicographic_tests {
        use super::*;

        #[test]
        fn test_surnames() {
            let order =
                expected_order(&strings(&["Smith", "Adams", "Lee"]), SortMode::Lexicographic)
                    .unwrap();
            assert_eq!(order.ascending, strings(&["Adams", "Lee", "Smith"]));
            assert_eq!(order.descending, strings(&["Smith", "Lee", "Adams"]));
        }

        #[test]
        fn test_case_sensitive_ordinal() {
            let order =
                expected_order(&strings(&["adams", "Zed", "bach"]), SortMode::Lexicographic)
                    .unwrap();
            assert_eq!(order.ascending, strings(&["Zed", "adams", "bach"]));
        }

        #[test]
        fn test_digits_as_text() {
            let order =
                expected_order(&strings(&["100", "5", "40"]), SortMode::Lexicographic).unwrap();
            assert_eq!(order.ascending, strings(&["100", "40", "5"]));
        }

        #[test]
        fn test_empty() {
            let order = expected_order(&[], SortMode::Lexicographic).unwrap();
            assert!(order.ascending.is_empty());
            assert!(order.descending.is_empty());
        }
    }

    mod numeric_tests {
        use super::*;

        #[test]
        fn test_dues() {
            let order = expected_order(
                &strings(&["$40.50", "$5.00", "$100.00"]),
                SortMode::Numeric,
            )
            .unwrap();
            assert_eq!(order.ascending, strings(&["$5.00", "$40.50", "$100.00"]));
            assert_eq!(order.descending, strings(&["$100.00", "$40.50", "$5.00"]));
        }

        #[test]
        fn test_unparsable_cell_fails_whole_column() {
            let err = expected_order(&strings(&["$1.00", "N/A"]), SortMode::Numeric).unwrap_err();
            assert!(matches!(err, SortProbeError::UnparsableValue { .. }));
        }

        #[test]
        fn test_ties_are_stable_ascending() {
            let order = expected_order(
                &strings(&["$5", "$1", "5.00", "$5.0"]),
                SortMode::Numeric,
            )
            .unwrap();
            assert_eq!(order.ascending, strings(&["$1", "$5", "5.00", "$5.0"]));
        }

        #[test]
        fn test_ties_are_reversed_descending() {
            let order = expected_order(
                &strings(&["$5", "$1", "5.00", "$5.0"]),
                SortMode::Numeric,
            )
            .unwrap();
            assert_eq!(order.descending, strings(&["$5.0", "5.00", "$5", "$1"]));
        }
    }

    mod matches_tests {
        use super::*;

        #[test]
        fn test_lexicographic_is_exact() {
            let a = strings(&["a", "b"]);
            assert!(SortMode::Lexicographic.matches(&a, &a).unwrap());
            assert!(!SortMode::Lexicographic
                .matches(&a, &strings(&["b", "a"]))
                .unwrap());
        }

        #[test]
        fn test_numeric_compares_parsed_values() {
            assert!(SortMode::Numeric
                .matches(&strings(&["$5", "10"]), &strings(&["5.00", "$10.00"]))
                .unwrap());
            assert!(!SortMode::Numeric
                .matches(&strings(&["$5", "10"]), &strings(&["10", "$5"]))
                .unwrap());
        }

        #[test]
        fn test_numeric_length_mismatch() {
            assert!(!SortMode::Numeric
                .matches(&strings(&["1"]), &strings(&["1", "2"]))
                .unwrap());
        }
    }

    mod mode_tests {
        use super::*;

        #[test]
        fn test_default_is_lexicographic() {
            assert_eq!(SortMode::default(), SortMode::Lexicographic);
        }

        #[test]
        fn test_display() {
            assert_eq!(SortMode::Numeric.to_string(), "numeric");
            assert_eq!(SortMode::Lexicographic.to_string(), "lexicographic");
        }
    }

    proptest! {
        #[test]
        fn prop_lexicographic_ascending_is_sorted_permutation(
            values in prop::collection::vec("[ -~]{0,8}", 0..20)
        ) {
            let order = expected_order(&values, SortMode::Lexicographic).unwrap();
            prop_assert!(order.ascending.windows(2).all(|w| w[0] <= w[1]));

            let mut a = order.ascending.clone();
            let mut b = values.clone();
            a.sort();
            b.sort();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_numeric_descending_is_reverse_of_ascending(
            amounts in prop::collection::vec(0u32..10_000, 0..20)
        ) {
            let values: Vec<String> = amounts
                .iter()
                .map(|cents| format!("${}.{:02}", cents / 100, cents % 100))
                .collect();
            let order = expected_order(&values, SortMode::Numeric).unwrap();

            let mut reversed = order.ascending.clone();
            reversed.reverse();
            prop_assert_eq!(reversed, order.descending);

            let keys: Vec<f64> = order
                .ascending
                .iter()
                .map(|v| parse_numeric(v).unwrap())
                .collect();
            prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
