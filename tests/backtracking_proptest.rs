//! Property-based tests for the backtracking protocol
//!
//! Whatever the input, a parser that does not match must leave the cursor
//! exactly where it started, and bounded repetition must consume exactly as
//! many matches as its bounds allow.

use braid::parser::{any_char, as_string, char_set, lit, many, repeat, text, ParseState, Parser};
use braid::Value;
use proptest::prelude::*;

/// A handful of parsers with different failure points.
fn parsers() -> Vec<Parser> {
    vec![
        text("ab") + text("ba"),
        text("a") | text("b") + text("c"),
        repeat(char_set("ab"), 3, Some(5)),
        many(text("ab")) + lit("c"),
        (text("a") + text("b")) | (text("a") + text("a") + text("b")),
    ]
}

/// Inputs over a small alphabet so that partial matches are common.
fn input_strategy() -> impl Strategy<Value = String> {
    "[abc]{0,12}"
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_failure_restores_position(input in input_strategy(), skip in 0usize..4) {
            for parser in parsers() {
                let mut state = ParseState::new(&input);
                let start = skip.min(input.len());
                state.restore(start);
                let result = parser.parse(&mut state);
                prop_assert!(result.is_ok());
                match result.unwrap() {
                    Some(_) => prop_assert!(state.position() >= start),
                    None => prop_assert_eq!(state.position(), start),
                }
                prop_assert!(state.scopes().is_empty());
            }
        }

        #[test]
        fn test_bounded_repeat_consumes_within_bounds(count in 0usize..10) {
            let input = "a".repeat(count);
            let mut state = ParseState::new(&input);
            let result = repeat(char_set("a"), 2, Some(4)).parse(&mut state).unwrap();
            if count < 2 {
                prop_assert_eq!(result, None);
                prop_assert_eq!(state.position(), 0);
            } else {
                prop_assert!(result.is_some());
                prop_assert_eq!(state.position(), count.min(4));
            }
        }

        #[test]
        fn test_many_any_char_reads_everything(input in "\\PC{0,20}") {
            let parsed = braid::parse(&as_string(many(any_char())), &input).unwrap();
            prop_assert_eq!(parsed.value, Some(Value::from(input.as_str())));
            prop_assert!(parsed.remaining.is_empty());
        }
    }
}
