//! # Braid - Backtracking Parser Combinators
//!
//! Braid builds recursive-descent parsers out of small composable pieces:
//! character matchers, sequences, ordered choice, repetition and named rules.
//! Semantic actions attached to parsers turn matched input into values while
//! parsing proceeds.
//!
//! ## Architecture Overview
//!
//! 1. **Cursor** (`cursor`) - Seekable character stream with O(1) save/restore
//! 2. **Parsers** (`parser`) - Combinator nodes sharing one backtracking protocol
//! 3. **Rules** (`rule`, `scope`) - Named recursive parsers with per-invocation scopes
//! 4. **Actions** (`action`) - Deferred expressions evaluated against a match
//!
//! ```text
//! input (&str)
//!     ↓
//! [Cursor] ← position saved/restored by every parser
//!     ↓
//! [Parser tree] → Rule calls open Scopes
//!     ↓
//! [Actions] → Value
//! ```
//!
//! ## Key Design Decisions
//!
//! ### Failure vs. Fault
//! A parser that does not match returns `Ok(None)` and leaves the cursor where
//! it found it. `Err(Fault)` is reserved for mistakes in the grammar itself,
//! such as calling an unbound rule or referencing a missing argument, and
//! aborts the parse.
//!
//! ### Deferred Actions
//! Actions are expression trees built with ordinary Rust operators
//! (`arg(0) * 2 + var("n")`) and evaluated only when their parser matches.
//!
//! ### Rules Without Cycles
//! A [`rule::Rule`] handle owns its body. Call sites hold weak references, so
//! recursive grammars do not leak.
//!
//! ## Example
//!
//! ```
//! use braid::action::{arg, call, func};
//! use braid::parser::{as_string, digit, lexeme, many1, ParseConfig};
//! use braid::value::Value;
//!
//! let to_int = func("int", |args, _| {
//!     let text = args.first().and_then(Value::as_str).unwrap_or_default();
//!     text.parse::<i64>()
//!         .map(Value::Int)
//!         .map_err(|e| braid::Fault::custom(e.to_string()))
//! });
//! let number = lexeme(as_string(many1(digit()))) >> call(to_int, [arg(0)]);
//! let sum = (number.clone() + "+" + number) >> arg(0) + arg(1);
//!
//! let config = ParseConfig::new().skipper(" ");
//! let parsed = braid::parse_with(&sum, " 12 + 30", config).unwrap();
//! assert_eq!(parsed.value, Some(Value::Int(42)));
//! ```
//!
//! ## Module Structure
//!
//! - [`action`] - Deferred actions and their operators
//! - [`attr`] - Attribute types of parser values
//! - [`cursor`] - Input cursor
//! - [`error`] - Faults
//! - [`parser`] - Parser nodes, constructors and parse state
//! - [`rule`] - Rules, rule calls and grammars
//! - [`scope`] - Per-invocation argument and variable storage
//! - [`value`] - Runtime values

pub mod action;
pub mod attr;
pub mod cursor;
pub mod error;
pub mod parser;
pub mod rule;
pub mod scope;
pub mod value;

pub use attr::AttrType;
pub use error::Fault;
pub use parser::{ParseConfig, ParseResult, ParseState, Parser};
pub use rule::{Grammar, Rule};
pub use value::Value;

/// Outcome of a top-level parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// The value of the match, `None` when the input did not match.
    pub value: Option<Value>,
    /// Where the cursor stopped: after the match, or at the start on failure.
    pub position: usize,
    /// The furthest offset any read was attempted at.
    pub furthest: usize,
    /// Input left after `position`.
    pub remaining: String,
}

impl Parsed {
    pub fn is_match(&self) -> bool {
        self.value.is_some()
    }

    /// Matched and consumed the whole input.
    pub fn is_complete(&self) -> bool {
        self.is_match() && self.remaining.is_empty()
    }
}

/// Parse `input` with the default configuration.
pub fn parse(parser: &Parser, input: &str) -> Result<Parsed, Fault> {
    parse_with(parser, input, ParseConfig::default())
}

pub fn parse_with(parser: &Parser, input: &str, config: ParseConfig) -> Result<Parsed, Fault> {
    let mut state = ParseState::with_config(input, config);
    let value = parser.parse(&mut state)?;
    Ok(Parsed {
        value,
        position: state.position(),
        furthest: state.furthest(),
        remaining: state.cursor().remaining(),
    })
}
