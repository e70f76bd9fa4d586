//! # Parsers
//!
//! A [`Parser`] is a tree of combinator nodes. Every node implements the same
//! protocol: [`Parser::parse`] remembers the cursor position, runs the node,
//! and rewinds to the remembered position unless the node succeeded. Because
//! every node does this, any composition backtracks fully.
//!
//! ```
//! use braid::parser::{digit, many1, as_string};
//! use braid::value::Value;
//!
//! let number = as_string(many1(digit()));
//! let parsed = braid::parse(&number, "42abc").unwrap();
//! assert_eq!(parsed.value, Some(Value::from("42")));
//! assert_eq!(parsed.remaining, "abc");
//! ```
//!
//! Parsers are built with the constructor functions of this module and
//! composed with `+` (sequence), `|` (ordered choice) and `>>` (attach an
//! [`Action`]).
//!
//! ## Related Modules
//!
//! - [`crate::rule`] - Named, recursive parsers with scoped variables
//! - [`crate::action`] - The deferred expressions evaluated on success

mod combinators;
mod primitives;
mod state;

pub use combinators::*;
pub use primitives::*;
pub use state::{ParseConfig, ParseState, DEFAULT_MAX_DEPTH};

use crate::action::Action;
use crate::attr::AttrType;
use crate::error::Fault;
use crate::rule::RuleCall;
use crate::value::Value;

/// Outcome of one parse attempt.
///
/// `Ok(Some(value))` is a match, `Ok(None)` an ordinary mismatch, and
/// `Err(fault)` a misuse of the grammar that aborts the whole parse.
pub type ParseResult = Result<Option<Value>, Fault>;

/// A node of a parser tree.
#[derive(Debug, Clone)]
pub enum Parser {
    /// One character, from the set if one is given.
    Char(Option<Vec<char>>),
    Class(CharClass),
    /// An exact string, computed when the parser runs.
    Literal { text: Action, keep: bool },
    Sequence(Vec<Parser>),
    Alternation(Vec<Parser>),
    /// Between `min` and `max` matches, unbounded without `max`.
    Repeat {
        parser: Box<Parser>,
        min: usize,
        max: Option<usize>,
    },
    Action {
        parser: Box<Parser>,
        action: Action,
    },
    Call(RuleCall),
    /// A constant, consuming nothing.
    Attr { value: Value, attr_type: AttrType },
    /// Keys sorted longest first.
    Symbols {
        table: Vec<(String, Value)>,
        attr_type: AttrType,
    },
    Omit(Box<Parser>),
    AsString(Box<Parser>),
    Lexeme(Box<Parser>),
    EndOfInput { skipper: Option<Box<Parser>> },
    Epsilon,
}

impl Parser {
    /// Run this parser, rewinding the cursor unless it matched.
    pub fn parse(&self, state: &mut ParseState) -> ParseResult {
        state.backtrack(|state| self.attempt(state))
    }

    fn attempt(&self, state: &mut ParseState) -> ParseResult {
        match self {
            Parser::Char(set) => {
                state.skip()?;
                Ok(state
                    .read_one()
                    .filter(|c| set.as_ref().map_or(true, |set| set.contains(c)))
                    .map(Value::from))
            }
            Parser::Class(class) => {
                state.skip()?;
                Ok(state
                    .read_one()
                    .filter(|c| class.matches(*c))
                    .map(Value::from))
            }
            Parser::Literal { text, keep } => {
                state.skip()?;
                let text = literal_text(text, state)?;
                if !text.chars().all(|expected| state.read_one() == Some(expected)) {
                    return Ok(None);
                }
                Ok(Some(if *keep { Value::Str(text) } else { Value::Unused }))
            }
            Parser::Sequence(children) => Ok(sequence_values(children, state)?.map(collapse)),
            Parser::Alternation(children) => {
                for child in children {
                    if let Some(value) = child.parse(state)? {
                        return Ok(Some(value));
                    }
                }
                Ok(None)
            }
            Parser::Repeat { parser, min, max } => repeat_values(parser, *min, *max, state),
            Parser::Action { parser, action } => match parser.parse_args(state)? {
                Some(args) => state.evaluate_with(action, &args).map(Some),
                None => Ok(None),
            },
            Parser::Call(call) => call.invoke(state),
            Parser::Attr { value, .. } => Ok(Some(value.clone())),
            Parser::Symbols { table, .. } => {
                state.skip()?;
                for (key, value) in table {
                    let matched = state.backtrack(|state| {
                        Ok(key
                            .chars()
                            .all(|expected| state.read_one() == Some(expected))
                            .then_some(()))
                    })?;
                    if matched.is_some() {
                        return Ok(Some(value.clone()));
                    }
                }
                Ok(None)
            }
            Parser::Omit(parser) => Ok(parser.parse(state)?.map(|_| Value::Unused)),
            Parser::AsString(parser) => Ok(parser
                .parse(state)?
                .map(|value| Value::Str(value.to_text()))),
            Parser::Lexeme(parser) => {
                state.skip()?;
                state.without_skipping(|state| parser.parse(state))
            }
            Parser::EndOfInput { skipper } => {
                match skipper {
                    Some(skipper) => state.skip_with(skipper)?,
                    None => state.skip()?,
                }
                Ok(state.is_at_end().then_some(Value::Unused))
            }
            Parser::Epsilon => Ok(Some(Value::Unused)),
        }
    }

    /// Run this parser and split the match into positional action arguments.
    ///
    /// A sequence contributes each of its non-`Unused` child values; any
    /// other parser contributes its value, or nothing when it is `Unused`.
    fn parse_args(&self, state: &mut ParseState) -> Result<Option<Vec<Value>>, Fault> {
        match self {
            Parser::Sequence(children) => {
                state.backtrack(|state| sequence_values(children, state))
            }
            other => Ok(other.parse(state)?.map(|value| {
                if value.is_unused() {
                    Vec::new()
                } else {
                    vec![value]
                }
            })),
        }
    }

    /// The shape of the value this parser produces.
    ///
    /// Faults when the parser reaches a rule that is unbound or dropped.
    pub fn attr_type(&self) -> Result<AttrType, Fault> {
        Ok(match self {
            Parser::Char(_) | Parser::Class(_) | Parser::AsString(_) => AttrType::String,
            Parser::Literal { keep: true, .. } => AttrType::String,
            Parser::Literal { keep: false, .. } => AttrType::Unused,
            Parser::Sequence(children) => {
                let mut used = Vec::new();
                for child in children {
                    let ty = child.attr_type()?;
                    if ty != AttrType::Unused {
                        used.push(ty);
                    }
                }
                match used.as_slice() {
                    [] => AttrType::Unused,
                    [single] => *single,
                    _ => AttrType::Tuple,
                }
            }
            Parser::Alternation(children) => AttrType::common(
                children
                    .iter()
                    .map(Parser::attr_type)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Parser::Repeat { parser, .. } => match parser.attr_type()? {
                AttrType::Unused => AttrType::Unused,
                _ => AttrType::Tuple,
            },
            Parser::Action { .. } => AttrType::Object,
            Parser::Call(call) => call.attr_type()?,
            Parser::Attr { attr_type, .. } | Parser::Symbols { attr_type, .. } => *attr_type,
            Parser::Lexeme(parser) => parser.attr_type()?,
            Parser::Omit(_) | Parser::EndOfInput { .. } | Parser::Epsilon => AttrType::Unused,
        })
    }
}

fn literal_text(text: &Action, state: &mut ParseState) -> Result<String, Fault> {
    let value = match text {
        Action::Const(value) => value.clone(),
        computed => state.evaluate(computed)?,
    };
    match value {
        Value::Str(text) => Ok(text),
        other => Err(Fault::NotAString {
            what: "literal text",
            found: other.type_name(),
        }),
    }
}

/// Values of all children, `Unused` ones dropped. `None` as soon as one
/// child fails.
fn sequence_values(children: &[Parser], state: &mut ParseState) -> Result<Option<Vec<Value>>, Fault> {
    let mut values = Vec::with_capacity(children.len());
    for child in children {
        match child.parse(state)? {
            Some(Value::Unused) => {}
            Some(value) => values.push(value),
            None => return Ok(None),
        }
    }
    Ok(Some(values))
}

fn collapse(mut values: Vec<Value>) -> Value {
    match values.len() {
        0 => Value::Unused,
        1 => values.remove(0),
        _ => Value::Tuple(values),
    }
}

fn repeat_values(
    parser: &Parser,
    min: usize,
    max: Option<usize>,
    state: &mut ParseState,
) -> ParseResult {
    let mut count = 0;
    let mut values = Vec::new();
    while max.map_or(true, |max| count < max) {
        let before = state.position();
        let Some(value) = parser.parse(state)? else {
            break;
        };
        count += 1;
        if !value.is_unused() {
            values.push(value);
        }
        // an unbounded loop over a match that consumed nothing would never end
        if max.is_none() && state.position() == before {
            break;
        }
    }
    if count < min {
        return Ok(None);
    }
    // the shape follows the inner type, however often it matched
    if values.is_empty() && parser.attr_type()? == AttrType::Unused {
        return Ok(Some(Value::Unused));
    }
    Ok(Some(Value::Tuple(values)))
}
