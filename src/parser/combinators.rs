use std::ops::{Add, BitOr, Shr};

use crate::action::Action;

use super::Parser;

// === Combinators as methods ===

impl Parser {
    /// Sequence: `self` followed by `next`. Nested sequences are flattened.
    pub fn then(self, next: impl Into<Parser>) -> Parser {
        let mut children = match self {
            Parser::Sequence(children) => children,
            other => vec![other],
        };
        match next.into() {
            Parser::Sequence(more) => children.extend(more),
            other => children.push(other),
        }
        Parser::Sequence(children)
    }

    /// Ordered choice: `self`, or else `other`. Nested alternations are
    /// flattened.
    pub fn or(self, other: impl Into<Parser>) -> Parser {
        let mut children = match self {
            Parser::Alternation(children) => children,
            first => vec![first],
        };
        match other.into() {
            Parser::Alternation(more) => children.extend(more),
            other => children.push(other),
        }
        Parser::Alternation(children)
    }

    /// Evaluate `action` against the match.
    pub fn map(self, action: impl Into<Action>) -> Parser {
        Parser::Action {
            parser: Box::new(self),
            action: action.into(),
        }
    }

    pub fn repeated(self, min: usize, max: Option<usize>) -> Parser {
        repeat(self, min, max)
    }
}

// === Operator Overloading ===

/// `+` for sequence
impl<R: Into<Parser>> Add<R> for Parser {
    type Output = Parser;

    fn add(self, rhs: R) -> Parser {
        self.then(rhs)
    }
}

/// `"<" + p` starts a sequence with a literal
impl Add<Parser> for &str {
    type Output = Parser;

    fn add(self, rhs: Parser) -> Parser {
        Parser::from(self).then(rhs)
    }
}

/// `|` for ordered choice
impl<R: Into<Parser>> BitOr<R> for Parser {
    type Output = Parser;

    fn bitor(self, rhs: R) -> Parser {
        self.or(rhs)
    }
}

/// `>>` for attaching an action
impl<A: Into<Action>> Shr<A> for Parser {
    type Output = Parser;

    fn shr(self, action: A) -> Parser {
        self.map(action)
    }
}

// === Composite Parsers ===

pub fn seq<P: Into<Parser>>(parsers: impl IntoIterator<Item = P>) -> Parser {
    parsers
        .into_iter()
        .fold(Parser::Sequence(Vec::new()), |acc, next| acc.then(next))
}

pub fn alt<P: Into<Parser>>(parsers: impl IntoIterator<Item = P>) -> Parser {
    parsers
        .into_iter()
        .fold(Parser::Alternation(Vec::new()), |acc, next| acc.or(next))
}

/// Between `min` and `max` matches, greedily. `None` leaves it unbounded.
pub fn repeat(parser: impl Into<Parser>, min: usize, max: Option<usize>) -> Parser {
    Parser::Repeat {
        parser: Box::new(parser.into()),
        min,
        max,
    }
}

/// Zero or one match.
///
/// Over a one-or-more repetition this relaxes the repetition to zero or more
/// instead of nesting it.
pub fn optional(parser: impl Into<Parser>) -> Parser {
    match parser.into() {
        Parser::Repeat {
            parser,
            min: 1,
            max,
        } => Parser::Repeat {
            parser,
            min: 0,
            max,
        },
        other => repeat(other, 0, Some(1)),
    }
}

/// Zero or more matches.
pub fn many(parser: impl Into<Parser>) -> Parser {
    repeat(parser, 0, None)
}

/// One or more matches.
pub fn many1(parser: impl Into<Parser>) -> Parser {
    repeat(parser, 1, None)
}

/// Match `parser` but yield `Unused`.
pub fn omit(parser: impl Into<Parser>) -> Parser {
    Parser::Omit(Box::new(parser.into()))
}

/// Match `parser` and yield its value flattened into one string.
pub fn as_string(parser: impl Into<Parser>) -> Parser {
    Parser::AsString(Box::new(parser.into()))
}

/// Skip once, then match `parser` with skipping suppressed.
pub fn lexeme(parser: impl Into<Parser>) -> Parser {
    Parser::Lexeme(Box::new(parser.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{any_char, digit, lit};

    #[test]
    fn test_then_flattens() {
        let parser = lit("a") + lit("b") + (lit("c") + lit("d"));
        match parser {
            Parser::Sequence(children) => assert_eq!(children.len(), 4),
            other => panic!("expected a sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_or_flattens() {
        let parser = lit("a") | (lit("b") | lit("c"));
        match parser {
            Parser::Alternation(children) => assert_eq!(children.len(), 3),
            other => panic!("expected an alternation, got {:?}", other),
        }
    }

    #[test]
    fn test_seq_and_alt_builders() {
        assert!(matches!(seq(["a", "b"]), Parser::Sequence(children) if children.len() == 2));
        assert!(matches!(alt([digit(), any_char()]), Parser::Alternation(children) if children.len() == 2));
    }

    #[test]
    fn test_optional_relaxes_many1() {
        match optional(many1(digit())) {
            Parser::Repeat { min, max, parser } => {
                assert_eq!((min, max), (0, None));
                assert!(matches!(*parser, Parser::Class(_)));
            }
            other => panic!("expected a repeat, got {:?}", other),
        }
        assert!(matches!(
            optional(digit()),
            Parser::Repeat {
                min: 0,
                max: Some(1),
                ..
            }
        ));
    }
}
