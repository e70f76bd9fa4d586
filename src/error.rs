//! # Faults
//!
//! Parsing has two disjoint failure classes:
//!
//! - An input mismatch is an ordinary parse failure. It is represented as
//!   `Ok(None)` in a [`crate::parser::ParseResult`] and is never raised.
//! - A [`Fault`] signals a defect in how the grammar was built or used: an
//!   unbound rule, a bad argument reference, an operator applied to values it
//!   does not support. Faults propagate through `?` and abort the parse that
//!   triggered them. They are never converted into parse failures.

use thiserror::Error;

use crate::attr::AttrType;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    /// A rule was invoked, or its attribute type requested, before a body
    /// was bound to it.
    #[error("rule '{name}' is not bound to a parser")]
    UnboundRule { name: String },

    /// A call site outlived the rule it refers to.
    #[error("rule '{name}' was dropped while a call site still refers to it")]
    RuleDropped { name: String },

    #[error("rule '{rule}' expects attribute type {expected}, but its body produces {found}")]
    AttrTypeMismatch {
        rule: String,
        expected: AttrType,
        found: AttrType,
    },

    /// A variable action was evaluated outside of any rule invocation.
    #[error("variable '{name}' accessed outside of any rule scope")]
    MissingScope { name: String },

    #[error("positional argument {index} out of range ({len} available)")]
    ArgIndexOutOfRange { index: usize, len: usize },

    #[error("missing keyword argument '{name}'")]
    MissingKwArg { name: String },

    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("invalid variable name '{name}'")]
    InvalidVariableName { name: String },

    #[error("invalid attribute: {reason}")]
    InvalidAttr { reason: String },

    #[error("symbol table must not be empty")]
    EmptySymbols,

    #[error("value of type {found} is not callable")]
    NotCallable { found: &'static str },

    #[error("expected a string for {what}, found {found}")]
    NotAString { what: &'static str, found: &'static str },

    #[error("unsupported operand types for {op}: {lhs} and {rhs}")]
    UnsupportedOperand {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("unsupported operand type for unary {op}: {operand}")]
    UnsupportedUnary {
        op: &'static str,
        operand: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {op}")]
    Overflow { op: &'static str },

    #[error("rule '{name}' exceeded the maximum recursion depth of {limit}")]
    RecursionLimit { name: String, limit: usize },

    /// Raised by user-supplied functions.
    #[error("{0}")]
    Custom(String),
}

impl Fault {
    pub fn custom(message: impl Into<String>) -> Self {
        Fault::Custom(message.into())
    }

    pub fn invalid_attr(reason: impl Into<String>) -> Self {
        Fault::InvalidAttr {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_rule_name() {
        let fault = Fault::UnboundRule {
            name: "expr".to_string(),
        };
        assert_eq!(fault.to_string(), "rule 'expr' is not bound to a parser");
    }

    #[test]
    fn test_display_attr_mismatch() {
        let fault = Fault::AttrTypeMismatch {
            rule: "tag".to_string(),
            expected: AttrType::String,
            found: AttrType::Unused,
        };
        assert_eq!(
            fault.to_string(),
            "rule 'tag' expects attribute type STRING, but its body produces UNUSED"
        );
    }
}
