use std::fmt;

use crate::value::Value;

/// Coarse shape of the value a parser produces.
///
/// Attribute types are checked once, when a body is bound to a typed
/// [`crate::rule::Rule`]. They play no part in parsing itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrType {
    /// The parser yields [`Value::Unused`].
    Unused,
    /// A single string, such as one matched character.
    String,
    /// A fixed sequence of values.
    Tuple,
    /// Anything else.
    Object,
}

impl AttrType {
    /// Classify a concrete value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Unused => AttrType::Unused,
            Value::Str(_) => AttrType::String,
            Value::Tuple(_) => AttrType::Tuple,
            _ => AttrType::Object,
        }
    }

    /// Whether `value` may be produced by a parser of this type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            AttrType::Object => !matches!(value, Value::Unused),
            other => other == AttrType::of(value),
        }
    }

    /// The type shared by every member, `Object` when they disagree and
    /// `Unused` when there are none.
    pub fn common(types: impl IntoIterator<Item = AttrType>) -> Self {
        let mut types = types.into_iter();
        let Some(first) = types.next() else {
            return AttrType::Unused;
        };
        if types.all(|ty| ty == first) {
            first
        } else {
            AttrType::Object
        }
    }

    pub fn pretty(self) -> &'static str {
        match self {
            AttrType::Unused => "UNUSED",
            AttrType::String => "STRING",
            AttrType::Tuple => "TUPLE",
            AttrType::Object => "OBJECT",
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}
