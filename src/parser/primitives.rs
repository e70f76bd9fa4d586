use crate::action::Action;
use crate::attr::AttrType;
use crate::error::Fault;
use crate::value::Value;

use super::Parser;

/// Predefined character classes.
#[derive(Debug, Clone, Copy)]
pub enum CharClass {
    Alnum,
    Alpha,
    /// Space or tab.
    Blank,
    /// ASCII `0`-`9`.
    Digit,
    Lower,
    /// Anything but control characters.
    Printable,
    /// Any whitespace.
    Space,
    Upper,
    /// ASCII hexadecimal digits.
    XDigit,
    Custom(fn(char) -> bool),
}

impl CharClass {
    pub fn matches(self, c: char) -> bool {
        match self {
            CharClass::Alnum => c.is_alphanumeric(),
            CharClass::Alpha => c.is_alphabetic(),
            CharClass::Blank => c == ' ' || c == '\t',
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Lower => c.is_lowercase(),
            CharClass::Printable => !c.is_control(),
            CharClass::Space => c.is_whitespace(),
            CharClass::Upper => c.is_uppercase(),
            CharClass::XDigit => c.is_ascii_hexdigit(),
            CharClass::Custom(predicate) => predicate(c),
        }
    }
}

/// Any single character.
pub fn any_char() -> Parser {
    Parser::Char(None)
}

/// A single character from `allowed`.
pub fn char_set(allowed: &str) -> Parser {
    Parser::Char(Some(allowed.chars().collect()))
}

pub fn char_class(class: CharClass) -> Parser {
    Parser::Class(class)
}

pub fn alnum() -> Parser {
    char_class(CharClass::Alnum)
}

pub fn alpha() -> Parser {
    char_class(CharClass::Alpha)
}

pub fn blank() -> Parser {
    char_class(CharClass::Blank)
}

pub fn digit() -> Parser {
    char_class(CharClass::Digit)
}

pub fn lower() -> Parser {
    char_class(CharClass::Lower)
}

pub fn printable() -> Parser {
    char_class(CharClass::Printable)
}

pub fn space() -> Parser {
    char_class(CharClass::Space)
}

pub fn upper() -> Parser {
    char_class(CharClass::Upper)
}

pub fn xdigit() -> Parser {
    char_class(CharClass::XDigit)
}

/// A single character accepted by `predicate`.
pub fn char_if(predicate: fn(char) -> bool) -> Parser {
    char_class(CharClass::Custom(predicate))
}

/// Match `text` exactly, yielding `Unused`.
///
/// The text is an action, so it may refer to the arguments of the enclosing
/// rule: `lit(arg(0))`.
pub fn lit(text: impl Into<Action>) -> Parser {
    Parser::Literal {
        text: text.into(),
        keep: false,
    }
}

/// Match `text` exactly, yielding the matched string.
pub fn text(text: impl Into<Action>) -> Parser {
    Parser::Literal {
        text: text.into(),
        keep: true,
    }
}

/// Yield `value` without consuming input. The attribute type is inferred.
pub fn attr(value: impl Into<Value>) -> Result<Parser, Fault> {
    let value = value.into();
    let attr_type = AttrType::of(&value);
    attr_typed(value, attr_type)
}

pub fn attr_typed(value: impl Into<Value>, attr_type: AttrType) -> Result<Parser, Fault> {
    let value = value.into();
    if value.is_unused() {
        return Err(Fault::invalid_attr("an attribute cannot be UNUSED"));
    }
    if attr_type == AttrType::Unused {
        return Err(Fault::invalid_attr("attribute type cannot be UNUSED"));
    }
    if !attr_type.accepts(&value) {
        return Err(Fault::invalid_attr(format!(
            "{} is not of type {}",
            value, attr_type
        )));
    }
    Ok(Parser::Attr { value, attr_type })
}

/// Match the longest key of `table` and yield its value.
///
/// The attribute type is the type shared by all values, `Object` when they
/// differ.
pub fn symbols<K, V>(table: impl IntoIterator<Item = (K, V)>) -> Result<Parser, Fault>
where
    K: Into<String>,
    V: Into<Value>,
{
    let table = symbol_table(table)?;
    let attr_type = AttrType::common(table.iter().map(|(_, value)| AttrType::of(value)));
    Ok(Parser::Symbols { table, attr_type })
}

pub fn symbols_typed<K, V>(
    table: impl IntoIterator<Item = (K, V)>,
    attr_type: AttrType,
) -> Result<Parser, Fault>
where
    K: Into<String>,
    V: Into<Value>,
{
    let table = symbol_table(table)?;
    if let Some((key, value)) = table.iter().find(|(_, value)| !attr_type.accepts(value)) {
        return Err(Fault::invalid_attr(format!(
            "symbol '{}' maps to {}, which is not of type {}",
            key, value, attr_type
        )));
    }
    Ok(Parser::Symbols { table, attr_type })
}

fn symbol_table<K, V>(table: impl IntoIterator<Item = (K, V)>) -> Result<Vec<(String, Value)>, Fault>
where
    K: Into<String>,
    V: Into<Value>,
{
    let mut table: Vec<(String, Value)> = table
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect();
    if table.is_empty() {
        return Err(Fault::EmptySymbols);
    }
    if let Some((key, _)) = table.iter().find(|(_, value)| value.is_unused()) {
        return Err(Fault::invalid_attr(format!("symbol '{}' maps to UNUSED", key)));
    }
    // stable, so keys of equal length keep their given order
    table.sort_by_key(|(key, _)| std::cmp::Reverse(key.chars().count()));
    Ok(table)
}

/// Succeed at the end of input, after skipping.
pub fn eoi() -> Parser {
    Parser::EndOfInput { skipper: None }
}

/// Like [`eoi`], with its own skipper in place of the configured one.
pub fn eoi_with(skipper: impl Into<Parser>) -> Parser {
    Parser::EndOfInput {
        skipper: Some(Box::new(skipper.into())),
    }
}

/// Always succeed without consuming input.
pub fn eps() -> Parser {
    Parser::Epsilon
}

impl From<&str> for Parser {
    fn from(text: &str) -> Self {
        lit(text)
    }
}

impl From<String> for Parser {
    fn from(text: String) -> Self {
        lit(text)
    }
}

impl From<char> for Parser {
    fn from(c: char) -> Self {
        lit(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_classes() {
        assert!(CharClass::Blank.matches('\t'));
        assert!(!CharClass::Blank.matches('\n'));
        assert!(CharClass::Space.matches('\n'));
        assert!(CharClass::XDigit.matches('F'));
        assert!(!CharClass::Digit.matches('a'));
        assert!(!CharClass::Printable.matches('\u{7}'));
        assert!(CharClass::Custom(|c| c == '_').matches('_'));
    }

    #[test]
    fn test_attr_rejects_unused() {
        assert!(matches!(attr(Value::Unused), Err(Fault::InvalidAttr { .. })));
        assert!(matches!(
            attr_typed("x", AttrType::Unused),
            Err(Fault::InvalidAttr { .. })
        ));
        assert!(matches!(
            attr_typed(1, AttrType::String),
            Err(Fault::InvalidAttr { .. })
        ));
    }

    #[test]
    fn test_symbols_sorted_longest_first() {
        let parser = symbols([("<", 1), ("<=", 2), ("<<=", 3)]).unwrap();
        let Parser::Symbols { table, attr_type } = parser else {
            panic!("expected a symbol table");
        };
        let keys: Vec<_> = table.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["<<=", "<=", "<"]);
        assert_eq!(attr_type, AttrType::Object);
    }

    #[test]
    fn test_symbols_type_inference() {
        let Parser::Symbols { attr_type, .. } = symbols([("a", "x"), ("b", "y")]).unwrap() else {
            panic!("expected a symbol table");
        };
        assert_eq!(attr_type, AttrType::String);

        let Parser::Symbols { attr_type, .. } =
            symbols([("a", Value::from("x")), ("b", Value::Int(1))]).unwrap()
        else {
            panic!("expected a symbol table");
        };
        assert_eq!(attr_type, AttrType::Object);
    }

    #[test]
    fn test_symbols_rejects_empty_and_mistyped() {
        let empty: Vec<(&str, i64)> = Vec::new();
        assert_eq!(symbols(empty).unwrap_err(), Fault::EmptySymbols);
        assert!(symbols_typed([("a", 1)], AttrType::String).is_err());
    }
}
