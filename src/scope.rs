use std::collections::BTreeMap;

use crate::error::Fault;
use crate::value::{KwArgs, Value};

/// Names starting with this prefix are reserved and cannot be assigned.
pub const RESERVED_PREFIX: &str = "_";

/// Arguments and local variables of one rule invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    args: Vec<Value>,
    kwargs: KwArgs,
    vars: BTreeMap<String, Value>,
}

impl Scope {
    pub fn new(args: Vec<Value>, kwargs: KwArgs) -> Self {
        Self {
            args,
            kwargs,
            vars: BTreeMap::new(),
        }
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwargs(&self) -> &KwArgs {
        &self.kwargs
    }

    /// Look up a local variable of this invocation only.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Set or create a local variable.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Result<(), Fault> {
        let name = name.into();
        if name.is_empty() || name.starts_with(RESERVED_PREFIX) {
            return Err(Fault::InvalidVariableName { name });
        }
        self.vars.insert(name, value);
        Ok(())
    }

    /// Local variables in name order.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// The scopes of all rule invocations currently open, innermost last.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the scope of a new invocation.
    pub fn enter(&mut self, scope: Scope) {
        self.frames.push(scope);
    }

    /// Close the innermost scope, dropping its variables.
    pub fn leave(&mut self) -> Option<Scope> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn current(&self) -> Option<&Scope> {
        self.frames.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Scope> {
        self.frames.last_mut()
    }

    /// Resolve a variable by searching from the innermost to the outermost
    /// scope.
    pub fn resolve(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Assign in the innermost scope.
    pub fn assign(&mut self, name: impl Into<String>, value: Value) -> Result<(), Fault> {
        let name = name.into();
        match self.frames.last_mut() {
            Some(scope) => scope.set(name, value),
            None => Err(Fault::MissingScope { name }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kwargs(pairs: &[(&str, &str)]) -> KwArgs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_args_and_kwargs() {
        let scope = Scope::new(
            vec![Value::Int(1), Value::Int(2), Value::Int(3)],
            kwargs(&[("a", "a"), ("b", "b")]),
        );
        assert_eq!(scope.args(), &[Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(scope.kwargs().get("b"), Some(&Value::from("b")));
    }

    #[test]
    fn test_set_and_get() {
        let mut scope = Scope::default();
        scope.set("a", Value::from("a")).unwrap();
        scope.set("b", Value::from("b")).unwrap();
        scope.set("a", Value::Int(1)).unwrap();
        assert_eq!(scope.get("a"), Some(&Value::Int(1)));
        assert_eq!(scope.get("missing"), None);
        let names: Vec<_> = scope.vars().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_reserved_names_rejected() {
        let mut scope = Scope::default();
        assert_eq!(
            scope.set("_a", Value::Int(1)),
            Err(Fault::InvalidVariableName {
                name: "_a".to_string()
            })
        );
        assert!(scope.set("", Value::Int(1)).is_err());
    }

    #[test]
    fn test_resolve_searches_outward() {
        let mut stack = ScopeStack::new();
        stack.enter(Scope::default());
        stack.assign("name", Value::from("outer")).unwrap();
        stack.enter(Scope::default());
        assert_eq!(stack.resolve("name"), Some(&Value::from("outer")));

        stack.assign("name", Value::from("inner")).unwrap();
        assert_eq!(stack.resolve("name"), Some(&Value::from("inner")));

        stack.leave();
        assert_eq!(stack.resolve("name"), Some(&Value::from("outer")));
    }

    #[test]
    fn test_assign_without_scope() {
        let mut stack = ScopeStack::new();
        assert!(matches!(
            stack.assign("x", Value::Int(1)),
            Err(Fault::MissingScope { .. })
        ));
    }
}
