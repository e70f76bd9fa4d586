use std::rc::Rc;

use log::{debug, trace};

use crate::action::{Action, Env};
use crate::cursor::Cursor;
use crate::error::Fault;
use crate::scope::{Scope, ScopeStack};
use crate::value::{KwArgs, Value};

use super::Parser;

/// Default bound on nested rule invocations.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Settings applied to a [`ParseState`].
#[derive(Debug, Clone)]
pub struct ParseConfig {
    skipper: Option<Rc<Parser>>,
    max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            skipper: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser run before every primitive read to discard insignificant input.
    pub fn skipper(mut self, skipper: impl Into<Parser>) -> Self {
        self.skipper = Some(Rc::new(skipper.into()));
        self
    }

    /// Maximum number of rule invocations open at once.
    ///
    /// Every open invocation holds several native stack frames, one per
    /// combinator between the rule and its recursive call. Deep limits need a
    /// thread with a matching stack; lower the limit on small stacks so the
    /// parse faults with [`Fault::RecursionLimit`] before the stack runs out.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Everything a parse threads through the parser tree: the input cursor, the
/// scopes of the open rule invocations and the skipper.
pub struct ParseState {
    cursor: Cursor,
    scopes: ScopeStack,
    skipper: Option<Rc<Parser>>,
    skipping: bool,
    max_depth: usize,
}

impl ParseState {
    pub fn new(input: &str) -> Self {
        Self::with_config(input, ParseConfig::default())
    }

    pub fn with_config(input: &str, config: ParseConfig) -> Self {
        debug!(
            "parse state over {} chars (skipper: {}, max depth: {})",
            input.chars().count(),
            config.skipper.is_some(),
            config.max_depth
        );
        Self {
            cursor: Cursor::new(input),
            scopes: ScopeStack::new(),
            skipper: config.skipper,
            skipping: true,
            max_depth: config.max_depth,
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn restore(&mut self, position: usize) {
        if position != self.cursor.position() {
            trace!("backtrack {} -> {}", self.cursor.position(), position);
        }
        self.cursor.seek(position);
    }

    /// Run `attempt`, rewinding the cursor unless it succeeds.
    pub fn backtrack<T>(
        &mut self,
        attempt: impl FnOnce(&mut Self) -> Result<Option<T>, Fault>,
    ) -> Result<Option<T>, Fault> {
        let start = self.position();
        let result = attempt(self);
        if !matches!(result, Ok(Some(_))) {
            self.restore(start);
        }
        result
    }

    pub fn read_one(&mut self) -> Option<char> {
        self.cursor.read_one()
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    pub fn furthest(&self) -> usize {
        self.cursor.furthest()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// Run the configured skipper, if any. Does nothing while skipping is
    /// suppressed.
    pub fn skip(&mut self) -> Result<(), Fault> {
        match self.skipper.clone() {
            Some(skipper) if self.skipping => self.skip_with(&skipper),
            _ => Ok(()),
        }
    }

    /// Apply an explicit `skipper` until it fails or stops consuming input.
    /// Runs even where skipping is suppressed.
    pub fn skip_with(&mut self, skipper: &Parser) -> Result<(), Fault> {
        self.without_skipping(|state: &mut Self| -> Result<(), Fault> {
            loop {
                let before = state.position();
                if skipper.parse(state)?.is_none() || state.position() == before {
                    return Ok(());
                }
            }
        })
    }

    /// Run `f` with the skipper suppressed.
    pub fn without_skipping<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = self.skipping;
        self.skipping = false;
        let result = f(self);
        self.skipping = previous;
        result
    }

    /// Open the scope of a rule invocation.
    pub fn enter(&mut self, rule: &str, scope: Scope) -> Result<(), Fault> {
        if self.scopes.depth() >= self.max_depth {
            return Err(Fault::RecursionLimit {
                name: rule.to_string(),
                limit: self.max_depth,
            });
        }
        self.scopes.enter(scope);
        Ok(())
    }

    pub fn leave(&mut self) -> Option<Scope> {
        self.scopes.leave()
    }

    /// Evaluate `action` in the context of the innermost rule invocation:
    /// its arguments, keyword arguments and variables.
    pub fn evaluate(&mut self, action: &Action) -> Result<Value, Fault> {
        let (args, kwargs) = match self.scopes.current() {
            Some(scope) => (scope.args().to_vec(), scope.kwargs().clone()),
            None => (Vec::new(), KwArgs::new()),
        };
        action.evaluate(&mut Env::new(&args, &kwargs).with_scopes(&mut self.scopes))
    }

    /// Evaluate `action` against the values of a match, keeping the keyword
    /// arguments and variables of the innermost invocation.
    pub fn evaluate_with(&mut self, action: &Action, args: &[Value]) -> Result<Value, Fault> {
        let kwargs = self
            .scopes
            .current()
            .map(|scope| scope.kwargs().clone())
            .unwrap_or_default();
        action.evaluate(&mut Env::new(args, &kwargs).with_scopes(&mut self.scopes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{arg, set_var, var};
    use crate::parser::lit;

    #[test]
    fn test_backtrack_restores_on_failure() {
        let mut state = ParseState::new("abc");
        let result = state.backtrack(|state| {
            state.read_one();
            state.read_one();
            Ok(None::<Value>)
        });
        assert_eq!(result, Ok(None));
        assert_eq!(state.position(), 0);
        assert_eq!(state.furthest(), 1);
    }

    #[test]
    fn test_backtrack_keeps_success() {
        let mut state = ParseState::new("abc");
        let result = state.backtrack(|state| Ok(state.read_one()));
        assert_eq!(result, Ok(Some('a')));
        assert_eq!(state.position(), 1);
    }

    #[test]
    fn test_skip_consumes_repeatedly() {
        let mut state = ParseState::with_config("   x", ParseConfig::new().skipper(" "));
        state.skip().unwrap();
        assert_eq!(state.position(), 3);
    }

    #[test]
    fn test_skipping_suppressed() {
        let mut state = ParseState::with_config("  x", ParseConfig::new().skipper(lit(" ")));
        state.without_skipping(|state| state.skip()).unwrap();
        assert_eq!(state.position(), 0);
    }

    #[test]
    fn test_explicit_skipper_ignores_suppression() {
        let mut state = ParseState::new("  x");
        state
            .without_skipping(|state| state.skip_with(&lit(" ")))
            .unwrap();
        assert_eq!(state.position(), 2);
    }

    #[test]
    fn test_enter_respects_max_depth() {
        let mut state = ParseState::with_config("", ParseConfig::new().max_depth(1));
        state.enter("r", Scope::default()).unwrap();
        assert_eq!(
            state.enter("r", Scope::default()),
            Err(Fault::RecursionLimit {
                name: "r".to_string(),
                limit: 1
            })
        );
        assert!(state.leave().is_some());
        assert!(state.scopes().is_empty());
    }

    #[test]
    fn test_evaluate_uses_innermost_scope() {
        let mut state = ParseState::new("");
        state
            .enter("r", Scope::new(vec![Value::Int(7)], KwArgs::new()))
            .unwrap();
        assert_eq!(state.evaluate(&set_var("x", arg(0))), Ok(Value::Int(7)));
        assert_eq!(state.evaluate(&var("x")), Ok(Value::Int(7)));
        assert_eq!(
            state.evaluate_with(&arg(0), &[Value::from("match")]),
            Ok(Value::from("match"))
        );
    }

    #[test]
    fn test_evaluate_outside_rule() {
        let mut state = ParseState::new("");
        assert!(matches!(
            state.evaluate(&var("x")),
            Err(Fault::MissingScope { .. })
        ));
    }
}
