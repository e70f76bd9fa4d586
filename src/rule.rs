//! # Rules
//!
//! A [`Rule`] is a named slot for a parser body. It can be referenced before
//! it is bound, which is what makes recursive grammars possible:
//!
//! ```
//! use braid::parser::{lit, eps};
//! use braid::rule::Rule;
//!
//! // parens := "(" parens ")" | eps
//! let parens = Rule::new("parens");
//! parens.bind(lit("(") + &parens + lit(")") | eps()).unwrap();
//!
//! let parsed = braid::parse(&parens.as_parser(), "(())").unwrap();
//! assert_eq!(parsed.remaining, "");
//! ```
//!
//! The [`Rule`] handle owns the slot. Call sites inside parser trees only
//! hold weak references, so a rule referring to itself is not a reference
//! cycle. Keep the handle (or a [`Grammar`]) alive while its parsers are in
//! use.
//!
//! Every invocation opens a fresh [`Scope`] holding the evaluated call
//! arguments and the invocation's local variables, and closes it again when
//! the body returns, whether it matched or not.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use log::{debug, trace};

use crate::action::Action;
use crate::attr::AttrType;
use crate::error::Fault;
use crate::parser::{ParseResult, ParseState, Parser};
use crate::scope::Scope;
use crate::value::{KwArgs, Value};

#[derive(Debug)]
pub struct RuleSlot {
    name: String,
    expected: Option<AttrType>,
    body: RefCell<Option<Rc<Parser>>>,
    // set while the body's type is computed, to cut off recursion
    resolving: Cell<bool>,
}

impl RuleSlot {
    fn body(&self) -> Result<Rc<Parser>, Fault> {
        self.body.borrow().clone().ok_or_else(|| Fault::UnboundRule {
            name: self.name.clone(),
        })
    }

    fn attr_type(&self) -> Result<AttrType, Fault> {
        if let Some(expected) = self.expected {
            return Ok(expected);
        }
        if self.resolving.get() {
            return Ok(AttrType::Object);
        }
        let body = self.body()?;
        self.resolving.set(true);
        let attr_type = body.attr_type();
        self.resolving.set(false);
        attr_type
    }
}

/// Handle to a named, possibly recursive parser.
#[derive(Debug, Clone)]
pub struct Rule {
    slot: Rc<RuleSlot>,
}

impl Rule {
    /// An unbound rule whose attribute type is taken from its body.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_expected(name.into(), None)
    }

    /// An unbound rule that only accepts bodies producing `attr_type`.
    pub fn typed(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self::with_expected(name.into(), Some(attr_type))
    }

    fn with_expected(name: String, expected: Option<AttrType>) -> Self {
        Self {
            slot: Rc::new(RuleSlot {
                name,
                expected,
                body: RefCell::new(None),
                resolving: Cell::new(false),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.slot.name
    }

    pub fn expected(&self) -> Option<AttrType> {
        self.slot.expected
    }

    pub fn is_bound(&self) -> bool {
        self.slot.body.borrow().is_some()
    }

    /// Install `body`, replacing any previous one.
    ///
    /// A typed rule checks the body's attribute type first and stays
    /// unchanged on mismatch.
    pub fn bind(&self, body: impl Into<Parser>) -> Result<(), Fault> {
        let body = body.into();
        if let Some(expected) = self.slot.expected {
            let found = body.attr_type()?;
            if found != expected {
                return Err(Fault::AttrTypeMismatch {
                    rule: self.slot.name.clone(),
                    expected,
                    found,
                });
            }
        }
        debug!("bound rule '{}'", self.slot.name);
        *self.slot.body.borrow_mut() = Some(Rc::new(body));
        Ok(())
    }

    /// The declared attribute type, or the one inferred from the body.
    pub fn attr_type(&self) -> Result<AttrType, Fault> {
        self.slot.attr_type()
    }

    /// Start building a call with arguments.
    pub fn call(&self) -> RuleCall {
        RuleCall {
            rule: Rc::downgrade(&self.slot),
            name: self.slot.name.clone(),
            args: Vec::new(),
            kwargs: Vec::new(),
        }
    }

    /// A call without arguments, as a parser.
    pub fn as_parser(&self) -> Parser {
        Parser::Call(self.call())
    }

    /// Invoke the rule without arguments.
    pub fn parse(&self, state: &mut ParseState) -> ParseResult {
        self.as_parser().parse(state)
    }
}

/// A reference to a rule together with the argument actions to evaluate on
/// each invocation.
#[derive(Debug, Clone)]
pub struct RuleCall {
    rule: Weak<RuleSlot>,
    name: String,
    args: Vec<Action>,
    kwargs: Vec<(String, Action)>,
}

impl RuleCall {
    pub fn arg(mut self, arg: impl Into<Action>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, arg: impl Into<Action>) -> Self {
        self.kwargs.push((name.into(), arg.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn slot(&self) -> Result<Rc<RuleSlot>, Fault> {
        self.rule.upgrade().ok_or_else(|| Fault::RuleDropped {
            name: self.name.clone(),
        })
    }

    pub(crate) fn attr_type(&self) -> Result<AttrType, Fault> {
        self.slot()?.attr_type()
    }

    /// Evaluate the arguments in the caller's context, then run the body in
    /// a new scope.
    pub(crate) fn invoke(&self, state: &mut ParseState) -> ParseResult {
        let slot = self.slot()?;
        let body = slot.body()?;

        let args = self
            .args
            .iter()
            .map(|arg| state.evaluate(arg))
            .collect::<Result<Vec<Value>, _>>()?;
        let kwargs = self
            .kwargs
            .iter()
            .map(|(name, arg)| Ok((name.clone(), state.evaluate(arg)?)))
            .collect::<Result<KwArgs, Fault>>()?;

        state.enter(&slot.name, Scope::new(args, kwargs))?;
        trace!("enter rule '{}' at {}", slot.name, state.position());
        let result = body.parse(state);
        state.leave();
        trace!(
            "exit rule '{}' at {} ({})",
            slot.name,
            state.position(),
            match &result {
                Ok(Some(_)) => "matched",
                Ok(None) => "failed",
                Err(_) => "fault",
            }
        );
        result
    }
}

impl From<RuleCall> for Parser {
    fn from(call: RuleCall) -> Self {
        Parser::Call(call)
    }
}

impl From<&Rule> for Parser {
    fn from(rule: &Rule) -> Self {
        rule.as_parser()
    }
}

/// Named rule table keeping its rules alive.
#[derive(Debug, Default)]
pub struct Grammar {
    rules: BTreeMap<String, Rule>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule called `name`, declared on first use.
    pub fn rule(&mut self, name: &str) -> Rule {
        self.rules
            .entry(name.to_string())
            .or_insert_with(|| Rule::new(name))
            .clone()
    }

    /// Declare a typed rule. An existing rule of the same name is replaced,
    /// which leaves call sites of the old one dangling.
    pub fn typed_rule(&mut self, name: &str, attr_type: AttrType) -> Rule {
        let rule = Rule::typed(name, attr_type);
        self.rules.insert(name.to_string(), rule.clone());
        rule
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Fault on the first rule, by name, that has no body.
    pub fn verify(&self) -> Result<(), Fault> {
        match self.rules.values().find(|rule| !rule.is_bound()) {
            Some(rule) => Err(Fault::UnboundRule {
                name: rule.name().to_string(),
            }),
            None => Ok(()),
        }
    }
}
