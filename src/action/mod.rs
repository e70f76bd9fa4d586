//! # Deferred actions
//!
//! An [`Action`] is an expression tree that is built while the grammar is
//! constructed and evaluated only when the parser it decorates succeeds. It
//! can refer to the values of the match (`arg`), to keyword arguments
//! (`kwarg`), and to the local variables of the enclosing rule invocation
//! (`var`, `set_var`).
//!
//! ```
//! use braid::action::{arg, var};
//!
//! // "the first matched value, doubled, plus the variable `offset`"
//! let action = arg(0) * 2 + var("offset");
//! ```
//!
//! Plain values convert into constant actions, so `arg(0) * 2` needs no
//! explicit `constant(2)`.
//!
//! ## Related Modules
//!
//! - [`crate::scope`] - Variable storage the `var` actions read and write
//! - [`crate::parser`] - Parsers that evaluate actions on success

mod eval;
mod ops;

pub use eval::Env;
pub use ops::{apply_binary, apply_unary, BinaryOp, UnaryOp};

use crate::error::Fault;
use crate::value::{Function, KwArgs, Value};

/// A node of the deferred expression language.
#[derive(Debug, Clone)]
pub enum Action {
    /// An already evaluated value.
    Const(Value),
    /// The positional argument at an index.
    Arg(usize),
    /// A keyword argument by name.
    KwArg(String),
    /// Read a scope variable. The name is itself an action.
    VarGet(Box<Action>),
    /// Write a scope variable and yield the written value.
    VarSet {
        name: Box<Action>,
        value: Box<Action>,
    },
    /// Call whatever function `func` evaluates to.
    Call {
        func: Box<Action>,
        args: Vec<Action>,
        kwargs: Vec<(String, Action)>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Action>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Action>,
        rhs: Box<Action>,
    },
}

impl Default for Action {
    fn default() -> Self {
        Action::Const(Value::Unused)
    }
}

impl Action {
    pub fn unary(op: UnaryOp, operand: impl Into<Action>) -> Self {
        Action::Unary {
            op,
            operand: Box::new(operand.into()),
        }
    }

    pub fn binary(op: BinaryOp, lhs: impl Into<Action>, rhs: impl Into<Action>) -> Self {
        Action::Binary {
            op,
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        }
    }

    /// Defer a call of the function this action evaluates to.
    pub fn call<A: Into<Action>>(self, args: impl IntoIterator<Item = A>) -> Self {
        call(self, args)
    }

    /// Defer a call with keyword arguments.
    pub fn call_kw<A, K>(
        self,
        args: impl IntoIterator<Item = A>,
        kwargs: impl IntoIterator<Item = (K, Action)>,
    ) -> Self
    where
        A: Into<Action>,
        K: Into<String>,
    {
        call_kw(self, args, kwargs)
    }

    /// Evaluate without any argument or scope context.
    pub fn evaluate_detached(&self) -> Result<Value, Fault> {
        let kwargs = KwArgs::new();
        self.evaluate(&mut Env::new(&[], &kwargs))
    }
}

macro_rules! value_into_action {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Action {
                fn from(value: $ty) -> Self {
                    Action::Const(Value::from(value))
                }
            }
        )*
    };
}

value_into_action!(bool, i32, i64, f64, char, &str, String, Vec<Value>, Function);

impl From<Value> for Action {
    fn from(value: Value) -> Self {
        Action::Const(value)
    }
}

pub fn constant(value: impl Into<Value>) -> Action {
    Action::Const(value.into())
}

/// The positional argument at `index`.
pub fn arg(index: usize) -> Action {
    Action::Arg(index)
}

pub fn kwarg(name: impl Into<String>) -> Action {
    Action::KwArg(name.into())
}

/// Read the scope variable `name`.
pub fn var(name: impl Into<String>) -> Action {
    var_named(constant(name.into()))
}

/// Read a scope variable whose name is computed at evaluation time.
pub fn var_named(name: impl Into<Action>) -> Action {
    Action::VarGet(Box::new(name.into()))
}

/// Assign the scope variable `name`, yielding the assigned value.
pub fn set_var(name: impl Into<String>, value: impl Into<Action>) -> Action {
    set_var_named(constant(name.into()), value)
}

pub fn set_var_named(name: impl Into<Action>, value: impl Into<Action>) -> Action {
    Action::VarSet {
        name: Box::new(name.into()),
        value: Box::new(value.into()),
    }
}

/// Defer a call of `func` with positional arguments.
pub fn call<A: Into<Action>>(func: impl Into<Action>, args: impl IntoIterator<Item = A>) -> Action {
    Action::Call {
        func: Box::new(func.into()),
        args: args.into_iter().map(Into::into).collect(),
        kwargs: Vec::new(),
    }
}

pub fn call_kw<A, K>(
    func: impl Into<Action>,
    args: impl IntoIterator<Item = A>,
    kwargs: impl IntoIterator<Item = (K, Action)>,
) -> Action
where
    A: Into<Action>,
    K: Into<String>,
{
    Action::Call {
        func: Box::new(func.into()),
        args: args.into_iter().map(Into::into).collect(),
        kwargs: kwargs
            .into_iter()
            .map(|(name, action)| (name.into(), action))
            .collect(),
    }
}

/// Wrap a closure as a callable value.
pub fn func<F>(name: &str, body: F) -> Function
where
    F: Fn(&[Value], &KwArgs) -> Result<Value, Fault> + 'static,
{
    Function::new(name, body)
}
