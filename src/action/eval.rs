//! Evaluation of deferred actions against a concrete context.

use crate::error::Fault;
use crate::scope::ScopeStack;
use crate::value::{KwArgs, Value};

use super::ops::{apply_binary, apply_unary};
use super::Action;

/// The context an action is evaluated in.
///
/// `args` and `kwargs` are the positional and keyword context; `scopes` are
/// the open rule scopes, absent when evaluating outside of any rule.
pub struct Env<'a> {
    args: &'a [Value],
    kwargs: &'a KwArgs,
    scopes: Option<&'a mut ScopeStack>,
}

impl<'a> Env<'a> {
    pub fn new(args: &'a [Value], kwargs: &'a KwArgs) -> Self {
        Self {
            args,
            kwargs,
            scopes: None,
        }
    }

    pub fn with_scopes(mut self, scopes: &'a mut ScopeStack) -> Self {
        self.scopes = Some(scopes);
        self
    }

    pub fn args(&self) -> &[Value] {
        self.args
    }

    pub fn kwargs(&self) -> &KwArgs {
        self.kwargs
    }
}

impl Action {
    pub fn evaluate(&self, env: &mut Env<'_>) -> Result<Value, Fault> {
        match self {
            Action::Const(value) => Ok(value.clone()),
            Action::Arg(index) => env.args.get(*index).cloned().ok_or(Fault::ArgIndexOutOfRange {
                index: *index,
                len: env.args.len(),
            }),
            Action::KwArg(name) => env
                .kwargs
                .get(name)
                .cloned()
                .ok_or_else(|| Fault::MissingKwArg { name: name.clone() }),
            Action::VarGet(name) => {
                let name = evaluate_name(name, env)?;
                let scopes = match env.scopes.as_deref() {
                    Some(scopes) if !scopes.is_empty() => scopes,
                    _ => return Err(Fault::MissingScope { name }),
                };
                scopes
                    .resolve(&name)
                    .cloned()
                    .ok_or(Fault::UnknownVariable { name })
            }
            Action::VarSet { name, value } => {
                let name = evaluate_name(name, env)?;
                let value = value.evaluate(env)?;
                match env.scopes.as_deref_mut() {
                    Some(scopes) => scopes.assign(name, value.clone())?,
                    None => return Err(Fault::MissingScope { name }),
                }
                Ok(value)
            }
            Action::Call { func, args, kwargs } => {
                let callee = match func.evaluate(env)? {
                    Value::Func(callee) => callee,
                    other => {
                        return Err(Fault::NotCallable {
                            found: other.type_name(),
                        })
                    }
                };
                let args = args
                    .iter()
                    .map(|arg| arg.evaluate(env))
                    .collect::<Result<Vec<_>, _>>()?;
                let kwargs = kwargs
                    .iter()
                    .map(|(name, arg)| Ok((name.clone(), arg.evaluate(env)?)))
                    .collect::<Result<KwArgs, Fault>>()?;
                callee.invoke(&args, &kwargs)
            }
            Action::Unary { op, operand } => {
                let operand = operand.evaluate(env)?;
                apply_unary(*op, &operand)
            }
            Action::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate(env)?;
                let rhs = rhs.evaluate(env)?;
                apply_binary(*op, &lhs, &rhs)
            }
        }
    }
}

fn evaluate_name(name: &Action, env: &mut Env<'_>) -> Result<String, Fault> {
    match name.evaluate(env)? {
        Value::Str(name) => Ok(name),
        other => Err(Fault::NotAString {
            what: "variable name",
            found: other.type_name(),
        }),
    }
}
