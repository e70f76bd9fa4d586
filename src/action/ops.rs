//! Operators of the action language.
//!
//! Operator traits on [`Action`] do not compute anything; they build
//! [`Action::Unary`] and [`Action::Binary`] nodes. The arithmetic happens in
//! [`apply_unary`] and [`apply_binary`] when the tree is evaluated.
//!
//! Value semantics follow the usual dynamic-language conventions:
//!
//! - `bool` operands act as `0`/`1` in arithmetic
//! - mixing `int` and `float` promotes to `float`
//! - floor division and modulo round toward negative infinity
//! - `+` concatenates strings and tuples, `*` repeats them
//! - strings and tuples compare lexicographically
//!
//! Integer overflow and division by zero are faults, not wrapped results.

use std::cmp::Ordering;
use std::mem;
use std::ops;

use crate::error::Fault;
use crate::value::{Function, Value};

use super::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Pos,
    Neg,
    Invert,
    Abs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
    Add,
    Sub,
    Mul,
    FloorDiv,
    Mod,
    Pow,
    TrueDiv,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Pos => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Invert => "~",
            UnaryOp::Abs => "abs",
        }
    }

    /// This operator as a callable value taking one argument.
    pub fn function(self) -> Function {
        Function::new(self.symbol(), move |args, _| match args {
            [operand] => apply_unary(self, operand),
            _ => Err(Fault::custom(format!(
                "unary {} takes 1 argument, got {}",
                self.symbol(),
                args.len()
            ))),
        })
    }
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Ge => ">=",
            BinaryOp::Gt => ">",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::TrueDiv => "/",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }

    /// This operator as a callable value taking two arguments, e.g. for use
    /// as the values of a symbol table.
    pub fn function(self) -> Function {
        Function::new(self.symbol(), move |args, _| match args {
            [lhs, rhs] => apply_binary(self, lhs, rhs),
            _ => Err(Fault::custom(format!(
                "{} takes 2 arguments, got {}",
                self.symbol(),
                args.len()
            ))),
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        match value {
            Value::Bool(b) => Some(Num::Int(i64::from(*b))),
            Value::Int(i) => Some(Num::Int(*i)),
            Value::Float(x) => Some(Num::Float(*x)),
            _ => None,
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(x) => x,
        }
    }
}

fn unsupported(op: BinaryOp, lhs: &Value, rhs: &Value) -> Fault {
    Fault::UnsupportedOperand {
        op: op.symbol(),
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    }
}

/// Largest string or tuple `*` builds, in bytes or items.
const MAX_REPEAT_LEN: usize = 1 << 24;

fn overflow(op: BinaryOp) -> Fault {
    Fault::Overflow { op: op.symbol() }
}

pub fn apply_unary(op: UnaryOp, operand: &Value) -> Result<Value, Fault> {
    let unsupported = || Fault::UnsupportedUnary {
        op: op.symbol(),
        operand: operand.type_name(),
    };
    let num = Num::of(operand).ok_or_else(unsupported)?;

    match (op, num) {
        (UnaryOp::Pos, Num::Int(i)) => Ok(Value::Int(i)),
        (UnaryOp::Pos, Num::Float(x)) => Ok(Value::Float(x)),
        (UnaryOp::Neg, Num::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or(Fault::Overflow { op: "-" }),
        (UnaryOp::Neg, Num::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Invert, Num::Int(i)) => Ok(Value::Int(!i)),
        (UnaryOp::Invert, Num::Float(_)) => Err(unsupported()),
        (UnaryOp::Abs, Num::Int(i)) => i
            .checked_abs()
            .map(Value::Int)
            .ok_or(Fault::Overflow { op: "abs" }),
        (UnaryOp::Abs, Num::Float(x)) => Ok(Value::Float(x.abs())),
    }
}

pub fn apply_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, Fault> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(equals(lhs, rhs))),
        BinaryOp::Ne => Ok(Value::Bool(!equals(lhs, rhs))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Gt => {
            let ordering = compare(op, lhs, rhs)?;
            let result = match (op, ordering) {
                (_, None) => false,
                (BinaryOp::Lt, Some(ord)) => ord == Ordering::Less,
                (BinaryOp::Le, Some(ord)) => ord != Ordering::Greater,
                (BinaryOp::Ge, Some(ord)) => ord != Ordering::Less,
                (_, Some(ord)) => ord == Ordering::Greater,
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::Add => match (lhs, rhs) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (Value::Tuple(a), Value::Tuple(b)) => Ok(Value::tuple(a.iter().chain(b).cloned())),
            _ => arithmetic(op, lhs, rhs, i64::checked_add, |a, b| a + b),
        },
        BinaryOp::Sub => arithmetic(op, lhs, rhs, i64::checked_sub, |a, b| a - b),
        BinaryOp::Mul => match (lhs, rhs) {
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                let count = repeat_count(s.len(), *n)?;
                Ok(Value::Str(s.repeat(count)))
            }
            (Value::Tuple(items), Value::Int(n)) | (Value::Int(n), Value::Tuple(items)) => {
                let count = repeat_count(items.len(), *n)?;
                Ok(Value::tuple(
                    std::iter::repeat(items.iter()).take(count).flatten().cloned(),
                ))
            }
            _ => arithmetic(op, lhs, rhs, i64::checked_mul, |a, b| a * b),
        },
        BinaryOp::FloorDiv => {
            check_divisor(op, lhs, rhs)?;
            arithmetic(op, lhs, rhs, floor_div, |a, b| (a / b).floor())
        }
        BinaryOp::Mod => {
            check_divisor(op, lhs, rhs)?;
            arithmetic(op, lhs, rhs, floor_mod, |a, b| {
                let r = a % b;
                if r != 0.0 && (r < 0.0) != (b < 0.0) {
                    r + b
                } else {
                    r
                }
            })
        }
        BinaryOp::TrueDiv => {
            check_divisor(op, lhs, rhs)?;
            let (a, b) = numbers(op, lhs, rhs)?;
            Ok(Value::Float(a.to_f64() / b.to_f64()))
        }
        BinaryOp::Pow => power(lhs, rhs),
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => bitwise(op, lhs, rhs),
        BinaryOp::Shl | BinaryOp::Shr => shift(op, lhs, rhs),
    }
}

fn numbers(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<(Num, Num), Fault> {
    match (Num::of(lhs), Num::of(rhs)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(unsupported(op, lhs, rhs)),
    }
}

fn arithmetic(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, Fault> {
    match numbers(op, lhs, rhs)? {
        (Num::Int(a), Num::Int(b)) => int_op(a, b).map(Value::Int).ok_or(overflow(op)),
        (a, b) => Ok(Value::Float(float_op(a.to_f64(), b.to_f64()))),
    }
}

fn check_divisor(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<(), Fault> {
    match numbers(op, lhs, rhs)? {
        (_, Num::Int(0)) => Err(Fault::DivisionByZero),
        (_, Num::Float(x)) if x == 0.0 => Err(Fault::DivisionByZero),
        _ => Ok(()),
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

fn floor_mod(a: i64, b: i64) -> Option<i64> {
    if b == -1 {
        return Some(0);
    }
    let r = a.checked_rem(b)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Some(r + b)
    } else {
        Some(r)
    }
}

/// Repetitions for `len * n`. Negative counts repeat nothing, and an empty
/// operand never repeats, so its count cannot run away.
fn repeat_count(len: usize, n: i64) -> Result<usize, Fault> {
    let count = usize::try_from(n).unwrap_or(0);
    if len == 0 {
        return Ok(0);
    }
    match len.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(count),
        _ => Err(overflow(BinaryOp::Mul)),
    }
}

fn power(lhs: &Value, rhs: &Value) -> Result<Value, Fault> {
    let op = BinaryOp::Pow;
    match numbers(op, lhs, rhs)? {
        (Num::Int(0), Num::Int(e)) if e < 0 => Err(Fault::DivisionByZero),
        // these bases stay bounded for any exponent
        (Num::Int(0), Num::Int(0)) => Ok(Value::Int(1)),
        (Num::Int(0), Num::Int(_)) => Ok(Value::Int(0)),
        (Num::Int(1), Num::Int(e)) if e >= 0 => Ok(Value::Int(1)),
        (Num::Int(-1), Num::Int(e)) if e >= 0 => {
            Ok(Value::Int(if e % 2 == 0 { 1 } else { -1 }))
        }
        (Num::Int(base), Num::Int(e)) if e >= 0 => {
            let e = u32::try_from(e).map_err(|_| overflow(op))?;
            base.checked_pow(e).map(Value::Int).ok_or(overflow(op))
        }
        (a, b) => {
            if a.to_f64() == 0.0 && b.to_f64() < 0.0 {
                return Err(Fault::DivisionByZero);
            }
            Ok(Value::Float(a.to_f64().powf(b.to_f64())))
        }
    }
}

fn bitwise(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, Fault> {
    if let (Value::Bool(a), Value::Bool(b)) = (lhs, rhs) {
        let result = match op {
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            _ => a ^ b,
        };
        return Ok(Value::Bool(result));
    }
    match numbers(op, lhs, rhs)? {
        (Num::Int(a), Num::Int(b)) => Ok(Value::Int(match op {
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            _ => a ^ b,
        })),
        _ => Err(unsupported(op, lhs, rhs)),
    }
}

fn shift(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, Fault> {
    let (a, n) = match numbers(op, lhs, rhs)? {
        (Num::Int(a), Num::Int(n)) => (a, n),
        _ => return Err(unsupported(op, lhs, rhs)),
    };
    if n < 0 {
        return Err(Fault::custom("negative shift count"));
    }
    if op == BinaryOp::Shr {
        return Ok(Value::Int(if n >= 64 { a >> 63 } else { a >> n }));
    }
    if a == 0 {
        return Ok(Value::Int(0));
    }
    let shifted = u32::try_from(n)
        .ok()
        .filter(|n| *n < 64)
        .map(|n| (a << n, n))
        .filter(|(shifted, n)| shifted >> n == a)
        .map(|(shifted, _)| shifted);
    shifted.map(Value::Int).ok_or(overflow(op))
}

fn equals(lhs: &Value, rhs: &Value) -> bool {
    match (Num::of(lhs), Num::of(rhs)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => a == b,
        (Some(a), Some(b)) => a.to_f64() == b.to_f64(),
        _ => match (lhs, rhs) {
            (Value::Tuple(a), Value::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| equals(x, y))
            }
            _ => lhs == rhs,
        },
    }
}

/// `None` when the values are unordered (a NaN is involved).
fn compare(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Option<Ordering>, Fault> {
    if let (Some(a), Some(b)) = (Num::of(lhs), Num::of(rhs)) {
        return Ok(match (a, b) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
        });
    }
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::Tuple(a), Value::Tuple(b)) => {
            for (x, y) in a.iter().zip(b) {
                match compare(op, x, y)? {
                    Some(Ordering::Equal) => continue,
                    other => return Ok(other),
                }
            }
            Ok(Some(a.len().cmp(&b.len())))
        }
        _ => Err(unsupported(op, lhs, rhs)),
    }
}

// === Operator Overloading ===

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:expr) => {
        impl<R: Into<Action>> ops::$trait<R> for Action {
            type Output = Action;

            fn $method(self, rhs: R) -> Action {
                Action::binary($op, self, rhs)
            }
        }

        impl<R: Into<Action>> ops::$assign_trait<R> for Action {
            fn $assign_method(&mut self, rhs: R) {
                let lhs = mem::take(self);
                *self = Action::binary($op, lhs, rhs);
            }
        }
    };
}

binary_operator!(Add, add, AddAssign, add_assign, BinaryOp::Add);
binary_operator!(Sub, sub, SubAssign, sub_assign, BinaryOp::Sub);
binary_operator!(Mul, mul, MulAssign, mul_assign, BinaryOp::Mul);
binary_operator!(Div, div, DivAssign, div_assign, BinaryOp::TrueDiv);
binary_operator!(Rem, rem, RemAssign, rem_assign, BinaryOp::Mod);
binary_operator!(BitAnd, bitand, BitAndAssign, bitand_assign, BinaryOp::BitAnd);
binary_operator!(BitOr, bitor, BitOrAssign, bitor_assign, BinaryOp::BitOr);
binary_operator!(BitXor, bitxor, BitXorAssign, bitxor_assign, BinaryOp::BitXor);
binary_operator!(Shl, shl, ShlAssign, shl_assign, BinaryOp::Shl);
binary_operator!(Shr, shr, ShrAssign, shr_assign, BinaryOp::Shr);

/// `-a`
impl ops::Neg for Action {
    type Output = Action;

    fn neg(self) -> Action {
        Action::unary(UnaryOp::Neg, self)
    }
}

/// `!a` builds a bitwise inversion (`~a`).
impl ops::Not for Action {
    type Output = Action;

    fn not(self) -> Action {
        Action::unary(UnaryOp::Invert, self)
    }
}

// Operators without a Rust operator trait.
impl Action {
    pub fn pos(self) -> Action {
        Action::unary(UnaryOp::Pos, self)
    }

    pub fn abs(self) -> Action {
        Action::unary(UnaryOp::Abs, self)
    }

    pub fn floor_div(self, rhs: impl Into<Action>) -> Action {
        Action::binary(BinaryOp::FloorDiv, self, rhs)
    }

    pub fn pow(self, rhs: impl Into<Action>) -> Action {
        Action::binary(BinaryOp::Pow, self, rhs)
    }

    pub fn lt(self, rhs: impl Into<Action>) -> Action {
        Action::binary(BinaryOp::Lt, self, rhs)
    }

    pub fn le(self, rhs: impl Into<Action>) -> Action {
        Action::binary(BinaryOp::Le, self, rhs)
    }

    pub fn eq(self, rhs: impl Into<Action>) -> Action {
        Action::binary(BinaryOp::Eq, self, rhs)
    }

    pub fn ne(self, rhs: impl Into<Action>) -> Action {
        Action::binary(BinaryOp::Ne, self, rhs)
    }

    pub fn ge(self, rhs: impl Into<Action>) -> Action {
        Action::binary(BinaryOp::Ge, self, rhs)
    }

    pub fn gt(self, rhs: impl Into<Action>) -> Action {
        Action::binary(BinaryOp::Gt, self, rhs)
    }
}
