//! Coercion and typecasting rules.
//!
//! All functions here are pure: the same inputs always coerce the same
//! way, no matter where in the program the expression appears. Failures
//! carry an [`ErrorKind`] and a message; the executor attaches the line.

use crate::diag::ErrorKind;
use crate::lexer::TypeName;

use super::value::Value;

/// A coercion failure, not yet located on a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CoerceError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A value lifted into the numeric domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(n) => n as f64,
            Numeric::Float(x) => x,
        }
    }
}

/// Is the string entirely digits with an optional leading minus?
fn int_shaped(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit())
}

/// Digits with exactly one interior dot, optional leading minus.
fn float_shaped(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    match body.split_once('.') {
        Some((whole, frac)) => {
            !whole.is_empty()
                && !frac.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Lift a value into the numeric domain for arithmetic.
///
/// NOOB is zero, a TROOF is 1 or 0, and a YARN converts when it is shaped
/// like a number (`"-3"`, `"2.5"`) or spells a TROOF. Anything else is a
/// coercion failure.
pub fn to_numeric(value: &Value) -> Result<Numeric, CoerceError> {
    match value {
        Value::Noob => Ok(Numeric::Int(0)),
        Value::Numbr(n) => Ok(Numeric::Int(*n)),
        Value::Numbar(x) => Ok(Numeric::Float(*x)),
        Value::Troof(b) => Ok(Numeric::Int(i64::from(*b))),
        Value::Yarn(s) => {
            if int_shaped(s) {
                Ok(Numeric::Int(s.parse().map_err(|_| {
                    CoerceError::new(
                        ErrorKind::OperandType,
                        format!("YARN \"{s}\" is out of NUMBR range"),
                    )
                })?))
            } else if float_shaped(s) {
                Ok(Numeric::Float(s.parse().map_err(|_| {
                    CoerceError::new(
                        ErrorKind::OperandType,
                        format!("YARN \"{s}\" is out of NUMBAR range"),
                    )
                })?))
            } else if s == "WIN" {
                Ok(Numeric::Int(1))
            } else if s == "FAIL" {
                Ok(Numeric::Int(0))
            } else {
                Err(CoerceError::new(
                    ErrorKind::OperandType,
                    format!("YARN \"{s}\" cannot be used as a number"),
                ))
            }
        }
    }
}

fn numeric_value(n: Numeric) -> Value {
    match n {
        Numeric::Int(i) => Value::Numbr(i),
        Numeric::Float(x) => Value::Numbar(x),
    }
}

/// Binary arithmetic. The result is a NUMBAR when either operand lifts to
/// a float; `QUOSHUNT OF` is always a NUMBAR.
pub fn arithmetic(op: ArithOp, lhs: &Value, rhs: &Value) -> Result<Value, CoerceError> {
    let a = to_numeric(lhs)?;
    let b = to_numeric(rhs)?;

    if matches!(op, ArithOp::Quoshunt | ArithOp::Mod) && b.as_f64() == 0.0 {
        return Err(CoerceError::new(
            ErrorKind::DivisionByZero,
            "Division by zero",
        ));
    }

    if let ArithOp::Quoshunt = op {
        return Ok(Value::Numbar(a.as_f64() / b.as_f64()));
    }

    let result = match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => {
            let value = match op {
                ArithOp::Sum => x.checked_add(y),
                ArithOp::Diff => x.checked_sub(y),
                ArithOp::Produkt => x.checked_mul(y),
                // Remainder takes the sign of the divisor. The adjustment
                // cannot overflow: |r| < |y| and they have opposite signs.
                ArithOp::Mod => x.checked_rem(y).map(|r| {
                    if r != 0 && (r < 0) != (y < 0) {
                        r + y
                    } else {
                        r
                    }
                }),
                ArithOp::Biggr => Some(x.max(y)),
                ArithOp::Smallr => Some(x.min(y)),
                ArithOp::Quoshunt => unreachable!(),
            };
            match value {
                Some(n) => Numeric::Int(n),
                None => {
                    return Err(CoerceError::new(
                        ErrorKind::OperandType,
                        "Result is out of NUMBR range",
                    ))
                }
            }
        }
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            Numeric::Float(match op {
                ArithOp::Sum => x + y,
                ArithOp::Diff => x - y,
                ArithOp::Produkt => x * y,
                ArithOp::Mod => x - y * (x / y).floor(),
                ArithOp::Biggr => x.max(y),
                ArithOp::Smallr => x.min(y),
                ArithOp::Quoshunt => unreachable!(),
            })
        }
    };
    Ok(numeric_value(result))
}

/// The seven arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Sum,
    Diff,
    Produkt,
    Quoshunt,
    Mod,
    Biggr,
    Smallr,
}

/// `BOTH SAEM` / `DIFFRINT`: numeric comparison with NOOB as zero.
pub fn compare_equal(lhs: &Value, rhs: &Value) -> Result<bool, CoerceError> {
    let a = to_numeric(lhs)?;
    let b = to_numeric(rhs)?;
    Ok(match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => x == y,
        _ => a.as_f64() == b.as_f64(),
    })
}

/// Exact, type-sensitive equality used when matching switch cases: a case
/// only fires when both type and value agree.
pub fn exactly_equal(lhs: &Value, rhs: &Value) -> bool {
    lhs == rhs
}

/// The explicit typecast matrix behind `MAEK` and `IS NOW A`.
pub fn cast_value(value: &Value, target: TypeName) -> Result<Value, CoerceError> {
    if value.type_name() == target {
        return Ok(value.clone());
    }
    match target {
        TypeName::Noob => Ok(Value::Noob),
        TypeName::Troof => Ok(Value::Troof(value.is_truthy())),
        TypeName::Numbr => match value {
            Value::Noob => Ok(Value::Numbr(0)),
            Value::Numbar(x) => Ok(Value::Numbr(*x as i64)),
            Value::Troof(b) => Ok(Value::Numbr(i64::from(*b))),
            Value::Yarn(s) if int_shaped(s) => s.parse().map(Value::Numbr).map_err(|_| {
                CoerceError::new(
                    ErrorKind::UnsupportedCast,
                    format!("YARN \"{s}\" is out of NUMBR range"),
                )
            }),
            _ => Err(cast_error(value, target)),
        },
        TypeName::Numbar => match value {
            Value::Noob => Ok(Value::Numbar(0.0)),
            Value::Numbr(n) => Ok(Value::Numbar(*n as f64)),
            Value::Troof(b) => Ok(Value::Numbar(if *b { 1.0 } else { 0.0 })),
            Value::Yarn(s) if float_shaped(s) || int_shaped(s) => {
                s.parse().map(Value::Numbar).map_err(|_| {
                    CoerceError::new(
                        ErrorKind::UnsupportedCast,
                        format!("YARN \"{s}\" is out of NUMBAR range"),
                    )
                })
            }
            _ => Err(cast_error(value, target)),
        },
        TypeName::Yarn => Ok(Value::Yarn(match value {
            Value::Noob => String::new(),
            Value::Numbr(n) => n.to_string(),
            // Explicit casts format to two decimals; output formatting does not.
            Value::Numbar(x) => format!("{x:.2}"),
            Value::Troof(b) => (if *b { "WIN" } else { "FAIL" }).to_string(),
            Value::Yarn(s) => s.clone(),
        })),
    }
}

fn cast_error(value: &Value, target: TypeName) -> CoerceError {
    CoerceError::new(
        ErrorKind::UnsupportedCast,
        format!(
            "Cannot typecast {} to {target}",
            match value {
                Value::Yarn(s) => format!("YARN \"{s}\""),
                other => format!("{} '{}'", other.type_name(), other),
            }
        ),
    )
}
