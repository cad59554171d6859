//! Runtime values.

use std::fmt;

use crate::lexer::TypeName;

/// A runtime value of one of the five types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Noob,
    Numbr(i64),
    Numbar(f64),
    Yarn(String),
    Troof(bool),
}

impl Value {
    pub fn type_name(&self) -> TypeName {
        match self {
            Value::Noob => TypeName::Noob,
            Value::Numbr(_) => TypeName::Numbr,
            Value::Numbar(_) => TypeName::Numbar,
            Value::Yarn(_) => TypeName::Yarn,
            Value::Troof(_) => TypeName::Troof,
        }
    }

    /// Truthiness never fails: every value has one.
    ///
    /// A YARN is falsy exactly when it spells one of the falsy values.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Noob => false,
            Value::Numbr(n) => *n != 0,
            Value::Numbar(f) => *f != 0.0,
            Value::Yarn(s) => !matches!(s.as_str(), "" | "0" | "0.0" | "FAIL" | "NOOB"),
            Value::Troof(b) => *b,
        }
    }
}

impl fmt::Display for Value {
    /// Output formatting: a NUMBAR always shows its decimal point, so `8.0`
    /// prints as `8.0` and not `8`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Noob => f.write_str("NOOB"),
            Value::Numbr(n) => write!(f, "{n}"),
            Value::Numbar(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Yarn(s) => f.write_str(s),
            Value::Troof(b) => f.write_str(if *b { "WIN" } else { "FAIL" }),
        }
    }
}
