//! Operand-stack evaluation of prefix expressions.
//!
//! Operators arrive before their operands, so evaluation pushes an operator
//! frame, collects operands into it, and reduces the frame the moment it is
//! saturated. Variadic operators (`ALL OF`, `ANY OF`, `SMOOSH`) never
//! saturate on their own; they close on `MKAY` or at the end of the
//! statement.

use crate::diag::ErrorKind;

use super::coerce::{self, ArithOp, CoerceError};
use super::value::Value;

/// Every expression operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Arith(ArithOp),
    BothOf,
    EitherOf,
    WonOf,
    Not,
    AllOf,
    AnyOf,
    BothSaem,
    Diffrint,
    Smoosh,
}

impl OpKind {
    /// Fixed operand count, or `None` for the variadic operators.
    fn arity(self) -> Option<usize> {
        match self {
            OpKind::Not => Some(1),
            OpKind::AllOf | OpKind::AnyOf | OpKind::Smoosh => None,
            _ => Some(2),
        }
    }
}

#[derive(Debug)]
struct OpFrame {
    op: OpKind,
    operands: Vec<Value>,
}

/// The evaluation stack for one expression.
#[derive(Debug, Default)]
pub struct ExprStack {
    frames: Vec<OpFrame>,
    result: Option<Value>,
}

impl ExprStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_operator(&mut self, op: OpKind) -> Result<(), CoerceError> {
        if self.result.is_some() {
            return Err(CoerceError {
                kind: ErrorKind::MalformedStatement,
                message: "Operator after a complete expression".into(),
            });
        }
        self.frames.push(OpFrame {
            op,
            operands: Vec::new(),
        });
        Ok(())
    }

    /// Feed an operand, reducing every frame it saturates.
    pub fn push_value(&mut self, value: Value) -> Result<(), CoerceError> {
        let mut value = value;
        loop {
            match self.frames.last_mut() {
                None => {
                    if self.result.is_some() {
                        return Err(CoerceError {
                            kind: ErrorKind::MalformedStatement,
                            message: "More than one value in expression".into(),
                        });
                    }
                    self.result = Some(value);
                    return Ok(());
                }
                Some(frame) => {
                    frame.operands.push(value);
                    match frame.op.arity() {
                        Some(n) if frame.operands.len() == n => {
                            let frame = self.frames.pop().expect("frame was just inspected");
                            value = reduce(frame.op, frame.operands)?;
                        }
                        _ => return Ok(()),
                    }
                }
            }
        }
    }

    /// True once a single value remains and no operator is waiting.
    pub fn is_complete(&self) -> bool {
        self.frames.is_empty() && self.result.is_some()
    }

    /// Is there a variadic frame for `MKAY` to close?
    pub fn has_open_variadic(&self) -> bool {
        self.frames.iter().any(|f| f.op.arity().is_none())
    }

    /// Close the innermost variadic frame (`MKAY`).
    pub fn close_variadic(&mut self) -> Result<(), CoerceError> {
        match self.frames.pop() {
            Some(frame) if frame.op.arity().is_none() => {
                let value = reduce(frame.op, frame.operands)?;
                self.push_value(value)
            }
            _ => Err(CoerceError {
                kind: ErrorKind::MalformedStatement,
                message: "'MKAY' without an open 'ALL OF', 'ANY OF' or 'SMOOSH'".into(),
            }),
        }
    }

    /// Finish the expression: any still-open variadic frames close
    /// implicitly, and anything else left on the stack is an error.
    pub fn finish(mut self) -> Result<Value, CoerceError> {
        while let Some(frame) = self.frames.last() {
            if frame.op.arity().is_none() {
                self.close_variadic()?;
            } else {
                return Err(CoerceError {
                    kind: ErrorKind::MalformedStatement,
                    message: "Expression is missing operands".into(),
                });
            }
        }
        self.result.ok_or(CoerceError {
            kind: ErrorKind::MalformedStatement,
            message: "Empty expression".into(),
        })
    }
}

fn reduce(op: OpKind, operands: Vec<Value>) -> Result<Value, CoerceError> {
    Ok(match op {
        OpKind::Arith(arith) => coerce::arithmetic(arith, &operands[0], &operands[1])?,
        OpKind::BothOf => Value::Troof(operands[0].is_truthy() && operands[1].is_truthy()),
        OpKind::EitherOf => Value::Troof(operands[0].is_truthy() || operands[1].is_truthy()),
        OpKind::WonOf => Value::Troof(operands[0].is_truthy() != operands[1].is_truthy()),
        OpKind::Not => Value::Troof(!operands[0].is_truthy()),
        OpKind::AllOf => Value::Troof(operands.iter().all(Value::is_truthy)),
        OpKind::AnyOf => Value::Troof(operands.iter().any(Value::is_truthy)),
        OpKind::BothSaem => Value::Troof(coerce::compare_equal(&operands[0], &operands[1])?),
        OpKind::Diffrint => Value::Troof(!coerce::compare_equal(&operands[0], &operands[1])?),
        OpKind::Smoosh => Value::Yarn(
            operands
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(""),
        ),
    })
}
