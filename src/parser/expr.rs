//! Expression grammar: prefix operators, `AN` between fixed operands,
//! `MKAY` closing the variadic ones.
//!
//! The parser only checks structure and infers a best-effort result type
//! for each expression; the analyzer re-walks expressions with the
//! coercion tables and the executor actually evaluates them.

use crate::diag::ErrorKind;
use crate::interpreter::Value;
use crate::lexer::{Keyword, TokenKind, TypeName};

use super::Parser;

/// What the parser learned about an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprInfo {
    /// Best-effort result type. `NOOB` when it cannot be known statically
    /// (`IT`, parameters, `GIMMEH`-fed variables).
    pub ty: TypeName,
    /// The value, when the expression is a single literal.
    pub literal: Option<Value>,
}

impl ExprInfo {
    fn of(ty: TypeName) -> Self {
        Self { ty, literal: None }
    }

    fn literal(value: Value) -> Self {
        Self {
            ty: value.type_name(),
            literal: Some(value),
        }
    }
}

impl Parser<'_> {
    /// Parse one prefix expression. Returns `None` after reporting a
    /// diagnostic; the caller is responsible for recovery.
    pub(crate) fn parse_expression(&mut self) -> Option<ExprInfo> {
        let line = self.cursor.line();
        let Some(tok) = self.cursor.current() else {
            self.error(
                ErrorKind::MalformedStatement,
                line,
                "Expected an expression, found end of input",
            );
            return None;
        };

        match tok.kind {
            TokenKind::Numbr => {
                self.cursor.advance();
                let value = tok.lexeme.parse().ok().map(Value::Numbr);
                match value {
                    Some(v) => Some(ExprInfo::literal(v)),
                    None => {
                        let lexeme = tok.lexeme.clone();
                        self.error(
                            ErrorKind::MalformedStatement,
                            line,
                            format!("NUMBR literal '{lexeme}' is out of range"),
                        );
                        None
                    }
                }
            }
            TokenKind::Numbar => {
                self.cursor.advance();
                match tok.lexeme.parse() {
                    Ok(value) => Some(ExprInfo::literal(Value::Numbar(value))),
                    Err(_) => {
                        let lexeme = tok.lexeme.clone();
                        self.error(
                            ErrorKind::MalformedStatement,
                            line,
                            format!("NUMBAR literal '{lexeme}' is out of range"),
                        );
                        None
                    }
                }
            }
            TokenKind::Yarn => {
                self.cursor.advance();
                Some(ExprInfo::literal(Value::Yarn(tok.lexeme.clone())))
            }
            TokenKind::Troof => {
                self.cursor.advance();
                Some(ExprInfo::literal(Value::Troof(tok.lexeme == "WIN")))
            }
            TokenKind::Ident => {
                self.cursor.advance();
                if self.is_declared(&tok.lexeme) {
                    let ty = self
                        .symbols
                        .value(&tok.lexeme)
                        .map_or(TypeName::Noob, Value::type_name);
                    Some(ExprInfo::of(ty))
                } else {
                    let name = tok.lexeme.clone();
                    self.error(
                        ErrorKind::UndeclaredVariable,
                        line,
                        format!("Variable '{name}' is not declared"),
                    );
                    None
                }
            }
            TokenKind::Keyword(kw) => self.parse_operator_expression(kw, line),
            _ => {
                let found = tok.describe();
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("Expected an expression, found {found}"),
                );
                None
            }
        }
    }

    fn parse_operator_expression(&mut self, kw: Keyword, line: usize) -> Option<ExprInfo> {
        match kw {
            Keyword::It => {
                self.cursor.advance();
                Some(ExprInfo::of(TypeName::Noob))
            }
            Keyword::Not => {
                self.cursor.advance();
                self.parse_expression()?;
                Some(ExprInfo::of(TypeName::Troof))
            }
            _ if kw.is_arithmetic() => {
                self.cursor.advance();
                let lhs = self.parse_expression()?;
                self.expect_an(kw, line)?;
                let rhs = self.parse_expression()?;
                let ty = if kw == Keyword::QuoshuntOf
                    || lhs.ty == TypeName::Numbar
                    || rhs.ty == TypeName::Numbar
                {
                    TypeName::Numbar
                } else {
                    TypeName::Numbr
                };
                Some(ExprInfo::of(ty))
            }
            _ if kw.is_boolean_binary() || kw.is_comparison() => {
                self.cursor.advance();
                self.parse_expression()?;
                self.expect_an(kw, line)?;
                self.parse_expression()?;
                Some(ExprInfo::of(TypeName::Troof))
            }
            _ if kw.is_variadic_boolean() => {
                self.cursor.advance();
                self.parse_expression()?;
                while self.cursor.eat_keyword(Keyword::An) {
                    self.parse_expression()?;
                }
                if !self.cursor.eat_keyword(Keyword::Mkay) {
                    let found = self.describe_current();
                    self.error(
                        ErrorKind::MissingDelimiter,
                        line,
                        format!("Expected 'MKAY' to close '{kw}', found {found}"),
                    );
                    return None;
                }
                Some(ExprInfo::of(TypeName::Troof))
            }
            Keyword::Smoosh => {
                self.cursor.advance();
                self.parse_expression()?;
                while self.cursor.eat_keyword(Keyword::An) {
                    self.parse_expression()?;
                }
                // MKAY is optional here; the newline closes SMOOSH too.
                self.cursor.eat_keyword(Keyword::Mkay);
                Some(ExprInfo::of(TypeName::Yarn))
            }
            Keyword::Maek => {
                self.cursor.advance();
                self.parse_expression()?;
                if !self.cursor.eat_keyword(Keyword::A) {
                    let found = self.describe_current();
                    self.error(
                        ErrorKind::MalformedStatement,
                        line,
                        format!("Expected 'A' after the operand of 'MAEK', found {found}"),
                    );
                    return None;
                }
                match self.cursor.current().map(|t| t.kind) {
                    Some(TokenKind::Type(ty)) => {
                        self.cursor.advance();
                        Some(ExprInfo::of(ty))
                    }
                    _ => {
                        let found = self.describe_current();
                        self.error(
                            ErrorKind::MalformedStatement,
                            line,
                            format!("Expected a type after 'MAEK .. A', found {found}"),
                        );
                        None
                    }
                }
            }
            _ => {
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("'{kw}' cannot start an expression"),
                );
                None
            }
        }
    }

    fn expect_an(&mut self, op: Keyword, line: usize) -> Option<()> {
        if self.cursor.eat_keyword(Keyword::An) {
            Some(())
        } else {
            let found = self.describe_current();
            self.error(
                ErrorKind::MissingDelimiter,
                line,
                format!("Expected 'AN' between the operands of '{op}', found {found}"),
            );
            None
        }
    }
}
