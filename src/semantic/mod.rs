//! The semantic analyzer: a second walk over the tokens.
//!
//! The parser has already vouched for statement structure, so this pass
//! only looks at expressions. It applies the coercion tables to every
//! operand whose type is statically known (literals, and variables with a
//! literal initializer), validates call-site argument types against
//! function signatures, and refines parameter types in place the first
//! time a call pins them down. Operands whose type can only be known at
//! runtime are deliberately let through.

use log::debug;

use crate::cursor::TokenCursor;
use crate::diag::{Diagnostic, ErrorKind};
use crate::interpreter::{cast_value, Value};
use crate::lexer::{Keyword, Token, TokenKind, TypeName};
use crate::symbol::{FunctionSig, Param, SymbolTable};

/// Result of the analysis pass.
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// False when any non-warning diagnostic was produced.
    pub ok: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Analyze the program. `functions` is refined in place: parameters start
/// as NOOB and take on the type of the first argument seen for them.
pub fn analyze(
    tokens: &[Token],
    symbols: &SymbolTable,
    functions: &mut Vec<FunctionSig>,
) -> AnalysisOutcome {
    let mut analyzer = Analyzer {
        cursor: TokenCursor::new(tokens),
        symbols,
        functions,
        diags: Vec::new(),
        local_params: None,
    };
    analyzer.run();

    let ok = crate::diag::all_warnings(&analyzer.diags);
    debug!("analysis finished: {} diagnostics", analyzer.diags.len());
    AnalysisOutcome {
        ok,
        diagnostics: analyzer.diags,
    }
}

/// Static knowledge about one expression.
#[derive(Debug, Clone, PartialEq)]
struct StaticType {
    ty: TypeName,
    literal: Option<Value>,
}

impl StaticType {
    fn unknown() -> Self {
        Self {
            ty: TypeName::Noob,
            literal: None,
        }
    }

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

struct Analyzer<'t> {
    cursor: TokenCursor<'t>,
    symbols: &'t SymbolTable,
    functions: &'t mut Vec<FunctionSig>,
    diags: Vec<Diagnostic>,
    /// Parameter scope while walking a function body.
    local_params: Option<Vec<Param>>,
}

impl<'t> Analyzer<'t> {
    fn error(&mut self, kind: ErrorKind, line: usize, message: impl Into<String>) {
        self.diags.push(Diagnostic::new(kind, line, message));
    }

    fn run(&mut self) {
        while let Some(tok) = self.cursor.current() {
            match tok.keyword() {
                Some(Keyword::Itz | Keyword::R | Keyword::Til | Keyword::Wile | Keyword::FoundYr) =>
                {
                    self.cursor.advance();
                    self.check_expression();
                }
                Some(Keyword::Visible) => {
                    self.cursor.advance();
                    self.check_visible();
                }
                Some(Keyword::HowIzI) => self.enter_function(),
                Some(Keyword::IfUSaySo) => {
                    self.leave_function();
                    self.cursor.advance();
                }
                Some(Keyword::IIz) => self.check_call(),
                Some(kw) if kw.starts_expression() || kw == Keyword::Maek => {
                    // A bare expression statement.
                    self.check_expression();
                    self.cursor.skip_to_next_line();
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn check_visible(&mut self) {
        loop {
            self.check_expression();
            if !matches!(self.cursor.current(), Some(t) if t.is_symbol("+")) {
                break;
            }
            self.cursor.advance();
        }
    }

    /// Open a parameter scope for the body of `HOW IZ I`. Parameter types
    /// start unknown; call sites seen anywhere in the program may already
    /// have refined them.
    fn enter_function(&mut self) {
        self.cursor.advance();
        let Some(name) = self.cursor.eat_ident() else {
            return;
        };
        let params = self
            .functions
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.params.clone())
            .unwrap_or_default();
        self.local_params = Some(params);
        self.cursor.skip_to_next_line();
    }

    fn leave_function(&mut self) {
        self.local_params = None;
    }

    /// Static type of a variable as far as this pass can know it.
    fn variable_type(&self, name: &str) -> StaticType {
        if let Some(params) = &self.local_params {
            if let Some(param) = params.iter().find(|p| p.name == name) {
                return StaticType::of(param.ty);
            }
        }
        match self.symbols.get(name) {
            Some(entry) => StaticType {
                ty: entry.value.type_name(),
                literal: Some(entry.value.clone()),
            },
            None => StaticType::unknown(),
        }
    }

    /// Walk one expression, checking every operand whose type is known.
    fn check_expression(&mut self) -> StaticType {
        let line = self.cursor.line();
        let Some(tok) = self.cursor.current() else {
            return StaticType::unknown();
        };

        match tok.kind {
            TokenKind::Numbr => {
                self.cursor.advance();
                tok.lexeme
                    .parse()
                    .map(Value::Numbr)
                    .map_or_else(|_| StaticType::of(TypeName::Numbr), StaticType::literal)
            }
            TokenKind::Numbar => {
                self.cursor.advance();
                tok.lexeme
                    .parse()
                    .map(Value::Numbar)
                    .map_or_else(|_| StaticType::of(TypeName::Numbar), StaticType::literal)
            }
            TokenKind::Yarn => {
                self.cursor.advance();
                StaticType::literal(Value::Yarn(tok.lexeme.clone()))
            }
            TokenKind::Troof => {
                self.cursor.advance();
                StaticType::literal(Value::Troof(tok.lexeme == "WIN"))
            }
            TokenKind::Ident => {
                self.cursor.advance();
                self.variable_type(&tok.lexeme)
            }
            TokenKind::Keyword(kw) => self.check_operator(kw, line),
            _ => {
                self.cursor.advance();
                StaticType::unknown()
            }
        }
    }

    fn check_operator(&mut self, kw: Keyword, line: usize) -> StaticType {
        match kw {
            Keyword::It => {
                self.cursor.advance();
                StaticType::unknown()
            }
            Keyword::Not => {
                self.cursor.advance();
                let operand = self.check_expression();
                self.check_boolean_operand(kw, &operand, line);
                StaticType::of(TypeName::Troof)
            }
            _ if kw.is_arithmetic() => {
                self.cursor.advance();
                let lhs = self.check_expression();
                self.cursor.eat_keyword(Keyword::An);
                let rhs = self.check_expression();
                self.check_arithmetic_operand(kw, &lhs, line);
                self.check_arithmetic_operand(kw, &rhs, line);
                let ty = if kw == Keyword::QuoshuntOf
                    || lhs.ty == TypeName::Numbar
                    || rhs.ty == TypeName::Numbar
                {
                    TypeName::Numbar
                } else {
                    TypeName::Numbr
                };
                StaticType::of(ty)
            }
            _ if kw.is_boolean_binary() => {
                self.cursor.advance();
                let lhs = self.check_expression();
                self.cursor.eat_keyword(Keyword::An);
                let rhs = self.check_expression();
                self.check_boolean_operand(kw, &lhs, line);
                self.check_boolean_operand(kw, &rhs, line);
                StaticType::of(TypeName::Troof)
            }
            _ if kw.is_comparison() => {
                self.cursor.advance();
                let lhs = self.check_expression();
                self.cursor.eat_keyword(Keyword::An);
                let rhs = self.check_expression();
                self.check_comparison_operand(kw, &lhs, line);
                self.check_comparison_operand(kw, &rhs, line);
                StaticType::of(TypeName::Troof)
            }
            _ if kw.is_variadic_boolean() => {
                self.cursor.advance();
                loop {
                    let operand = self.check_expression();
                    self.check_boolean_operand(kw, &operand, line);
                    if !self.cursor.eat_keyword(Keyword::An) {
                        break;
                    }
                }
                self.cursor.eat_keyword(Keyword::Mkay);
                StaticType::of(TypeName::Troof)
            }
            Keyword::Smoosh => {
                self.cursor.advance();
                loop {
                    self.check_expression();
                    if !self.cursor.eat_keyword(Keyword::An) {
                        break;
                    }
                }
                self.cursor.eat_keyword(Keyword::Mkay);
                StaticType::of(TypeName::Yarn)
            }
            Keyword::Maek => {
                self.cursor.advance();
                let operand = self.check_expression();
                self.cursor.eat_keyword(Keyword::A);
                let target = match self.cursor.current().map(|t| t.kind) {
                    Some(TokenKind::Type(ty)) => {
                        self.cursor.advance();
                        ty
                    }
                    _ => return StaticType::unknown(),
                };
                if let Some(value) = &operand.literal {
                    if let Err(err) = cast_value(value, target) {
                        self.error(err.kind, line, err.message);
                    }
                }
                StaticType::of(target)
            }
            _ => {
                self.cursor.advance();
                StaticType::unknown()
            }
        }
    }

    /// A YARN feeds arithmetic only when it is shaped like a number or
    /// spells a TROOF. Only literal operands can be judged here.
    fn check_arithmetic_operand(&mut self, op: Keyword, operand: &StaticType, line: usize) {
        if let Some(Value::Yarn(s)) = &operand.literal {
            let numeric = s == "WIN"
                || s == "FAIL"
                || cast_value(&Value::Yarn(s.clone()), TypeName::Numbar).is_ok();
            if !numeric {
                self.error(
                    ErrorKind::OperandType,
                    line,
                    format!("YARN \"{s}\" cannot be an operand of '{op}'"),
                );
            }
        }
    }

    /// Boolean operands must already look like truth values: a TROOF, a
    /// NOOB, or a literal spelling 0 or 1.
    fn check_boolean_operand(&mut self, op: Keyword, operand: &StaticType, line: usize) {
        let Some(value) = &operand.literal else {
            return;
        };
        let valid = match value {
            Value::Troof(_) | Value::Noob => true,
            Value::Numbr(n) => *n == 0 || *n == 1,
            Value::Numbar(x) => *x == 0.0 || *x == 1.0,
            Value::Yarn(s) => matches!(s.as_str(), "" | "0" | "1" | "0.0" | "1.0" | "WIN" | "FAIL"),
        };
        if !valid {
            self.error(
                ErrorKind::OperandType,
                line,
                format!("{} '{value}' cannot be an operand of '{op}'", value.type_name()),
            );
        }
    }

    /// Comparison is numeric: NUMBR, NUMBAR, or NOOB (which compares as 0).
    fn check_comparison_operand(&mut self, op: Keyword, operand: &StaticType, line: usize) {
        let Some(value) = &operand.literal else {
            return;
        };
        if matches!(value, Value::Yarn(_) | Value::Troof(_)) {
            self.error(
                ErrorKind::OperandType,
                line,
                format!("{} '{value}' cannot be an operand of '{op}'", value.type_name()),
            );
        }
    }

    /// `I IZ name YR .. MKAY`: validate argument types against the
    /// signature, refining unknown parameter types to the first argument
    /// type seen for them.
    fn check_call(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        let Some(name) = self.cursor.eat_ident() else {
            return;
        };
        let name = name.to_string();

        let mut args = Vec::new();
        if self.cursor.eat_keyword(Keyword::Yr) {
            loop {
                args.push(self.check_expression());
                if !(self.cursor.eat_keyword(Keyword::An) && self.cursor.eat_keyword(Keyword::Yr))
                {
                    break;
                }
            }
        }
        self.cursor.eat_keyword(Keyword::Mkay);

        let Some(idx) = self.functions.iter().position(|f| f.name == name) else {
            return;
        };
        for (pos, arg) in args.iter().enumerate() {
            let Some(param) = self.functions[idx].params.get(pos) else {
                break;
            };
            if param.ty == TypeName::Noob {
                if arg.ty != TypeName::Noob {
                    self.functions[idx].params[pos].ty = arg.ty;
                }
                continue;
            }
            if !types_compatible(param.ty, arg.ty) {
                let (param_name, param_ty) = {
                    let p = &self.functions[idx].params[pos];
                    (p.name.clone(), p.ty)
                };
                self.error(
                    ErrorKind::ArgumentType,
                    line,
                    format!(
                        "Argument {} of '{name}' is a {}, but parameter '{param_name}' expects a {param_ty}",
                        pos + 1,
                        arg.ty,
                    ),
                );
            }
        }
    }
}

/// Can a value of `arg` flow into a slot already typed `param`?
fn types_compatible(param: TypeName, arg: TypeName) -> bool {
    use TypeName::*;
    param == arg
        || matches!((param, arg), (Numbr | Numbar, Numbr | Numbar))
        || arg == Yarn
        || arg == Noob
        || param == Yarn
}
