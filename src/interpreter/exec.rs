//! The executor: a tree-walking run over the validated token sequence.
//!
//! Execution moves a [`TokenCursor`] through the program. Control flow is
//! cursor movement: loops jump back to their condition, function calls
//! jump into the body and back, and skipped branches are crossed with
//! depth-matched scans. All interpreter state lives in the [`Machine`]:
//! the active symbol table, the implicit `IT` result, and the call depth.

use log::{debug, trace};

use crate::cursor::TokenCursor;
use crate::diag::{Diagnostic, ErrorKind};
use crate::lexer::{Keyword, Token, TokenKind};
use crate::symbol::{find_function, FunctionSig, SymbolTable};

use super::coerce::{self, ArithOp, CoerceError};
use super::io::{InputSource, OutputBuffer};
use super::stack::{ExprStack, OpKind};
use super::value::Value;

/// Runaway-program ceilings.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// A single loop may not run more iterations than this.
    pub max_iterations: usize,
    /// Calls may not nest deeper than this.
    pub max_call_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            max_call_depth: 100,
        }
    }
}

/// What a finished (or aborted) run leaves behind.
#[derive(Debug)]
pub struct ExecOutcome {
    /// False when the run was aborted by a runtime error.
    pub ok: bool,
    pub symbols: SymbolTable,
    pub functions: Vec<FunctionSig>,
    pub diagnostics: Vec<Diagnostic>,
    pub output: String,
}

/// Where control goes after a statement.
#[derive(Debug, Clone, PartialEq)]
enum Flow {
    Normal,
    /// `GTFO`: leave the enclosing loop, switch case, or function.
    Break,
    /// `FOUND YR`: leave the enclosing function with a value.
    Return(Value),
    /// `KTHXBYE` was executed.
    Halt,
}

type Exec<T> = Result<T, Diagnostic>;

/// Runs a program. Construct one per run, feed it the parser's tables.
pub struct Executor<I> {
    input: I,
    limits: Limits,
}

impl<I: InputSource> Executor<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(input: I, limits: Limits) -> Self {
        Self { input, limits }
    }

    pub fn run(
        self,
        tokens: &[Token],
        symbols: SymbolTable,
        mut functions: Vec<FunctionSig>,
    ) -> ExecOutcome {
        record_bodies(tokens, &mut functions);
        let mut machine = Machine {
            cursor: TokenCursor::new(tokens),
            globals: symbols,
            it: Value::Noob,
            functions,
            input: self.input,
            output: OutputBuffer::new(),
            limits: self.limits,
            call_depth: 0,
        };

        let mut diagnostics = Vec::new();
        let ok = match machine.run_program() {
            Ok(()) => true,
            Err(diag) => {
                diagnostics.push(diag);
                false
            }
        };
        debug!("execution finished, ok = {ok}");
        ExecOutcome {
            ok,
            symbols: machine.globals,
            functions: machine.functions,
            diagnostics,
            output: machine.output.into_string(),
        }
    }
}

/// Remember where each function body starts, so calls can jump straight
/// there.
fn record_bodies(tokens: &[Token], functions: &mut [FunctionSig]) {
    let mut cursor = TokenCursor::new(tokens);
    while let Some(tok) = cursor.advance() {
        if !tok.is_keyword(Keyword::HowIzI) {
            continue;
        }
        let start = cursor.position() - 1;
        if let Some(name) = cursor.eat_ident() {
            if let Some(sig) = functions.iter_mut().find(|f| f.name == name) {
                sig.body_start = Some(start);
            }
        }
    }
}

struct Machine<'t, I> {
    cursor: TokenCursor<'t>,
    globals: SymbolTable,
    it: Value,
    functions: Vec<FunctionSig>,
    input: I,
    output: OutputBuffer,
    limits: Limits,
    call_depth: usize,
}

impl<'t, I: InputSource> Machine<'t, I> {
    fn fail(&self, kind: ErrorKind, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(kind, self.cursor.line(), message)
    }

    fn lift(&self, err: CoerceError) -> Diagnostic {
        Diagnostic::new(err.kind, self.cursor.line(), err.message)
    }

    fn run_program(&mut self) -> Exec<()> {
        self.cursor.skip_newlines();
        // HAI <newline>; the parser guaranteed the shape.
        self.cursor.eat_keyword(Keyword::Hai);
        self.cursor.skip_to_next_line();

        self.cursor.skip_newlines();
        if self.cursor.eat_keyword(Keyword::Wazzup) {
            self.cursor.skip_to_next_line();
            self.run_var_section()?;
        }

        loop {
            self.cursor.skip_newlines();
            if self.cursor.at_end() {
                return Ok(());
            }
            match self.exec_statement()? {
                Flow::Halt => return Ok(()),
                _ => continue,
            }
        }
    }

    /// `WAZZUP` .. `BUHBYE`: run declarations and re-assignments.
    fn run_var_section(&mut self) -> Exec<()> {
        loop {
            self.cursor.skip_newlines();
            if self.cursor.eat_keyword(Keyword::Buhbye) || self.cursor.at_end() {
                self.cursor.skip_to_next_line();
                return Ok(());
            }
            if self.cursor.eat_keyword(Keyword::IHasA) {
                let line = self.cursor.line();
                let name = self
                    .cursor
                    .eat_ident()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        self.fail(ErrorKind::MalformedStatement, "Malformed declaration")
                    })?;
                let value = if self.cursor.eat_keyword(Keyword::Itz) {
                    self.eval_expression()?
                } else {
                    Value::Noob
                };
                self.globals.declare(name, value, line);
                self.cursor.skip_to_next_line();
            } else {
                self.exec_statement()?;
            }
        }
    }

    fn exec_statement(&mut self) -> Exec<Flow> {
        let Some(tok) = self.cursor.current() else {
            return Ok(Flow::Halt);
        };
        trace!("executing statement at line {}", tok.line);

        match tok.keyword() {
            Some(Keyword::Kthxbye) => Ok(Flow::Halt),
            Some(Keyword::Visible) => {
                self.exec_visible()?;
                Ok(Flow::Normal)
            }
            Some(Keyword::Gimmeh) => {
                self.exec_gimmeh()?;
                Ok(Flow::Normal)
            }
            Some(Keyword::ORly) => self.exec_conditional(),
            Some(Keyword::Wtf) => self.exec_switch(),
            Some(Keyword::ImInYr) => self.exec_loop(),
            Some(Keyword::HowIzI) => {
                self.skip_function_body();
                Ok(Flow::Normal)
            }
            Some(Keyword::IIz) => {
                let value = self.exec_call()?;
                self.it = value;
                self.cursor.skip_to_next_line();
                Ok(Flow::Normal)
            }
            Some(Keyword::FoundYr) => {
                self.cursor.advance();
                let value = self.eval_expression()?;
                Ok(Flow::Return(value))
            }
            Some(Keyword::Gtfo) => {
                self.cursor.advance();
                Ok(Flow::Break)
            }
            None if tok.is_ident() => {
                match self.cursor.peek(1).and_then(Token::keyword) {
                    Some(Keyword::R) => {
                        self.exec_assignment()?;
                        Ok(Flow::Normal)
                    }
                    Some(Keyword::IsNowA) => {
                        self.exec_recast()?;
                        Ok(Flow::Normal)
                    }
                    _ => {
                        let value = self.eval_expression()?;
                        self.it = value;
                        self.cursor.skip_to_next_line();
                        Ok(Flow::Normal)
                    }
                }
            }
            _ => {
                // A bare expression; its value lands in IT.
                let value = self.eval_expression()?;
                self.it = value;
                self.cursor.skip_to_next_line();
                Ok(Flow::Normal)
            }
        }
    }

    /// `VISIBLE <expr> (+ <expr>)* [!]`
    fn exec_visible(&mut self) -> Exec<()> {
        self.cursor.advance();
        let mut suppress_newline = false;
        loop {
            let value = self.eval_expression()?;
            self.output.push(&value.to_string());
            match self.cursor.current() {
                Some(t) if t.is_symbol("+") => {
                    self.cursor.advance();
                }
                Some(t) if t.is_symbol("!") => {
                    suppress_newline = true;
                    self.cursor.advance();
                    break;
                }
                _ => break,
            }
        }
        if !suppress_newline {
            self.output.push_newline();
        }
        self.cursor.skip_to_next_line();
        Ok(())
    }

    /// `GIMMEH var`: the line read is always a YARN; exhausted input reads
    /// as an empty one.
    fn exec_gimmeh(&mut self) -> Exec<()> {
        self.cursor.advance();
        let name = self
            .cursor
            .eat_ident()
            .map(str::to_string)
            .ok_or_else(|| self.fail(ErrorKind::MalformedStatement, "Malformed 'GIMMEH'"))?;
        let line = self.input.read_line().unwrap_or_default();
        if !self.globals.assign(&name, Value::Yarn(line)) {
            return Err(self.fail(
                ErrorKind::MissingSymbol,
                format!("Variable '{name}' is not declared"),
            ));
        }
        self.cursor.skip_to_next_line();
        Ok(())
    }

    /// `var R <expr>`
    fn exec_assignment(&mut self) -> Exec<()> {
        let name = self
            .cursor
            .eat_ident()
            .expect("caller checked for an identifier")
            .to_string();
        self.cursor.advance(); // R
        let value = self.eval_expression()?;
        if !self.globals.assign(&name, value) {
            return Err(self.fail(
                ErrorKind::MissingSymbol,
                format!("Variable '{name}' is not declared"),
            ));
        }
        self.cursor.skip_to_next_line();
        Ok(())
    }

    /// `var IS NOW A <type>`: re-cast the variable in place.
    fn exec_recast(&mut self) -> Exec<()> {
        let name = self
            .cursor
            .eat_ident()
            .expect("caller checked for an identifier")
            .to_string();
        self.cursor.advance(); // IS NOW A
        let target = match self.cursor.current().map(|t| t.kind) {
            Some(TokenKind::Type(ty)) => ty,
            _ => return Err(self.fail(ErrorKind::MalformedStatement, "Malformed 'IS NOW A'")),
        };
        self.cursor.advance();
        let current = self
            .globals
            .value(&name)
            .cloned()
            .ok_or_else(|| {
                self.fail(
                    ErrorKind::MissingSymbol,
                    format!("Variable '{name}' is not declared"),
                )
            })?;
        let cast = coerce::cast_value(&current, target).map_err(|e| self.lift(e))?;
        self.globals.assign(&name, cast);
        self.cursor.skip_to_next_line();
        Ok(())
    }

    /// `O RLY?` branches on the truthiness of `IT`.
    fn exec_conditional(&mut self) -> Exec<Flow> {
        self.cursor.advance(); // O RLY?
        self.cursor.skip_to_next_line();
        self.cursor.skip_newlines();
        self.cursor.eat_keyword(Keyword::YaRly);
        self.cursor.skip_to_next_line();

        let flow = if self.it.is_truthy() {
            self.exec_block(|t| {
                matches!(t.keyword(), Some(Keyword::NoWai | Keyword::Oic))
            })?
        } else {
            // Cross the true branch; run the false one if it exists.
            match self.skip_branch() {
                Some(Keyword::NoWai) => {
                    self.cursor.skip_to_next_line();
                    self.exec_block(|t| matches!(t.keyword(), Some(Keyword::Oic)))?
                }
                _ => Flow::Normal,
            }
        };
        // The cursor must leave past this conditional's own OIC even when a
        // GTFO or FOUND YR cut the branch short; otherwise an enclosing
        // switch or loop scan would pair up with the wrong closer.
        self.skip_to_conditional_end();
        self.cursor.eat_keyword(Keyword::Oic);
        self.cursor.skip_to_next_line();
        Ok(flow)
    }

    /// `WTF?`: match `IT` against each case literal, first match wins, no
    /// fallthrough; `OMGWTF` runs only when nothing matched.
    fn exec_switch(&mut self) -> Exec<Flow> {
        self.cursor.advance(); // WTF?
        self.cursor.skip_to_next_line();
        let subject = self.it.clone();

        loop {
            self.cursor.skip_newlines();
            let Some(tok) = self.cursor.current() else {
                return Ok(Flow::Normal);
            };
            match tok.keyword() {
                Some(Keyword::Omg) => {
                    self.cursor.advance();
                    let literal = self.literal_token()?;
                    self.cursor.skip_to_next_line();
                    if coerce::exactly_equal(&subject, &literal) {
                        return self.run_case_body();
                    }
                    self.skip_case_body();
                }
                Some(Keyword::Omgwtf) => {
                    self.cursor.advance();
                    self.cursor.skip_to_next_line();
                    return self.run_case_body();
                }
                Some(Keyword::Oic) => {
                    self.cursor.advance();
                    self.cursor.skip_to_next_line();
                    return Ok(Flow::Normal);
                }
                _ => {
                    // Statements before the first case never execute.
                    self.cursor.skip_to_next_line();
                }
            }
        }
    }

    /// Run a matched case until the next case marker or `OIC`, then cross
    /// the rest of the switch. `GTFO` just ends the case.
    fn run_case_body(&mut self) -> Exec<Flow> {
        let flow = self.exec_block(|t| {
            matches!(
                t.keyword(),
                Some(Keyword::Omg | Keyword::Omgwtf | Keyword::Oic)
            )
        })?;
        match flow {
            Flow::Normal | Flow::Break => {
                self.skip_to_conditional_end();
                self.cursor.eat_keyword(Keyword::Oic);
                self.cursor.skip_to_next_line();
                Ok(Flow::Normal)
            }
            other => Ok(other),
        }
    }

    /// The literal after `OMG`.
    fn literal_token(&mut self) -> Exec<Value> {
        let Some(tok) = self.cursor.current() else {
            return Err(self.fail(ErrorKind::MalformedStatement, "Missing case literal"));
        };
        let value = match tok.kind {
            TokenKind::Numbr => tok.lexeme.parse().map(Value::Numbr).map_err(|_| {
                self.fail(
                    ErrorKind::MalformedStatement,
                    format!("NUMBR literal '{}' is out of range", tok.lexeme),
                )
            })?,
            TokenKind::Numbar => tok.lexeme.parse().map(Value::Numbar).map_err(|_| {
                self.fail(
                    ErrorKind::MalformedStatement,
                    format!("NUMBAR literal '{}' is out of range", tok.lexeme),
                )
            })?,
            TokenKind::Yarn => Value::Yarn(tok.lexeme.clone()),
            TokenKind::Troof => Value::Troof(tok.lexeme == "WIN"),
            _ => {
                return Err(self.fail(
                    ErrorKind::MalformedStatement,
                    format!("Expected a literal after 'OMG', found {}", tok.describe()),
                ))
            }
        };
        self.cursor.advance();
        Ok(value)
    }

    /// `IM IN YR label UPPIN|NERFIN YR var TIL|WILE <expr>`
    fn exec_loop(&mut self) -> Exec<Flow> {
        self.cursor.advance(); // IM IN YR
        self.cursor.eat_ident(); // label
        let stepping_up = self.cursor.eat_keyword(Keyword::Uppin);
        if !stepping_up {
            self.cursor.eat_keyword(Keyword::Nerfin);
        }
        self.cursor.eat_keyword(Keyword::Yr);
        let var = self
            .cursor
            .eat_ident()
            .map(str::to_string)
            .ok_or_else(|| self.fail(ErrorKind::MalformedStatement, "Malformed loop header"))?;
        let until_style = self.cursor.eat_keyword(Keyword::Til);
        if !until_style {
            self.cursor.eat_keyword(Keyword::Wile);
        }

        let condition_start = self.cursor.position();
        self.eval_expression()?;
        self.cursor.skip_to_next_line();
        let body_start = self.cursor.position();
        let resume = self.loop_resume_position(body_start);

        let mut iterations = 0usize;
        loop {
            self.cursor.jump_to(condition_start);
            let condition = self.eval_expression()?.is_truthy();
            let keep_going = if until_style { !condition } else { condition };
            if !keep_going {
                break;
            }
            iterations += 1;
            if iterations > self.limits.max_iterations {
                self.cursor.jump_to(condition_start);
                return Err(self.fail(
                    ErrorKind::IterationLimit,
                    format!(
                        "Loop exceeded {} iterations and was stopped",
                        self.limits.max_iterations
                    ),
                ));
            }

            self.cursor.jump_to(body_start);
            let flow =
                self.exec_block(|t| matches!(t.keyword(), Some(Keyword::ImOuttaYr)))?;
            match flow {
                Flow::Normal => self.step_loop_variable(&var, stepping_up)?,
                Flow::Break => break,
                other => return Ok(other),
            }
        }

        self.cursor.jump_to(resume);
        Ok(Flow::Normal)
    }

    /// Token position just past the `IM OUTTA YR` line that closes the
    /// loop body starting at `body_start`.
    fn loop_resume_position(&mut self, body_start: usize) -> usize {
        let saved = self.cursor.position();
        self.cursor.jump_to(body_start);
        let mut depth = 0usize;
        while let Some(tok) = self.cursor.advance() {
            match tok.keyword() {
                Some(Keyword::ImInYr) => depth += 1,
                Some(Keyword::ImOuttaYr) => {
                    if depth == 0 {
                        self.cursor.skip_to_next_line();
                        let resume = self.cursor.position();
                        self.cursor.jump_to(saved);
                        return resume;
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        let end = self.cursor.position();
        self.cursor.jump_to(saved);
        end
    }

    /// `UPPIN` adds one to the loop variable, `NERFIN` subtracts one.
    fn step_loop_variable(&mut self, var: &str, stepping_up: bool) -> Exec<()> {
        let current = self
            .globals
            .value(var)
            .cloned()
            .ok_or_else(|| {
                self.fail(
                    ErrorKind::MissingSymbol,
                    format!("Variable '{var}' is not declared"),
                )
            })?;
        let op = if stepping_up {
            ArithOp::Sum
        } else {
            ArithOp::Diff
        };
        let next = coerce::arithmetic(op, &current, &Value::Numbr(1)).map_err(|e| self.lift(e))?;
        self.globals.assign(var, next);
        Ok(())
    }

    /// `HOW IZ I` bodies are skipped during the main walk and only entered
    /// through calls.
    fn skip_function_body(&mut self) {
        self.cursor.advance();
        while let Some(tok) = self.cursor.advance() {
            if tok.is_keyword(Keyword::IfUSaySo) {
                self.cursor.skip_to_next_line();
                return;
            }
        }
    }

    /// `I IZ name [YR <expr> (AN YR <expr>)*] MKAY`
    ///
    /// Arguments are evaluated in the caller's scope. The callee runs on a
    /// snapshot of the globals with its parameters bound on top; whatever
    /// it writes is discarded when it returns.
    fn exec_call(&mut self) -> Exec<Value> {
        let call_line = self.cursor.line();
        self.cursor.advance(); // I IZ
        let name = self
            .cursor
            .eat_ident()
            .map(str::to_string)
            .ok_or_else(|| self.fail(ErrorKind::MalformedStatement, "Malformed call"))?;

        let mut args = Vec::new();
        if self.cursor.eat_keyword(Keyword::Yr) {
            loop {
                args.push(self.eval_expression()?);
                if !(self.cursor.eat_keyword(Keyword::An) && self.cursor.eat_keyword(Keyword::Yr))
                {
                    break;
                }
            }
        }
        self.cursor.eat_keyword(Keyword::Mkay);

        let sig = find_function(&self.functions, &name).ok_or_else(|| {
            Diagnostic::new(
                ErrorKind::UndefinedFunction,
                call_line,
                format!("Function '{name}' is not declared"),
            )
        })?;
        if sig.arity() != args.len() {
            return Err(Diagnostic::new(
                ErrorKind::ArgumentCount,
                call_line,
                format!(
                    "Function '{name}' takes {} argument(s), but {} were given",
                    sig.arity(),
                    args.len()
                ),
            ));
        }
        let body_start = sig.body_start.ok_or_else(|| {
            Diagnostic::new(
                ErrorKind::UndefinedFunction,
                call_line,
                format!("Function '{name}' has no body"),
            )
        })?;
        let params: Vec<String> = sig.params.iter().map(|p| p.name.clone()).collect();

        if self.call_depth + 1 > self.limits.max_call_depth {
            return Err(Diagnostic::new(
                ErrorKind::RecursionLimit,
                call_line,
                format!(
                    "Call depth exceeded {} and the program was stopped",
                    self.limits.max_call_depth
                ),
            ));
        }

        let saved_position = self.cursor.position();
        let saved_globals = self.globals.clone();
        let saved_it = std::mem::replace(&mut self.it, Value::Noob);
        for (param, arg) in params.iter().zip(args) {
            self.globals.bind(param, arg);
        }
        self.call_depth += 1;

        self.cursor.jump_to(body_start);
        self.cursor.skip_to_next_line(); // past the HOW IZ I header
        let result = self.run_function_body();

        self.call_depth -= 1;
        self.globals = saved_globals;
        self.it = saved_it;
        self.cursor.jump_to(saved_position);
        result
    }

    fn run_function_body(&mut self) -> Exec<Value> {
        let flow = self.exec_block(|t| matches!(t.keyword(), Some(Keyword::IfUSaySo)))?;
        Ok(match flow {
            Flow::Return(value) => value,
            // GTFO or falling off the end returns nothing.
            _ => Value::Noob,
        })
    }

    /// Execute statements until a terminator token (left unconsumed) or a
    /// non-normal flow.
    fn exec_block(&mut self, terminator: fn(&Token) -> bool) -> Exec<Flow> {
        loop {
            self.cursor.skip_newlines();
            let Some(tok) = self.cursor.current() else {
                return Ok(Flow::Normal);
            };
            if terminator(tok) {
                return Ok(Flow::Normal);
            }
            let flow = self.exec_statement()?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
    }

    /// From inside a conditional or switch, cross everything up to and
    /// including the matching `OIC`.
    fn skip_to_conditional_end(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.cursor.advance() {
            match tok.keyword() {
                Some(Keyword::ORly | Keyword::Wtf) => depth += 1,
                Some(Keyword::Oic) => {
                    if depth == 0 {
                        // Step back so the caller sees the OIC.
                        self.cursor.jump_to(self.cursor.position() - 1);
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
    }

    /// Cross the true branch of a conditional. Returns the keyword that
    /// ended the scan (`NO WAI` or `OIC`), leaving the cursor on it.
    fn skip_branch(&mut self) -> Option<Keyword> {
        let mut depth = 0usize;
        while let Some(tok) = self.cursor.advance() {
            match tok.keyword() {
                Some(Keyword::ORly | Keyword::Wtf) => depth += 1,
                Some(Keyword::NoWai) if depth == 0 => {
                    self.cursor.jump_to(self.cursor.position() - 1);
                    return Some(Keyword::NoWai);
                }
                Some(Keyword::Oic) => {
                    if depth == 0 {
                        self.cursor.jump_to(self.cursor.position() - 1);
                        return Some(Keyword::Oic);
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        None
    }

    /// Cross one switch case, stopping on the next `OMG`/`OMGWTF`/`OIC`
    /// at this nesting level.
    fn skip_case_body(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.cursor.current() {
            match tok.keyword() {
                Some(Keyword::ORly | Keyword::Wtf) => {
                    depth += 1;
                    self.cursor.advance();
                }
                Some(Keyword::Oic) if depth > 0 => {
                    depth -= 1;
                    self.cursor.advance();
                }
                Some(Keyword::Omg | Keyword::Omgwtf | Keyword::Oic) if depth == 0 => return,
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Evaluate one prefix expression with the operand stack.
    fn eval_expression(&mut self) -> Exec<Value> {
        let line = self.cursor.line();
        let mut stack = ExprStack::new();

        loop {
            let Some(tok) = self.cursor.current() else {
                break;
            };
            if tok.is_newline() {
                break;
            }
            if stack.is_complete() {
                break;
            }

            match tok.kind {
                TokenKind::Numbr => {
                    let value = tok.lexeme.parse().map(Value::Numbr).map_err(|_| {
                        self.fail(
                            ErrorKind::MalformedStatement,
                            format!("NUMBR literal '{}' is out of range", tok.lexeme),
                        )
                    })?;
                    self.cursor.advance();
                    stack.push_value(value).map_err(|e| self.lift(e))?;
                }
                TokenKind::Numbar => {
                    let value = tok.lexeme.parse().map(Value::Numbar).map_err(|_| {
                        self.fail(
                            ErrorKind::MalformedStatement,
                            format!("NUMBAR literal '{}' is out of range", tok.lexeme),
                        )
                    })?;
                    self.cursor.advance();
                    stack.push_value(value).map_err(|e| self.lift(e))?;
                }
                TokenKind::Yarn => {
                    let value = Value::Yarn(tok.lexeme.clone());
                    self.cursor.advance();
                    stack.push_value(value).map_err(|e| self.lift(e))?;
                }
                TokenKind::Troof => {
                    let value = Value::Troof(tok.lexeme == "WIN");
                    self.cursor.advance();
                    stack.push_value(value).map_err(|e| self.lift(e))?;
                }
                TokenKind::Ident => {
                    let value = self
                        .globals
                        .value(&tok.lexeme)
                        .cloned()
                        .ok_or_else(|| {
                            self.fail(
                                ErrorKind::MissingSymbol,
                                format!("Variable '{}' is not declared", tok.lexeme),
                            )
                        })?;
                    self.cursor.advance();
                    stack.push_value(value).map_err(|e| self.lift(e))?;
                }
                TokenKind::Keyword(Keyword::It) => {
                    let value = self.it.clone();
                    self.cursor.advance();
                    stack.push_value(value).map_err(|e| self.lift(e))?;
                }
                TokenKind::Keyword(Keyword::An) => {
                    self.cursor.advance();
                }
                TokenKind::Keyword(Keyword::Mkay) => {
                    if !stack.has_open_variadic() {
                        break;
                    }
                    self.cursor.advance();
                    stack.close_variadic().map_err(|e| self.lift(e))?;
                }
                TokenKind::Keyword(Keyword::Maek) => {
                    self.cursor.advance();
                    let value = self.eval_expression()?;
                    self.cursor.eat_keyword(Keyword::A);
                    let target = match self.cursor.current().map(|t| t.kind) {
                        Some(TokenKind::Type(ty)) => ty,
                        _ => {
                            return Err(
                                self.fail(ErrorKind::MalformedStatement, "Malformed 'MAEK'")
                            )
                        }
                    };
                    self.cursor.advance();
                    let cast = coerce::cast_value(&value, target).map_err(|e| self.lift(e))?;
                    stack.push_value(cast).map_err(|e| self.lift(e))?;
                }
                TokenKind::Keyword(kw) => {
                    let op = match operator_for(kw) {
                        Some(op) => op,
                        None => break,
                    };
                    self.cursor.advance();
                    stack.push_operator(op).map_err(|e| self.lift(e))?;
                }
                _ => break,
            }
        }

        stack
            .finish()
            .map_err(|e| Diagnostic::new(e.kind, line, e.message))
    }
}

fn operator_for(kw: Keyword) -> Option<OpKind> {
    Some(match kw {
        Keyword::SumOf => OpKind::Arith(ArithOp::Sum),
        Keyword::DiffOf => OpKind::Arith(ArithOp::Diff),
        Keyword::ProduktOf => OpKind::Arith(ArithOp::Produkt),
        Keyword::QuoshuntOf => OpKind::Arith(ArithOp::Quoshunt),
        Keyword::ModOf => OpKind::Arith(ArithOp::Mod),
        Keyword::BiggrOf => OpKind::Arith(ArithOp::Biggr),
        Keyword::SmallrOf => OpKind::Arith(ArithOp::Smallr),
        Keyword::BothOf => OpKind::BothOf,
        Keyword::EitherOf => OpKind::EitherOf,
        Keyword::WonOf => OpKind::WonOf,
        Keyword::Not => OpKind::Not,
        Keyword::AllOf => OpKind::AllOf,
        Keyword::AnyOf => OpKind::AnyOf,
        Keyword::BothSaem => OpKind::BothSaem,
        Keyword::Diffrint => OpKind::Diffrint,
        Keyword::Smoosh => OpKind::Smoosh,
        _ => return None,
    })
}
