//! The pushdown parser.
//!
//! A single forward walk over the token sequence, with a [`BlockStack`]
//! tracking the open `HAI`/`O RLY?`/`WTF?`/`IM IN YR`/`HOW IZ I` blocks.
//! The parser validates statement structure, builds the symbol table from
//! the `WAZZUP` section and the function signature list from `HOW IZ I`
//! headers, and reports every structural error it can find; on a broken
//! statement it recovers by skipping to the next line.

mod expr;

pub use expr::ExprInfo;

use log::debug;

use crate::cursor::{BlockKind, BlockStack, TokenCursor};
use crate::diag::{Diagnostic, ErrorKind};
use crate::interpreter::Value;
use crate::lexer::{Keyword, Token, TokenKind, TypeName};
use crate::symbol::{find_function, FunctionSig, Param, SymbolTable};

/// Everything the parser hands to the later stages.
#[derive(Debug)]
pub struct ParseOutcome {
    /// False when any non-warning diagnostic was produced.
    pub ok: bool,
    pub symbols: SymbolTable,
    pub functions: Vec<FunctionSig>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse the token sequence produced by the lexer.
pub fn parse(tokens: &[Token]) -> ParseOutcome {
    let (functions, diags) = scan_signatures(tokens);
    let mut parser = Parser {
        cursor: TokenCursor::new(tokens),
        blocks: BlockStack::new(),
        symbols: SymbolTable::new(),
        functions,
        diags,
        current_fn: None,
        program_ended: false,
    };
    parser.run();

    let ok = crate::diag::all_warnings(&parser.diags);
    debug!(
        "parse finished: {} symbols, {} functions, {} diagnostics",
        parser.symbols.len(),
        parser.functions.len(),
        parser.diags.len()
    );
    ParseOutcome {
        ok,
        symbols: parser.symbols,
        functions: parser.functions,
        diagnostics: parser.diags,
    }
}

/// Collect every `HOW IZ I` signature up front, so calls that precede the
/// declaration still check out. Malformed headers are left for the main
/// walk to report; only duplicates are flagged here.
fn scan_signatures(tokens: &[Token]) -> (Vec<FunctionSig>, Vec<Diagnostic>) {
    let mut functions: Vec<FunctionSig> = Vec::new();
    let mut diags = Vec::new();
    let mut cursor = TokenCursor::new(tokens);

    while let Some(tok) = cursor.advance() {
        if !tok.is_keyword(Keyword::HowIzI) {
            continue;
        }
        let Some(name) = cursor.eat_ident() else {
            continue;
        };
        if find_function(&functions, name).is_some() {
            diags.push(Diagnostic::new(
                ErrorKind::DuplicateDeclaration,
                tok.line,
                format!("Function '{name}' is already declared"),
            ));
            cursor.skip_to_next_line();
            continue;
        }
        let mut sig = FunctionSig::new(name, tok.line);
        if cursor.eat_keyword(Keyword::Yr) {
            loop {
                let Some(param) = cursor.eat_ident() else {
                    break;
                };
                sig.params.push(Param {
                    name: param.to_string(),
                    ty: TypeName::Noob,
                });
                if !(cursor.eat_keyword(Keyword::An) && cursor.eat_keyword(Keyword::Yr)) {
                    break;
                }
            }
        }
        functions.push(sig);
    }
    (functions, diags)
}

pub(crate) struct Parser<'t> {
    pub(crate) cursor: TokenCursor<'t>,
    blocks: BlockStack,
    pub(crate) symbols: SymbolTable,
    pub(crate) functions: Vec<FunctionSig>,
    pub(crate) diags: Vec<Diagnostic>,
    /// Index into `functions` while inside a `HOW IZ I` body.
    pub(crate) current_fn: Option<usize>,
    program_ended: bool,
}

impl<'t> Parser<'t> {
    pub(crate) fn error(&mut self, kind: ErrorKind, line: usize, message: impl Into<String>) {
        self.diags.push(Diagnostic::new(kind, line, message));
    }

    /// Is `name` visible here: a parameter of the enclosing function, or a
    /// declared variable?
    pub(crate) fn is_declared(&self, name: &str) -> bool {
        if let Some(idx) = self.current_fn {
            if self.functions[idx].params.iter().any(|p| p.name == name) {
                return true;
            }
        }
        self.symbols.contains(name)
    }

    fn run(&mut self) {
        self.cursor.skip_newlines();
        if self.cursor.at_end() {
            self.error(
                ErrorKind::MissingDelimiter,
                1,
                "Program must start with 'HAI', found end of input",
            );
            return;
        }
        if let Some(tok) = self.cursor.current() {
            if tok.is_keyword(Keyword::Hai) {
                let line = tok.line;
                self.cursor.advance();
                self.blocks.push(BlockKind::Program, line);
                self.end_of_statement();
            } else {
                let line = tok.line;
                let found = tok.describe();
                self.error(
                    ErrorKind::MissingDelimiter,
                    line,
                    format!("Program must start with 'HAI', found {found}"),
                );
            }
        }

        // The variable section is only legal immediately after HAI.
        self.cursor.skip_newlines();
        if self.cursor.at_keyword(Keyword::Wazzup) {
            self.parse_var_section();
        }

        while !self.cursor.at_end() {
            self.cursor.skip_newlines();
            if self.cursor.at_end() {
                break;
            }
            if self.program_ended {
                let tok = self.cursor.current().expect("cursor is not at end");
                let (line, found) = (tok.line, tok.describe());
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("Unexpected {found} after 'KTHXBYE'"),
                );
                break;
            }
            self.parse_statement();
        }

        if !self.program_ended {
            for frame in self.blocks.unclosed() {
                let (kind, line, message) = match &frame.kind {
                    BlockKind::Program => (
                        ErrorKind::MissingDelimiter,
                        frame.opened_at,
                        "Program is missing 'KTHXBYE'".to_string(),
                    ),
                    other => (
                        ErrorKind::MismatchedBlock,
                        frame.opened_at,
                        format!("'{}' block is never closed", other.opener()),
                    ),
                };
                self.diags.push(Diagnostic::new(kind, line, message));
            }
        }
    }

    /// `WAZZUP` .. `BUHBYE`: declarations (and re-assignments of already
    /// declared variables), nothing else.
    fn parse_var_section(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        self.blocks.push(BlockKind::VarSection, line);
        self.end_of_statement();

        loop {
            self.cursor.skip_newlines();
            if self.cursor.eat_keyword(Keyword::Buhbye) {
                self.blocks.pop();
                self.end_of_statement();
                return;
            }
            let Some(tok) = self.cursor.current() else {
                break;
            };
            if tok.is_keyword(Keyword::IHasA) {
                self.parse_declaration();
            } else if tok.is_ident() && matches!(self.cursor.peek(1), Some(t) if t.is_keyword(Keyword::R))
            {
                self.parse_assignment();
            } else {
                let (line, found) = (tok.line, tok.describe());
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("Only variable declarations are allowed inside 'WAZZUP', found {found}"),
                );
                self.cursor.skip_to_next_line();
            }
        }
        // Ran off the end of input with the section still open.
        self.blocks.pop();
        self.error(
            ErrorKind::MismatchedBlock,
            line,
            "'WAZZUP' section is missing 'BUHBYE'",
        );
    }

    /// `I HAS A var [ITZ <expr>]`
    fn parse_declaration(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        let Some(name) = self.cursor.eat_ident() else {
            let found = self.describe_current();
            self.error(
                ErrorKind::MalformedStatement,
                line,
                format!("Expected a variable name after 'I HAS A', found {found}"),
            );
            self.cursor.skip_to_next_line();
            return;
        };
        if self.symbols.contains(name) {
            self.error(
                ErrorKind::DuplicateDeclaration,
                line,
                format!("Variable '{name}' is already declared"),
            );
            self.cursor.skip_to_next_line();
            return;
        }

        let mut initial = Value::Noob;
        if self.cursor.eat_keyword(Keyword::Itz) {
            match self.parse_expression() {
                Some(info) => {
                    // Literal initializers land in the table now; computed
                    // ones are filled in by the executor.
                    if let Some(value) = info.literal {
                        initial = value;
                    }
                }
                None => {
                    self.cursor.skip_to_next_line();
                    self.symbols.declare(name, Value::Noob, line);
                    return;
                }
            }
        }
        self.symbols.declare(name, initial, line);
        self.end_of_statement();
    }

    /// `var R <expr>`
    fn parse_assignment(&mut self) {
        let line = self.cursor.line();
        let name = self
            .cursor
            .eat_ident()
            .expect("caller checked for an identifier")
            .to_string();
        self.cursor.advance(); // R
        if !self.is_declared(&name) {
            self.error(
                ErrorKind::UndeclaredVariable,
                line,
                format!("Variable '{name}' is not declared"),
            );
        }
        if self.parse_expression().is_none() {
            self.cursor.skip_to_next_line();
            return;
        }
        self.end_of_statement();
    }

    fn parse_statement(&mut self) {
        let Some(tok) = self.cursor.current() else {
            return;
        };
        let line = tok.line;

        // A freshly opened conditional or switch constrains what may follow.
        if let Some(frame) = self.blocks.top() {
            if frame.kind == BlockKind::Conditional
                && !matches!(
                    tok.keyword(),
                    Some(Keyword::YaRly | Keyword::Oic | Keyword::Mebbe)
                )
            {
                let found = tok.describe();
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("Expected 'YA RLY' after 'O RLY?', found {found}"),
                );
                self.cursor.skip_to_next_line();
                return;
            }
        }

        match tok.keyword() {
            Some(Keyword::Kthxbye) => {
                self.cursor.advance();
                while let Some(frame) = self.blocks.top() {
                    if frame.kind == BlockKind::Program {
                        break;
                    }
                    let frame = self.blocks.pop().expect("top frame exists");
                    self.error(
                        ErrorKind::MismatchedBlock,
                        frame.opened_at,
                        format!("'{}' block is never closed", frame.kind.opener()),
                    );
                }
                self.blocks.pop();
                self.program_ended = true;
                self.end_of_statement();
            }
            Some(Keyword::Wazzup) => {
                self.cursor.advance();
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    "'WAZZUP' must appear immediately after 'HAI'",
                );
                self.cursor.skip_to_next_line();
            }
            Some(Keyword::IHasA) => {
                self.cursor.advance();
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    "Variable declarations are only allowed inside 'WAZZUP' .. 'BUHBYE'",
                );
                self.cursor.skip_to_next_line();
            }
            Some(Keyword::Visible) => self.parse_visible(),
            Some(Keyword::Gimmeh) => self.parse_gimmeh(),
            Some(Keyword::ORly) => self.parse_o_rly(),
            Some(Keyword::YaRly) => self.parse_ya_rly(),
            Some(Keyword::NoWai) => self.parse_no_wai(),
            Some(Keyword::Mebbe) => {
                self.cursor.advance();
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    "'MEBBE' branches are not supported",
                );
                self.cursor.skip_to_next_line();
            }
            Some(Keyword::Oic) => self.parse_oic(),
            Some(Keyword::Wtf) => self.parse_wtf(),
            Some(Keyword::Omg) => self.parse_omg(),
            Some(Keyword::Omgwtf) => self.parse_omgwtf(),
            Some(Keyword::Gtfo) => self.parse_gtfo(),
            Some(Keyword::ImInYr) => self.parse_loop_open(),
            Some(Keyword::ImOuttaYr) => self.parse_loop_close(),
            Some(Keyword::HowIzI) => self.parse_function_open(),
            Some(Keyword::IfUSaySo) => self.parse_function_close(),
            Some(Keyword::FoundYr) => self.parse_found_yr(),
            Some(Keyword::IIz) => self.parse_call(),
            Some(kw) if kw.starts_expression() || kw == Keyword::Maek => {
                self.parse_expression_statement()
            }
            None if tok.is_ident() => {
                match self.cursor.peek(1).and_then(Token::keyword) {
                    Some(Keyword::R) => self.parse_assignment(),
                    Some(Keyword::IsNowA) => self.parse_recast(),
                    _ => self.parse_expression_statement(),
                }
            }
            None if matches!(
                tok.kind,
                TokenKind::Numbr | TokenKind::Numbar | TokenKind::Yarn | TokenKind::Troof
            ) =>
            {
                self.parse_expression_statement()
            }
            _ => {
                let found = tok.describe();
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("Unexpected {found} at the start of a statement"),
                );
                self.cursor.skip_to_next_line();
            }
        }
    }

    /// `VISIBLE <expr> (+ <expr>)* [!]`
    fn parse_visible(&mut self) {
        self.cursor.advance();
        loop {
            if self.parse_expression().is_none() {
                self.cursor.skip_to_next_line();
                return;
            }
            if !matches!(self.cursor.current(), Some(t) if t.is_symbol("+")) {
                break;
            }
            self.cursor.advance();
        }
        if matches!(self.cursor.current(), Some(t) if t.is_symbol("!")) {
            self.cursor.advance();
        }
        self.end_of_statement();
    }

    /// `GIMMEH var`
    fn parse_gimmeh(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        match self.cursor.eat_ident() {
            Some(name) => {
                if !self.is_declared(name) {
                    let name = name.to_string();
                    self.error(
                        ErrorKind::UndeclaredVariable,
                        line,
                        format!("Variable '{name}' is not declared"),
                    );
                }
                self.end_of_statement();
            }
            None => {
                let found = self.describe_current();
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("Expected a variable name after 'GIMMEH', found {found}"),
                );
                self.cursor.skip_to_next_line();
            }
        }
    }

    /// `var IS NOW A <type>`
    fn parse_recast(&mut self) {
        let line = self.cursor.line();
        let name = self
            .cursor
            .eat_ident()
            .expect("caller checked for an identifier")
            .to_string();
        self.cursor.advance(); // IS NOW A
        if !self.is_declared(&name) {
            self.error(
                ErrorKind::UndeclaredVariable,
                line,
                format!("Variable '{name}' is not declared"),
            );
        }
        match self.cursor.current().map(|t| t.kind) {
            Some(TokenKind::Type(_)) => {
                self.cursor.advance();
                self.end_of_statement();
            }
            _ => {
                let found = self.describe_current();
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("Expected a type after 'IS NOW A', found {found}"),
                );
                self.cursor.skip_to_next_line();
            }
        }
    }

    /// A bare expression: evaluated for its side effect on `IT`.
    fn parse_expression_statement(&mut self) {
        if self.parse_expression().is_none() {
            self.cursor.skip_to_next_line();
            return;
        }
        self.end_of_statement();
    }

    fn parse_o_rly(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        self.blocks.push(BlockKind::Conditional, line);
        self.end_of_statement();
    }

    fn parse_ya_rly(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        if matches!(self.blocks.top(), Some(f) if f.kind == BlockKind::Conditional) {
            self.blocks.push(BlockKind::TrueBranch, line);
            self.end_of_statement();
        } else {
            self.error(
                ErrorKind::MismatchedBlock,
                line,
                "'YA RLY' outside of 'O RLY?'",
            );
            self.cursor.skip_to_next_line();
        }
    }

    fn parse_no_wai(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        if matches!(self.blocks.top(), Some(f) if f.kind == BlockKind::TrueBranch) {
            self.blocks.pop();
            self.blocks.push(BlockKind::FalseBranch, line);
            self.end_of_statement();
        } else {
            self.error(
                ErrorKind::MismatchedBlock,
                line,
                "'NO WAI' without a preceding 'YA RLY'",
            );
            self.cursor.skip_to_next_line();
        }
    }

    /// `OIC` closes either a conditional (with its open branch) or a switch.
    fn parse_oic(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        if matches!(
            self.blocks.top(),
            Some(f) if matches!(f.kind, BlockKind::TrueBranch | BlockKind::FalseBranch)
        ) {
            self.blocks.pop();
        }
        match self.blocks.top() {
            Some(f) if matches!(f.kind, BlockKind::Conditional | BlockKind::Switch) => {
                self.blocks.pop();
                self.end_of_statement();
            }
            _ => {
                self.error(
                    ErrorKind::MismatchedBlock,
                    line,
                    "'OIC' without a matching 'O RLY?' or 'WTF?'",
                );
                self.cursor.skip_to_next_line();
            }
        }
    }

    fn parse_wtf(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        self.blocks.push(BlockKind::Switch, line);
        self.end_of_statement();
        // The first thing inside a switch must be a case.
        let mut look = self.cursor.clone();
        look.skip_newlines();
        if !matches!(look.current(), Some(t) if t.is_keyword(Keyword::Omg)) {
            self.error(
                ErrorKind::MalformedStatement,
                line,
                "Expected 'OMG' after 'WTF?'",
            );
        }
    }

    /// `OMG <literal>`
    fn parse_omg(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        if !self.blocks.any(|k| *k == BlockKind::Switch) {
            self.error(ErrorKind::MismatchedBlock, line, "'OMG' outside of 'WTF?'");
            self.cursor.skip_to_next_line();
            return;
        }
        match self.cursor.current().map(|t| t.kind) {
            Some(TokenKind::Numbr | TokenKind::Numbar | TokenKind::Yarn | TokenKind::Troof) => {
                self.cursor.advance();
                self.end_of_statement();
            }
            _ => {
                let found = self.describe_current();
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("Expected a literal after 'OMG', found {found}"),
                );
                self.cursor.skip_to_next_line();
            }
        }
    }

    fn parse_omgwtf(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        if self.blocks.any(|k| *k == BlockKind::Switch) {
            self.end_of_statement();
        } else {
            self.error(
                ErrorKind::MismatchedBlock,
                line,
                "'OMGWTF' outside of 'WTF?'",
            );
            self.cursor.skip_to_next_line();
        }
    }

    /// `GTFO` is only meaningful inside a loop, a switch, or a function.
    fn parse_gtfo(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        let legal = self.blocks.any(|k| {
            matches!(
                k,
                BlockKind::Loop(_) | BlockKind::Switch | BlockKind::Function(_)
            )
        });
        if legal {
            self.end_of_statement();
        } else {
            self.error(
                ErrorKind::MalformedStatement,
                line,
                "'GTFO' outside of a loop, switch, or function",
            );
            self.cursor.skip_to_next_line();
        }
    }

    /// `IM IN YR label UPPIN|NERFIN YR var TIL|WILE <expr>`
    fn parse_loop_open(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        let Some(label) = self.cursor.eat_ident() else {
            let found = self.describe_current();
            self.error(
                ErrorKind::MalformedStatement,
                line,
                format!("Expected a loop label after 'IM IN YR', found {found}"),
            );
            self.cursor.skip_to_next_line();
            return;
        };
        let label = label.to_string();

        let direction_ok = self.cursor.eat_keyword(Keyword::Uppin)
            || self.cursor.eat_keyword(Keyword::Nerfin);
        if !direction_ok {
            let found = self.describe_current();
            self.error(
                ErrorKind::MalformedStatement,
                line,
                format!("Expected 'UPPIN' or 'NERFIN' in loop header, found {found}"),
            );
            self.cursor.skip_to_next_line();
            return;
        }
        if !self.cursor.eat_keyword(Keyword::Yr) {
            let found = self.describe_current();
            self.error(
                ErrorKind::MalformedStatement,
                line,
                format!("Expected 'YR' before the loop variable, found {found}"),
            );
            self.cursor.skip_to_next_line();
            return;
        }
        match self.cursor.eat_ident() {
            Some(var) if !self.is_declared(var) => {
                let var = var.to_string();
                self.error(
                    ErrorKind::UndeclaredVariable,
                    line,
                    format!("Variable '{var}' is not declared"),
                );
            }
            Some(_) => {}
            None => {
                let found = self.describe_current();
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("Expected a loop variable after 'YR', found {found}"),
                );
                self.cursor.skip_to_next_line();
                return;
            }
        }
        let condition_ok =
            self.cursor.eat_keyword(Keyword::Til) || self.cursor.eat_keyword(Keyword::Wile);
        if !condition_ok {
            let found = self.describe_current();
            self.error(
                ErrorKind::MalformedStatement,
                line,
                format!("Expected 'TIL' or 'WILE' in loop header, found {found}"),
            );
            self.cursor.skip_to_next_line();
            return;
        }
        if self.parse_expression().is_none() {
            self.cursor.skip_to_next_line();
            return;
        }
        self.blocks.push(BlockKind::Loop(label), line);
        self.end_of_statement();
    }

    /// `IM OUTTA YR label`: the label must match the innermost open loop.
    fn parse_loop_close(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        let label = self.cursor.eat_ident().map(str::to_string);
        match (self.blocks.top(), label) {
            (Some(frame), Some(label)) => {
                if let BlockKind::Loop(open_label) = &frame.kind {
                    if *open_label == label {
                        self.blocks.pop();
                        self.end_of_statement();
                    } else {
                        let open_label = open_label.clone();
                        self.error(
                            ErrorKind::MismatchedBlock,
                            line,
                            format!(
                                "Loop label '{label}' does not match open loop '{open_label}'"
                            ),
                        );
                        self.blocks.pop();
                        self.cursor.skip_to_next_line();
                    }
                } else {
                    self.error(
                        ErrorKind::MismatchedBlock,
                        line,
                        "'IM OUTTA YR' without an open loop",
                    );
                    self.cursor.skip_to_next_line();
                }
            }
            (_, None) => {
                let found = self.describe_current();
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("Expected a loop label after 'IM OUTTA YR', found {found}"),
                );
                self.cursor.skip_to_next_line();
            }
            (None, Some(_)) => {
                self.error(
                    ErrorKind::MismatchedBlock,
                    line,
                    "'IM OUTTA YR' without an open loop",
                );
                self.cursor.skip_to_next_line();
            }
        }
    }

    /// `HOW IZ I name [YR p (AN YR p)*]`
    fn parse_function_open(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        if self.current_fn.is_some() {
            self.error(
                ErrorKind::MalformedStatement,
                line,
                "Function declarations cannot nest",
            );
            self.cursor.skip_to_next_line();
            return;
        }
        let Some(name) = self.cursor.eat_ident() else {
            let found = self.describe_current();
            self.error(
                ErrorKind::MalformedStatement,
                line,
                format!("Expected a function name after 'HOW IZ I', found {found}"),
            );
            self.cursor.skip_to_next_line();
            return;
        };
        let name = name.to_string();

        if self.cursor.eat_keyword(Keyword::Yr) {
            loop {
                if self.cursor.eat_ident().is_none() {
                    let found = self.describe_current();
                    self.error(
                        ErrorKind::MalformedStatement,
                        line,
                        format!("Expected a parameter name after 'YR', found {found}"),
                    );
                    self.cursor.skip_to_next_line();
                    break;
                }
                if !self.cursor.eat_keyword(Keyword::An) {
                    break;
                }
                if !self.cursor.eat_keyword(Keyword::Yr) {
                    let found = self.describe_current();
                    self.error(
                        ErrorKind::MalformedStatement,
                        line,
                        format!("Expected 'YR' before the next parameter, found {found}"),
                    );
                    self.cursor.skip_to_next_line();
                    break;
                }
            }
        }

        self.current_fn = self.functions.iter().position(|f| f.name == name);
        self.blocks.push(BlockKind::Function(name), line);
        self.end_of_statement();
    }

    fn parse_function_close(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        if matches!(self.blocks.top(), Some(f) if matches!(f.kind, BlockKind::Function(_))) {
            self.blocks.pop();
            self.current_fn = None;
            self.end_of_statement();
        } else {
            self.error(
                ErrorKind::MismatchedBlock,
                line,
                "'IF U SAY SO' without an open 'HOW IZ I'",
            );
            self.cursor.skip_to_next_line();
        }
    }

    /// `FOUND YR <expr>`
    fn parse_found_yr(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        if !self.blocks.any(|k| matches!(k, BlockKind::Function(_))) {
            self.error(
                ErrorKind::MalformedStatement,
                line,
                "'FOUND YR' outside of a function",
            );
            self.cursor.skip_to_next_line();
            return;
        }
        if self.parse_expression().is_none() {
            self.cursor.skip_to_next_line();
            return;
        }
        self.end_of_statement();
    }

    /// `I IZ name [YR <expr> (AN YR <expr>)*] MKAY`
    fn parse_call(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        let Some(name) = self.cursor.eat_ident() else {
            let found = self.describe_current();
            self.error(
                ErrorKind::MalformedStatement,
                line,
                format!("Expected a function name after 'I IZ', found {found}"),
            );
            self.cursor.skip_to_next_line();
            return;
        };
        let name = name.to_string();

        let mut args = 0;
        if self.cursor.eat_keyword(Keyword::Yr) {
            loop {
                if self.parse_expression().is_none() {
                    self.cursor.skip_to_next_line();
                    return;
                }
                args += 1;
                if !self.cursor.eat_keyword(Keyword::An) {
                    break;
                }
                if !self.cursor.eat_keyword(Keyword::Yr) {
                    let found = self.describe_current();
                    self.error(
                        ErrorKind::MalformedStatement,
                        line,
                        format!("Expected 'YR' before the next argument, found {found}"),
                    );
                    self.cursor.skip_to_next_line();
                    return;
                }
            }
        }
        if !self.cursor.eat_keyword(Keyword::Mkay) {
            let found = self.describe_current();
            self.error(
                ErrorKind::MissingDelimiter,
                line,
                format!("Expected 'MKAY' to close the call to '{name}', found {found}"),
            );
            self.cursor.skip_to_next_line();
            return;
        }

        match find_function(&self.functions, &name) {
            Some(sig) if sig.arity() != args => {
                let expected = sig.arity();
                self.error(
                    ErrorKind::ArgumentCount,
                    line,
                    format!(
                        "Function '{name}' takes {expected} argument(s), but {args} were given"
                    ),
                );
            }
            Some(_) => {}
            None => {
                self.error(
                    ErrorKind::UndefinedFunction,
                    line,
                    format!("Function '{name}' is not declared"),
                );
            }
        }
        self.end_of_statement();
    }

    /// Statements end at the newline marker; anything else still on the
    /// line is an error and the rest of the line is abandoned.
    pub(crate) fn end_of_statement(&mut self) {
        match self.cursor.current() {
            None => {}
            Some(tok) if tok.is_newline() => {
                self.cursor.advance();
            }
            Some(tok) => {
                let (line, found) = (tok.line, tok.describe());
                self.error(
                    ErrorKind::MalformedStatement,
                    line,
                    format!("Unexpected {found} after the end of the statement"),
                );
                self.cursor.skip_to_next_line();
            }
        }
    }

    pub(crate) fn describe_current(&self) -> String {
        self.cursor
            .current()
            .map_or_else(|| "end of input".to_string(), Token::describe)
    }
}
