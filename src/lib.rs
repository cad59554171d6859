//! An interpreter for LOLCODE.
//!
//! The pipeline has four stages, each a separate walk over a shared,
//! immutable token sequence:
//!
//! 1. [`lexer::tokenize`] turns source text into tokens. It never fails;
//!    garbage input becomes diagnostics.
//! 2. [`parser::parse`] validates statement structure with a pushdown
//!    block stack and builds the symbol table and function signatures.
//! 3. [`semantic::analyze`] applies the coercion tables to every operand
//!    it can type statically and refines parameter types from call sites.
//! 4. [`interpreter::Executor`] runs the program, collecting output in a
//!    buffer and reading input through a seam.
//!
//! Stages gate each other: a stage only runs when everything before it
//! produced nothing worse than warnings. All diagnostics render as
//! `Error on line <N>: <message>`.
//!
//! ```
//! use kthx::interpreter::QueuedInput;
//!
//! let source = "HAI\nVISIBLE \"O HAI\"\nKTHXBYE\n";
//! let report = kthx::run_program(source, QueuedInput::default());
//! assert!(report.ok);
//! assert_eq!(report.output, "O HAI\n");
//! ```

pub mod cursor;
pub mod diag;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod symbol;

use diag::Diagnostic;
use interpreter::{Executor, InputSource, Limits};
use symbol::SymbolTable;

/// Everything a full pipeline run produces.
#[derive(Debug)]
pub struct RunReport {
    /// True when every stage passed and the program ran to completion.
    pub ok: bool,
    /// The program's collected output (empty if execution never started).
    pub output: String,
    /// Diagnostics from every stage that ran, in stage order.
    pub diagnostics: Vec<Diagnostic>,
    /// The final symbol table, when execution happened.
    pub symbols: Option<SymbolTable>,
}

/// Run all four stages over `source` with default limits.
pub fn run_program(source: &str, input: impl InputSource) -> RunReport {
    run_program_with_limits(source, input, Limits::default())
}

/// Run all four stages over `source`.
pub fn run_program_with_limits(
    source: &str,
    input: impl InputSource,
    limits: Limits,
) -> RunReport {
    let (tokens, mut diagnostics) = lexer::tokenize(source);
    if !diag::all_warnings(&diagnostics) {
        return RunReport {
            ok: false,
            output: String::new(),
            diagnostics,
            symbols: None,
        };
    }

    let parsed = parser::parse(&tokens);
    diagnostics.extend(parsed.diagnostics);
    if !parsed.ok {
        return RunReport {
            ok: false,
            output: String::new(),
            diagnostics,
            symbols: None,
        };
    }

    let mut functions = parsed.functions;
    let analysis = semantic::analyze(&tokens, &parsed.symbols, &mut functions);
    diagnostics.extend(analysis.diagnostics);
    if !analysis.ok {
        return RunReport {
            ok: false,
            output: String::new(),
            diagnostics,
            symbols: None,
        };
    }

    let run = Executor::with_limits(input, limits).run(&tokens, parsed.symbols, functions);
    diagnostics.extend(run.diagnostics);
    RunReport {
        ok: run.ok,
        output: run.output,
        diagnostics,
        symbols: Some(run.symbols),
    }
}
