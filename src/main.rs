use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use kthx::interpreter::StdinInput;
use kthx::lexer::{self, TokenKind};

/// A LOLCODE interpreter.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// The program to run.
    file: PathBuf,

    /// Print the token table instead of running the program.
    #[arg(long)]
    tokens: bool,

    /// Print the final symbol table after the run.
    #[arg(long)]
    symbols: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("could not read {}", args.file.display()))?;

    if args.tokens {
        print_tokens(&source);
        return Ok(ExitCode::SUCCESS);
    }

    let report = kthx::run_program(&source, StdinInput);
    print!("{}", report.output);
    for diag in &report.diagnostics {
        eprintln!("{diag}");
    }

    if args.symbols {
        if let Some(symbols) = &report.symbols {
            println!("{:<20} {:<8} VALUE", "NAME", "TYPE");
            for (name, entry) in symbols.sorted() {
                println!(
                    "{:<20} {:<8} {}",
                    name,
                    entry.value.type_name().as_str(),
                    entry.value
                );
            }
        }
    }

    Ok(if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_tokens(source: &str) {
    let (tokens, diags) = lexer::tokenize(source);
    println!("{:<16} {:<28} LINE", "LEXEME", "CLASSIFICATION");
    for token in &tokens {
        if token.kind == TokenKind::Newline {
            continue;
        }
        println!("{:<16} {:<28} {}", token.lexeme, token.category(), token.line);
    }
    for diag in &diags {
        eprintln!("{diag}");
    }
}
