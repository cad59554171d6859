//! Program input and output seams.
//!
//! `GIMMEH` reads through an [`InputSource`] and `VISIBLE` writes into an
//! [`OutputBuffer`], so the executor never touches stdin or stdout itself.
//! Tests drive programs with a [`QueuedInput`] and inspect the buffer.

use std::io::{self, BufRead, Write};

/// Where `GIMMEH` gets its lines from.
pub trait InputSource {
    /// The next input line, without its trailing newline. `None` means the
    /// source is exhausted.
    fn read_line(&mut self) -> Option<String>;
}

/// Interactive input: prompts on stdout and reads a line from stdin.
#[derive(Debug, Default)]
pub struct StdinInput;

impl InputSource for StdinInput {
    fn read_line(&mut self) -> Option<String> {
        print!("> ");
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
        }
    }
}

/// Pre-recorded input lines, consumed front to back.
#[derive(Debug, Default)]
pub struct QueuedInput {
    lines: Vec<String>,
    next: usize,
}

impl QueuedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }
}

impl InputSource for QueuedInput {
    fn read_line(&mut self) -> Option<String> {
        let line = self.lines.get(self.next)?;
        self.next += 1;
        Some(line.clone())
    }
}

/// Collected program output.
///
/// `VISIBLE` appends text and, unless suppressed with a trailing `!`, a
/// newline. The whole transcript is returned to the caller at the end of
/// the run instead of being printed as a side effect.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    text: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &str) {
        self.text.push_str(chunk);
    }

    pub fn push_newline(&mut self) {
        self.text.push('\n');
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
