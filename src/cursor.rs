//! Shared traversal machinery for the token sequence.
//!
//! Each stage after the lexer owns its own [`TokenCursor`] over the same
//! immutable token slice, and a [`BlockStack`] tracking which nestable
//! constructs are currently open. The stages compose these rather than
//! extending one another.

use crate::lexer::{Keyword, Token, TokenKind};

/// A read-only position into a token slice.
#[derive(Debug, Clone)]
pub struct TokenCursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TokenCursor<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Rewind or fast-forward to an absolute position.
    pub fn jump_to(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    /// Look `n` tokens past the current one without moving.
    pub fn peek(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + n)
    }

    pub fn advance(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Step over any newline markers, landing on the next real token.
    pub fn skip_newlines(&mut self) {
        while matches!(self.current(), Some(t) if t.is_newline()) {
            self.pos += 1;
        }
    }

    /// Skip forward until just past the next newline marker. This is the
    /// panic-mode recovery: abandon the rest of the statement.
    pub fn skip_to_next_line(&mut self) {
        while let Some(tok) = self.advance() {
            if tok.is_newline() {
                break;
            }
        }
    }

    /// Line number of the current token, or of the last token when the
    /// cursor has run off the end.
    pub fn line(&self) -> usize {
        self.current()
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    /// True if the current token is the given keyword.
    pub fn at_keyword(&self, kw: Keyword) -> bool {
        matches!(self.current(), Some(t) if t.is_keyword(kw))
    }

    /// Consume the current token if it is the given keyword.
    pub fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.at_keyword(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume an identifier token, returning its name.
    pub fn eat_ident(&mut self) -> Option<&'t str> {
        match self.current() {
            Some(t) if t.kind == TokenKind::Ident => {
                self.pos += 1;
                Some(&t.lexeme)
            }
            _ => None,
        }
    }
}

/// The nestable constructs the pushdown automaton tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// `HAI` .. `KTHXBYE`
    Program,
    /// `WAZZUP` .. `BUHBYE`
    VarSection,
    /// `HOW IZ I <name>` .. `IF U SAY SO`
    Function(String),
    /// `O RLY?` .. `OIC`
    Conditional,
    /// `YA RLY` arm of a conditional
    TrueBranch,
    /// `NO WAI` arm of a conditional
    FalseBranch,
    /// `WTF?` .. `OIC`
    Switch,
    /// `IM IN YR <label>` .. `IM OUTTA YR <label>`
    Loop(String),
}

impl BlockKind {
    /// The opening keyword's spelling, for error messages.
    pub fn opener(&self) -> &'static str {
        match self {
            BlockKind::Program => "HAI",
            BlockKind::VarSection => "WAZZUP",
            BlockKind::Function(_) => "HOW IZ I",
            BlockKind::Conditional => "O RLY?",
            BlockKind::TrueBranch => "YA RLY",
            BlockKind::FalseBranch => "NO WAI",
            BlockKind::Switch => "WTF?",
            BlockKind::Loop(_) => "IM IN YR",
        }
    }
}

/// One open block and the line its opener appeared on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFrame {
    pub kind: BlockKind,
    pub opened_at: usize,
}

/// The pushdown stack of currently open blocks.
#[derive(Debug, Default)]
pub struct BlockStack {
    frames: Vec<BlockFrame>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: BlockKind, opened_at: usize) {
        self.frames.push(BlockFrame { kind, opened_at });
    }

    pub fn pop(&mut self) -> Option<BlockFrame> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<&BlockFrame> {
        self.frames.last()
    }

    /// True if any enclosing frame satisfies the predicate; used to decide
    /// whether `GTFO` or `I HAS A` is legal where it appears.
    pub fn any<F: Fn(&BlockKind) -> bool>(&self, f: F) -> bool {
        self.frames.iter().any(|frame| f(&frame.kind))
    }

    /// Frames still open at end of input, outermost first.
    pub fn unclosed(&self) -> &[BlockFrame] {
        &self.frames
    }
}
