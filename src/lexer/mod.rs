//! Tokenization of LOLCODE source text.
//!
//! [`tokenize`] never fails: unrecognizable input produces diagnostics and
//! the scanner moves on. Keywords are matched against an ordered table,
//! multi-word forms first, so `IM OUTTA YR` is never split into an
//! identifier soup and `3.14` is never split at the dot. A [`TokenKind::Newline`]
//! marker is emitted at the end of every physical line; the later stages
//! treat those markers as statement terminators.

mod scan;

pub use scan::tokenize;

use std::fmt;

/// Every reserved word of the language, established once at tokenization
/// time so the later stages match on an enum instead of comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Hai,
    Kthxbye,
    Wazzup,
    Buhbye,
    IHasA,
    Itz,
    R,
    IsNowA,
    Maek,
    A,
    Visible,
    Gimmeh,
    SumOf,
    DiffOf,
    ProduktOf,
    QuoshuntOf,
    ModOf,
    BiggrOf,
    SmallrOf,
    BothOf,
    EitherOf,
    WonOf,
    Not,
    AllOf,
    AnyOf,
    BothSaem,
    Diffrint,
    Smoosh,
    Mkay,
    An,
    ORly,
    YaRly,
    Mebbe,
    NoWai,
    Oic,
    Wtf,
    Omg,
    Omgwtf,
    ImInYr,
    ImOuttaYr,
    Uppin,
    Nerfin,
    Yr,
    Til,
    Wile,
    Gtfo,
    HowIzI,
    IfUSaySo,
    FoundYr,
    IIz,
    It,
}

impl Keyword {
    /// Source spelling of the keyword.
    pub fn text(self) -> &'static str {
        use Keyword::*;
        match self {
            Hai => "HAI",
            Kthxbye => "KTHXBYE",
            Wazzup => "WAZZUP",
            Buhbye => "BUHBYE",
            IHasA => "I HAS A",
            Itz => "ITZ",
            R => "R",
            IsNowA => "IS NOW A",
            Maek => "MAEK",
            A => "A",
            Visible => "VISIBLE",
            Gimmeh => "GIMMEH",
            SumOf => "SUM OF",
            DiffOf => "DIFF OF",
            ProduktOf => "PRODUKT OF",
            QuoshuntOf => "QUOSHUNT OF",
            ModOf => "MOD OF",
            BiggrOf => "BIGGR OF",
            SmallrOf => "SMALLR OF",
            BothOf => "BOTH OF",
            EitherOf => "EITHER OF",
            WonOf => "WON OF",
            Not => "NOT",
            AllOf => "ALL OF",
            AnyOf => "ANY OF",
            BothSaem => "BOTH SAEM",
            Diffrint => "DIFFRINT",
            Smoosh => "SMOOSH",
            Mkay => "MKAY",
            An => "AN",
            ORly => "O RLY?",
            YaRly => "YA RLY",
            Mebbe => "MEBBE",
            NoWai => "NO WAI",
            Oic => "OIC",
            Wtf => "WTF?",
            Omg => "OMG",
            Omgwtf => "OMGWTF",
            ImInYr => "IM IN YR",
            ImOuttaYr => "IM OUTTA YR",
            Uppin => "UPPIN",
            Nerfin => "NERFIN",
            Yr => "YR",
            Til => "TIL",
            Wile => "WILE",
            Gtfo => "GTFO",
            HowIzI => "HOW IZ I",
            IfUSaySo => "IF U SAY SO",
            FoundYr => "FOUND YR",
            IIz => "I IZ",
            It => "IT",
        }
    }

    /// Human-readable category for the front end's token table.
    pub fn category(self) -> &'static str {
        use Keyword::*;
        match self {
            Hai | Kthxbye => "Code Delimiter",
            Wazzup | Buhbye => "Variable List Delimiter",
            IHasA => "Variable Declaration",
            Itz | R => "Variable Assignment",
            IsNowA | Maek | A => "Typecasting",
            Visible => "Output Statement",
            Gimmeh => "Input Statement",
            SumOf | DiffOf | ProduktOf | QuoshuntOf | ModOf | BiggrOf | SmallrOf => {
                "Arithmetic Operator"
            }
            BothOf | EitherOf | WonOf | Not | AllOf | AnyOf => "Boolean Operator",
            BothSaem | Diffrint => "Comparison Operator",
            Smoosh => "String Operation",
            Mkay => "End of Expression",
            An => "Multiple Parameter Separator",
            ORly | YaRly | Mebbe | NoWai | Oic => "Conditional Statement",
            Wtf | Omg | Omgwtf => "Switch-Case Statement",
            ImInYr | ImOuttaYr => "Loop Statement",
            Uppin | Nerfin => "Loop Operation",
            Yr => "Loop Parameter",
            Til | Wile => "Loop Condition",
            Gtfo => "Break Statement",
            HowIzI | IfUSaySo => "Function Declaration",
            FoundYr => "Return Statement",
            IIz => "Function Call",
            It => "Implicit Result",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        use Keyword::*;
        matches!(
            self,
            SumOf | DiffOf | ProduktOf | QuoshuntOf | ModOf | BiggrOf | SmallrOf
        )
    }

    pub fn is_boolean_binary(self) -> bool {
        matches!(self, Keyword::BothOf | Keyword::EitherOf | Keyword::WonOf)
    }

    pub fn is_variadic_boolean(self) -> bool {
        matches!(self, Keyword::AllOf | Keyword::AnyOf)
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, Keyword::BothSaem | Keyword::Diffrint)
    }

    /// Can this keyword begin an expression?
    pub fn starts_expression(self) -> bool {
        self.is_arithmetic()
            || self.is_boolean_binary()
            || self.is_variadic_boolean()
            || self.is_comparison()
            || matches!(self, Keyword::Not | Keyword::Smoosh | Keyword::It)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// The five runtime types. Doubles as the token payload for type keywords
/// (`MAEK x A NUMBR`) and as the name of a value's runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Noob,
    Numbr,
    Numbar,
    Yarn,
    Troof,
}

impl TypeName {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeName::Noob => "NOOB",
            TypeName::Numbr => "NUMBR",
            TypeName::Numbar => "NUMBAR",
            TypeName::Yarn => "YARN",
            TypeName::Troof => "TROOF",
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    /// Type-name keyword (`NUMBR`, `YARN`, ...), used after `MAEK`/`IS NOW A`.
    Type(TypeName),
    Ident,
    /// Integer literal.
    Numbr,
    /// Float literal.
    Numbar,
    /// String literal; the lexeme is the content without the quotes.
    Yarn,
    /// `WIN` or `FAIL`.
    Troof,
    /// End-of-line marker, the statement terminator.
    Newline,
    /// Punctuation: `+` `!` `,` `?`.
    Other,
}

/// One token of the source program. Produced once by [`tokenize`] and
/// treated as read-only by every later stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword(kw)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Newline
    }

    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }

    /// True for `+` `!` etc.
    pub fn is_symbol(&self, sym: &str) -> bool {
        self.kind == TokenKind::Other && self.lexeme == sym
    }

    /// Human-readable category for the front end's token table.
    pub fn category(&self) -> &'static str {
        match self.kind {
            TokenKind::Keyword(kw) => kw.category(),
            TokenKind::Type(_) => "Type Literal",
            TokenKind::Ident => "Variable Identifier",
            TokenKind::Numbr => "Integer Literal",
            TokenKind::Numbar => "Float Literal",
            TokenKind::Yarn => "String Literal",
            TokenKind::Troof => "Boolean Value",
            TokenKind::Newline => "Newline",
            TokenKind::Other => "Delimiter",
        }
    }

    /// Token description used in error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Keyword(kw) => format!("'{}'", kw.text()),
            TokenKind::Type(ty) => format!("type '{ty}'"),
            TokenKind::Ident => format!("identifier '{}'", self.lexeme),
            TokenKind::Yarn => format!("string \"{}\"", self.lexeme),
            TokenKind::Newline => "end of line".to_string(),
            _ => format!("'{}'", self.lexeme),
        }
    }
}
