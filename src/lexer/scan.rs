//! The scanner: one forward pass per source line.

use crate::diag::{Diagnostic, ErrorKind};

use super::{Keyword, Token, TokenKind, TypeName};

/// Multi-word keywords (and the `?`-suffixed ones), tried before anything
/// else. Order matters: more specific spellings come first.
const COMPOUND_KEYWORDS: &[(&str, Keyword)] = &[
    ("I HAS A", Keyword::IHasA),
    ("IS NOW A", Keyword::IsNowA),
    ("SUM OF", Keyword::SumOf),
    ("DIFF OF", Keyword::DiffOf),
    ("PRODUKT OF", Keyword::ProduktOf),
    ("QUOSHUNT OF", Keyword::QuoshuntOf),
    ("MOD OF", Keyword::ModOf),
    ("BIGGR OF", Keyword::BiggrOf),
    ("SMALLR OF", Keyword::SmallrOf),
    ("BOTH OF", Keyword::BothOf),
    ("EITHER OF", Keyword::EitherOf),
    ("WON OF", Keyword::WonOf),
    ("ANY OF", Keyword::AnyOf),
    ("ALL OF", Keyword::AllOf),
    ("BOTH SAEM", Keyword::BothSaem),
    ("O RLY?", Keyword::ORly),
    ("YA RLY", Keyword::YaRly),
    ("NO WAI", Keyword::NoWai),
    ("WTF?", Keyword::Wtf),
    ("IM IN YR", Keyword::ImInYr),
    ("IM OUTTA YR", Keyword::ImOuttaYr),
    ("HOW IZ I", Keyword::HowIzI),
    ("IF U SAY SO", Keyword::IfUSaySo),
    ("FOUND YR", Keyword::FoundYr),
    ("I IZ", Keyword::IIz),
];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn single_word_kind(word: &str) -> Option<TokenKind> {
    let kw = match word {
        "HAI" => Keyword::Hai,
        "KTHXBYE" => Keyword::Kthxbye,
        "WAZZUP" => Keyword::Wazzup,
        "BUHBYE" => Keyword::Buhbye,
        "ITZ" => Keyword::Itz,
        "R" => Keyword::R,
        "NOT" => Keyword::Not,
        "SMOOSH" => Keyword::Smoosh,
        "MAEK" => Keyword::Maek,
        "A" => Keyword::A,
        "VISIBLE" => Keyword::Visible,
        "GIMMEH" => Keyword::Gimmeh,
        "MEBBE" => Keyword::Mebbe,
        "OIC" => Keyword::Oic,
        "OMGWTF" => Keyword::Omgwtf,
        "OMG" => Keyword::Omg,
        "UPPIN" => Keyword::Uppin,
        "NERFIN" => Keyword::Nerfin,
        "YR" => Keyword::Yr,
        "TIL" => Keyword::Til,
        "WILE" => Keyword::Wile,
        "GTFO" => Keyword::Gtfo,
        "MKAY" => Keyword::Mkay,
        "AN" => Keyword::An,
        "IT" => Keyword::It,
        "DIFFRINT" => Keyword::Diffrint,
        "NOOB" => return Some(TokenKind::Type(TypeName::Noob)),
        "NUMBR" => return Some(TokenKind::Type(TypeName::Numbr)),
        "NUMBAR" => return Some(TokenKind::Type(TypeName::Numbar)),
        "YARN" => return Some(TokenKind::Type(TypeName::Yarn)),
        "TROOF" => return Some(TokenKind::Type(TypeName::Troof)),
        "WIN" | "FAIL" => return Some(TokenKind::Troof),
        _ => return None,
    };
    Some(TokenKind::Keyword(kw))
}

/// Single-word keyword spellings used for the typo check on identifiers.
const KEYWORD_WORDS: &[&str] = &[
    "KTHXBYE", "WAZZUP", "BUHBYE", "VISIBLE", "GIMMEH", "SMOOSH", "MKAY", "OMGWTF", "UPPIN",
    "NERFIN", "WILE", "GTFO", "MEBBE", "DIFFRINT", "NUMBR", "NUMBAR", "YARN", "TROOF", "NOOB",
];

/// Convert source text into a flat token sequence.
///
/// Never fails; anything the scanner cannot make sense of is reported in
/// the returned diagnostics and skipped. A newline marker is emitted for
/// every physical line.
pub fn tokenize(text: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut tokens = Vec::new();
    let mut diags = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line);
        scan_line(line, line_no, &mut tokens, &mut diags);
        tokens.push(Token::new(TokenKind::Newline, "", line_no));
    }

    (tokens, diags)
}

/// Cut the line at the first `BTW` that sits outside a string literal and
/// on a word boundary.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'B' if !in_string && line[i..].starts_with("BTW") => {
                let before_ok = i == 0 || !is_word_char(bytes[i - 1] as char);
                let after_ok = i + 3 >= bytes.len() || !is_word_char(bytes[i + 3] as char);
                if before_ok && after_ok {
                    return &line[..i];
                }
            }
            _ => {}
        }
        i += 1;
    }
    line
}

fn scan_line(line: &str, line_no: usize, tokens: &mut Vec<Token>, diags: &mut Vec<Diagnostic>) {
    let mut pos = 0;
    while pos < line.len() {
        let rest = &line[pos..];
        let c = rest.chars().next().expect("pos is on a char boundary");

        if c == ' ' || c == '\t' {
            pos += 1;
            continue;
        }

        if c == '"' {
            pos += 1 + scan_string(&line[pos + 1..], line_no, tokens, diags);
            continue;
        }

        if let Some(len) = match_compound(rest, tokens, line_no) {
            pos += len;
            continue;
        }

        if c.is_ascii_digit() || (c == '-' && rest[1..].starts_with(|d: char| d.is_ascii_digit()))
        {
            pos += scan_number(rest, line_no, tokens, diags);
            continue;
        }

        if c.is_ascii_alphabetic() {
            pos += scan_word(rest, line_no, tokens, diags);
            continue;
        }

        if c == ',' {
            // A comma is a soft statement separator, same as a newline.
            tokens.push(Token::new(TokenKind::Newline, ",", line_no));
            pos += 1;
            continue;
        }

        if matches!(c, '!' | '?' | '+') {
            tokens.push(Token::new(TokenKind::Other, c.to_string(), line_no));
            pos += 1;
            continue;
        }

        diags.push(Diagnostic::new(
            ErrorKind::UnknownCharacter,
            line_no,
            format!("Unknown character '{c}'"),
        ));
        pos += c.len_utf8();
    }
}

/// Accumulate a string literal verbatim (no escape processing). Returns the
/// number of bytes consumed after the opening quote.
fn scan_string(
    rest: &str,
    line_no: usize,
    tokens: &mut Vec<Token>,
    diags: &mut Vec<Diagnostic>,
) -> usize {
    match rest.find('"') {
        Some(end) => {
            tokens.push(Token::new(TokenKind::Yarn, &rest[..end], line_no));
            end + 1
        }
        None => {
            diags.push(Diagnostic::new(
                ErrorKind::UnterminatedString,
                line_no,
                "String literal is missing its closing quote",
            ));
            tokens.push(Token::new(TokenKind::Yarn, rest, line_no));
            rest.len()
        }
    }
}

/// Try the compound-keyword table. First match wins.
fn match_compound(rest: &str, tokens: &mut Vec<Token>, line_no: usize) -> Option<usize> {
    for &(text, kw) in COMPOUND_KEYWORDS {
        if rest.starts_with(text) {
            // Keywords ending in '?' terminate themselves; the rest need a
            // word boundary so IM IN YRS stays an identifier problem.
            let boundary = text.ends_with('?')
                || !rest[text.len()..].starts_with(is_word_char);
            if boundary {
                tokens.push(Token::new(TokenKind::Keyword(kw), text, line_no));
                return Some(text.len());
            }
        }
    }
    None
}

/// Scan a numeric literal, trying the float shape before the integer shape.
/// A number immediately followed by word characters is a malformed
/// identifier: flagged and skipped, never emitted.
fn scan_number(
    rest: &str,
    line_no: usize,
    tokens: &mut Vec<Token>,
    diags: &mut Vec<Diagnostic>,
) -> usize {
    let mut len = if rest.starts_with('-') { 1 } else { 0 };
    while rest[len..].starts_with(|c: char| c.is_ascii_digit()) {
        len += 1;
    }
    let mut is_float = false;
    if rest[len..].starts_with('.') && rest[len + 1..].starts_with(|c: char| c.is_ascii_digit()) {
        is_float = true;
        len += 1;
        while rest[len..].starts_with(|c: char| c.is_ascii_digit()) {
            len += 1;
        }
    }

    if rest[len..].starts_with(|c: char| is_word_char(c)) {
        let mut end = len;
        while rest[end..].starts_with(is_word_char) {
            end += 1;
        }
        diags.push(Diagnostic::new(
            ErrorKind::InvalidIdentifier,
            line_no,
            format!("Invalid identifier '{}': identifiers cannot start with a digit", &rest[..end]),
        ));
        return end;
    }

    let kind = if is_float {
        TokenKind::Numbar
    } else {
        TokenKind::Numbr
    };
    tokens.push(Token::new(kind, &rest[..len], line_no));
    len
}

/// Scan a word: single-word keyword, type name, TROOF literal, or identifier.
fn scan_word(
    rest: &str,
    line_no: usize,
    tokens: &mut Vec<Token>,
    diags: &mut Vec<Diagnostic>,
) -> usize {
    let len = rest
        .find(|c: char| !is_word_char(c))
        .unwrap_or(rest.len());
    let word = &rest[..len];

    match single_word_kind(word) {
        Some(kind) => tokens.push(Token::new(kind, word, line_no)),
        None => {
            if looks_like_keyword(word) {
                diags.push(Diagnostic::new(
                    ErrorKind::KeywordLookalike,
                    line_no,
                    format!("Identifier '{word}' looks like a misspelled keyword"),
                ));
            }
            tokens.push(Token::new(TokenKind::Ident, word, line_no));
        }
    }
    len
}

/// Uppercase identifiers that share a long prefix with a keyword are
/// probably typos; they are flagged but still emitted as identifiers.
fn looks_like_keyword(word: &str) -> bool {
    word.len() >= 4
        && word.chars().all(|c| c.is_ascii_uppercase())
        && KEYWORD_WORDS
            .iter()
            .any(|kw| kw.starts_with(word) || word.starts_with(kw))
}
