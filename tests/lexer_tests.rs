use kthx::diag::{all_warnings, ErrorKind};
use kthx::lexer::{tokenize, Keyword, Token, TokenKind};

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn minimal_program() {
    let (tokens, diags) = tokenize("HAI\nKTHXBYE\n");
    assert!(diags.is_empty());
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Keyword(Keyword::Hai),
            TokenKind::Newline,
            TokenKind::Keyword(Keyword::Kthxbye),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn multi_word_keywords_stay_whole() {
    let (tokens, diags) = tokenize("IM OUTTA YR loopy\n");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::ImOuttaYr));
    assert_eq!(tokens[1].kind, TokenKind::Ident);
    assert_eq!(tokens[1].lexeme, "loopy");
}

#[test]
fn keywords_with_shared_prefixes() {
    let (tokens, _) = tokenize("BOTH OF WIN AN FAIL\nBOTH SAEM 1 AN 2\n");
    assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::BothOf));
    let second_line: Vec<_> = tokens.iter().filter(|t| t.line == 2).collect();
    assert_eq!(second_line[0].kind, TokenKind::Keyword(Keyword::BothSaem));
}

#[test]
fn string_literals_are_verbatim() {
    let (tokens, diags) = tokenize("VISIBLE \"hello, world BTW not a comment\"\n");
    assert!(diags.is_empty());
    assert_eq!(tokens[1].kind, TokenKind::Yarn);
    assert_eq!(tokens[1].lexeme, "hello, world BTW not a comment");
}

#[test]
fn comments_are_stripped() {
    let (tokens, diags) = tokenize("VISIBLE 1 BTW the rest is gone\n");
    assert!(diags.is_empty());
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Keyword(Keyword::Visible),
            TokenKind::Numbr,
            TokenKind::Newline,
        ]
    );
}

#[test]
fn btw_needs_a_word_boundary() {
    let (tokens, diags) = tokenize("VISIBLE BTWx\n");
    // BTWx is an identifier, not a comment opener.
    assert!(diags.is_empty());
    assert_eq!(tokens[1].kind, TokenKind::Ident);
    assert_eq!(tokens[1].lexeme, "BTWx");
}

#[test]
fn numeric_literals() {
    let (tokens, diags) = tokenize("-3 3.14 42 -0.5\n");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].kind, TokenKind::Numbr);
    assert_eq!(tokens[0].lexeme, "-3");
    assert_eq!(tokens[1].kind, TokenKind::Numbar);
    assert_eq!(tokens[1].lexeme, "3.14");
    assert_eq!(tokens[2].kind, TokenKind::Numbr);
    assert_eq!(tokens[3].kind, TokenKind::Numbar);
    assert_eq!(tokens[3].lexeme, "-0.5");
}

#[test]
fn digit_leading_identifier_is_rejected() {
    let (tokens, diags) = tokenize("3abc\n");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, ErrorKind::InvalidIdentifier);
    assert!(!all_warnings(&diags));
    // The bad span is skipped entirely.
    assert_eq!(kinds(&tokens), vec![TokenKind::Newline]);
}

#[test]
fn unterminated_string_is_reported() {
    let (_, diags) = tokenize("VISIBLE \"oops\n");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, ErrorKind::UnterminatedString);
    assert_eq!(diags[0].line, 1);
}

#[test]
fn keyword_lookalike_is_a_warning() {
    let (tokens, diags) = tokenize("VISIBL\n");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, ErrorKind::KeywordLookalike);
    assert!(diags[0].is_warning());
    assert!(all_warnings(&diags));
    // The identifier is still emitted.
    assert_eq!(tokens[0].kind, TokenKind::Ident);
}

#[test]
fn unknown_character_is_reported_and_skipped() {
    let (tokens, diags) = tokenize("VISIBLE @ 1\n");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, ErrorKind::UnknownCharacter);
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Keyword(Keyword::Visible),
            TokenKind::Numbr,
            TokenKind::Newline,
        ]
    );
}

#[test]
fn line_numbers_are_one_based() {
    let (tokens, _) = tokenize("HAI\n\nVISIBLE 1\n");
    let visible = tokens
        .iter()
        .find(|t| t.is_keyword(Keyword::Visible))
        .expect("VISIBLE token");
    assert_eq!(visible.line, 3);
}

#[test]
fn comma_acts_as_statement_separator() {
    let (tokens, diags) = tokenize("GTFO, VISIBLE 1\n");
    assert!(diags.is_empty());
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Keyword(Keyword::Gtfo),
            TokenKind::Newline,
            TokenKind::Keyword(Keyword::Visible),
            TokenKind::Numbr,
            TokenKind::Newline,
        ]
    );
    // Both statements sit on the same physical line.
    assert!(tokens.iter().all(|t| t.line == 1));
}

#[test]
fn troof_and_type_literals() {
    let (tokens, _) = tokenize("WIN FAIL NUMBR YARN\n");
    assert_eq!(tokens[0].kind, TokenKind::Troof);
    assert_eq!(tokens[1].kind, TokenKind::Troof);
    assert!(matches!(tokens[2].kind, TokenKind::Type(_)));
    assert!(matches!(tokens[3].kind, TokenKind::Type(_)));
}

#[test]
fn diagnostic_rendering() {
    let (_, diags) = tokenize("3abc\n");
    let rendered = diags[0].to_string();
    assert!(rendered.starts_with("Error on line 1: "), "{rendered}");
}
