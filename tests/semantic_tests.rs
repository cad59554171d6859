use kthx::diag::ErrorKind;
use kthx::lexer::{tokenize, TypeName};
use kthx::parser::parse;
use kthx::semantic::{analyze, AnalysisOutcome};
use kthx::symbol::FunctionSig;

fn analyze_src(source: &str) -> (AnalysisOutcome, Vec<FunctionSig>) {
    let (tokens, diags) = tokenize(source);
    assert!(
        kthx::diag::all_warnings(&diags),
        "unexpected lexer errors: {diags:?}"
    );
    let parsed = parse(&tokens);
    assert!(parsed.ok, "unexpected parse errors: {:?}", parsed.diagnostics);
    let mut functions = parsed.functions;
    let outcome = analyze(&tokens, &parsed.symbols, &mut functions);
    (outcome, functions)
}

fn has_error(outcome: &AnalysisOutcome, kind: ErrorKind) -> bool {
    outcome.diagnostics.iter().any(|d| d.kind == kind)
}

#[test]
fn clean_program_passes() {
    let (outcome, _) = analyze_src("HAI\nVISIBLE SUM OF 1 AN 2\nKTHXBYE\n");
    assert!(outcome.ok, "{:?}", outcome.diagnostics);
}

#[test]
fn non_numeric_yarn_in_arithmetic() {
    let (outcome, _) = analyze_src("HAI\nVISIBLE SUM OF \"abc\" AN 1\nKTHXBYE\n");
    assert!(!outcome.ok);
    assert!(has_error(&outcome, ErrorKind::OperandType));
}

#[test]
fn numeric_shaped_yarn_is_accepted() {
    let (outcome, _) = analyze_src("HAI\nVISIBLE SUM OF \"3\" AN 1\nKTHXBYE\n");
    assert!(outcome.ok, "{:?}", outcome.diagnostics);
}

#[test]
fn float_shaped_yarn_is_accepted() {
    let (outcome, _) = analyze_src("HAI\nVISIBLE PRODUKT OF \"2.5\" AN 2\nKTHXBYE\n");
    assert!(outcome.ok, "{:?}", outcome.diagnostics);
}

#[test]
fn troof_feeds_arithmetic() {
    let (outcome, _) = analyze_src("HAI\nVISIBLE SUM OF WIN AN 1\nKTHXBYE\n");
    assert!(outcome.ok, "{:?}", outcome.diagnostics);
}

#[test]
fn comparison_rejects_troof_literal() {
    let (outcome, _) = analyze_src("HAI\nBOTH SAEM WIN AN 1\nKTHXBYE\n");
    assert!(!outcome.ok);
    assert!(has_error(&outcome, ErrorKind::OperandType));
}

#[test]
fn comparison_rejects_yarn_literal() {
    let (outcome, _) = analyze_src("HAI\nDIFFRINT \"a\" AN 1\nKTHXBYE\n");
    assert!(!outcome.ok);
    assert!(has_error(&outcome, ErrorKind::OperandType));
}

#[test]
fn comparison_accepts_numbers() {
    let (outcome, _) = analyze_src("HAI\nBOTH SAEM 1 AN 2.0\nKTHXBYE\n");
    assert!(outcome.ok, "{:?}", outcome.diagnostics);
}

#[test]
fn boolean_operand_must_spell_a_truth_value() {
    let (outcome, _) = analyze_src("HAI\nBOTH OF 5 AN WIN\nKTHXBYE\n");
    assert!(!outcome.ok);
    assert!(has_error(&outcome, ErrorKind::OperandType));
}

#[test]
fn boolean_accepts_zero_and_one() {
    let (outcome, _) = analyze_src("HAI\nALL OF 1 AN 0 AN WIN MKAY\nKTHXBYE\n");
    assert!(outcome.ok, "{:?}", outcome.diagnostics);
}

#[test]
fn smoosh_takes_anything() {
    let (outcome, _) =
        analyze_src("HAI\nVISIBLE SMOOSH \"x\" AN 1 AN WIN AN 2.5 MKAY\nKTHXBYE\n");
    assert!(outcome.ok, "{:?}", outcome.diagnostics);
}

#[test]
fn impossible_literal_cast_is_flagged() {
    let (outcome, _) = analyze_src("HAI\nVISIBLE MAEK \"abc\" A NUMBR\nKTHXBYE\n");
    assert!(!outcome.ok);
    assert!(has_error(&outcome, ErrorKind::UnsupportedCast));
}

#[test]
fn possible_literal_cast_passes() {
    let (outcome, _) = analyze_src("HAI\nVISIBLE MAEK \"3.14\" A NUMBAR\nKTHXBYE\n");
    assert!(outcome.ok, "{:?}", outcome.diagnostics);
}

#[test]
fn parameters_are_refined_from_call_sites() {
    let (outcome, functions) = analyze_src(
        "HAI\nHOW IZ I add YR a AN YR b\nFOUND YR SUM OF a AN b\nIF U SAY SO\nI IZ add YR 1 AN YR 2 MKAY\nKTHXBYE\n",
    );
    assert!(outcome.ok, "{:?}", outcome.diagnostics);
    assert_eq!(functions[0].params[0].ty, TypeName::Numbr);
    assert_eq!(functions[0].params[1].ty, TypeName::Numbr);
}

#[test]
fn conflicting_argument_type_is_flagged() {
    let (outcome, _) = analyze_src(
        "HAI\nHOW IZ I add YR a AN YR b\nFOUND YR SUM OF a AN b\nIF U SAY SO\nI IZ add YR 1 AN YR 2 MKAY\nI IZ add YR WIN AN YR 2 MKAY\nKTHXBYE\n",
    );
    assert!(!outcome.ok);
    assert!(has_error(&outcome, ErrorKind::ArgumentType));
}

#[test]
fn numbr_argument_fits_a_numbar_parameter() {
    let (outcome, _) = analyze_src(
        "HAI\nHOW IZ I half YR n\nFOUND YR QUOSHUNT OF n AN 2\nIF U SAY SO\nI IZ half YR 3.0 MKAY\nI IZ half YR 4 MKAY\nKTHXBYE\n",
    );
    assert!(outcome.ok, "{:?}", outcome.diagnostics);
}

#[test]
fn variable_initializer_types_flow_into_checks() {
    let (outcome, _) = analyze_src(
        "HAI\nWAZZUP\nI HAS A word ITZ \"abc\"\nBUHBYE\nVISIBLE SUM OF word AN 1\nKTHXBYE\n",
    );
    assert!(!outcome.ok);
    assert!(has_error(&outcome, ErrorKind::OperandType));
}
