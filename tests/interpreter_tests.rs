use kthx::diag::ErrorKind;
use kthx::interpreter::{Limits, QueuedInput};
use kthx::{run_program, run_program_with_limits, RunReport};

fn run(source: &str) -> RunReport {
    run_program(source, QueuedInput::default())
}

fn run_ok(source: &str) -> String {
    let report = run(source);
    assert!(report.ok, "diagnostics: {:?}", report.diagnostics);
    report.output
}

fn runtime_error(source: &str) -> ErrorKind {
    let report = run(source);
    assert!(!report.ok);
    report
        .diagnostics
        .last()
        .expect("a runtime diagnostic")
        .kind
}

#[test]
fn visible_prints_a_line() {
    assert_eq!(run_ok("HAI\nVISIBLE \"O HAI\"\nKTHXBYE\n"), "O HAI\n");
}

#[test]
fn visible_concatenates_with_plus() {
    assert_eq!(
        run_ok("HAI\nVISIBLE \"a\" + \"b\" + \"c\"\nKTHXBYE\n"),
        "abc\n"
    );
}

#[test]
fn bang_suppresses_the_newline() {
    assert_eq!(
        run_ok("HAI\nVISIBLE \"a\"!\nVISIBLE \"b\"\nKTHXBYE\n"),
        "ab\n"
    );
}

#[test]
fn arithmetic_operators() {
    assert_eq!(run_ok("HAI\nVISIBLE SUM OF 2 AN 3\nKTHXBYE\n"), "5\n");
    assert_eq!(run_ok("HAI\nVISIBLE DIFF OF 2 AN 5\nKTHXBYE\n"), "-3\n");
    assert_eq!(run_ok("HAI\nVISIBLE PRODUKT OF 4 AN 3\nKTHXBYE\n"), "12\n");
    assert_eq!(run_ok("HAI\nVISIBLE MOD OF 7 AN 3\nKTHXBYE\n"), "1\n");
    assert_eq!(run_ok("HAI\nVISIBLE BIGGR OF 3 AN 5\nKTHXBYE\n"), "5\n");
    assert_eq!(run_ok("HAI\nVISIBLE SMALLR OF 3 AN 5\nKTHXBYE\n"), "3\n");
}

#[test]
fn quoshunt_is_always_a_numbar() {
    assert_eq!(run_ok("HAI\nVISIBLE QUOSHUNT OF 10 AN 4\nKTHXBYE\n"), "2.5\n");
    assert_eq!(run_ok("HAI\nVISIBLE QUOSHUNT OF 8 AN 2\nKTHXBYE\n"), "4.0\n");
}

#[test]
fn mod_takes_the_divisor_sign() {
    assert_eq!(run_ok("HAI\nVISIBLE MOD OF -7 AN 3\nKTHXBYE\n"), "2\n");
    assert_eq!(run_ok("HAI\nVISIBLE MOD OF 7 AN -3\nKTHXBYE\n"), "-2\n");
}

#[test]
fn mixed_arithmetic_widens_to_numbar() {
    assert_eq!(run_ok("HAI\nVISIBLE SUM OF 1 AN 2.5\nKTHXBYE\n"), "3.5\n");
    assert_eq!(run_ok("HAI\nVISIBLE SUM OF 1.0 AN 2\nKTHXBYE\n"), "3.0\n");
}

#[test]
fn yarn_operands_coerce_by_shape() {
    assert_eq!(run_ok("HAI\nVISIBLE SUM OF \"3\" AN 1\nKTHXBYE\n"), "4\n");
    assert_eq!(
        run_ok("HAI\nVISIBLE SUM OF \"2.5\" AN 1\nKTHXBYE\n"),
        "3.5\n"
    );
}

#[test]
fn troof_operands_count_as_one_and_zero() {
    assert_eq!(run_ok("HAI\nVISIBLE SUM OF WIN AN WIN\nKTHXBYE\n"), "2\n");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    assert_eq!(
        runtime_error("HAI\nVISIBLE QUOSHUNT OF 1 AN 0\nKTHXBYE\n"),
        ErrorKind::DivisionByZero
    );
    assert_eq!(
        runtime_error("HAI\nVISIBLE MOD OF 1 AN 0\nKTHXBYE\n"),
        ErrorKind::DivisionByZero
    );
}

#[test]
fn numbr_overflow_is_a_runtime_error() {
    assert_eq!(
        runtime_error("HAI\nVISIBLE SUM OF 9223372036854775807 AN 1\nKTHXBYE\n"),
        ErrorKind::OperandType
    );
    assert_eq!(
        runtime_error("HAI\nVISIBLE PRODUKT OF 4611686018427387904 AN 2\nKTHXBYE\n"),
        ErrorKind::OperandType
    );
}

#[test]
fn boolean_operators() {
    assert_eq!(run_ok("HAI\nVISIBLE BOTH OF WIN AN FAIL\nKTHXBYE\n"), "FAIL\n");
    assert_eq!(run_ok("HAI\nVISIBLE EITHER OF WIN AN FAIL\nKTHXBYE\n"), "WIN\n");
    assert_eq!(run_ok("HAI\nVISIBLE WON OF WIN AN WIN\nKTHXBYE\n"), "FAIL\n");
    assert_eq!(run_ok("HAI\nVISIBLE NOT FAIL\nKTHXBYE\n"), "WIN\n");
    assert_eq!(
        run_ok("HAI\nVISIBLE ALL OF WIN AN WIN AN FAIL MKAY\nKTHXBYE\n"),
        "FAIL\n"
    );
    assert_eq!(
        run_ok("HAI\nVISIBLE ANY OF FAIL AN WIN MKAY\nKTHXBYE\n"),
        "WIN\n"
    );
}

#[test]
fn comparison_operators() {
    assert_eq!(run_ok("HAI\nVISIBLE BOTH SAEM 3 AN 3\nKTHXBYE\n"), "WIN\n");
    assert_eq!(run_ok("HAI\nVISIBLE BOTH SAEM 3 AN 3.0\nKTHXBYE\n"), "WIN\n");
    assert_eq!(run_ok("HAI\nVISIBLE DIFFRINT 1 AN 2\nKTHXBYE\n"), "WIN\n");
}

#[test]
fn smoosh_concatenates_any_values() {
    assert_eq!(
        run_ok("HAI\nVISIBLE SMOOSH \"n=\" AN 4 AN \", t=\" AN WIN MKAY\nKTHXBYE\n"),
        "n=4, t=WIN\n"
    );
}

#[test]
fn bare_expression_lands_in_it() {
    assert_eq!(
        run_ok("HAI\nSUM OF 20 AN 22\nVISIBLE IT\nKTHXBYE\n"),
        "42\n"
    );
}

#[test]
fn declarations_and_assignment() {
    let src = "HAI\nWAZZUP\nI HAS A x ITZ 5\nI HAS A y\nBUHBYE\ny R SUM OF x AN 1\nVISIBLE y\nKTHXBYE\n";
    assert_eq!(run_ok(src), "6\n");
}

#[test]
fn computed_initializer_runs_at_declaration() {
    let src = "HAI\nWAZZUP\nI HAS A x ITZ SUM OF 2 AN 2\nBUHBYE\nVISIBLE x\nKTHXBYE\n";
    assert_eq!(run_ok(src), "4\n");
}

#[test]
fn is_now_a_recasts_in_place() {
    let src = "HAI\nWAZZUP\nI HAS A n ITZ \"42\"\nBUHBYE\nn IS NOW A NUMBR\nVISIBLE SUM OF n AN 1\nKTHXBYE\n";
    assert_eq!(run_ok(src), "43\n");
}

#[test]
fn maek_casts_an_expression() {
    assert_eq!(
        run_ok("HAI\nVISIBLE MAEK \"3.14\" A NUMBAR\nKTHXBYE\n"),
        "3.14\n"
    );
    assert_eq!(run_ok("HAI\nVISIBLE MAEK 3.9 A NUMBR\nKTHXBYE\n"), "3\n");
    assert_eq!(run_ok("HAI\nVISIBLE MAEK 2.5 A YARN\nKTHXBYE\n"), "2.50\n");
    assert_eq!(run_ok("HAI\nVISIBLE MAEK 0 A TROOF\nKTHXBYE\n"), "FAIL\n");
}

#[test]
fn impossible_runtime_cast_aborts() {
    let src = "HAI\nWAZZUP\nI HAS A w ITZ \"abc\"\nBUHBYE\nw IS NOW A NUMBR\nKTHXBYE\n";
    assert_eq!(runtime_error(src), ErrorKind::UnsupportedCast);
}

#[test]
fn gimmeh_reads_a_yarn() {
    let src = "HAI\nWAZZUP\nI HAS A name\nBUHBYE\nGIMMEH name\nVISIBLE SMOOSH \"hi \" AN name MKAY\nKTHXBYE\n";
    let report = run_program(src, QueuedInput::new(["bob"]));
    assert!(report.ok, "{:?}", report.diagnostics);
    assert_eq!(report.output, "hi bob\n");
}

#[test]
fn exhausted_input_reads_empty() {
    let src = "HAI\nWAZZUP\nI HAS A line\nBUHBYE\nGIMMEH line\nVISIBLE line\nKTHXBYE\n";
    assert_eq!(run_ok(src), "\n");
}

#[test]
fn conditional_takes_the_true_branch() {
    let src = "HAI\nWIN\nO RLY?\nYA RLY\nVISIBLE \"yes\"\nNO WAI\nVISIBLE \"no\"\nOIC\nKTHXBYE\n";
    assert_eq!(run_ok(src), "yes\n");
}

#[test]
fn conditional_takes_the_false_branch() {
    let src = "HAI\nFAIL\nO RLY?\nYA RLY\nVISIBLE \"yes\"\nNO WAI\nVISIBLE \"no\"\nOIC\nKTHXBYE\n";
    assert_eq!(run_ok(src), "no\n");
}

#[test]
fn conditional_without_false_branch() {
    let src = "HAI\nFAIL\nO RLY?\nYA RLY\nVISIBLE \"yes\"\nOIC\nVISIBLE \"after\"\nKTHXBYE\n";
    assert_eq!(run_ok(src), "after\n");
}

#[test]
fn conditionals_nest() {
    let src = "HAI\nWIN\nO RLY?\nYA RLY\nFAIL\nO RLY?\nYA RLY\nVISIBLE \"inner\"\nNO WAI\nVISIBLE \"outer\"\nOIC\nOIC\nKTHXBYE\n";
    assert_eq!(run_ok(src), "outer\n");
}

#[test]
fn switch_matches_first_case_only() {
    let src = "HAI\n2\nWTF?\nOMG 1\nVISIBLE \"one\"\nGTFO\nOMG 2\nVISIBLE \"two\"\nGTFO\nOMG 2\nVISIBLE \"again\"\nGTFO\nOIC\nKTHXBYE\n";
    assert_eq!(run_ok(src), "two\n");
}

#[test]
fn switch_falls_back_to_omgwtf() {
    let src = "HAI\n9\nWTF?\nOMG 1\nVISIBLE \"one\"\nGTFO\nOMGWTF\nVISIBLE \"dunno\"\nOIC\nKTHXBYE\n";
    assert_eq!(run_ok(src), "dunno\n");
}

#[test]
fn switch_matching_is_type_sensitive() {
    // NUMBR 1 does not match the YARN case "1".
    let src = "HAI\n1\nWTF?\nOMG \"1\"\nVISIBLE \"yarn\"\nGTFO\nOMGWTF\nVISIBLE \"default\"\nOIC\nKTHXBYE\n";
    assert_eq!(run_ok(src), "default\n");
}

#[test]
fn switch_without_gtfo_still_stops_at_next_case() {
    let src = "HAI\n1\nWTF?\nOMG 1\nVISIBLE \"one\"\nOMG 2\nVISIBLE \"two\"\nOIC\nKTHXBYE\n";
    assert_eq!(run_ok(src), "one\n");
}

#[test]
fn gtfo_in_a_conditional_leaves_the_switch_case() {
    let src = "HAI\n1\nWTF?\nOMG 1\nVISIBLE \"one\"\nWIN\nO RLY?\nYA RLY\nGTFO\nOIC\nVISIBLE \"unreached\"\nOMG 2\nVISIBLE \"two\"\nOIC\nVISIBLE \"after\"\nKTHXBYE\n";
    assert_eq!(run_ok(src), "one\nafter\n");
}

#[test]
fn til_loop_counts_up() {
    let src = "HAI\nWAZZUP\nI HAS A i ITZ 0\nBUHBYE\nIM IN YR loopy UPPIN YR i TIL BOTH SAEM i AN 3\nVISIBLE i\nIM OUTTA YR loopy\nKTHXBYE\n";
    assert_eq!(run_ok(src), "0\n1\n2\n");
}

#[test]
fn wile_loop_counts_down() {
    let src = "HAI\nWAZZUP\nI HAS A i ITZ 3\nBUHBYE\nIM IN YR down NERFIN YR i WILE DIFFRINT i AN 0\nVISIBLE i\nIM OUTTA YR down\nKTHXBYE\n";
    assert_eq!(run_ok(src), "3\n2\n1\n");
}

#[test]
fn gtfo_breaks_a_loop() {
    let src = "HAI\nWAZZUP\nI HAS A i ITZ 0\nBUHBYE\nIM IN YR loopy UPPIN YR i TIL BOTH SAEM i AN 100\nVISIBLE i\nBOTH SAEM i AN 2\nO RLY?\nYA RLY\nGTFO\nOIC\nIM OUTTA YR loopy\nVISIBLE \"done\"\nKTHXBYE\n";
    assert_eq!(run_ok(src), "0\n1\n2\ndone\n");
}

#[test]
fn runaway_loop_hits_the_iteration_limit() {
    let src = "HAI\nWAZZUP\nI HAS A i ITZ 0\nBUHBYE\nIM IN YR forever UPPIN YR i WILE WIN\nIM OUTTA YR forever\nKTHXBYE\n";
    let limits = Limits {
        max_iterations: 50,
        max_call_depth: 100,
    };
    let report = run_program_with_limits(src, QueuedInput::default(), limits);
    assert!(!report.ok);
    assert_eq!(
        report.diagnostics.last().map(|d| d.kind),
        Some(ErrorKind::IterationLimit)
    );
}

#[test]
fn function_call_returns_through_it() {
    let src = "HAI\nHOW IZ I add YR a AN YR b\nFOUND YR SUM OF a AN b\nIF U SAY SO\nI IZ add YR 3 AN YR 4 MKAY\nVISIBLE IT\nKTHXBYE\n";
    assert_eq!(run_ok(src), "7\n");
}

#[test]
fn function_without_found_yr_returns_noob() {
    let src = "HAI\nHOW IZ I shout\nVISIBLE \"HI\"\nIF U SAY SO\nI IZ shout MKAY\nVISIBLE IT\nKTHXBYE\n";
    assert_eq!(run_ok(src), "HI\nNOOB\n");
}

#[test]
fn function_writes_are_discarded() {
    let src = "HAI\nWAZZUP\nI HAS A g ITZ 1\nBUHBYE\nHOW IZ I clobber\ng R 99\nFOUND YR g\nIF U SAY SO\nI IZ clobber MKAY\nVISIBLE IT\nVISIBLE g\nKTHXBYE\n";
    assert_eq!(run_ok(src), "99\n1\n");
}

#[test]
fn parameter_shadows_a_global_of_the_same_name() {
    let src = "HAI\nWAZZUP\nI HAS A n ITZ 7\nBUHBYE\nHOW IZ I bump YR n\nn R SUM OF n AN 1\nFOUND YR n\nIF U SAY SO\nI IZ bump YR 41 MKAY\nVISIBLE IT\nVISIBLE n\nKTHXBYE\n";
    assert_eq!(run_ok(src), "42\n7\n");
}

#[test]
fn functions_read_the_globals_snapshot() {
    let src = "HAI\nWAZZUP\nI HAS A g ITZ 10\nBUHBYE\nHOW IZ I peek\nFOUND YR g\nIF U SAY SO\nI IZ peek MKAY\nVISIBLE IT\nKTHXBYE\n";
    assert_eq!(run_ok(src), "10\n");
}

#[test]
fn recursion_works() {
    let src = "HAI\nHOW IZ I fac YR n\nBOTH SAEM n AN 0\nO RLY?\nYA RLY\nFOUND YR 1\nNO WAI\nI IZ fac YR DIFF OF n AN 1 MKAY\nFOUND YR PRODUKT OF n AN IT\nOIC\nIF U SAY SO\nI IZ fac YR 5 MKAY\nVISIBLE IT\nKTHXBYE\n";
    assert_eq!(run_ok(src), "120\n");
}

#[test]
fn unbounded_recursion_hits_the_depth_limit() {
    let src = "HAI\nHOW IZ I spin\nI IZ spin MKAY\nIF U SAY SO\nI IZ spin MKAY\nKTHXBYE\n";
    let limits = Limits {
        max_iterations: 10_000,
        max_call_depth: 25,
    };
    let report = run_program_with_limits(src, QueuedInput::default(), limits);
    assert!(!report.ok);
    assert_eq!(
        report.diagnostics.last().map(|d| d.kind),
        Some(ErrorKind::RecursionLimit)
    );
}

#[test]
fn numbar_output_keeps_its_decimal_point() {
    assert_eq!(run_ok("HAI\nVISIBLE 8.0\nKTHXBYE\n"), "8.0\n");
    assert_eq!(run_ok("HAI\nVISIBLE SUM OF 4.0 AN 4\nKTHXBYE\n"), "8.0\n");
}

#[test]
fn final_symbols_reflect_the_run() {
    use kthx::interpreter::Value;
    let src = "HAI\nWAZZUP\nI HAS A i ITZ 0\nBUHBYE\ni R SUM OF i AN 5\nKTHXBYE\n";
    let report = run(src);
    assert!(report.ok);
    let symbols = report.symbols.expect("symbols after a run");
    assert_eq!(symbols.value("i"), Some(&Value::Numbr(5)));
}
