use super::*;
use incant_ir::{ScriptId, Ty};
use incant_typeck::CompiledScript;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn compile(source: &str) -> CompiledScript {
    let tokens = incant_lexer::tokenize(source).unwrap();
    let program = incant_parse::parse(source, &tokens).unwrap();
    incant_typeck::check(ScriptId::new("!test"), source, program).unwrap()
}

fn fixed_host() -> Host {
    Host::fixed(1_700_000_000.0, 42)
}

/// Compile, instantiate, and invoke a script with no params.
fn run(source: &str) -> Result<String, RuntimeError> {
    run_with_params(source, &HashMap::new())
}

fn run_with_params(
    source: &str,
    params: &HashMap<String, String>,
) -> Result<String, RuntimeError> {
    let script = compile(source);
    let mut store = MemoryStore::new();
    let mut host = fixed_host();
    let seeded = instantiate(&script, &mut host)?;
    store.write_values(&script.id, seeded).unwrap();
    invoke(&script, params, &mut store, &mut host)
}

fn run_ok(source: &str) -> String {
    match run(source) {
        Ok(output) => output,
        Err(e) => panic!("running {source:?} failed: {e}"),
    }
}

fn run_err(source: &str) -> RuntimeErrorKind {
    match run(source) {
        Ok(output) => panic!("expected {source:?} to fail, got output {output:?}"),
        Err(e) => e.kind,
    }
}

#[test]
fn print_renders_each_type() {
    assert_eq!(run_ok("PRINT 42;"), "42");
    assert_eq!(run_ok("PRINT 3.0;"), "3");
    assert_eq!(run_ok("PRINT 2.5;"), "2.5");
    assert_eq!(run_ok("PRINT true;"), "true");
    assert_eq!(run_ok("PRINT 'hi';"), "hi");
    assert_eq!(run_ok("PRINT [1, 2, 3];"), "[1, 2, 3]");
    assert_eq!(run_ok("PRINT [[1], []];"), "[[1], []]");
}

#[test]
fn output_segments_concatenate() {
    assert_eq!(run_ok("PRINT 'a'; PRINT 'b';"), "ab");
    // A script with no PRINT produces empty output.
    assert_eq!(run_ok("LET x = 1;"), "");
}

#[test]
fn conversions() {
    assert_eq!(run_ok("PRINT $'5' + 1;"), "6");
    assert_eq!(run_ok("PRINT $' -3.5 ';"), "-3.5");
    assert_eq!(run_ok("PRINT $true + $false;"), "1");
    assert_eq!(run_ok("PRINT ?'true' and ?1;"), "true");
    assert_eq!(run_ok("PRINT #42 + '!';"), "42!");
    assert_eq!(run_ok("PRINT #3.0;"), "3");
    assert!(matches!(
        run_err("PRINT $'five';"),
        RuntimeErrorKind::NumberConversion { .. }
    ));
    assert!(matches!(
        run_err("PRINT ?'yes';"),
        RuntimeErrorKind::BoolConversion { .. }
    ));
}

#[test]
fn arithmetic_and_zero_checks() {
    assert_eq!(run_ok("PRINT 7 % 3;"), "1");
    // Modulo follows the divisor's sign.
    assert_eq!(run_ok("PRINT (0 - 7) % 3;"), "2");
    assert!(matches!(run_err("PRINT 1 / 0;"), RuntimeErrorKind::DivisionByZero));
    assert!(matches!(run_err("PRINT 1 % 0;"), RuntimeErrorKind::ModuloByZero));
}

#[test]
fn ranges_are_directional() {
    assert_eq!(run_ok("PRINT 1..=5;"), "[1, 2, 3, 4, 5]");
    assert_eq!(run_ok("PRINT 5..=1;"), "[5, 4, 3, 2, 1]");
    assert_eq!(run_ok("PRINT 5..<1;"), "[5, 4, 3, 2]");
    assert_eq!(run_ok("PRINT 0..<0;"), "[]");
    assert_eq!(run_ok("PRINT 0..<3;"), "[0, 1, 2]");
    assert!(matches!(
        run_err("PRINT 1.5..=3;"),
        RuntimeErrorKind::RangeBoundNotInteger { .. }
    ));
}

#[test]
fn comprehension_filters_and_maps() {
    assert_eq!(
        run_ok("PRINT for [1, 2, 3, 4, 5] as n if n > 2 yeet n * 10;"),
        "[30, 40, 50]"
    );
    assert_eq!(run_ok("PRINT for 'abc' as c yeet c + '!';"), "[a!, b!, c!]");
    // Nothing passes the filter: the result is an empty, typed list.
    assert_eq!(
        run_ok("PRINT 'type'(for [1, 2] as n if n > 9 yeet #n);"),
        "list<string>"
    );
}

#[test]
fn collect_reduces() {
    assert_eq!(run_ok("PRINT collect [1, 2, 3, 4, 5] as acc, n with acc + n;"), "15");
    assert_eq!(run_ok("PRINT collect 'abc' as acc, c with c + acc;"), "cba");
    // String collect starts from the empty string.
    assert_eq!(run_ok("PRINT collect '' as acc, c with acc + c;"), "");
    assert!(matches!(
        run_err("LET xs: list<number> = []; PRINT collect xs as acc, n with acc + n;"),
        RuntimeErrorKind::EmptyCollect
    ));
}

#[test]
fn subscript_checks() {
    assert_eq!(run_ok("PRINT 'abc'[1];"), "b");
    assert_eq!(run_ok("PRINT [10, 20][1];"), "20");
    assert!(matches!(
        run_err("PRINT [1, 2, 3][5];"),
        RuntimeErrorKind::IndexOutOfBounds { index: 5, len: 3 }
    ));
    assert!(matches!(
        run_err("PRINT 'abc'[0 - 1];"),
        RuntimeErrorKind::NegativeIndex { .. }
    ));
    assert!(matches!(
        run_err("PRINT 'abc'[0.5];"),
        RuntimeErrorKind::NonIntegerIndex { .. }
    ));
}

#[test]
fn sort_variants() {
    assert_eq!(run_ok("PRINT 'sort'([3, 1, 2]);"), "[1, 2, 3]");
    assert_eq!(
        run_ok("PRINT 'sort'(['pear', 'apple']; a, b yeet a < b);"),
        "[apple, pear]"
    );
    // Descending comparator.
    assert_eq!(
        run_ok("PRINT 'sort'([1, 3, 2]; a, b yeet a > b);"),
        "[3, 2, 1]"
    );
}

#[test]
fn eval_operator_runs_isolated_code() {
    assert_eq!(run_ok("PRINT !'PRINT 2 + 3;';"), "5");
    // The nested result is a string: it concatenates.
    assert_eq!(run_ok("PRINT !'PRINT 2;' + '!';"), "2!");
    assert!(matches!(
        run_err("PARAMS code; PRINT !code;"),
        RuntimeErrorKind::MissingParameter { .. }
    ));
}

#[test]
fn eval_of_computed_code_is_checked_at_runtime() {
    let mut params = HashMap::new();
    params.insert("code".to_string(), "PRINT 6 * 7;".to_string());
    assert_eq!(
        run_with_params("PARAMS code; PRINT !code;", &params).unwrap(),
        "42"
    );

    params.insert("code".to_string(), "STORE n = 1; PRINT n;".to_string());
    let err = run_with_params("PARAMS code; PRINT !code;", &params).unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::EvalStores));

    params.insert("code".to_string(), "PRINT 1 +;".to_string());
    let err = run_with_params("PARAMS code; PRINT !code;", &params).unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::EvalCompile { .. }));

    params.insert("code".to_string(), "LET x = 1;".to_string());
    let err = run_with_params("PARAMS code; PRINT !code;", &params).unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::EvalNoOutput));
}

#[test]
fn eval_depth_is_bounded() {
    // Wrap `PRINT 1;` in MAX_EVAL_DEPTH + 1 layers of `!'...'`.
    let mut code = "PRINT 1;".to_string();
    for _ in 0..=MAX_EVAL_DEPTH {
        let escaped = code.replace('\\', "\\\\").replace('\'', "\\'");
        code = format!("PRINT !'{escaped}';");
    }
    let err = run(&code).unwrap_err();
    assert!(matches!(
        err.kind,
        RuntimeErrorKind::EvalDepthExceeded { .. }
    ));
}

#[test]
fn stores_persist_across_invocations() {
    let source = "STORE n = 0; n = n + 1; PRINT n;";
    let script = compile(source);
    let mut store = MemoryStore::new();
    let mut host = fixed_host();
    let seeded = instantiate(&script, &mut host).unwrap();
    assert_eq!(seeded, vec![("n".to_string(), Value::Number(0.0))]);
    store.write_values(&script.id, seeded).unwrap();

    let params = HashMap::new();
    assert_eq!(invoke(&script, &params, &mut store, &mut host).unwrap(), "1");
    assert_eq!(invoke(&script, &params, &mut store, &mut host).unwrap(), "2");
    assert_eq!(store.get(&script.id, "n"), Some(&Value::Number(2.0)));
}

#[test]
fn failed_invocation_commits_nothing() {
    let source = "STORE n = 0; n = n + 1; PRINT 1 / 0;";
    let script = compile(source);
    let mut store = MemoryStore::new();
    let mut host = fixed_host();
    let seeded = instantiate(&script, &mut host).unwrap();
    store.write_values(&script.id, seeded).unwrap();

    let err = invoke(&script, &HashMap::new(), &mut store, &mut host).unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::DivisionByZero));
    // The increment was rolled back and no output was produced.
    assert_eq!(store.get(&script.id, "n"), Some(&Value::Number(0.0)));
}

#[test]
fn store_initializers_see_earlier_stores() {
    let script = compile("STORE a = 2; STORE b = a * 3; PRINT b;");
    let mut host = fixed_host();
    let seeded = instantiate(&script, &mut host).unwrap();
    assert_eq!(
        seeded,
        vec![
            ("a".to_string(), Value::Number(2.0)),
            ("b".to_string(), Value::Number(6.0)),
        ]
    );
}

#[test]
fn uninstantiated_store_is_reported() {
    let script = compile("STORE n = 0; PRINT n;");
    let mut store = MemoryStore::new();
    let mut host = fixed_host();
    let err = invoke(&script, &HashMap::new(), &mut store, &mut host).unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::MissingStore { .. }));
}

#[test]
fn persisted_store_type_is_verified() {
    let script = compile("STORE n = 0; PRINT n;");
    let mut store = MemoryStore::new();
    let mut host = fixed_host();
    store
        .write_values(&script.id, vec![("n".to_string(), Value::string("oops"))])
        .unwrap();
    let err = invoke(&script, &HashMap::new(), &mut store, &mut host).unwrap_err();
    assert!(matches!(
        err.kind,
        RuntimeErrorKind::StoreTypeMismatch { expected: Ty::Number, .. }
    ));
}

#[test]
fn params_bind_caller_strings() {
    let mut params = HashMap::new();
    params.insert("who".to_string(), "chat".to_string());
    assert_eq!(
        run_with_params("PARAMS who; PRINT 'hello ' + who;", &params).unwrap(),
        "hello chat"
    );
    // Extra caller entries are ignored.
    params.insert("extra".to_string(), "x".to_string());
    assert_eq!(
        run_with_params("PARAMS who; PRINT who;", &params).unwrap(),
        "chat"
    );
}

#[test]
fn equality_is_deep() {
    assert_eq!(run_ok("PRINT [[1], [2]] == [[1], [2]];"), "true");
    assert_eq!(run_ok("PRINT [1, 2] == [1, 3];"), "false");
    assert_eq!(run_ok("PRINT [1] + [2] == [1, 2];"), "true");
}

#[test]
fn ternary_takes_one_branch_only() {
    // The untaken branch must not run: it would divide by zero.
    assert_eq!(run_ok("PRINT true ? 1 : 1 / 0;"), "1");
    assert_eq!(run_ok("PRINT false ? 1 / 0 : 2;"), "2");
}
