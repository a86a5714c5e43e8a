//! End-to-end tests driving the public engine API.

#![expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use incant::{
    compile, instantiate, invoke, CompileError, Host, MemoryStore, RuntimeErrorKind, StoreBackend,
    TypeErrorKind, Value,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

/// A registered script plus its backing store, ready to trigger.
struct Registered {
    script: incant::CompiledScript,
    store: MemoryStore,
    host: Host,
}

impl Registered {
    fn new(id: &str, source: &str) -> Self {
        let script = match compile(id, source) {
            Ok(script) => script,
            Err(e) => panic!("compiling {source:?} failed: {e}"),
        };
        let mut store = MemoryStore::new();
        let mut host = Host::fixed(1_700_000_000.0, 42);
        let seeded = instantiate(&script, &mut host).unwrap();
        store.write_values(&script.id, seeded).unwrap();
        Registered {
            script,
            store,
            host,
        }
    }

    fn trigger(&mut self) -> Result<String, incant::RuntimeError> {
        self.trigger_with(&HashMap::new())
    }

    fn trigger_with(
        &mut self,
        params: &HashMap<String, String>,
    ) -> Result<String, incant::RuntimeError> {
        invoke(&self.script, params, &mut self.store, &mut self.host)
    }
}

fn output(source: &str) -> String {
    Registered::new("!t", source).trigger().unwrap()
}

#[test]
fn literal_rendering_round_trips() {
    assert_eq!(output("PRINT #42;"), "42");
    assert_eq!(output("PRINT #3.0;"), "3");
    assert_eq!(output("PRINT #2.75;"), "2.75");
    assert_eq!(output("PRINT 'x';"), "x");
    assert_eq!(output("PRINT true;"), "true");
}

#[test]
fn conversions_on_matching_types_are_identity() {
    assert_eq!(output("PRINT ?true == true;"), "true");
    assert_eq!(output("PRINT $5 == 5;"), "true");
    assert_eq!(output("PRINT #'x' == 'x';"), "true");
}

#[test]
fn empty_list_needs_annotation() {
    assert!(compile("!t", "LET x: list<string> = []; PRINT x;").is_ok());
    match compile("!t", "LET x = []; PRINT x;") {
        Err(CompileError::Type(e)) => {
            assert!(matches!(e.kind, TypeErrorKind::AnnotationRequired));
        }
        other => panic!("expected a type error, got {other:?}"),
    }
}

#[test]
fn scripts_have_independent_stores() {
    let source = "STORE n = 0; n = n + 1; PRINT #n;";
    let mut first = Registered::new("!first", source);
    let mut second = Registered::new("!second", source);

    assert_eq!(first.trigger().unwrap(), "1");
    assert_eq!(first.trigger().unwrap(), "2");
    assert_eq!(first.trigger().unwrap(), "3");
    // The other script's counter is untouched.
    assert_eq!(second.trigger().unwrap(), "1");
}

#[test]
fn runtime_failure_rolls_back_store_writes() {
    let mut registered = Registered::new(
        "!t",
        "STORE n = 0; PARAMS divisor; n = n + 1; PRINT #(n / $divisor);",
    );

    let mut params = HashMap::new();
    params.insert("divisor".to_string(), "1".to_string());
    assert_eq!(registered.trigger_with(&params).unwrap(), "1");

    params.insert("divisor".to_string(), "0".to_string());
    let err = registered.trigger_with(&params).unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::DivisionByZero));
    // The increment from the failed run did not persist.
    assert_eq!(
        registered.store.get(&registered.script.id, "n"),
        Some(&Value::Number(1.0))
    );

    params.insert("divisor".to_string(), "2".to_string());
    assert_eq!(registered.trigger_with(&params).unwrap(), "1");
}

#[test]
fn range_semantics() {
    assert_eq!(output("PRINT 1..=5;"), "[1, 2, 3, 4, 5]");
    assert_eq!(output("PRINT 5..<1;"), "[5, 4, 3, 2]");
    assert_eq!(output("PRINT 0..<0;"), "[]");
}

#[test]
fn comprehension_with_filter() {
    assert_eq!(
        output("PRINT for [1, 2, 3, 4, 5] as n if n > 2 yeet n * 10;"),
        "[30, 40, 50]"
    );
}

#[test]
fn collect_sums_a_list() {
    assert_eq!(
        output("PRINT collect [1, 2, 3, 4, 5] as acc, n with acc + n;"),
        "15"
    );
}

#[test]
fn nested_evaluation() {
    assert_eq!(output("PRINT !'PRINT 2+3;';"), "5");
    match compile("!t", "PRINT !'STORE x = 1; PRINT x;';") {
        Err(CompileError::Type(e)) => {
            assert!(matches!(e.kind, TypeErrorKind::NestedStores));
        }
        other => panic!("expected a type error, got {other:?}"),
    }
}

#[test]
fn subscript_bounds_are_runtime_errors() {
    let err = Registered::new("!t", "PRINT [1, 2, 3][5];")
        .trigger()
        .unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::IndexOutOfBounds { .. }));

    let err = Registered::new("!t", "PRINT 'abc'[-1];").trigger().unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::NegativeIndex { .. }));
}

#[test]
fn rejected_scripts_produce_no_artifact() {
    for source in [
        "PRINT 1 ß;",                 // lex
        "PRINT 1",                    // parse
        "PRINT 1 + 'one';",           // type
        "STORE n = 0;",               // no statements
        "PARAMS a; STORE n = 0; PRINT n;", // ordering
    ] {
        assert!(compile("!t", source).is_err(), "{source:?} should not compile");
    }
}

#[test]
fn seeded_host_makes_impure_builtins_reproducible() {
    let source = "PRINT #'random'(1, 10) + ' @ ' + #'timestamp'();";
    let a = Registered::new("!t", source).trigger().unwrap();
    let b = Registered::new("!t", source).trigger().unwrap();
    assert_eq!(a, b);
    assert!(a.ends_with("@ 1700000000"));
}

#[test]
fn multi_statement_script_end_to_end() {
    let mut registered = Registered::new(
        "!quote",
        "STORE uses = 0;\n\
         PARAMS who;\n\
         uses = uses + 1;\n\
         LET greeting = 'hi ' + 'upper'(who);\n\
         PRINT greeting + ' (#' + #uses + ')';",
    );
    let mut params = HashMap::new();
    params.insert("who".to_string(), "chat".to_string());
    assert_eq!(registered.trigger_with(&params).unwrap(), "hi CHAT (#1)");
    assert_eq!(registered.trigger_with(&params).unwrap(), "hi CHAT (#2)");
}

#[test]
fn missing_param_fails_before_execution() {
    let mut registered =
        Registered::new("!t", "STORE n = 0; PARAMS who; n = n + 1; PRINT who;");
    let err = registered.trigger().unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::MissingParameter { .. }));
    // Setup failures leave the store untouched too.
    assert_eq!(
        registered.store.get(&registered.script.id, "n"),
        Some(&Value::Number(0.0))
    );
}
