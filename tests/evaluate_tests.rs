//! End-to-end evaluation: binding, invocation, retention, serialization.
//!
//! These tests compile and load real artifacts.

mod common;

use common::{simple_unit, test_base, unique_name};
use dyneval::{ErrorKind, EvalError, Evaluation, Func, Overrides, Value, Var};

fn overrides<const N: usize>(entries: [(&str, Value); N]) -> Overrides {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

#[test]
fn evaluates_with_defaults_and_overrides() {
    let mut eval = simple_unit("simple operation");
    eval.build().unwrap();

    // A overridden, B at its declared default of 10.5
    let result = eval.evaluate(&overrides([("A", Value::Int(9))])).unwrap();
    assert_eq!(result, Value::Float(19.5));

    let result = eval
        .evaluate(&overrides([("A", Value::Int(1)), ("B", Value::Float(2.1))]))
        .unwrap();
    assert_eq!(result, Value::Float(3.1));
}

#[test]
fn mismatched_override_kind_is_a_binding_error_not_a_crash() {
    let mut eval = simple_unit("mismatched kind");
    eval.build().unwrap();

    let err = eval.evaluate(&overrides([("B", Value::Int(2))])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Binding);
    assert_eq!(
        err.to_string(),
        "Error on setting value of variable B (type int) with value 2 (type float64)"
    );

    // The artifact is still good; a correct call right after succeeds.
    let result = eval
        .evaluate(&overrides([("A", Value::Int(0)), ("B", Value::Float(2.0))]))
        .unwrap();
    assert_eq!(result, Value::Float(2.0));
}

#[test]
fn unknown_override_name_is_a_binding_error() {
    let mut eval = simple_unit("unknown override");
    eval.build().unwrap();

    let err = eval
        .evaluate(&overrides([("A", Value::Int(1)), ("D", Value::Int(1))]))
        .unwrap_err();
    assert_eq!(err, EvalError::unknown_variable("D"));
    assert_eq!(err.kind(), ErrorKind::Binding);
}

#[test]
fn slots_retain_the_last_written_value() {
    let mut eval = simple_unit("slot retention");
    eval.build().unwrap();

    let result = eval
        .evaluate(&overrides([("A", Value::Int(1)), ("B", Value::Float(2.1))]))
        .unwrap();
    assert_eq!(result, Value::Float(3.1));

    // B keeps the 2.1 written above; only A is rebound.
    let result = eval.evaluate(&overrides([("A", Value::Int(0))])).unwrap();
    assert_eq!(result, Value::Float(2.1));
}

#[test]
fn string_and_bool_slots_round_trip() {
    let mut eval = Evaluation::with_name(unique_name("strings and bools"));
    eval.set_base_build_path(test_base());
    eval.define_variable(Var::with_default("Greeting", "string", "hello"));
    eval.define_variable(Var::with_default("Loud", "bool", false));
    eval.prepare(
        "if Loud { Value::from(format!(\"{}!\", Greeting)) } else { Value::from(Greeting) }",
    );
    eval.build().unwrap();

    let result = eval.evaluate(&Overrides::new()).unwrap();
    assert_eq!(result, Value::Str("hello".into()));

    let result = eval
        .evaluate(&overrides([
            ("Greeting", Value::Str("bye".into())),
            ("Loud", Value::Bool(true)),
        ]))
        .unwrap();
    assert_eq!(result, Value::Str("bye!".into()));
}

#[test]
fn helper_functions_are_callable_from_the_body() {
    let mut eval = Evaluation::with_name(unique_name("helper function"));
    eval.set_base_build_path(test_base());
    eval.define_variable(Var::with_default("B", "float64", 10.5));
    eval.define_function(Func::new(
        "Double",
        "fn Double(x: f64) -> f64 { x * 2.0 }",
    ));
    eval.prepare("Value::from(Double(B))");
    eval.build().unwrap();

    let result = eval.evaluate(&Overrides::new()).unwrap();
    assert_eq!(result, Value::Float(21.0));
}

#[test]
fn imports_are_usable_from_the_body() {
    let mut eval = Evaluation::with_name(unique_name("imports"));
    eval.set_base_build_path(test_base());
    eval.import("std::collections::BTreeSet");
    eval.define_variable(Var::with_default("A", "int", 7));
    eval.prepare(
        "let mut seen = BTreeSet::new(); seen.insert(A); seen.insert(A); \
         Value::from(seen.len() as i64)",
    );
    eval.build().unwrap();

    let result = eval.evaluate(&Overrides::new()).unwrap();
    assert_eq!(result, Value::Int(1));
}

#[test]
fn integer_results_decode_as_ints() {
    let mut eval = Evaluation::with_name(unique_name("int result"));
    eval.set_base_build_path(test_base());
    eval.define_variable(Var::with_default("A", "int", 20));
    eval.prepare("Value::from(A * 2)");
    eval.build().unwrap();

    let result = eval.evaluate(&Overrides::new()).unwrap();
    assert_eq!(result.as_int().unwrap(), 40);
}

#[test]
fn deleting_the_artifact_makes_evaluate_a_load_error() {
    let mut eval = simple_unit("deleted artifact");
    eval.build().unwrap();
    std::fs::remove_file(eval.artifact_path().unwrap()).unwrap();

    let err = eval.evaluate(&Overrides::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);
    assert!(err.to_string().contains("rebuild the formula"));
}

#[test]
fn concurrent_evaluations_observe_only_their_own_overrides() {
    let mut eval = Evaluation::with_name(unique_name("parallel evaluate"));
    eval.set_base_build_path(test_base());
    eval.define_variable(Var::new("A", "int"));
    eval.prepare("Value::from(A * 2)");
    eval.build().unwrap();

    // Slots are shared, process-wide state per artifact; the per-artifact
    // gate must keep each call's override visible to its own invocation.
    let eval = &eval;
    std::thread::scope(|scope| {
        for thread in 0..4i64 {
            scope.spawn(move || {
                for i in 0..25i64 {
                    let a = thread * 100 + i;
                    let result = eval
                        .evaluate(&overrides([("A", Value::Int(a))]))
                        .unwrap();
                    assert_eq!(result, Value::Int(a * 2));
                }
            });
        }
    });
}
