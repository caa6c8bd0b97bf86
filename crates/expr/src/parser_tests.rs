// SPDX-License-Identifier: MIT

use super::*;
use crate::context::{ExecutionContext, FileMeta};
use cronplus_core::TaskId;
use std::collections::HashMap;
use std::path::PathBuf;

fn ctx_with(variables: HashMap<String, VariableValue>) -> ExecutionContext {
    let file = FileMeta {
        path: PathBuf::from("/in/Report.PDF"),
        size: 2048,
        mtime_utc: chrono::DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").expect("fixed timestamp").into(),
    };
    ExecutionContext::new(
        TaskId::from_string("tsk-fixedidtest0000000"),
        "corr-1".to_string(),
        file,
        variables,
        chrono::DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z").expect("fixed now").into(),
    )
}

fn eval(src: &str) -> bool {
    evaluate(src, &ctx_with(HashMap::new())).unwrap_or_else(|e| panic!("{src:?} failed to evaluate: {e}"))
}

#[test]
fn evaluates_numeric_comparison() {
    assert!(eval("file.size > 1024"));
    assert!(!eval("file.size < 1024"));
}

#[test]
fn evaluates_logical_operators() {
    assert!(eval("true && !false"));
    assert!(eval("false || true"));
    assert!(!eval("false && true"));
}

#[test]
fn evaluates_string_functions() {
    assert!(eval(r#"endsWith(file.name, "PDF")"#));
    assert!(eval(r#"startsWith(lower(file.name), "report")"#));
    assert!(eval(r#"contains(upper("hello"), "ELL")"#));
}

#[test]
fn evaluates_matches_with_regex() {
    assert!(eval(r#"matches("^Report\\.PDF$", file.name)"#));
    assert!(!eval(r#"matches("^invoice", file.name)"#));
}

#[test]
fn evaluates_vars_member() {
    let mut vars = HashMap::new();
    vars.insert("threshold".to_string(), VariableValue::Integer(100));
    let ctx = ctx_with(vars);
    assert!(evaluate("vars.threshold < file.size", &ctx).expect("valid expression"));
}

#[test]
fn precedence_places_comparison_above_logical_and() {
    assert!(eval("file.size > 1 && file.size < 9999"));
}

#[test]
fn string_concatenation_with_plus() {
    let result = evaluate(r#""a" + "b" == "ab""#, &ctx_with(HashMap::new())).expect("valid expression");
    assert!(result);
}

#[test]
fn arithmetic_on_numbers() {
    assert!(eval("1 + 2 * 3 == 7"));
    assert!(eval("(1 + 2) * 3 == 9"));
}

#[test]
fn type_mismatch_on_comparison_is_an_error() {
    let err = evaluate(r#"file.size > "big""#, &ctx_with(HashMap::new())).expect_err("type mismatch must fail");
    assert!(matches!(err, ExpressionError::TypeMismatch(_)));
}

#[test]
fn unknown_function_is_an_error() {
    let err = evaluate("nope(file.name)", &ctx_with(HashMap::new())).expect_err("unknown function must fail");
    assert!(matches!(err, ExpressionError::UnknownFunction(name) if name == "nope"));
}

#[test]
fn wrong_arity_is_an_error() {
    let err = evaluate(r#"lower(file.name, "x")"#, &ctx_with(HashMap::new())).expect_err("wrong arity must fail");
    assert!(matches!(err, ExpressionError::ArityMismatch { name, expected: 1, got: 2 } if name == "lower"));
}

#[test]
fn malformed_expression_is_an_error_not_a_panic() {
    let err = evaluate("file.size >", &ctx_with(HashMap::new())).expect_err("malformed expression must fail");
    assert!(matches!(err, ExpressionError::UnexpectedToken { .. }));
}

#[test]
fn unknown_var_member_is_an_error() {
    let err = evaluate("vars.missing == true", &ctx_with(HashMap::new())).expect_err("unknown variable must fail");
    assert!(matches!(err, ExpressionError::Interpolation(crate::error::InterpolationError::UnknownVariable(_))));
}
