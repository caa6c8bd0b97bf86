// SPDX-License-Identifier: MIT

use super::*;
use crate::context::FileMeta;
use cronplus_core::TaskId;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::PathBuf;

fn ctx_with(variables: HashMap<String, VariableValue>) -> ExecutionContext {
    let file = FileMeta {
        path: PathBuf::from("/in/invoice.pdf"),
        size: 1024,
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

#[test]
fn substitutes_builtin() {
    let ctx = ctx_with(HashMap::new());
    assert_eq!(interpolate("file: {fileName}", &ctx).expect("substitution"), "file: invoice.pdf");
}

#[test]
fn substitutes_task_variable() {
    let mut vars = HashMap::new();
    vars.insert("customer".to_string(), VariableValue::String("acme".to_string()));
    let ctx = ctx_with(vars);
    assert_eq!(interpolate("/out/{customer}/{fileName}", &ctx).expect("substitution"), "/out/acme/invoice.pdf");
}

#[test]
fn outputs_take_precedence_over_variables() {
    let mut vars = HashMap::new();
    vars.insert("status".to_string(), VariableValue::String("pending".to_string()));
    let mut ctx = ctx_with(vars);
    ctx.merge_outputs("check", serde_json::json!({"status": "ok"}));
    assert_eq!(interpolate("{check.status}", &ctx).expect("substitution"), "ok");
}

#[test]
fn dot_path_descends_into_map_variable() {
    let mut inner = BTreeMap::new();
    inner.insert("city".to_string(), VariableValue::String("Springfield".to_string()));
    let mut vars = HashMap::new();
    vars.insert("address".to_string(), VariableValue::Map(inner));
    let ctx = ctx_with(vars);
    assert_eq!(interpolate("{address.city}", &ctx).expect("substitution"), "Springfield");
}

#[test]
fn dot_path_descends_into_json_output() {
    let mut ctx = ctx_with(HashMap::new());
    ctx.merge_outputs("rest", serde_json::json!({"body": {"id": 42}}));
    assert_eq!(interpolate("{rest.body.id}", &ctx).expect("substitution"), "42");
}

#[test]
fn unknown_name_errors() {
    let ctx = ctx_with(HashMap::new());
    let err = interpolate("{doesNotExist}", &ctx).expect_err("unknown name must fail");
    assert!(matches!(err, InterpolationError::UnknownVariable(name) if name == "doesNotExist"));
}

#[test]
fn missing_field_on_map_errors() {
    let mut vars = HashMap::new();
    vars.insert("address".to_string(), VariableValue::Map(BTreeMap::new()));
    let ctx = ctx_with(vars);
    let err = interpolate("{address.city}", &ctx).expect_err("missing field must fail");
    assert!(matches!(err, InterpolationError::NotAnObject { name, field } if name == "address" && field == "city"));
}

#[test]
fn scalar_variable_with_dot_path_errors() {
    let mut vars = HashMap::new();
    vars.insert("customer".to_string(), VariableValue::String("acme".to_string()));
    let ctx = ctx_with(vars);
    let err = interpolate("{customer.name}", &ctx).expect_err("scalar has no fields");
    assert!(matches!(err, InterpolationError::NotAnObject { name, .. } if name == "customer"));
}

#[test]
fn template_with_no_placeholders_is_returned_unchanged() {
    let ctx = ctx_with(HashMap::new());
    assert_eq!(interpolate("static/path/no/placeholders.txt", &ctx).expect("no-op"), "static/path/no/placeholders.txt");
}

#[test]
fn multiple_placeholders_in_one_template() {
    let mut vars = HashMap::new();
    vars.insert("env".to_string(), VariableValue::String("prod".to_string()));
    let ctx = ctx_with(vars);
    assert_eq!(interpolate("{env}/{date}/{fileName}", &ctx).expect("substitution"), "prod/2026-01-02/invoice.pdf");
}

#[test]
fn interpolate_json_walks_nested_string_leaves() {
    let ctx = ctx_with(HashMap::new());
    let payload = serde_json::json!({
        "destinationDirectory": "/out/{date}",
        "headers": {"X-File": "{fileName}"},
        "retries": 3,
        "tags": ["{fileExtension}", "static"],
    });
    let resolved = interpolate_json(&payload, &ctx).expect("payload interpolates");
    assert_eq!(resolved["destinationDirectory"], "/out/2026-01-02");
    assert_eq!(resolved["headers"]["X-File"], "invoice.pdf");
    assert_eq!(resolved["retries"], 3);
    assert_eq!(resolved["tags"][0], "pdf");
}

#[test]
fn interpolate_json_propagates_unknown_variable_error() {
    let ctx = ctx_with(HashMap::new());
    let payload = serde_json::json!({"url": "{doesNotExist}"});
    let err = interpolate_json(&payload, &ctx).expect_err("unknown name must fail");
    assert!(matches!(err, InterpolationError::UnknownVariable(_)));
}
