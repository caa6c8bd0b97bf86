// SPDX-License-Identifier: MIT

//! `{name}` substitution over an [`ExecutionContext`].
//!
//! Precedence, highest first: step outputs from earlier steps in this
//! execution, then task variables, then built-ins. Dot-separated identifiers
//! select into object/map values. Unknown names fail the whole substitution
//! rather than passing the placeholder through unchanged.

use crate::context::ExecutionContext;
use crate::error::InterpolationError;
use cronplus_core::VariableValue;
use regex::Regex;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_.]*)\}").unwrap_or_else(|_| unreachable!("placeholder pattern is a valid regex"))
    })
}

/// Substitute every `{name}` placeholder in `template`.
pub fn interpolate(template: &str, ctx: &ExecutionContext) -> Result<String, InterpolationError> {
    let mut result = String::with_capacity(template.len());
    let mut last_end = 0;
    for caps in placeholder_pattern().captures_iter(template) {
        let whole = caps.get(0).unwrap_or_else(|| unreachable!("capture group 0 is always present"));
        let name = &caps[1];
        result.push_str(&template[last_end..whole.start()]);
        result.push_str(&resolve(name, ctx)?);
        last_end = whole.end();
    }
    result.push_str(&template[last_end..]);
    Ok(result)
}

fn resolve(name: &str, ctx: &ExecutionContext) -> Result<String, InterpolationError> {
    let (root, rest) = match name.split_once('.') {
        Some((root, rest)) => (root, Some(rest)),
        None => (name, None),
    };

    if let Some(json) = ctx.outputs.get(root) {
        return resolve_json_path(root, json, rest);
    }

    if let Some(variable) = ctx.variables.get(root) {
        return resolve_variable_path(root, variable, rest);
    }

    if rest.is_none() {
        if let Some(value) = ctx.builtin(root) {
            return Ok(value);
        }
    }

    Err(InterpolationError::UnknownVariable(name.to_string()))
}

fn resolve_json_path(root: &str, value: &serde_json::Value, rest: Option<&str>) -> Result<String, InterpolationError> {
    let mut current = value;
    if let Some(path) = rest {
        for segment in path.split('.') {
            current = current
                .get(segment)
                .ok_or_else(|| InterpolationError::NotAnObject { name: root.to_string(), field: segment.to_string() })?;
        }
    }
    Ok(json_to_canonical_string(current))
}

fn json_to_canonical_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn resolve_variable_path(root: &str, variable: &VariableValue, rest: Option<&str>) -> Result<String, InterpolationError> {
    let Some(path) = rest else {
        return Ok(variable.to_canonical_string());
    };

    let VariableValue::Map(map) = variable else {
        return Err(InterpolationError::NotAnObject { name: root.to_string(), field: path.to_string() });
    };

    let mut segments = path.split('.');
    let first = segments.next().unwrap_or_else(|| unreachable!("str::split always yields at least one segment"));
    let mut current = map
        .get(first)
        .ok_or_else(|| InterpolationError::NotAnObject { name: root.to_string(), field: first.to_string() })?;

    for segment in segments {
        let VariableValue::Map(inner) = current else {
            return Err(InterpolationError::NotAnObject { name: root.to_string(), field: segment.to_string() });
        };
        current = inner
            .get(segment)
            .ok_or_else(|| InterpolationError::NotAnObject { name: root.to_string(), field: segment.to_string() })?;
    }

    Ok(current.to_canonical_string())
}

/// Interpolate every string leaf of a step's JSON parameter payload. Object keys and non-string scalars pass through unchanged.
pub fn interpolate_json(value: &serde_json::Value, ctx: &ExecutionContext) -> Result<serde_json::Value, InterpolationError> {
    match value {
        serde_json::Value::String(s) => Ok(serde_json::Value::String(interpolate(s, ctx)?)),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(interpolate_json(item, ctx)?);
            }
            Ok(serde_json::Value::Array(out))
        }
        serde_json::Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, v) in map {
                out.insert(key.clone(), interpolate_json(v, ctx)?);
            }
            Ok(serde_json::Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
#[path = "interpolate_tests.rs"]
mod tests;
