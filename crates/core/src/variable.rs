// SPDX-License-Identifier: MIT

//! Typed variables: name, type, value, scope.

use serde::{Deserialize, Serialize};

/// Scope a variable is declared at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableScope {
    Task,
    Pipeline,
    Step,
}

/// A typed value. Decimal is string-backed to avoid float drift across
/// serialization round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableValue {
    String(String),
    Integer(i64),
    Decimal(String),
    Boolean(bool),
    Datetime(chrono::DateTime<chrono::Utc>),
    Json(serde_json::Value),
    List(Vec<VariableValue>),
    Map(std::collections::BTreeMap<String, VariableValue>),
}

impl VariableValue {
    /// Canonical string formatting used by the interpolator:
    /// ISO-8601 for datetimes, decimal for numbers, lowercase `true`/`false`.
    pub fn to_canonical_string(&self) -> String {
        match self {
            VariableValue::String(s) => s.clone(),
            VariableValue::Integer(n) => n.to_string(),
            VariableValue::Decimal(d) => d.clone(),
            VariableValue::Boolean(b) => b.to_string(),
            VariableValue::Datetime(dt) => dt.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
            VariableValue::Json(v) => v.to_string(),
            VariableValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_canonical_string()).collect();
                format!("[{}]", parts.join(","))
            }
            VariableValue::Map(map) => serde_json::to_string(map).unwrap_or_default(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            VariableValue::Integer(n) => Some(*n as f64),
            VariableValue::Decimal(d) => d.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VariableValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VariableValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A task-scoped variable declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: VariableValue,
    #[serde(default)]
    pub default_value: Option<VariableValue>,
    #[serde(default)]
    pub is_constant: bool,
    #[serde(default = "Variable::default_scope")]
    pub scope: VariableScope,
}

impl Variable {
    fn default_scope() -> VariableScope {
        VariableScope::Task
    }

    /// The effective value: `value`, falling back to `default_value`.
    pub fn effective_value(&self) -> &VariableValue {
        match (&self.value, &self.default_value) {
            (VariableValue::String(s), Some(default)) if s.is_empty() => default,
            _ => &self.value,
        }
    }
}

#[cfg(test)]
#[path = "variable_tests.rs"]
mod tests;
