//! Field-level validation checks.
//!
//! `validate_field` applies one rule to one value and returns zero or more
//! diagnostics. There is an explicit matcher per rule variant. A type
//! mismatch produces a single error and suppresses the variant's remaining
//! checks for that field, so a wrongly-shaped value does not cascade into
//! nonsensical pattern/enum/size findings. Checks that do run are evaluated
//! independently; a single field may yield several diagnostics.
//!
//! Severity is fixed per check kind: type, pattern, enum and numeric-bound
//! violations are errors (the document is unusable downstream), length and
//! item-count overruns are warnings (oversized but still valid).

use crate::models::schema::{anchored_pattern, RuleSpec};
use crate::models::Diagnostic;
use regex::Regex;
use serde_yaml::Value;

/// Runtime shape name of a YAML value, for error messages.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "array",
        Value::Mapping(_) => "object",
        Value::Tagged(_) => "tagged value",
    }
}

fn type_mismatch(path: &str, rule: &RuleSpec, value: &Value) -> Diagnostic {
    let expected = rule.expected_type();
    let article = if expected.starts_with(['a', 'e', 'i', 'o', 'u']) {
        "an"
    } else {
        "a"
    };
    Diagnostic::error(
        path,
        format!(
            "Field '{path}' must be {article} {expected}, got {}",
            value_type_name(value)
        ),
    )
}

/// Validate a single field value against its rule.
///
/// Never fails on malformed input; structural problems become error
/// diagnostics.
pub fn validate_field(path: &str, value: &Value, rule: &RuleSpec) -> Vec<Diagnostic> {
    match rule {
        RuleSpec::String {
            pattern,
            allowed,
            max_length,
        } => check_string(path, value, rule, pattern, allowed, max_length),
        RuleSpec::Integer { min, max } => check_integer(path, value, rule, *min, *max),
        RuleSpec::Boolean => check_boolean(path, value, rule),
        RuleSpec::Array { max_items } => check_array(path, value, rule, *max_items),
        RuleSpec::Object { .. } => check_object(path, value, rule),
    }
}

fn check_string(
    path: &str,
    value: &Value,
    rule: &RuleSpec,
    pattern: &Option<String>,
    allowed: &Option<Vec<String>>,
    max_length: &Option<usize>,
) -> Vec<Diagnostic> {
    let Some(text) = value.as_str() else {
        return vec![type_mismatch(path, rule, value)];
    };

    let mut out = Vec::new();
    if let Some(pattern) = pattern {
        // Compilation was verified at schema load; an Err here cannot occur.
        if let Ok(re) = Regex::new(&anchored_pattern(pattern)) {
            if !re.is_match(text) {
                out.push(Diagnostic::error(
                    path,
                    format!(
                        "Field '{path}' value '{text}' does not match required pattern '{pattern}'"
                    ),
                ));
            }
        }
    }
    if let Some(max) = max_length {
        let len = text.chars().count();
        if len > *max {
            out.push(Diagnostic::warning(
                path,
                format!("Field '{path}' has {len} characters, recommended maximum: {max}"),
            ));
        }
    }
    if let Some(allowed) = allowed {
        if !allowed.iter().any(|a| a == text) {
            out.push(Diagnostic::error(
                path,
                format!(
                    "Field '{path}' value '{text}' not in allowed values: [{}]",
                    allowed.join(", ")
                ),
            ));
        }
    }
    out
}

fn check_integer(
    path: &str,
    value: &Value,
    rule: &RuleSpec,
    min: Option<i64>,
    max: Option<i64>,
) -> Vec<Diagnostic> {
    let Some(n) = value.as_i64() else {
        return vec![type_mismatch(path, rule, value)];
    };

    let mut out = Vec::new();
    if let Some(min) = min {
        if n < min {
            out.push(Diagnostic::error(
                path,
                format!("Field '{path}' value {n} is below the minimum of {min}"),
            ));
        }
    }
    if let Some(max) = max {
        if n > max {
            out.push(Diagnostic::error(
                path,
                format!("Field '{path}' value {n} is above the maximum of {max}"),
            ));
        }
    }
    out
}

fn check_boolean(path: &str, value: &Value, rule: &RuleSpec) -> Vec<Diagnostic> {
    if value.as_bool().is_some() {
        Vec::new()
    } else {
        vec![type_mismatch(path, rule, value)]
    }
}

fn check_array(
    path: &str,
    value: &Value,
    rule: &RuleSpec,
    max_items: Option<usize>,
) -> Vec<Diagnostic> {
    let Some(items) = value.as_sequence() else {
        return vec![type_mismatch(path, rule, value)];
    };

    let mut out = Vec::new();
    if let Some(max) = max_items {
        if items.len() > max {
            out.push(Diagnostic::warning(
                path,
                format!(
                    "Field '{path}' has {} items, recommended maximum: {max}",
                    items.len()
                ),
            ));
        }
    }
    out
}

fn check_object(path: &str, value: &Value, rule: &RuleSpec) -> Vec<Diagnostic> {
    // Object rules only shape-check here; descent into declared properties
    // is the section walk's job.
    if value.is_mapping() {
        Vec::new()
    } else {
        vec![type_mismatch(path, rule, value)]
    }
}
