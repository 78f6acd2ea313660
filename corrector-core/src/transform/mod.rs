//! The transformation engine: interprets a [`TransformSpec`] against a source
//! tree.
//!
//! Nothing in here fails outward. Field problems are collected as
//! [`FieldError`]s and the offending field is omitted; a failing CUSTOM
//! script becomes `{"error": "<message>"}`.

mod builtin;
mod condition;
pub mod script;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde_json::{json, Map, Value as JsonValue};

use crate::path;
use crate::types::{ArraySpec, FieldRule, ObjectSpec, TransformSpec};

pub use builtin::Builtin;
pub use condition::{parse_condition, ConditionError, ParsedCondition};
pub use script::{ScriptError, ScriptLimits, ScriptSandbox};

static SANDBOX: LazyLock<ScriptSandbox> = LazyLock::new(ScriptSandbox::default);

/// Shared sandbox used by [`transform`]; exposed for script validation.
pub fn sandbox() -> &'static ScriptSandbox {
    &SANDBOX
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub target: String,
    pub message: String,
}

impl FieldError {
    fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub value: JsonValue,
    pub field_errors: Vec<FieldError>,
}

pub fn transform(
    source: &JsonValue,
    spec: &TransformSpec,
    custom_transforms: &BTreeMap<String, String>,
) -> JsonValue {
    transform_with_report(source, spec, custom_transforms).value
}

pub fn transform_with_report(
    source: &JsonValue,
    spec: &TransformSpec,
    custom_transforms: &BTreeMap<String, String>,
) -> TransformOutput {
    let mut errors = Vec::new();
    let value = match spec {
        TransformSpec::Direct => source.clone(),
        TransformSpec::Object(obj) => apply_object(source, obj, custom_transforms, &mut errors),
        TransformSpec::Array(arr) => apply_array(source, arr, custom_transforms, &mut errors),
        TransformSpec::Custom(custom) => match SANDBOX.eval(&custom.script, source) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "custom transform failed");
                json!({ "error": e.to_string() })
            }
        },
    };

    for e in &errors {
        tracing::warn!(field = %e.target, error = %e.message, "field transform error");
    }
    TransformOutput {
        value,
        field_errors: errors,
    }
}

fn apply_object(
    source: &JsonValue,
    spec: &ObjectSpec,
    custom: &BTreeMap<String, String>,
    errors: &mut Vec<FieldError>,
) -> JsonValue {
    apply_rules(source, &spec.mappings, &spec.defaults, custom, errors, "")
}

fn apply_array(
    source: &JsonValue,
    spec: &ArraySpec,
    custom: &BTreeMap<String, String>,
    errors: &mut Vec<FieldError>,
) -> JsonValue {
    let items = match spec.root.as_deref() {
        None => {
            errors.push(FieldError::new("$", "ARRAY transform has no root path"));
            Vec::new()
        }
        Some(root) => match path::get(source, root) {
            Some(JsonValue::Array(items)) => items,
            other => {
                tracing::warn!(
                    root = %root,
                    found = other.as_ref().map(kind_of).unwrap_or("undefined"),
                    "ARRAY transform root is not an array"
                );
                Vec::new()
            }
        },
    };

    let out: Vec<JsonValue> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            apply_rules(
                item,
                &spec.mappings,
                &spec.defaults,
                custom,
                errors,
                &format!("[{i}]"),
            )
        })
        .collect();

    match spec.output_wrapper.as_deref() {
        Some(wrapper) if !wrapper.trim().is_empty() => {
            let mut wrapped = JsonValue::Object(Map::new());
            if let Err(e) = path::set(&mut wrapped, wrapper, JsonValue::Array(out.clone())) {
                errors.push(FieldError::new(wrapper, e.to_string()));
                return JsonValue::Array(out);
            }
            wrapped
        }
        _ => JsonValue::Array(out),
    }
}

fn apply_rules(
    source: &JsonValue,
    rules: &[FieldRule],
    defaults: &BTreeMap<String, JsonValue>,
    custom: &BTreeMap<String, String>,
    errors: &mut Vec<FieldError>,
    prefix: &str,
) -> JsonValue {
    let mut out = JsonValue::Object(Map::new());

    for rule in rules {
        let label = format!("{prefix}{}", rule.target);
        let resolved = match &rule.condition {
            Some(cond) => match parse_condition(cond) {
                Ok(parsed) if parsed.evaluate(source) => rule
                    .value_if_true
                    .clone()
                    .or_else(|| resolve_source(source, rule)),
                Ok(_) => match &rule.value_if_false {
                    Some(v) => Some(v.clone()),
                    None => continue,
                },
                Err(e) => {
                    errors.push(FieldError::new(label, format!("invalid condition: {e}")));
                    continue;
                }
            },
            None => resolve_source(source, rule),
        };

        let Some(value) = resolved.or_else(|| rule.default.clone()) else {
            if rule.required {
                errors.push(FieldError::new(label, "required value is missing"));
            }
            continue;
        };

        let value = match rule.transform.as_deref() {
            Some(name) => match apply_named(name, value, custom) {
                Ok(v) => v,
                Err(msg) => {
                    errors.push(FieldError::new(label, msg));
                    continue;
                }
            },
            None => value,
        };

        if let Err(e) = path::set(&mut out, &rule.target, value) {
            errors.push(FieldError::new(label, e.to_string()));
        }
    }

    for (target, literal) in defaults {
        if path::get_ref(&out, target).is_none() {
            if let Err(e) = path::set(&mut out, target, literal.clone()) {
                errors.push(FieldError::new(format!("{prefix}{target}"), e.to_string()));
            }
        }
    }

    out
}

fn resolve_source(source: &JsonValue, rule: &FieldRule) -> Option<JsonValue> {
    rule.source.as_deref().and_then(|p| path::get(source, p))
}

fn apply_named(
    name: &str,
    value: JsonValue,
    custom: &BTreeMap<String, String>,
) -> Result<JsonValue, String> {
    if let Some(builtin) = Builtin::from_name(name) {
        return builtin.apply(value);
    }
    match custom.get(name) {
        Some(script) => SANDBOX
            .eval(script, &value)
            .map_err(|e| format!("transform '{name}': {e}")),
        None => Err(format!("unknown transform '{name}'")),
    }
}

fn kind_of(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Condition, CustomSpec};
    use serde_json::json;

    fn object(rules: Vec<FieldRule>) -> TransformSpec {
        TransformSpec::Object(ObjectSpec {
            mappings: rules,
            defaults: BTreeMap::new(),
        })
    }

    fn none() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn direct_returns_source() {
        let src = json!({"a": [1, 2]});
        assert_eq!(transform(&src, &TransformSpec::Direct, &none()), src);
    }

    #[test]
    fn object_copies_and_renames() {
        let spec = object(vec![FieldRule::new("$.inputName", "$.fullName")]);
        let out = transform(&json!({"inputName": "Ada", "extra": 1}), &spec, &none());
        assert_eq!(out, json!({"fullName": "Ada"}));
    }

    #[test]
    fn required_missing_is_omitted_and_reported() {
        let spec = object(vec![
            FieldRule::new("$.age", "$.meta.age").required(),
            FieldRule::new("$.name", "$.name"),
        ]);
        let out = transform_with_report(&json!({"name": "x"}), &spec, &none());
        assert_eq!(out.value, json!({"name": "x"}));
        assert_eq!(out.field_errors.len(), 1);
        assert_eq!(out.field_errors[0].target, "$.meta.age");
    }

    #[test]
    fn default_fills_missing_source() {
        let spec = object(vec![
            FieldRule::new("$.country", "$.country").with_default(json!("NL"))
        ]);
        assert_eq!(transform(&json!({}), &spec, &none()), json!({"country": "NL"}));
    }

    #[test]
    fn condition_selects_branch_values() {
        let mut rule = FieldRule::new("$.status", "$.active")
            .with_condition(Condition::Expr("$.status == 'on'".into()));
        rule.value_if_true = Some(json!(true));
        rule.value_if_false = Some(json!(false));
        let spec = object(vec![rule]);

        assert_eq!(
            transform(&json!({"status": "on"}), &spec, &none()),
            json!({"active": true})
        );
        assert_eq!(
            transform(&json!({"status": "off"}), &spec, &none()),
            json!({"active": false})
        );
    }

    #[test]
    fn false_condition_without_fallback_skips_rule() {
        let spec = object(vec![FieldRule::new("$.vip", "$.vip")
            .with_condition(Condition::Expr("$.vip".into()))]);
        assert_eq!(transform(&json!({"vip": false}), &spec, &none()), json!({}));
    }

    #[test]
    fn builtin_transform_applies() {
        let spec = object(vec![
            FieldRule::new("$.price", "$.price").with_transform("round2"),
            FieldRule::new("$.code", "$.code").with_transform("UPPER_CASE"),
        ]);
        let out = transform(&json!({"price": 1.005_1, "code": "ab"}), &spec, &none());
        assert_eq!(out, json!({"price": 1.01, "code": "AB"}));
    }

    #[test]
    fn failing_builtin_omits_field() {
        let spec = object(vec![FieldRule::new("$.n", "$.n").with_transform("toNumber")]);
        let out = transform_with_report(&json!({"n": "abc"}), &spec, &none());
        assert_eq!(out.value, json!({}));
        assert_eq!(out.field_errors.len(), 1);
    }

    #[test]
    fn named_custom_transform_runs_script() {
        let mut custom = BTreeMap::new();
        custom.insert("double".to_string(), "input * 2".to_string());
        let spec = object(vec![FieldRule::new("$.n", "$.n").with_transform("double")]);
        assert_eq!(transform(&json!({"n": 21}), &spec, &custom), json!({"n": 42}));
    }

    #[test]
    fn unknown_transform_is_field_error() {
        let spec = object(vec![FieldRule::new("$.n", "$.n").with_transform("nope")]);
        let out = transform_with_report(&json!({"n": 1}), &spec, &none());
        assert_eq!(out.value, json!({}));
        assert!(out.field_errors[0].message.contains("nope"));
    }

    #[test]
    fn spec_defaults_fill_after_rules() {
        let mut defaults = BTreeMap::new();
        defaults.insert("$.source".to_string(), json!("corrector"));
        defaults.insert("$.name".to_string(), json!("ignored"));
        let spec = TransformSpec::Object(ObjectSpec {
            mappings: vec![FieldRule::new("$.n", "$.name")],
            defaults,
        });
        assert_eq!(
            transform(&json!({"n": "kept"}), &spec, &none()),
            json!({"name": "kept", "source": "corrector"})
        );
    }

    #[test]
    fn array_maps_each_element() {
        let spec = TransformSpec::array("$.items", vec![FieldRule::new("$.id", "$.value")]);
        let out = transform(&json!({"items": [{"id": 1}, {"id": 2}]}), &spec, &none());
        assert_eq!(out, json!([{"value": 1}, {"value": 2}]));
    }

    #[test]
    fn array_with_non_array_root_is_empty() {
        let spec = TransformSpec::array("$.items", vec![FieldRule::new("$.id", "$.value")]);
        assert_eq!(transform(&json!({"items": 5}), &spec, &none()), json!([]));
        assert_eq!(transform(&json!({}), &spec, &none()), json!([]));
    }

    #[test]
    fn array_output_wrapper() {
        let spec = TransformSpec::Array(ArraySpec {
            root: Some("$.rows".into()),
            mappings: vec![FieldRule::new("$.a", "$.b")],
            output_wrapper: Some("$.data.list".into()),
            defaults: BTreeMap::new(),
        });
        let out = transform(&json!({"rows": [{"a": 1}]}), &spec, &none());
        assert_eq!(out, json!({"data": {"list": [{"b": 1}]}}));
    }

    #[test]
    fn custom_script_result_is_returned() {
        let spec = TransformSpec::custom("#{ total: input.a + input.b }");
        assert_eq!(
            transform(&json!({"a": 2, "b": 3}), &spec, &none()),
            json!({"total": 5})
        );
    }

    #[test]
    fn failing_custom_script_yields_error_object() {
        let spec = TransformSpec::Custom(CustomSpec {
            script: "input.missing.deeper".into(),
        });
        let out = transform(&json!({"a": 1}), &spec, &none());
        assert!(out.get("error").and_then(JsonValue::as_str).is_some());
    }

    #[test]
    fn transform_is_deterministic() {
        let spec = object(vec![
            FieldRule::new("$.a", "$.x.y"),
            FieldRule::new("$.b", "$.x.z").with_transform("toString"),
        ]);
        let src = json!({"a": 1, "b": 2});
        let first = transform(&src, &spec, &none());
        for _ in 0..5 {
            assert_eq!(transform(&src, &spec, &none()), first);
        }
    }
}
