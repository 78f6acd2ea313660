use crate::path::PathExpr;
use crate::transform::{parse_condition, sandbox, Builtin};
use crate::types::{FieldRule, TransformSpec};
use crate::validate::validator::Validator;

pub(crate) fn validate_transform_spec(v: &mut Validator, path: &str, spec: &TransformSpec) {
    match spec {
        TransformSpec::Direct => {}
        TransformSpec::Object(obj) => {
            validate_rules(v, &format!("{path}.mappings"), &obj.mappings);
            validate_default_targets(v, path, obj.defaults.keys());
        }
        TransformSpec::Array(arr) => {
            match arr.root.as_deref().map(str::trim) {
                None | Some("") => v.push(format!("{path}.root"), "is required for ARRAY"),
                Some(root) => validate_readable(v, &format!("{path}.root"), root),
            }
            if let Some(wrapper) = &arr.output_wrapper {
                validate_writable(v, &format!("{path}.outputWrapper"), wrapper);
            }
            validate_rules(v, &format!("{path}.mappings"), &arr.mappings);
            validate_default_targets(v, path, arr.defaults.keys());
        }
        TransformSpec::Custom(custom) => {
            if custom.script.trim().is_empty() {
                v.push(format!("{path}.script"), "must not be empty");
            } else if let Err(e) = sandbox().check(&custom.script) {
                v.push(format!("{path}.script"), e.to_string());
            }
        }
    }
}

fn validate_rules(v: &mut Validator, path: &str, rules: &[FieldRule]) {
    for (idx, rule) in rules.iter().enumerate() {
        let rpath = format!("{path}[{idx}]");

        if rule.target.trim().is_empty() {
            v.push(format!("{rpath}.target"), "must not be empty");
        } else {
            validate_writable(v, &format!("{rpath}.target"), &rule.target);
        }

        match &rule.source {
            Some(src) => validate_readable(v, &format!("{rpath}.source"), src),
            None => {
                let has_literal = rule.condition.is_some() && rule.value_if_true.is_some();
                if !has_literal && rule.default.is_none() {
                    v.push(
                        format!("{rpath}.source"),
                        "is required unless a condition supplies valueIfTrue",
                    );
                }
            }
        }

        if let Some(cond) = &rule.condition {
            if let Err(e) = parse_condition(cond) {
                v.push(format!("{rpath}.condition"), e.to_string());
            }
        }

        if let Some(name) = &rule.transform {
            if Builtin::from_name(name).is_none() && !v.has_custom_transform(name) {
                v.push(
                    format!("{rpath}.transform"),
                    format!("'{name}' is neither a built-in nor a declared custom transform"),
                );
            }
        }
    }
}

fn validate_default_targets<'a>(
    v: &mut Validator,
    path: &str,
    targets: impl Iterator<Item = &'a String>,
) {
    for target in targets {
        validate_writable(v, &format!("{path}.defaults.{target}"), target);
    }
}

fn validate_readable(v: &mut Validator, path: &str, expr: &str) {
    if let Err(e) = PathExpr::parse(expr) {
        v.push(path, e.to_string());
    }
}

fn validate_writable(v: &mut Validator, path: &str, expr: &str) {
    match PathExpr::parse(expr) {
        Ok(p) if p.segments().is_none() => {
            v.push(path, "must be a plain path (wildcards and filters are read-only)")
        }
        Ok(_) => {}
        Err(e) => v.push(path, e.to_string()),
    }
}
