use std::collections::HashSet;

use crate::transform::sandbox;
use crate::types::MappingConfig;
use crate::validate::rules::target::validate_target_api;
use crate::validate::rules::transform::validate_transform_spec;
use crate::validate::validator::Validator;

pub(crate) fn validate_mapping(v: &mut Validator, m: &MappingConfig) {
    if m.id.trim().is_empty() {
        v.push("id", "must not be empty");
    }

    match &m.target_api {
        Some(api) => validate_target_api(v, "targetApi", api),
        None if m.steps.is_empty() => v.push("targetApi", "is required"),
        None => {}
    }

    for (name, script) in &m.transforms {
        if name.trim().is_empty() {
            v.push("transforms", "transform names must not be empty");
        }
        if let Err(e) = sandbox().check(script) {
            v.push(format!("transforms.{name}"), e.to_string());
        }
    }

    if let Some(spec) = &m.request_mapping {
        validate_transform_spec(v, "requestMapping", spec);
    }
    if let Some(spec) = &m.response_mapping {
        validate_transform_spec(v, "responseMapping", spec);
    }
    if let Some(spec) = &m.error_mapping {
        validate_transform_spec(v, "errorMapping", spec);
    }

    validate_schema_shape(v, "requestSchema", m.request_schema.as_ref());
    validate_schema_shape(v, "responseSchema", m.response_schema.as_ref());

    let mut seen = HashSet::<&str>::new();
    for (idx, step) in m.steps.iter().enumerate() {
        let spath = format!("steps[{idx}]");
        if step.name.trim().is_empty() {
            v.push(format!("{spath}.name"), "must not be empty");
        } else if !seen.insert(step.name.as_str()) {
            v.push(format!("{spath}.name"), "duplicate step name");
        }

        validate_target_api(v, &format!("{spath}.targetApi"), &step.target_api);

        if let Some(spec) = &step.request_mapping {
            validate_transform_spec(v, &format!("{spath}.requestMapping"), spec);
        }
        if let Some(spec) = &step.response_mapping {
            validate_transform_spec(v, &format!("{spath}.responseMapping"), spec);
        }
        validate_schema_shape(v, &format!("{spath}.requestSchema"), step.request_schema.as_ref());
        validate_schema_shape(v, &format!("{spath}.responseSchema"), step.response_schema.as_ref());

        if let Some(key) = &step.save_result_to_context_as {
            if key.trim().is_empty() {
                v.push(format!("{spath}.saveResultToContextAs"), "must not be empty");
            }
        }
    }
}

// Full schema compilation happens in the executor; here we only reject
// documents that cannot be a JSON Schema at all.
fn validate_schema_shape(v: &mut Validator, path: &str, schema: Option<&serde_json::Value>) {
    match schema {
        None | Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Bool(_)) => {}
        Some(_) => v.push(path, "must be a JSON Schema object or boolean"),
    }
}
