use std::path::Path;

use corrector_core::{parse_mapping_str, transform_with_report, DocumentFormat};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::cmd::config::load_payload;
use crate::commands::MappingKind;
use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::OutputArgs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldErrorOut {
    target: String,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransformResult {
    result: JsonValue,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    field_errors: Vec<FieldErrorOut>,
}

pub fn transform_cmd(
    path: &Path,
    payload: Option<&Path>,
    kind: MappingKind,
    output: OutputArgs,
) -> i32 {
    let content = match std::fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to read {}: {e}", path.display()),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let mapping = match parse_mapping_str(&content, DocumentFormat::Auto) {
        Ok(p) => p.mapping,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::VALIDATION_FAILED;
        }
    };
    let input = match load_payload(payload) {
        Ok(v) => v,
        Err(msg) => {
            print_error(output.format, output.quiet, &msg);
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let spec = match kind {
        MappingKind::Request => mapping.request_mapping.as_ref(),
        MappingKind::Response => mapping.response_mapping.as_ref(),
        MappingKind::Error => mapping.error_mapping.as_ref(),
    };

    // An absent mapping is a passthrough at run time too.
    let result = match spec {
        Some(spec) => {
            let out = transform_with_report(&input, spec, &mapping.transforms);
            TransformResult {
                result: out.value,
                field_errors: out
                    .field_errors
                    .into_iter()
                    .map(|e| FieldErrorOut {
                        target: e.target,
                        message: e.message,
                    })
                    .collect(),
            }
        }
        None => TransformResult {
            result: input,
            field_errors: Vec::new(),
        },
    };

    print_result(output.format, output.quiet, &result);
    exit_codes::SUCCESS
}
