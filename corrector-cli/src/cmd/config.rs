use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde_json::Value as JsonValue;

use corrector_core::{path, AuthConfig};
use corrector_exec::{AuthOverridePolicy, ExecutorConfig};

use crate::EngineArgs;

/// Read a JSON or YAML document.
pub fn load_document(path: &Path) -> Result<JsonValue, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    if let Ok(v) = serde_json::from_str(&content) {
        return Ok(v);
    }
    serde_yaml::from_str(&content)
        .map_err(|_| format!("{} is neither valid JSON nor YAML", path.display()))
}

pub fn load_payload(path: Option<&Path>) -> Result<JsonValue, String> {
    match path {
        Some(p) => load_document(p),
        None => Ok(serde_json::json!({})),
    }
}

/// Apply `--set path=value` pairs. Values that parse as JSON keep their
/// type; anything else is a string.
pub fn merge_set_fields(payload: &mut JsonValue, set_fields: &[String]) -> Result<(), String> {
    for s in set_fields {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| format!("--set expects KEY=VALUE, got {s:?}"))?;
        let value = serde_json::from_str(v).unwrap_or_else(|_| JsonValue::String(v.to_string()));
        path::set(payload, k, value).map_err(|e| format!("--set {k}: {e}"))?;
    }
    Ok(())
}

pub fn parse_pairs(flag: &str, pairs: &[String]) -> Result<BTreeMap<String, String>, String> {
    let mut out = BTreeMap::new();
    for s in pairs {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| format!("--{flag} expects KEY=VALUE, got {s:?}"))?;
        if k.trim().is_empty() {
            return Err(format!("--{flag} has an empty name in {s:?}"));
        }
        out.insert(k.trim().to_string(), v.to_string());
    }
    Ok(out)
}

/// Accepts either a bare auth config or one wrapped as `{authConfig: ...}`.
pub fn load_auth_override(path: Option<&Path>) -> Result<Option<AuthConfig>, String> {
    let Some(path) = path else {
        return Ok(None);
    };
    let mut doc = load_document(path)?;
    if let Some(inner) = doc.get_mut("authConfig") {
        doc = inner.take();
    }
    serde_json::from_value(doc)
        .map(Some)
        .map_err(|e| format!("invalid auth override in {}: {e}", path.display()))
}

pub fn build_executor_config(engine: &EngineArgs) -> ExecutorConfig {
    ExecutorConfig {
        attempt_timeout: Duration::from_millis(engine.timeout),
        max_response_bytes: engine.max_response_bytes,
        auth_override_policy: if engine.strict_auth_override {
            AuthOverridePolicy::Strict
        } else {
            AuthOverridePolicy::AllowOverNone
        },
        ..Default::default()
    }
}
