use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use corrector_core::{AuthConfig, AuthType};

pub const REDACTED: &str = "<redacted>";

const ALWAYS_SENSITIVE: [&str; 5] = [
    "authorization",
    "proxy-authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
];

/// Header names that carry credentials for this auth config.
pub fn secret_header_names(auth: Option<&AuthConfig>) -> Vec<String> {
    let Some(auth) = auth else {
        return Vec::new();
    };
    match auth.auth_type {
        AuthType::ApiKey => auth.str_field("keyName").map(str::to_string).into_iter().collect(),
        AuthType::BearerToken => auth.str_field("headerName").map(str::to_string).into_iter().collect(),
        AuthType::Custom => match auth.field("headers") {
            Some(JsonValue::Object(m)) => m.keys().cloned().collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

pub fn redact_headers(
    headers: &BTreeMap<String, String>,
    secret_derived_header_names: &[String],
) -> BTreeMap<String, String> {
    let mut out = headers.clone();
    for name in ALWAYS_SENSITIVE {
        replace_case_insensitive(&mut out, name);
    }
    for name in secret_derived_header_names {
        replace_case_insensitive(&mut out, name);
    }
    out
}

fn replace_case_insensitive(map: &mut BTreeMap<String, String>, header: &str) {
    for (k, v) in map.iter_mut() {
        if k.eq_ignore_ascii_case(header) {
            *v = REDACTED.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_standard_and_derived_headers() {
        let mut h = BTreeMap::new();
        h.insert("Authorization".to_string(), "Bearer abc".to_string());
        h.insert("X-Tenant-Key".to_string(), "k".to_string());
        h.insert("Accept".to_string(), "application/json".to_string());

        let auth = AuthConfig::new(AuthType::ApiKey)
            .with("keyName", "x-tenant-key")
            .with("keyValue", "k");
        let out = redact_headers(&h, &secret_header_names(Some(&auth)));
        assert_eq!(out["Authorization"], REDACTED);
        assert_eq!(out["X-Tenant-Key"], REDACTED);
        assert_eq!(out["Accept"], "application/json");
    }

    #[test]
    fn custom_header_names_are_secret() {
        let auth = AuthConfig::new(AuthType::Custom).with("headers", json!({"X-Sig": "s"}));
        assert_eq!(secret_header_names(Some(&auth)), vec!["X-Sig".to_string()]);
        assert!(secret_header_names(None).is_empty());
    }
}
