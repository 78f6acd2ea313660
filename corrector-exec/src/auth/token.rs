//! Token extraction from dynamic login responses.
//!
//! The lookup order is a versioned contract: changing it changes which token
//! existing mappings pick up, so any change must bump
//! [`TOKEN_EXTRACTION_VERSION`].

use std::time::Duration;

use serde_json::Value as JsonValue;

use corrector_core::path;

use crate::auth::{AuthContext, AuthError};
use crate::http::HttpRequestParts;

pub const TOKEN_EXTRACTION_VERSION: u32 = 1;

/// Longer advertised lifetimes are cut down to this.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Tried after an explicit `tokenPath` and a bare JSON-string body.
pub const TOKEN_FIELD_ORDER: [&str; 8] = [
    "access_token",
    "accessToken",
    "token",
    "id_token",
    "data.access_token",
    "data.accessToken",
    "data.token",
    "result.token",
];

pub fn extract_token(body: &JsonValue, token_path: Option<&str>) -> Option<String> {
    if let Some(p) = token_path {
        if let Some(t) = non_empty(path::get(body, p).as_ref()) {
            return Some(t);
        }
    }
    if let Some(t) = non_empty(Some(body)) {
        return Some(t);
    }
    TOKEN_FIELD_ORDER
        .iter()
        .find_map(|p| non_empty(path::get_ref(body, p)))
}

/// `expires_in` / `expiresIn`, as a number or numeric string of seconds.
pub fn extract_lifetime(body: &JsonValue) -> Option<Duration> {
    ["expires_in", "expiresIn"].iter().find_map(|k| {
        let secs = match body.get(*k)? {
            JsonValue::Number(n) => n.as_f64()?,
            JsonValue::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !(secs.is_finite() && secs > 0.0) {
            return None;
        }
        let capped = secs.min(MAX_TOKEN_LIFETIME.as_secs_f64());
        Duration::try_from_secs_f64(capped).ok()
    })
}

/// Send a token request and return the parsed body of a 2xx response.
pub(crate) async fn request_token(
    ctx: &AuthContext<'_>,
    req: HttpRequestParts,
) -> Result<JsonValue, AuthError> {
    let endpoint = req.url.to_string();
    let resp = ctx
        .http
        .send(req, ctx.settings.timeout, ctx.settings.max_response_bytes)
        .await
        .map_err(|e| AuthError::TokenAcquisition(format!("{endpoint}: {e}")))?;
    if !resp.is_success() {
        return Err(AuthError::TokenAcquisition(format!(
            "{endpoint} returned status {}",
            resp.status
        )));
    }
    Ok(resp.body_value())
}

fn non_empty(v: Option<&JsonValue>) -> Option<String> {
    match v {
        Some(JsonValue::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_path_wins() {
        let body = json!({"access_token": "a", "auth": {"jwt": "b"}});
        assert_eq!(extract_token(&body, Some("$.auth.jwt")).as_deref(), Some("b"));
    }

    #[test]
    fn bare_string_body() {
        assert_eq!(extract_token(&json!("raw"), None).as_deref(), Some("raw"));
    }

    #[test]
    fn follows_documented_order() {
        let body = json!({"token": "t", "accessToken": "a2", "data": {"token": "d"}});
        assert_eq!(extract_token(&body, None).as_deref(), Some("a2"));

        let nested = json!({"data": {"accessToken": "da"}, "result": {"token": "r"}});
        assert_eq!(extract_token(&nested, None).as_deref(), Some("da"));

        let result = json!({"result": {"token": "r"}});
        assert_eq!(extract_token(&result, None).as_deref(), Some("r"));
    }

    #[test]
    fn skips_empty_and_non_string_candidates() {
        let body = json!({"access_token": "", "accessToken": 5, "id_token": "i"});
        assert_eq!(extract_token(&body, None).as_deref(), Some("i"));
        assert!(extract_token(&json!({"nothing": true}), None).is_none());
    }

    #[test]
    fn lifetime_from_number_or_string() {
        assert_eq!(
            extract_lifetime(&json!({"expires_in": 300})),
            Some(Duration::from_secs(300))
        );
        assert_eq!(
            extract_lifetime(&json!({"expiresIn": "120"})),
            Some(Duration::from_secs(120))
        );
        assert_eq!(extract_lifetime(&json!({"expires_in": 0})), None);
        assert_eq!(extract_lifetime(&json!({})), None);
    }

    #[test]
    fn lifetime_is_capped_and_rejects_non_finite() {
        assert_eq!(
            extract_lifetime(&json!({"expires_in": 1e20})),
            Some(MAX_TOKEN_LIFETIME)
        );
        assert_eq!(
            extract_lifetime(&json!({"expiresIn": "1e19"})),
            Some(MAX_TOKEN_LIFETIME)
        );
        assert_eq!(extract_lifetime(&json!({"expires_in": "NaN"})), None);
        assert_eq!(extract_lifetime(&json!({"expires_in": "inf"})), None);
        assert_eq!(extract_lifetime(&json!({"expires_in": -5})), None);
    }
}
