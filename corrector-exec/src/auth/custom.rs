use async_trait::async_trait;
use serde_json::Value as JsonValue;

use corrector_core::{AuthConfig, AuthType};

use crate::auth::{AuthContext, AuthError, AuthProvider};
use crate::request::RequestDraft;

/// Injects a fixed header map verbatim.
pub struct CustomHeadersProvider;

fn headers(config: &AuthConfig) -> Result<&serde_json::Map<String, JsonValue>, AuthError> {
    match config.field("headers") {
        None => Err(AuthError::MissingField {
            auth_type: AuthType::Custom,
            field: "headers",
        }),
        Some(JsonValue::Object(m)) => Ok(m),
        Some(_) => Err(AuthError::InvalidField {
            auth_type: AuthType::Custom,
            field: "headers",
            message: "must be an object of header name to value".into(),
        }),
    }
}

#[async_trait]
impl AuthProvider for CustomHeadersProvider {
    fn auth_type(&self) -> AuthType {
        AuthType::Custom
    }

    fn validate(&self, config: &AuthConfig) -> Result<(), AuthError> {
        headers(config).map(|_| ())
    }

    async fn inject(
        &self,
        draft: &mut RequestDraft,
        config: &AuthConfig,
        _ctx: &AuthContext<'_>,
    ) -> Result<(), AuthError> {
        for (name, value) in headers(config)? {
            let value = match value {
                JsonValue::String(s) => s.clone(),
                JsonValue::Null => continue,
                other => other.to_string(),
            };
            draft.set_header(name.as_str(), value);
        }
        Ok(())
    }
}
