use std::collections::BTreeMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value as JsonValue};

use corrector_core::{AuthConfig, AuthType, HttpMethod};

use crate::auth::token::{extract_lifetime, extract_token, request_token};
use crate::auth::{AuthContext, AuthError, AuthProvider, FetchedToken, TokenKey};
use crate::http::HttpRequestParts;
use crate::request::RequestDraft;

const DEFAULT_HEADER: &str = "Authorization";
const DEFAULT_PREFIX: &str = "Bearer ";
const IDENTITY_KEYS: [&str; 4] = ["username", "clientId", "client_id", "email"];

/// Static token, or a token obtained by POSTing a login payload to `tokenUrl`.
pub struct BearerTokenProvider;

#[async_trait]
impl AuthProvider for BearerTokenProvider {
    fn auth_type(&self) -> AuthType {
        AuthType::BearerToken
    }

    fn validate(&self, config: &AuthConfig) -> Result<(), AuthError> {
        if config.str_field("token").is_some() {
            return Ok(());
        }
        let Some(token_url) = config.str_field("tokenUrl") else {
            return Err(AuthError::MissingField {
                auth_type: AuthType::BearerToken,
                field: "token",
            });
        };
        if let Err(e) = url::Url::parse(token_url) {
            return Err(AuthError::InvalidField {
                auth_type: AuthType::BearerToken,
                field: "tokenUrl",
                message: e.to_string(),
            });
        }
        match login_payload(config) {
            None | Some(JsonValue::Object(_)) => Ok(()),
            Some(_) => Err(AuthError::InvalidField {
                auth_type: AuthType::BearerToken,
                field: "loginPayload",
                message: "must be an object".into(),
            }),
        }
    }

    async fn inject(
        &self,
        draft: &mut RequestDraft,
        config: &AuthConfig,
        ctx: &AuthContext<'_>,
    ) -> Result<(), AuthError> {
        self.validate(config)?;
        let token = match config.str_field("token") {
            Some(t) => SecretString::from(t.to_string()),
            None => dynamic_token(config, ctx).await?,
        };

        let header = config.str_field("headerName").unwrap_or(DEFAULT_HEADER);
        let prefix = match config.config.get("tokenPrefix") {
            Some(JsonValue::String(p)) => p.as_str(),
            _ => DEFAULT_PREFIX,
        };
        draft.set_header(header, format!("{prefix}{}", token.expose_secret()));
        Ok(())
    }
}

fn login_payload(config: &AuthConfig) -> Option<&JsonValue> {
    config
        .field("loginPayload")
        .or_else(|| config.field("credentials"))
}

/// First identity-like field of the payload, else its canonical text.
fn identity(payload: &JsonValue) -> String {
    IDENTITY_KEYS
        .iter()
        .find_map(|k| payload.get(*k).and_then(JsonValue::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| payload.to_string())
}

async fn dynamic_token(
    config: &AuthConfig,
    ctx: &AuthContext<'_>,
) -> Result<SecretString, AuthError> {
    let token_url = config.str_field("tokenUrl").ok_or(AuthError::MissingField {
        auth_type: AuthType::BearerToken,
        field: "tokenUrl",
    })?;
    let payload = login_payload(config)
        .cloned()
        .unwrap_or_else(|| JsonValue::Object(Map::new()));
    let key = TokenKey::new(token_url, identity(&payload));

    ctx.cache
        .get_or_fetch(&key, || async {
            let url = url::Url::parse(token_url)
                .map_err(|e| AuthError::TokenAcquisition(format!("invalid tokenUrl: {e}")))?;
            let body = serde_json::to_vec(&payload)
                .map_err(|e| AuthError::TokenAcquisition(e.to_string()))?;

            let mut headers = BTreeMap::new();
            headers.insert("Content-Type".to_string(), "application/json".to_string());
            headers.insert("Accept".to_string(), "application/json".to_string());

            tracing::debug!(token_url = %token_url, "requesting bearer token");
            let resp = request_token(
                ctx,
                HttpRequestParts {
                    method: HttpMethod::Post,
                    url,
                    headers,
                    body,
                },
            )
            .await?;

            let token = extract_token(&resp, config.str_field("tokenPath")).ok_or_else(|| {
                AuthError::TokenAcquisition(format!("no token found in response from {token_url}"))
            })?;
            Ok(FetchedToken {
                token: SecretString::from(token),
                lifetime: extract_lifetime(&resp).unwrap_or(ctx.settings.default_token_lifetime),
            })
        })
        .await
}
