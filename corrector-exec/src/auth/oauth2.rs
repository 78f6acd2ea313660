use std::collections::BTreeMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use corrector_core::{AuthConfig, AuthType, HttpMethod};

use crate::auth::token::{extract_lifetime, extract_token, request_token};
use crate::auth::{require, AuthContext, AuthError, AuthProvider, FetchedToken, TokenKey};
use crate::http::HttpRequestParts;
use crate::request::RequestDraft;

const T: AuthType = AuthType::OAuth2ClientCredentials;

/// RFC 6749 client credentials grant; tokens cached per endpoint and client.
pub struct OAuth2ClientCredentialsProvider;

#[async_trait]
impl AuthProvider for OAuth2ClientCredentialsProvider {
    fn auth_type(&self) -> AuthType {
        T
    }

    fn validate(&self, config: &AuthConfig) -> Result<(), AuthError> {
        let token_url = require(T, config, "tokenUrl")?;
        require(T, config, "clientId")?;
        require(T, config, "clientSecret")?;
        url::Url::parse(token_url).map_err(|e| AuthError::InvalidField {
            auth_type: T,
            field: "tokenUrl",
            message: e.to_string(),
        })?;
        Ok(())
    }

    async fn inject(
        &self,
        draft: &mut RequestDraft,
        config: &AuthConfig,
        ctx: &AuthContext<'_>,
    ) -> Result<(), AuthError> {
        self.validate(config)?;
        let token_url = require(T, config, "tokenUrl")?;
        let client_id = require(T, config, "clientId")?;
        let key = TokenKey::new(token_url, client_id);

        let token = ctx
            .cache
            .get_or_fetch(&key, || fetch(config, ctx))
            .await?;
        draft.set_header("Authorization", format!("Bearer {}", token.expose_secret()));
        Ok(())
    }
}

async fn fetch(config: &AuthConfig, ctx: &AuthContext<'_>) -> Result<FetchedToken, AuthError> {
    let token_url = require(T, config, "tokenUrl")?;
    let url = url::Url::parse(token_url)
        .map_err(|e| AuthError::TokenAcquisition(format!("invalid tokenUrl: {e}")))?;

    let mut form = vec![
        ("grant_type", "client_credentials"),
        ("client_id", require(T, config, "clientId")?),
        ("client_secret", require(T, config, "clientSecret")?),
    ];
    if let Some(scope) = config.str_field("scope") {
        form.push(("scope", scope));
    }
    if let Some(audience) = config.str_field("audience") {
        form.push(("audience", audience));
    }
    let body = form
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let mut headers = BTreeMap::new();
    headers.insert(
        "Content-Type".to_string(),
        "application/x-www-form-urlencoded".to_string(),
    );
    headers.insert("Accept".to_string(), "application/json".to_string());

    tracing::debug!(token_url = %token_url, "requesting client credentials token");
    let resp = request_token(
        ctx,
        HttpRequestParts {
            method: HttpMethod::Post,
            url,
            headers,
            body: body.into_bytes(),
        },
    )
    .await?;

    let token = extract_token(&resp, None).ok_or_else(|| {
        AuthError::TokenAcquisition(format!("no access_token in response from {token_url}"))
    })?;
    Ok(FetchedToken {
        token: SecretString::from(token),
        lifetime: extract_lifetime(&resp).unwrap_or(ctx.settings.default_token_lifetime),
    })
}
