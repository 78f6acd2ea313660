use async_trait::async_trait;

use corrector_core::{AuthConfig, AuthType};

use crate::auth::{require, AuthContext, AuthError, AuthProvider};
use crate::request::RequestDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

impl ApiKeyLocation {
    fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        match config.str_field("location") {
            None => Ok(ApiKeyLocation::Header),
            Some(s) if s.eq_ignore_ascii_case("header") => Ok(ApiKeyLocation::Header),
            Some(s) if s.eq_ignore_ascii_case("query") => Ok(ApiKeyLocation::Query),
            Some(other) => Err(AuthError::InvalidField {
                auth_type: AuthType::ApiKey,
                field: "location",
                message: format!("expected HEADER or QUERY, got {other:?}"),
            }),
        }
    }
}

pub struct ApiKeyProvider;

#[async_trait]
impl AuthProvider for ApiKeyProvider {
    fn auth_type(&self) -> AuthType {
        AuthType::ApiKey
    }

    fn validate(&self, config: &AuthConfig) -> Result<(), AuthError> {
        require(AuthType::ApiKey, config, "keyName")?;
        require(AuthType::ApiKey, config, "keyValue")?;
        ApiKeyLocation::from_config(config)?;
        Ok(())
    }

    async fn inject(
        &self,
        draft: &mut RequestDraft,
        config: &AuthConfig,
        _ctx: &AuthContext<'_>,
    ) -> Result<(), AuthError> {
        let name = require(AuthType::ApiKey, config, "keyName")?;
        let value = require(AuthType::ApiKey, config, "keyValue")?;
        match ApiKeyLocation::from_config(config)? {
            ApiKeyLocation::Header => draft.set_header(name, value),
            ApiKeyLocation::Query => {
                draft.query.insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> AuthConfig {
        AuthConfig::new(AuthType::ApiKey)
            .with("keyName", "X-Api-Key")
            .with("keyValue", "k-1")
    }

    #[test]
    fn location_defaults_to_header_and_is_case_insensitive() {
        assert_eq!(ApiKeyLocation::from_config(&key()), Ok(ApiKeyLocation::Header));
        assert_eq!(
            ApiKeyLocation::from_config(&key().with("location", "query")),
            Ok(ApiKeyLocation::Query)
        );
        assert_eq!(
            ApiKeyLocation::from_config(&key().with("location", "HEADER")),
            Ok(ApiKeyLocation::Header)
        );
    }

    #[test]
    fn unknown_location_fails_validation() {
        let err = ApiKeyProvider
            .validate(&key().with("location", "COOKIE"))
            .unwrap_err();
        assert_eq!(err.field(), Some("location"));
        assert!(err.is_validation());
    }

    #[test]
    fn key_value_is_required() {
        let cfg = AuthConfig::new(AuthType::ApiKey).with("keyName", "X-Api-Key");
        assert_eq!(ApiKeyProvider.validate(&cfg).unwrap_err().field(), Some("keyValue"));
    }
}
