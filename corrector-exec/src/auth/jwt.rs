use async_trait::async_trait;

use corrector_core::{AuthConfig, AuthType};

use crate::auth::{require, AuthContext, AuthError, AuthProvider};
use crate::request::RequestDraft;

/// Config is validated but no token is minted; signing is not supported.
pub struct JwtProvider;

#[async_trait]
impl AuthProvider for JwtProvider {
    fn auth_type(&self) -> AuthType {
        AuthType::Jwt
    }

    fn validate(&self, config: &AuthConfig) -> Result<(), AuthError> {
        require(AuthType::Jwt, config, "issuer")?;
        require(AuthType::Jwt, config, "audience")?;
        require(AuthType::Jwt, config, "privateKeyRef")?;
        Ok(())
    }

    async fn inject(
        &self,
        _draft: &mut RequestDraft,
        _config: &AuthConfig,
        _ctx: &AuthContext<'_>,
    ) -> Result<(), AuthError> {
        tracing::debug!("JWT auth is not implemented; request sent without credentials");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_names_first_missing_field() {
        let p = JwtProvider;
        let empty = AuthConfig::new(AuthType::Jwt);
        assert_eq!(p.validate(&empty).unwrap_err().field(), Some("issuer"));

        let partial = empty.with("issuer", "svc");
        assert_eq!(p.validate(&partial).unwrap_err().field(), Some("audience"));

        let partial = partial.with("audience", "api");
        assert_eq!(p.validate(&partial).unwrap_err().field(), Some("privateKeyRef"));

        assert!(p.validate(&partial.with("privateKeyRef", "kms://key")).is_ok());
    }
}
