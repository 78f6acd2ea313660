use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};

use corrector_core::{AuthConfig, AuthType};

use crate::auth::{require, AuthContext, AuthError, AuthProvider};
use crate::request::RequestDraft;

pub struct BasicProvider;

#[async_trait]
impl AuthProvider for BasicProvider {
    fn auth_type(&self) -> AuthType {
        AuthType::Basic
    }

    fn validate(&self, config: &AuthConfig) -> Result<(), AuthError> {
        require(AuthType::Basic, config, "username")?;
        require(AuthType::Basic, config, "password")?;
        Ok(())
    }

    async fn inject(
        &self,
        draft: &mut RequestDraft,
        config: &AuthConfig,
        _ctx: &AuthContext<'_>,
    ) -> Result<(), AuthError> {
        let username = require(AuthType::Basic, config, "username")?;
        let password = require(AuthType::Basic, config, "password")?;
        let encoded = general_purpose::STANDARD.encode(format!("{username}:{password}"));
        draft.set_header("Authorization", format!("Basic {encoded}"));
        Ok(())
    }
}
