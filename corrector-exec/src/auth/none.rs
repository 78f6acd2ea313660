use async_trait::async_trait;

use corrector_core::{AuthConfig, AuthType};

use crate::auth::{AuthContext, AuthError, AuthProvider};
use crate::request::RequestDraft;

pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    fn auth_type(&self) -> AuthType {
        AuthType::None
    }

    fn validate(&self, _config: &AuthConfig) -> Result<(), AuthError> {
        Ok(())
    }

    async fn inject(
        &self,
        _draft: &mut RequestDraft,
        _config: &AuthConfig,
        _ctx: &AuthContext<'_>,
    ) -> Result<(), AuthError> {
        Ok(())
    }
}
