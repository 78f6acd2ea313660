use std::collections::HashMap;
use std::sync::Arc;

use corrector_core::{AuthConfig, AuthType};

use crate::auth::{
    ApiKeyProvider, AuthError, AuthProvider, BasicProvider, BearerTokenProvider,
    CustomHeadersProvider, JwtProvider, NoAuthProvider, OAuth2ClientCredentialsProvider,
};

/// Maps an [`AuthType`] to its provider. Lookups never fail: a type with no
/// registered provider gets the no-auth provider.
pub struct AuthRegistry {
    providers: HashMap<AuthType, Arc<dyn AuthProvider>>,
    fallback: Arc<dyn AuthProvider>,
}

impl Default for AuthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthRegistry {
    pub fn new() -> Self {
        let mut r = Self::empty();
        r.register(Arc::new(NoAuthProvider));
        r.register(Arc::new(BasicProvider));
        r.register(Arc::new(ApiKeyProvider));
        r.register(Arc::new(BearerTokenProvider));
        r.register(Arc::new(OAuth2ClientCredentialsProvider));
        r.register(Arc::new(CustomHeadersProvider));
        r.register(Arc::new(JwtProvider));
        r
    }

    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
            fallback: Arc::new(NoAuthProvider),
        }
    }

    /// Replaces any provider already registered for the same type.
    pub fn register(&mut self, provider: Arc<dyn AuthProvider>) {
        self.providers.insert(provider.auth_type(), provider);
    }

    pub fn provider(&self, auth_type: AuthType) -> Arc<dyn AuthProvider> {
        self.providers
            .get(&auth_type)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn validate(&self, config: &AuthConfig) -> Result<(), AuthError> {
        self.provider(config.auth_type).validate(config)
    }
}
