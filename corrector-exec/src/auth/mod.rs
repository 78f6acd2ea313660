//! Authentication strategies, one provider per [`AuthType`].
//!
//! Providers validate their config without touching the network and inject
//! credentials into a [`RequestDraft`]. Dynamic credentials (bearer login,
//! OAuth2 client credentials) go through the shared [`TokenCache`].

mod api_key;
mod basic;
mod bearer;
mod cache;
mod custom;
mod jwt;
mod none;
mod oauth2;
mod registry;
mod token;

use std::time::Duration;

use async_trait::async_trait;

use corrector_core::{AuthConfig, AuthType};

use crate::http::HttpClient;
use crate::request::RequestDraft;

pub use api_key::{ApiKeyLocation, ApiKeyProvider};
pub use basic::BasicProvider;
pub use bearer::BearerTokenProvider;
pub use cache::{Clock, FetchedToken, ManualClock, SystemClock, TokenCache, TokenKey};
pub use custom::CustomHeadersProvider;
pub use jwt::JwtProvider;
pub use none::NoAuthProvider;
pub use oauth2::OAuth2ClientCredentialsProvider;
pub use registry::AuthRegistry;
pub use token::{
    extract_lifetime, extract_token, MAX_TOKEN_LIFETIME, TOKEN_EXTRACTION_VERSION, TOKEN_FIELD_ORDER,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{auth_type} auth config is missing required field '{field}'")]
    MissingField {
        auth_type: AuthType,
        field: &'static str,
    },
    #[error("{auth_type} auth config field '{field}' is invalid: {message}")]
    InvalidField {
        auth_type: AuthType,
        field: &'static str,
        message: String,
    },
    #[error("token acquisition failed: {0}")]
    TokenAcquisition(String),
}

impl AuthError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, AuthError::TokenAcquisition(_))
    }

    /// The offending config key, for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AuthError::MissingField { field, .. } | AuthError::InvalidField { field, .. } => {
                Some(field)
            }
            AuthError::TokenAcquisition(_) => None,
        }
    }
}

/// Knobs for network round trips made by providers themselves.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub timeout: Duration,
    pub max_response_bytes: usize,
    /// Used when a token response carries no `expires_in`.
    pub default_token_lifetime: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
            default_token_lifetime: Duration::from_secs(3600),
        }
    }
}

pub struct AuthContext<'a> {
    pub http: &'a dyn HttpClient,
    pub cache: &'a TokenCache,
    pub settings: &'a AuthSettings,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn auth_type(&self) -> AuthType;

    /// Fails naming the first missing required field. Never does I/O.
    fn validate(&self, config: &AuthConfig) -> Result<(), AuthError>;

    async fn inject(
        &self,
        draft: &mut RequestDraft,
        config: &AuthConfig,
        ctx: &AuthContext<'_>,
    ) -> Result<(), AuthError>;
}

pub(crate) fn require<'c>(
    auth_type: AuthType,
    config: &'c AuthConfig,
    field: &'static str,
) -> Result<&'c str, AuthError> {
    config
        .str_field(field)
        .ok_or(AuthError::MissingField { auth_type, field })
}
