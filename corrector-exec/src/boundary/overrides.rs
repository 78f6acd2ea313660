use std::collections::BTreeMap;

use corrector_core::{AuthConfig, AuthType, HttpMethod};

use crate::executor::CallOverrides;

/// How a call-time auth override is reconciled with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthOverridePolicy {
    /// The override type must equal the stored type, NONE included.
    Strict,
    /// As `Strict`, except any override is accepted over a stored NONE.
    #[default]
    AllowOverNone,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("auth override {requested} does not match configured {stored}")]
pub struct AuthMismatch {
    pub stored: AuthType,
    pub requested: AuthType,
}

/// One inbound call as seen by the boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallRequest {
    pub method: Option<HttpMethod>,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub operation: Option<String>,
    pub auth_override: Option<AuthConfig>,
}

impl CallRequest {
    pub fn overrides(&self) -> CallOverrides {
        CallOverrides {
            method: self.method,
            query: self.query.clone(),
            headers: self.headers.clone(),
            operation: self.operation.clone(),
        }
    }
}

/// Resolve the single auth config the engine runs with.
pub fn merge_auth(
    stored: Option<&AuthConfig>,
    requested: Option<&AuthConfig>,
    policy: AuthOverridePolicy,
) -> Result<Option<AuthConfig>, AuthMismatch> {
    let Some(requested) = requested else {
        return Ok(stored.cloned());
    };
    let stored_type = stored.map(|a| a.auth_type).unwrap_or_default();

    if stored_type == requested.auth_type {
        return Ok(Some(requested.clone()));
    }
    if stored_type == AuthType::None && policy == AuthOverridePolicy::AllowOverNone {
        return Ok(Some(requested.clone()));
    }
    Err(AuthMismatch {
        stored: stored_type,
        requested: requested.auth_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bearer() -> AuthConfig {
        AuthConfig::new(AuthType::BearerToken).with("token", "t")
    }

    #[test]
    fn no_override_keeps_stored() {
        let stored = bearer();
        let out = merge_auth(Some(&stored), None, AuthOverridePolicy::Strict).unwrap();
        assert_eq!(out, Some(stored));
        assert_eq!(merge_auth(None, None, AuthOverridePolicy::Strict).unwrap(), None);
    }

    #[test]
    fn same_type_replaces_config_wholesale() {
        let stored = bearer().with("headerName", "X-Token");
        let over = AuthConfig::new(AuthType::BearerToken).with("token", "other");
        let out = merge_auth(Some(&stored), Some(&over), AuthOverridePolicy::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(out.str_field("token"), Some("other"));
        assert_eq!(out.str_field("headerName"), None);
    }

    #[test]
    fn mismatch_rejected() {
        let stored = bearer();
        let over = AuthConfig::new(AuthType::Basic);
        let err = merge_auth(Some(&stored), Some(&over), AuthOverridePolicy::AllowOverNone)
            .unwrap_err();
        assert_eq!(err.stored, AuthType::BearerToken);
        assert_eq!(err.requested, AuthType::Basic);
    }

    #[test]
    fn override_over_none_depends_on_policy() {
        let over = bearer();
        assert!(merge_auth(None, Some(&over), AuthOverridePolicy::AllowOverNone).is_ok());
        let none = AuthConfig::new(AuthType::None);
        assert!(merge_auth(Some(&none), Some(&over), AuthOverridePolicy::Strict).is_err());
    }
}
