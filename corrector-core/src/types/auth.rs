use std::fmt;

use serde_json::{Map, Value as JsonValue};

/// Closed set of authentication strategies a mapping can request.
///
/// Unrecognised tags resolve to [`AuthType::None`] instead of failing, so a
/// typo in stored configuration degrades to an unauthenticated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthType {
    #[default]
    None,
    Basic,
    ApiKey,
    BearerToken,
    OAuth2ClientCredentials,
    Custom,
    Jwt,
}

impl AuthType {
    pub const ALL: [AuthType; 7] = [
        AuthType::None,
        AuthType::Basic,
        AuthType::ApiKey,
        AuthType::BearerToken,
        AuthType::OAuth2ClientCredentials,
        AuthType::Custom,
        AuthType::Jwt,
    ];

    pub fn as_tag(&self) -> &'static str {
        match self {
            AuthType::None => "NONE",
            AuthType::Basic => "BASIC",
            AuthType::ApiKey => "API_KEY",
            AuthType::BearerToken => "BEARER_TOKEN",
            AuthType::OAuth2ClientCredentials => "OAUTH2_CLIENT_CREDENTIALS",
            AuthType::Custom => "CUSTOM",
            AuthType::Jwt => "JWT",
        }
    }

    /// Case-insensitive; `-` and `_` are interchangeable.
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().to_ascii_uppercase().replace('-', "_");
        match AuthType::ALL.iter().find(|t| t.as_tag() == normalized) {
            Some(t) => *t,
            None => {
                if !normalized.is_empty() {
                    tracing::warn!(auth_type = %tag, "unrecognised auth type, falling back to NONE");
                }
                AuthType::None
            }
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl From<String> for AuthType {
    fn from(s: String) -> Self {
        AuthType::from_tag(&s)
    }
}

impl From<AuthType> for String {
    fn from(t: AuthType) -> Self {
        t.as_tag().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct AuthConfig {
    #[serde(rename = "authType", default)]
    pub auth_type: AuthType,

    /// Type-specific settings; required keys are checked by the auth provider.
    #[serde(default)]
    pub config: Map<String, JsonValue>,
}

impl AuthConfig {
    pub fn new(auth_type: AuthType) -> Self {
        Self {
            auth_type,
            config: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.config.get(key).filter(|v| !v.is_null())
    }

    /// A present, non-empty string value.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.config
            .get(key)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn has(&self, key: &str) -> bool {
        match self.config.get(key) {
            None | Some(JsonValue::Null) => false,
            Some(JsonValue::String(s)) => !s.is_empty(),
            Some(JsonValue::Object(m)) => !m.is_empty(),
            Some(_) => true,
        }
    }
}
