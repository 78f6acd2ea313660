use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value as JsonValue;

use corrector_core::HttpMethod;

use crate::auth::AuthSettings;
use crate::boundary::AuthOverridePolicy;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Per-attempt deadline when the mapping sets no `timeoutMs`.
    pub attempt_timeout: Duration,
    pub max_response_bytes: usize,
    pub default_token_lifetime: Duration,
    pub token_safety_margin: Duration,
    pub auth_override_policy: AuthOverridePolicy,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
            default_token_lifetime: Duration::from_secs(3600),
            token_safety_margin: Duration::from_secs(60),
            auth_override_policy: AuthOverridePolicy::default(),
        }
    }
}

impl ExecutorConfig {
    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            timeout: self.attempt_timeout,
            max_response_bytes: self.max_response_bytes,
            default_token_lifetime: self.default_token_lifetime,
        }
    }
}

/// Call-time values layered over the mapping's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOverrides {
    pub method: Option<HttpMethod>,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub operation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub result: JsonValue,
    /// Status of the last remote call; 200 when the result came from `errorMapping`.
    pub status_code: u16,
    pub attempts: u32,
    pub from_error_mapping: bool,
    /// Headers of the last request sent, credentials included.
    pub request_headers: BTreeMap<String, String>,
}
