use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::types::{AuthConfig, HttpMethod, TransformSpec};

/// One stored integration: where to call, how to authenticate, and how to
/// reshape the payload on the way out and the response on the way back.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MappingConfig {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "sourceSystem")]
    pub source_system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "targetSystem")]
    pub target_system: Option<String>,

    /// Absent only for broken records; the orchestrator refuses to run without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "targetApi")]
    pub target_api: Option<TargetApi>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestMapping")]
    pub request_mapping: Option<TransformSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "responseMapping")]
    pub response_mapping: Option<TransformSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "errorMapping")]
    pub error_mapping: Option<TransformSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestSchema")]
    pub request_schema: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "responseSchema")]
    pub response_schema: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "authConfig")]
    pub auth_config: Option<AuthConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<WorkflowStep>,

    /// Named scalar transforms: name -> script expression over `input`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transforms: BTreeMap<String, String>,
}

impl MappingConfig {
    pub fn new(id: impl Into<String>, target_api: TargetApi) -> Self {
        Self {
            id: id.into(),
            source_system: None,
            target_system: None,
            target_api: Some(target_api),
            request_mapping: None,
            response_mapping: None,
            error_mapping: None,
            request_schema: None,
            response_schema: None,
            auth_config: None,
            steps: Vec::new(),
            transforms: BTreeMap::new(),
        }
    }

    pub fn is_workflow(&self) -> bool {
        !self.steps.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TargetApi {
    /// May contain `{name}` placeholders filled from `pathParams`.
    pub url: String,

    pub method: HttpMethod,

    /// Values starting with `$` are path expressions against the payload.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(rename = "queryParams")]
    pub query_params: BTreeMap<String, JsonValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(rename = "pathParams")]
    pub path_params: BTreeMap<String, JsonValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub resilience: ResilienceConfig,
}

impl TargetApi {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            query_params: BTreeMap::new(),
            path_params: BTreeMap::new(),
            headers: BTreeMap::new(),
            resilience: ResilienceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResilienceConfig {
    #[serde(default, rename = "retryCount")]
    pub retry_count: u32,

    #[serde(default = "default_retry_delay_ms", rename = "retryDelayMs")]
    pub retry_delay_ms: u64,

    /// Per-attempt deadline; falls back to the executor default.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "timeoutMs")]
    pub timeout_ms: Option<u64>,
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry_count: 0,
            retry_delay_ms: default_retry_delay_ms(),
            timeout_ms: None,
        }
    }
}

/// One leg of a chained workflow.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkflowStep {
    pub name: String,

    #[serde(rename = "targetApi")]
    pub target_api: TargetApi,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestMapping")]
    pub request_mapping: Option<TransformSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "responseMapping")]
    pub response_mapping: Option<TransformSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestSchema")]
    pub request_schema: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "responseSchema")]
    pub response_schema: Option<JsonValue>,

    /// Overrides the mapping-level auth for this step only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "authConfig")]
    pub auth_config: Option<AuthConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "saveResultToContextAs")]
    pub save_result_to_context_as: Option<String>,
}
