//! The execution orchestrator.
//!
//! One call runs RESOLVE_PARAMS, VALIDATE_REQUEST, TRANSFORM_REQUEST,
//! AUTHENTICATE, INVOKE (with retry), TRANSFORM_RESPONSE and
//! VALIDATE_RESPONSE in order. Mappings with `steps` run each step through
//! the same request/auth/invoke path over a shared context.

mod context;
mod failure;
mod invoke;
mod types;
mod workflow;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value as JsonValue};

use corrector_core::{transform_with_report, HttpMethod, MappingConfig, TargetApi, TransformSpec};

use crate::auth::{AuthRegistry, TokenCache};
use crate::http::HttpClient;
use crate::request::{fill_placeholders, resolve_params, RequestDraft};
use crate::retry::RetryConfig;
use crate::schema::{self, SchemaViolation};

pub use context::ExecutionContext;
pub use failure::{ExecuteError, TransportFailure, TransportKind};
pub use types::{CallOverrides, ExecutionOutcome, ExecutorConfig};

use invoke::InvocationFailure;

pub struct Executor {
    http: Arc<dyn HttpClient>,
    auth: Arc<AuthRegistry>,
    tokens: Arc<TokenCache>,
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(http: Arc<dyn HttpClient>, config: ExecutorConfig) -> Self {
        let tokens = TokenCache::new().with_safety_margin(config.token_safety_margin);
        Self {
            http,
            auth: Arc::new(AuthRegistry::new()),
            tokens: Arc::new(tokens),
            config,
        }
    }

    pub fn with_auth_registry(mut self, registry: Arc<AuthRegistry>) -> Self {
        self.auth = registry;
        self
    }

    /// Share a token cache between executors, or inject one with a test clock.
    pub fn with_token_cache(mut self, cache: Arc<TokenCache>) -> Self {
        self.tokens = cache;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn auth_registry(&self) -> &AuthRegistry {
        &self.auth
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.tokens
    }

    pub(crate) fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    /// Run one correction. Failures from AUTHENTICATE onward are turned into
    /// a result when the mapping has an `errorMapping`.
    #[tracing::instrument(skip_all, fields(mapping_id = %mapping.id, operation = overrides.operation.as_deref()))]
    pub async fn execute(
        &self,
        mapping: &MappingConfig,
        payload: &JsonValue,
        overrides: &CallOverrides,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let mut ctx = ExecutionContext::new(overrides, payload);

        let result = if mapping.is_workflow() {
            self.run_workflow(mapping, payload, &mut ctx).await
        } else {
            self.run_single(mapping, payload, &ctx).await
        };

        match result {
            Ok(outcome) => {
                tracing::info!(
                    status = outcome.status_code,
                    attempts = outcome.attempts,
                    "execution succeeded"
                );
                Ok(outcome)
            }
            Err(failure) => self.recover(mapping, failure),
        }
    }

    async fn run_single(
        &self,
        mapping: &MappingConfig,
        payload: &JsonValue,
        ctx: &ExecutionContext,
    ) -> Result<ExecutionOutcome, InvocationFailure> {
        let target = mapping.target_api.as_ref().ok_or_else(|| {
            local(ExecuteError::Configuration(format!(
                "mapping {} has no targetApi",
                mapping.id
            )))
        })?;

        gate_request(mapping.request_schema.as_ref(), payload).map_err(local)?;

        let method = ctx.method.unwrap_or(target.method);
        let body = self.transform_request(
            mapping.request_mapping.as_ref(),
            payload,
            &mapping.transforms,
            method,
        );
        let draft = build_draft(target, payload, body, method, Some(&ctx.query), &ctx.headers);

        let inv = self
            .invoke_with_retry(
                &draft,
                mapping.auth_config.as_ref(),
                &RetryConfig::from(&target.resilience),
                self.attempt_timeout(target),
            )
            .await?;

        let raw = inv.response.body_value();
        let result = apply(mapping.response_mapping.as_ref(), &raw, &mapping.transforms);
        gate_response(mapping.response_schema.as_ref(), &result).map_err(|error| {
            InvocationFailure {
                error,
                attempts: inv.attempts,
            }
        })?;

        Ok(ExecutionOutcome {
            result,
            status_code: inv.response.status,
            attempts: inv.attempts,
            from_error_mapping: false,
            request_headers: inv.headers,
        })
    }

    fn recover(
        &self,
        mapping: &MappingConfig,
        failure: InvocationFailure,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let InvocationFailure { error, attempts } = failure;
        let spec = match &mapping.error_mapping {
            Some(spec) if error.is_mappable() => spec,
            _ => {
                tracing::warn!(error = %error, attempts, "execution failed");
                return Err(error);
            }
        };

        tracing::warn!(error = %error, attempts, "execution failed, applying errorMapping");
        let result = apply(Some(spec), &error.failure_document(), &mapping.transforms);
        Ok(ExecutionOutcome {
            result,
            status_code: 200,
            attempts,
            from_error_mapping: true,
            request_headers: BTreeMap::new(),
        })
    }

    pub(crate) fn transform_request(
        &self,
        spec: Option<&TransformSpec>,
        input: &JsonValue,
        custom: &BTreeMap<String, String>,
        method: HttpMethod,
    ) -> JsonValue {
        let body = apply(spec, input, custom);
        if method.is_write() && body.is_null() {
            JsonValue::Object(Map::new())
        } else {
            body
        }
    }

    pub(crate) fn attempt_timeout(&self, target: &TargetApi) -> Duration {
        target
            .resilience
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.config.attempt_timeout)
    }
}

/// Apply a transform, passing the input through when there is none.
pub(crate) fn apply(
    spec: Option<&TransformSpec>,
    input: &JsonValue,
    custom: &BTreeMap<String, String>,
) -> JsonValue {
    match spec {
        Some(spec) if !spec.is_passthrough() => {
            let out = transform_with_report(input, spec, custom);
            if !out.field_errors.is_empty() {
                tracing::debug!(count = out.field_errors.len(), "transform reported field errors");
            }
            out.value
        }
        _ => input.clone(),
    }
}

/// Static headers, then call-time headers. Query: mapping defaults resolved
/// against `input`, then call-time values.
pub(crate) fn build_draft(
    target: &TargetApi,
    input: &JsonValue,
    body: JsonValue,
    method: HttpMethod,
    query: Option<&BTreeMap<String, String>>,
    headers: &BTreeMap<String, String>,
) -> RequestDraft {
    let path_params = resolve_params(&target.path_params, input);
    let mut draft = RequestDraft::new(method, fill_placeholders(&target.url, &path_params));

    draft.query = resolve_params(&target.query_params, input);
    if let Some(query) = query {
        draft.query.extend(query.clone());
    }

    for (k, v) in &target.headers {
        draft.set_header(k.as_str(), v.as_str());
    }
    for (k, v) in headers {
        draft.set_header(k.as_str(), v.as_str());
    }

    if method.allows_body() {
        draft.body = Some(body);
    }
    draft
}

pub(crate) fn gate_request(schema: Option<&JsonValue>, value: &JsonValue) -> Result<(), ExecuteError> {
    gate(schema, value, |violations| ExecuteError::RequestContract { violations })
}

pub(crate) fn gate_response(schema: Option<&JsonValue>, value: &JsonValue) -> Result<(), ExecuteError> {
    gate(schema, value, |violations| ExecuteError::ResponseContract { violations })
}

fn gate(
    schema: Option<&JsonValue>,
    value: &JsonValue,
    contract: fn(Vec<SchemaViolation>) -> ExecuteError,
) -> Result<(), ExecuteError> {
    let Some(schema) = schema else {
        return Ok(());
    };
    let report = schema::check(schema, value)
        .map_err(|e| ExecuteError::Configuration(e.to_string()))?;
    if report.valid {
        Ok(())
    } else {
        Err(contract(report.errors))
    }
}

/// A failure raised before any remote attempt.
pub(crate) fn local(error: ExecuteError) -> InvocationFailure {
    InvocationFailure { error, attempts: 0 }
}
