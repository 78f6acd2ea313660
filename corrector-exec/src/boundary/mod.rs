//! The boundary adapter: looks a mapping up, reconciles auth overrides,
//! runs the executor and folds every outcome into an [`Envelope`].

mod envelope;
mod overrides;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::Instrument;
use uuid::Uuid;

use corrector_core::MappingConfig;
use corrector_store::{MappingStore, StoreError};

use crate::audit::{redact_headers, secret_header_names, AuditRecord, AuditSink, NoopAuditSink};
use crate::executor::{ExecuteError, ExecutionOutcome, Executor};

pub use envelope::{Envelope, ErrorType};
pub use overrides::{merge_auth, AuthMismatch, AuthOverridePolicy, CallRequest};

pub struct Corrector {
    mappings: Arc<dyn MappingStore>,
    executor: Arc<Executor>,
    audit: Arc<dyn AuditSink>,
}

/// What a handled call produced, before it is audited.
struct Handled {
    envelope: Envelope,
    mapping: Option<MappingConfig>,
    headers: BTreeMap<String, String>,
}

impl Corrector {
    pub fn new(mappings: Arc<dyn MappingStore>, executor: Arc<Executor>) -> Self {
        Self {
            mappings,
            executor,
            audit: Arc::new(NoopAuditSink),
        }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Handle one call. Every failure is reported inside the envelope.
    pub async fn handle(&self, key: &str, payload: JsonValue, request: CallRequest) -> Envelope {
        let execution_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();

        let span = tracing::info_span!("correction", %execution_id, mapping_key = %key);
        let handled = self.run(key, &payload, &request).instrument(span).await;

        let Handled {
            envelope,
            mapping,
            headers,
        } = handled;

        let mut secret_names = secret_header_names(request.auth_override.as_ref());
        if let Some(m) = &mapping {
            let step_auths = m.steps.iter().filter_map(|s| s.auth_config.as_ref());
            for auth in m.auth_config.iter().chain(step_auths) {
                secret_names.extend(secret_header_names(Some(auth)));
            }
        }

        let record = AuditRecord {
            execution_id,
            mapping_key: key.to_string(),
            operation: request.operation.clone(),
            started_at,
            duration_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
            success: envelope.success,
            status_code: envelope.status_code,
            payload,
            result: envelope.data.clone(),
            headers: redact_headers(&headers, &secret_names),
            error: envelope.error_detail(),
        };
        self.audit.record(record).await;

        envelope
    }

    async fn run(&self, key: &str, payload: &JsonValue, request: &CallRequest) -> Handled {
        let mut handled = Handled {
            envelope: Envelope::ok(200, JsonValue::Null),
            mapping: None,
            headers: request.headers.clone(),
        };

        let mut mapping = match self.mappings.find_mapping(key).await {
            Ok(Some(m)) if m.target_api.is_some() || m.is_workflow() => m,
            Ok(_) => {
                tracing::info!("no runnable mapping for key");
                handled.envelope = Envelope::failure(
                    ErrorType::FrameworkError,
                    404,
                    format!("no correction mapping found for {key}"),
                );
                return handled;
            }
            Err(e) => {
                handled.envelope = store_failure(&e);
                return handled;
            }
        };

        let policy = self.executor.config().auth_override_policy;
        let auth = match merge_auth(
            mapping.auth_config.as_ref(),
            request.auth_override.as_ref(),
            policy,
        ) {
            Ok(auth) => auth,
            Err(mismatch) => {
                tracing::warn!(stored = %mismatch.stored, requested = %mismatch.requested, "auth override rejected");
                handled.envelope =
                    Envelope::failure(ErrorType::AuthMismatch, 400, mismatch.to_string());
                handled.mapping = Some(mapping);
                return handled;
            }
        };

        if let Some(auth) = &auth {
            if let Err(e) = self.executor.auth_registry().validate(auth) {
                tracing::warn!(auth_type = %auth.auth_type, field = e.field(), "auth config rejected");
                handled.envelope =
                    Envelope::failure(ErrorType::AuthValidationFailed, 400, e.to_string());
                handled.mapping = Some(mapping);
                return handled;
            }
        }
        mapping.auth_config = auth;

        let result = self
            .executor
            .execute(&mapping, payload, &request.overrides())
            .await;
        handled.envelope = match result {
            Ok(ExecutionOutcome {
                result,
                status_code,
                request_headers,
                ..
            }) => {
                if !request_headers.is_empty() {
                    handled.headers = request_headers;
                }
                Envelope::ok(status_code, result)
            }
            Err(e) => failure_envelope(&e),
        };
        handled.mapping = Some(mapping);
        handled
    }
}

fn store_failure(e: &StoreError) -> Envelope {
    match e {
        StoreError::InvalidKey(_) => Envelope::failure(ErrorType::FrameworkError, 400, e.to_string()),
        _ => {
            tracing::error!(error = %e, "mapping lookup failed");
            Envelope::failure(ErrorType::InternalCorrectorError, 500, e.to_string())
        }
    }
}

/// Translate an engine failure into its stable envelope.
pub fn failure_envelope(error: &ExecuteError) -> Envelope {
    let message = error.to_string();
    let status = error.status_code();
    match error.root() {
        ExecuteError::Validation(_) => {
            Envelope::failure(ErrorType::AuthValidationFailed, status, message)
        }
        ExecuteError::RequestContract { violations }
        | ExecuteError::ResponseContract { violations } => {
            Envelope::failure(ErrorType::FrameworkError, status, message)
                .with_details(serde_json::to_value(violations).unwrap_or(JsonValue::Null))
        }
        ExecuteError::Transport(t) => {
            let env = Envelope::failure(ErrorType::TargetApiError, status, message);
            match &t.body {
                Some(body) => env.with_target_response(body.clone()),
                None => env,
            }
        }
        ExecuteError::TokenAcquisition(_) => {
            Envelope::failure(ErrorType::TargetApiError, status, message)
        }
        ExecuteError::Configuration(_) => {
            Envelope::failure(ErrorType::FrameworkError, status, message)
        }
        ExecuteError::Transform(_) | ExecuteError::Step { .. } => {
            Envelope::failure(ErrorType::InternalCorrectorError, status, message)
        }
    }
}
