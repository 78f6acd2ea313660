use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use tracing::Instrument;

use corrector_core::{MappingConfig, WorkflowStep};

use crate::executor::invoke::InvocationFailure;
use crate::executor::{
    apply, build_draft, gate_request, gate_response, local, ExecuteError, ExecutionContext,
    ExecutionOutcome, Executor,
};
use crate::retry::RetryConfig;

struct StepOutput {
    result: JsonValue,
    status: u16,
    attempts: u32,
    headers: BTreeMap<String, String>,
}

impl Executor {
    /// Steps run strictly in order over `ctx.bag`; the first failure aborts
    /// the chain and earlier effects stand.
    pub(crate) async fn run_workflow(
        &self,
        mapping: &MappingConfig,
        payload: &JsonValue,
        ctx: &mut ExecutionContext,
    ) -> Result<ExecutionOutcome, InvocationFailure> {
        gate_request(mapping.request_schema.as_ref(), payload).map_err(local)?;

        let mut total_attempts = 0u32;
        let mut last: Option<StepOutput> = None;

        for step in &mapping.steps {
            let out = self
                .run_step(mapping, step, ctx)
                .instrument(tracing::info_span!("step", step = %step.name))
                .await
                .map_err(|f| InvocationFailure {
                    error: f.error.in_step(&step.name),
                    attempts: total_attempts + f.attempts,
                })?;
            total_attempts += out.attempts;

            if let Some(key) = step.save_result_to_context_as.as_deref() {
                ctx.publish(key, out.result.clone()).map_err(|e| InvocationFailure {
                    error: ExecuteError::Transform(format!(
                        "cannot save result as '{key}': {e}"
                    ))
                    .in_step(&step.name),
                    attempts: total_attempts,
                })?;
            }
            tracing::debug!(step = %step.name, status = out.status, "step completed");
            last = Some(out);
        }

        let last = last.ok_or_else(|| local(ExecuteError::Configuration("workflow has no steps".into())))?;
        let result = apply(mapping.response_mapping.as_ref(), &last.result, &mapping.transforms);
        gate_response(mapping.response_schema.as_ref(), &result).map_err(|error| {
            InvocationFailure {
                error,
                attempts: total_attempts,
            }
        })?;

        Ok(ExecutionOutcome {
            result,
            status_code: last.status,
            attempts: total_attempts,
            from_error_mapping: false,
            request_headers: last.headers,
        })
    }

    async fn run_step(
        &self,
        mapping: &MappingConfig,
        step: &WorkflowStep,
        ctx: &ExecutionContext,
    ) -> Result<StepOutput, InvocationFailure> {
        let target = &step.target_api;
        gate_request(step.request_schema.as_ref(), &ctx.bag).map_err(local)?;

        // Call-time method and query apply to the single-call form only;
        // call-time headers reach every step.
        let body = self.transform_request(
            step.request_mapping.as_ref(),
            &ctx.bag,
            &mapping.transforms,
            target.method,
        );
        let draft = build_draft(target, &ctx.bag, body, target.method, None, &ctx.headers);
        let auth = step.auth_config.as_ref().or(mapping.auth_config.as_ref());

        let inv = self
            .invoke_with_retry(
                &draft,
                auth,
                &RetryConfig::from(&target.resilience),
                self.attempt_timeout(target),
            )
            .await?;

        let raw = inv.response.body_value();
        let result = apply(step.response_mapping.as_ref(), &raw, &mapping.transforms);
        gate_response(step.response_schema.as_ref(), &result).map_err(|error| {
            InvocationFailure {
                error,
                attempts: inv.attempts,
            }
        })?;

        Ok(StepOutput {
            result,
            status: inv.response.status,
            attempts: inv.attempts,
            headers: inv.headers,
        })
    }
}
