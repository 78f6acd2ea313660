use std::collections::BTreeMap;
use std::time::Duration;

use corrector_core::AuthConfig;

use crate::auth::AuthContext;
use crate::executor::{ExecuteError, Executor, TransportFailure};
use crate::http::{HttpError, HttpResponseParts};
use crate::request::RequestDraft;
use crate::retry::{decide_retry, RetryConfig, RetryDecision};

/// A successful remote exchange.
pub(crate) struct Invocation {
    pub response: HttpResponseParts,
    pub attempts: u32,
    pub headers: BTreeMap<String, String>,
}

/// A failed exchange, with the number of attempts it consumed.
pub(crate) struct InvocationFailure {
    pub error: ExecuteError,
    pub attempts: u32,
}

impl Executor {
    /// AUTHENTICATE + INVOKE under the retry policy. Each attempt starts from
    /// the unauthenticated draft; cached tokens are reused across attempts.
    pub(crate) async fn invoke_with_retry(
        &self,
        draft: &RequestDraft,
        auth: Option<&AuthConfig>,
        retry: &RetryConfig,
        timeout: Duration,
    ) -> Result<Invocation, InvocationFailure> {
        let mut attempt_no: u32 = 0;
        loop {
            attempt_no += 1;
            tracing::debug!(attempt = attempt_no, url = %draft.url, "invoking target");

            match self.attempt(draft, auth, timeout).await {
                Ok((response, headers)) => {
                    return Ok(Invocation {
                        response,
                        attempts: attempt_no,
                        headers,
                    })
                }
                Err(error) => match decide_retry(retry, attempt_no, error.is_retryable()) {
                    RetryDecision::RetryAfter { delay } => {
                        tracing::warn!(
                            attempt = attempt_no,
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "attempt failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    RetryDecision::Stop { reason } => {
                        tracing::debug!(attempt = attempt_no, ?reason, "giving up");
                        return Err(InvocationFailure {
                            error,
                            attempts: attempt_no,
                        });
                    }
                },
            }
        }
    }

    async fn attempt(
        &self,
        draft: &RequestDraft,
        auth: Option<&AuthConfig>,
        timeout: Duration,
    ) -> Result<(HttpResponseParts, BTreeMap<String, String>), ExecuteError> {
        let mut draft = draft.clone();
        if let Some(auth) = auth {
            let settings = self.config().auth_settings();
            let ctx = AuthContext {
                http: self.http(),
                cache: self.token_cache(),
                settings: &settings,
            };
            tracing::debug!(auth_type = %auth.auth_type, "injecting credentials");
            self.auth_registry()
                .provider(auth.auth_type)
                .inject(&mut draft, auth, &ctx)
                .await?;
        }

        let parts = draft
            .build()
            .map_err(|e| ExecuteError::Configuration(e.to_string()))?;
        let headers = parts.headers.clone();

        let response = match tokio::time::timeout(
            timeout,
            self.http()
                .send(parts, timeout, self.config().max_response_bytes),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(HttpError::Timeout.into()),
        };

        if !response.is_success() {
            let body = response.body_value();
            return Err(ExecuteError::Transport(TransportFailure::status(
                response.status,
                body,
            )));
        }
        Ok((response, headers))
    }
}
