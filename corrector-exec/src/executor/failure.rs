use serde_json::{json, Value as JsonValue};

use crate::auth::AuthError;
use crate::http::HttpError;
use crate::schema::SchemaViolation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Network,
    /// The remote answered outside 2xx.
    Status,
    ResponseTooLarge,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportFailure {
    pub kind: TransportKind,
    pub status: Option<u16>,
    pub body: Option<JsonValue>,
    pub message: String,
}

impl TransportFailure {
    pub fn status(status: u16, body: JsonValue) -> Self {
        Self {
            kind: TransportKind::Status,
            status: Some(status),
            body: Some(body),
            message: format!("target returned status {status}"),
        }
    }
}

impl From<HttpError> for TransportFailure {
    fn from(e: HttpError) -> Self {
        let kind = match &e {
            HttpError::Timeout => TransportKind::Timeout,
            HttpError::Network(_) => TransportKind::Network,
            HttpError::ResponseTooLarge { .. } => TransportKind::ResponseTooLarge,
            HttpError::Other(_) => TransportKind::Other,
        };
        Self {
            kind,
            status: None,
            body: None,
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecuteError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("auth validation failed: {0}")]
    Validation(AuthError),
    #[error("token acquisition failed: {0}")]
    TokenAcquisition(String),
    #[error("transport error: {}", .0.message)]
    Transport(TransportFailure),
    #[error("request violates schema ({} errors)", .violations.len())]
    RequestContract { violations: Vec<SchemaViolation> },
    #[error("response violates schema ({} errors)", .violations.len())]
    ResponseContract { violations: Vec<SchemaViolation> },
    #[error("transform error: {0}")]
    Transform(String),
    #[error("step '{step}' failed: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<ExecuteError>,
    },
}

impl From<AuthError> for ExecuteError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::TokenAcquisition(msg) => ExecuteError::TokenAcquisition(msg),
            other => ExecuteError::Validation(other),
        }
    }
}

impl From<HttpError> for ExecuteError {
    fn from(e: HttpError) -> Self {
        ExecuteError::Transport(e.into())
    }
}

impl ExecuteError {
    /// Only transport and token failures consume further attempts.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.root(),
            ExecuteError::Transport(_) | ExecuteError::TokenAcquisition(_)
        )
    }

    /// Failures `errorMapping` may turn into a result. Contract and
    /// configuration errors always propagate.
    pub fn is_mappable(&self) -> bool {
        self.is_retryable()
    }

    /// The underlying failure, past any step wrapper.
    pub fn root(&self) -> &ExecuteError {
        match self {
            ExecuteError::Step { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn step(&self) -> Option<&str> {
        match self {
            ExecuteError::Step { step, .. } => Some(step),
            _ => None,
        }
    }

    pub fn in_step(self, step: &str) -> Self {
        ExecuteError::Step {
            step: step.to_string(),
            source: Box::new(self),
        }
    }

    /// Status reported for this failure when it leaves the engine.
    pub fn status_code(&self) -> u16 {
        match self.root() {
            ExecuteError::Configuration(_) | ExecuteError::Transform(_) => 500,
            ExecuteError::Validation(_) | ExecuteError::RequestContract { .. } => 400,
            ExecuteError::TokenAcquisition(_) | ExecuteError::ResponseContract { .. } => 502,
            ExecuteError::Transport(t) => match (t.kind, t.status) {
                (_, Some(status)) => status,
                (TransportKind::Timeout, None) => 504,
                _ => 502,
            },
            ExecuteError::Step { .. } => 500,
        }
    }

    /// The document fed to `errorMapping`: the remote body when there is
    /// one, otherwise `{message, status}`.
    pub fn failure_document(&self) -> JsonValue {
        if let ExecuteError::Transport(TransportFailure {
            body: Some(body), ..
        }) = self.root()
        {
            if !body.is_null() {
                return body.clone();
            }
        }
        json!({
            "message": self.root().to_string(),
            "status": self.status_code(),
        })
    }
}
