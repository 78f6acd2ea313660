use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use corrector_core::MappingConfig;

use crate::store::types::AuditRecord;

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid regex"));

/// Mapping keys double as file names, so they are restricted to a safe
/// alphabet and may not be `.` or `..`.
pub fn is_valid_key(key: &str) -> bool {
    KEY_RE.is_match(key) && key != "." && key != ".."
}

#[async_trait]
pub trait MappingStore: Send + Sync {
    /// `Ok(None)` when no mapping is stored under `key`.
    async fn find_mapping(&self, key: &str) -> Result<Option<MappingConfig>, StoreError>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, record: &AuditRecord) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid mapping key {0:?}")]
    InvalidKey(String),
    #[error("mapping {key} is unreadable: {message}")]
    Corrupt { key: String, message: String },
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Other(e.to_string())
    }
}
