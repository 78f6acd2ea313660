use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use corrector_core::MappingConfig;

use crate::store::{AuditRecord, AuditStore, MappingStore, StoreError};

#[derive(Default)]
pub struct MemoryMappingStore {
    mappings: Mutex<HashMap<String, MappingConfig>>,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: impl Into<String>, mapping: MappingConfig) -> Self {
        self.insert(key, mapping);
        self
    }

    pub fn insert(&self, key: impl Into<String>, mapping: MappingConfig) {
        if let Ok(mut m) = self.mappings.lock() {
            m.insert(key.into(), mapping);
        }
    }
}

#[async_trait]
impl MappingStore for MemoryMappingStore {
    async fn find_mapping(&self, key: &str) -> Result<Option<MappingConfig>, StoreError> {
        let m = self
            .mappings
            .lock()
            .map_err(|_| StoreError::Other("mapping store lock poisoned".into()))?;
        Ok(m.get(key).cloned())
    }
}

#[derive(Default)]
pub struct MemoryAuditStore {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Other("audit store lock poisoned".into()))?
            .push(record.clone());
        Ok(())
    }
}
