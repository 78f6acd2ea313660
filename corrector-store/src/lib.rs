#![forbid(unsafe_code)]

pub mod fs;
pub mod memory;
pub mod store;

pub use crate::fs::{FsMappingStore, JsonlAuditStore};
pub use crate::memory::{MemoryAuditStore, MemoryMappingStore};
pub use crate::store::{is_valid_key, AuditRecord, AuditStore, MappingStore, StoreError};
