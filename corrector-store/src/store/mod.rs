mod trait_store;
mod types;

pub use trait_store::{is_valid_key, AuditStore, MappingStore, StoreError};
pub use types::AuditRecord;
