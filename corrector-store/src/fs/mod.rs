mod audit;
mod mappings;

pub use audit::JsonlAuditStore;
pub use mappings::FsMappingStore;
