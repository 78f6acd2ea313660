mod auth;
mod mapping;
mod method;
mod transform;

pub use auth::{AuthConfig, AuthType};
pub use mapping::{MappingConfig, ResilienceConfig, TargetApi, WorkflowStep};
pub use method::{HttpMethod, UnknownMethod};
pub use transform::{ArraySpec, Condition, CustomSpec, FieldRule, ObjectSpec, TransformSpec};
