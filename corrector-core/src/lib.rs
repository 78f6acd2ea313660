#![forbid(unsafe_code)]

pub mod error;
pub mod parser;
pub mod path;
pub mod transform;
pub mod types;
pub mod validate;

pub use crate::error::{CorrectorError, ParseError, ValidationError, Violation};
pub use crate::parser::{parse_mapping_str, DocumentFormat, ParsedMapping};
pub use crate::path::{PathError, PathExpr};
pub use crate::transform::{transform, transform_with_report, FieldError, TransformOutput};
pub use crate::types::{
    ArraySpec, AuthConfig, AuthType, Condition, CustomSpec, FieldRule, HttpMethod, MappingConfig,
    ObjectSpec, ResilienceConfig, TargetApi, TransformSpec, WorkflowStep,
};
pub use crate::validate::{validate_mapping, Validate};
