mod rules;
mod validator;

use crate::error::ValidationError;
use crate::types::MappingConfig;
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for MappingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_mapping(self)
    }
}

pub fn validate_mapping(mapping: &MappingConfig) -> Result<(), ValidationError> {
    let mut v = Validator::new(mapping);
    v.validate_mapping(mapping);
    v.finish()
}
