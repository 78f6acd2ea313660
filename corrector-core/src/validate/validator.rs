use std::collections::BTreeMap;

use crate::error::{ValidationError, Violation};
use crate::types::MappingConfig;

use super::rules;

pub struct Validator<'m> {
    violations: Vec<Violation>,
    custom_transforms: &'m BTreeMap<String, String>,
}

impl<'m> Validator<'m> {
    pub fn new(mapping: &'m MappingConfig) -> Self {
        Self {
            violations: Vec::new(),
            custom_transforms: &mapping.transforms,
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.violations))
        }
    }

    pub fn validate_mapping(&mut self, mapping: &MappingConfig) {
        rules::mapping::validate_mapping(self, mapping);
    }

    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    pub(crate) fn has_custom_transform(&self, name: &str) -> bool {
        self.custom_transforms.contains_key(name)
    }
}
