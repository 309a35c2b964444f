use std::collections::BTreeMap;

use super::errors::{EngineError, EngineResult};
use super::models::{Field, FieldValues};
use super::schema::FormSchema;

/// Per-field messages produced by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<Field, String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    /// First invalid field in form order, used to move focus.
    pub fn first_invalid(&self) -> Option<Field> {
        Field::ALL.into_iter().find(|field| self.errors.contains_key(field))
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

/// The validation engine seam used by the wizard controller.
pub trait Validator {
    /// Checks exactly `fields` against the full `values` snapshot.
    ///
    /// Field failures are reported in the returned [`ValidationReport`];
    /// `Err` means the engine could not run at all.
    fn validate(&self, values: &FieldValues, fields: &[Field]) -> EngineResult<ValidationReport>;
}

impl Validator for FormSchema {
    fn validate(&self, values: &FieldValues, fields: &[Field]) -> EngineResult<ValidationReport> {
        let mut report = ValidationReport::new();
        for &field in fields {
            if self.rules_for(field).is_none() {
                return Err(EngineError::NoRules(field));
            }
            if let Some(message) = self.first_failure(field, values) {
                report.add(field, message);
            }
        }
        Ok(report)
    }
}
