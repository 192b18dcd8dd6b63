use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::model::{FieldSpec, FieldValues};
use crate::validation::field::{validate_field_on, ValidationResult};

/// Aggregate result for a whole form, one entry per spec in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormValidation {
    pub valid: bool,
    pub field_results: Vec<ValidationResult>,
}

impl FormValidation {
    /// The field that should receive focus.
    pub fn first_invalid(&self) -> Option<&ValidationResult> {
        self.field_results.iter().find(|r| !r.valid)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationResult> {
        self.field_results.iter().filter(|r| !r.valid)
    }

    pub fn result_for(&self, key: &str) -> Option<&ValidationResult> {
        self.field_results.iter().find(|r| r.field_key == key)
    }
}

pub fn validate_form(specs: &[FieldSpec], values: &FieldValues) -> FormValidation {
    validate_form_on(specs, values, Local::now().date_naive())
}

/// Every field is checked so that all problems can be reported at once.
pub fn validate_form_on(specs: &[FieldSpec], values: &FieldValues, today: NaiveDate) -> FormValidation {
    let field_results: Vec<ValidationResult> = specs
        .iter()
        .map(|spec| validate_field_on(spec, values.get(spec.key), today))
        .collect();
    let valid = field_results.iter().all(|r| r.valid);
    FormValidation { valid, field_results }
}
