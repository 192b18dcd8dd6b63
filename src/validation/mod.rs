//! Field and form validation.
//!
//! Each form kind has a fixed list of [`FieldSpec`](crate::model::FieldSpec)s held by the
//! [`FormRegistry`]. A field is checked against the rule implied by its kind and
//! constraints; a form is valid when every one of its fields is.

pub mod field;
pub mod form;
pub mod input;
pub mod patterns;
pub mod registry;

pub use field::{validate_field, validate_field_on, FieldErrorCode, ValidationResult};
pub use form::{validate_form, validate_form_on, FormValidation};
pub use input::{sanitize_phone_input, CONFIRMATION_DISPLAY};
pub use registry::FormRegistry;
