pub mod form;
pub mod field_value;
pub mod submission;

pub use field_value::{FieldValue, FieldValues, RawValue, UploadedFile};
pub use form::{FieldConstraints, FieldKind, FieldSpec, FormKind};
pub use submission::{ContactMessage, GenericRequest, RecordError, SubmissionRecord, WriterApplication};
