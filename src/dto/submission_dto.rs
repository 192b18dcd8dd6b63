use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::model::{FieldSpec, FieldValue, FieldValues, FormKind, UploadedFile};
use crate::util::error::SubmissionError;
use crate::validation::FormRegistry;

/// Body returned when a submission is accepted.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SubmissionResponse {
    pub fn accepted(kind: FormKind, id: Option<String>) -> Self {
        SubmissionResponse {
            success: true,
            message: kind.success_message().to_string(),
            id,
        }
    }
}

/// Folds payload entries onto canonical field keys for one form kind.
///
/// Keys the form does not declare, and a second value for a key already seen
/// (directly or through an alias), are rejected.
pub struct PayloadBuilder<'a> {
    registry: &'a FormRegistry,
    kind: FormKind,
    values: FieldValues,
}

impl<'a> PayloadBuilder<'a> {
    pub fn new(registry: &'a FormRegistry, kind: FormKind) -> Self {
        PayloadBuilder { registry, kind, values: FieldValues::new() }
    }

    /// Reject keys the form does not declare, without recording a value.
    pub fn ensure_known(&self, key: &str) -> Result<(), SubmissionError> {
        self.resolve(key).map(|_| ())
    }

    fn resolve(&self, key: &str) -> Result<&'a FieldSpec, SubmissionError> {
        self.registry
            .resolve(self.kind, key)
            .ok_or_else(|| SubmissionError::InvalidPayload(format!("Unknown field: {}", key)))
    }

    fn canonical_key(&self, key: &str) -> Result<&'static str, SubmissionError> {
        let spec = self.resolve(key)?;
        if self.values.contains(spec.key) {
            return Err(SubmissionError::InvalidPayload(format!("Duplicate field: {}", spec.key)));
        }
        if spec.key != key {
            debug!("Folding '{}' onto '{}'", key, spec.key);
        }
        Ok(spec.key)
    }

    pub fn push_text(&mut self, key: &str, value: impl Into<String>) -> Result<(), SubmissionError> {
        let key = self.canonical_key(key)?;
        self.values.insert(FieldValue::text(key, value));
        Ok(())
    }

    pub fn push_file(&mut self, key: &str, file: UploadedFile) -> Result<(), SubmissionError> {
        let key = self.canonical_key(key)?;
        self.values.insert(FieldValue::file(key, file));
        Ok(())
    }

    pub fn finish(self) -> FieldValues {
        self.values
    }
}

/// Top-level members of a JSON object in document order, repeated keys included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonFields(pub Vec<(String, Value)>);

impl<'de> Deserialize<'de> for JsonFields {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = JsonFields;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object of form fields")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, Value>()? {
                    fields.push(entry);
                }
                Ok(JsonFields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// Flatten a JSON object body. Nulls count as absent; nested values are refused.
pub fn values_from_json(
    registry: &FormRegistry,
    kind: FormKind,
    body: JsonFields,
) -> Result<FieldValues, SubmissionError> {
    let mut builder = PayloadBuilder::new(registry, kind);
    for (key, value) in body.0 {
        let text = match value {
            Value::Null => {
                // still has to be a declared key
                builder.ensure_known(&key)?;
                continue;
            }
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(SubmissionError::InvalidPayload(format!(
                    "Field {} must be a single value",
                    key
                )))
            }
        };
        builder.push_text(&key, text)?;
    }
    Ok(builder.finish())
}

/// Urlencoded bodies arrive as ordered pairs; repeated keys are duplicates.
pub fn values_from_pairs(
    registry: &FormRegistry,
    kind: FormKind,
    pairs: Vec<(String, String)>,
) -> Result<FieldValues, SubmissionError> {
    let mut builder = PayloadBuilder::new(registry, kind);
    for (key, value) in pairs {
        builder.push_text(&key, value)?;
    }
    Ok(builder.finish())
}
