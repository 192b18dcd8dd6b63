use bytes::Bytes;
use std::collections::HashMap;

/// A file received with a submission, held in memory until it is stored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub content: Bytes,
    pub size: usize,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, content: Bytes) -> Self {
        let size = content.len();
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content,
            size,
        }
    }

    /// Lower-cased extension of the original filename, if it has one.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.filename.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone)]
pub enum RawValue {
    Text(String),
    File(UploadedFile),
}

/// One submitted value keyed by its canonical field key.
#[derive(Debug, Clone)]
pub struct FieldValue {
    pub key: String,
    pub raw: RawValue,
}

impl FieldValue {
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), raw: RawValue::Text(value.into()) }
    }

    pub fn file(key: impl Into<String>, file: UploadedFile) -> Self {
        Self { key: key.into(), raw: RawValue::File(file) }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.raw {
            RawValue::Text(s) => Some(s.trim()),
            RawValue::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&UploadedFile> {
        match &self.raw {
            RawValue::File(f) => Some(f),
            RawValue::Text(_) => None,
        }
    }

    /// Empty text (after trimming) or a file without a name and without content.
    pub fn is_empty(&self) -> bool {
        match &self.raw {
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::File(f) => f.filename.trim().is_empty() && f.size == 0,
        }
    }
}

/// The decoded values of one submission.
#[derive(Debug, Clone, Default)]
pub struct FieldValues {
    values: HashMap<String, FieldValue>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(value.key.clone(), value)
    }

    pub fn with_text(mut self, key: &str, value: &str) -> Self {
        self.insert(FieldValue::text(key, value));
        self
    }

    pub fn with_file(mut self, key: &str, file: UploadedFile) -> Self {
        self.insert(FieldValue::file(key, file));
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Trimmed text of `key`, `None` when absent or blank.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(FieldValue::as_text)
            .filter(|s| !s.is_empty())
    }

    pub fn file(&self, key: &str) -> Option<&UploadedFile> {
        self.values.get(key).and_then(FieldValue::as_file)
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &UploadedFile)> {
        self.values
            .values()
            .filter_map(|v| v.as_file().map(|f| (v.key.as_str(), f)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        let file = UploadedFile::new("Sample.PDF", "application/pdf", Bytes::from_static(b"%PDF"));
        assert_eq!(file.extension(), Some("pdf".to_string()));
    }

    #[test]
    fn test_extension_missing() {
        let file = UploadedFile::new("README", "text/plain", Bytes::new());
        assert_eq!(file.extension(), None);
        let dotfile = UploadedFile::new(".bashrc", "text/plain", Bytes::new());
        assert_eq!(dotfile.extension(), None);
    }

    #[test]
    fn test_text_is_trimmed_and_blank_is_absent() {
        let values = FieldValues::new()
            .with_text("name", "  Jane Doe  ")
            .with_text("email", "   ");
        assert_eq!(values.text("name"), Some("Jane Doe"));
        assert_eq!(values.text("email"), None);
        assert!(values.get("email").is_some_and(FieldValue::is_empty));
    }
}
