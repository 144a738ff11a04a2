//! Multipart form bodies for uploads
//!
//! Only the shape of the form lives here; the transport encodes it.

use std::path::PathBuf;

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    /// In-memory attachment
    Data { filename: String, content_type: String, data: Vec<u8> },
    /// Attachment read from disk when the request is sent
    File { filename: String, content_type: String, path: PathBuf },
}

/// Ordered `multipart/form-data` fields. Order is preserved because upload
/// targets (S3 and friends) require `file` to come last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), FormValue::Text(value.into())));
        self
    }

    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: FormValue) -> Self {
        self.fields.push((key.into(), value));
        self
    }

    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<(String, FormValue)> {
        self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Content-Type` header value for the given boundary.
    pub fn content_type(boundary: &str) -> String {
        format!("multipart/form-data; charset=utf-8; boundary=\"{boundary}\"")
    }
}
