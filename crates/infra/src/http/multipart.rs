//! `reqwest` multipart forms built from [`FormData`]

use canvas_core::{FormData, FormValue};
use reqwest::multipart::{Form, Part};

use crate::api::ApiError;

/// Build the wire form, keeping field order. File attachments are read
/// here, so a missing file fails before anything is sent.
///
/// # Errors
/// [`ApiError::Upload`] when a file cannot be read or a content type is
/// not a valid MIME type.
pub async fn to_multipart(form: FormData) -> Result<Form, ApiError> {
    let mut multipart = Form::new();

    for (key, value) in form.into_fields() {
        multipart = match value {
            FormValue::Text(text) => multipart.text(key, text),
            FormValue::Data { filename, content_type, data } => {
                multipart.part(key, attachment(data, filename, &content_type)?)
            }
            FormValue::File { filename, content_type, path } => {
                let data = tokio::fs::read(&path).await.map_err(|e| {
                    ApiError::Upload(format!("Failed to read {}: {e}", path.display()))
                })?;
                multipart.part(key, attachment(data, filename, &content_type)?)
            }
        };
    }

    Ok(multipart)
}

/// `Content-Type` for `form`, in the `charset=utf-8; boundary="..."` form
/// Canvas upload targets expect.
pub fn content_type(form: &Form) -> String {
    FormData::content_type(form.boundary())
}

fn attachment(data: Vec<u8>, filename: String, content_type: &str) -> Result<Part, ApiError> {
    Part::bytes(data)
        .file_name(filename)
        .mime_str(content_type)
        .map_err(|e| ApiError::Upload(format!("Invalid content type {content_type:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[tokio::test]
    async fn missing_file_fails_before_sending() {
        let form = FormData::new().field(
            "file",
            FormValue::File {
                filename: "gone.bin".into(),
                content_type: "application/octet-stream".into(),
                path: PathBuf::from("/definitely/not/here.bin"),
            },
        );

        match to_multipart(form).await {
            Err(ApiError::Upload(msg)) => assert!(msg.contains("here.bin")),
            other => panic!("expected upload error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn rejects_invalid_content_type() {
        let form = FormData::new().field(
            "file",
            FormValue::Data {
                filename: "x".into(),
                content_type: "not a mime".into(),
                data: vec![1],
            },
        );
        assert!(matches!(to_multipart(form).await, Err(ApiError::Upload(_))));
    }

    #[tokio::test]
    async fn content_type_carries_form_boundary() {
        let form = to_multipart(FormData::new().text("key", "abc")).await.unwrap();
        let boundary = form.boundary().to_string();
        assert_eq!(
            content_type(&form),
            format!("multipart/form-data; charset=utf-8; boundary=\"{boundary}\"")
        );
    }
}
