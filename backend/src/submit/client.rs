//! Upload client for the remote storage endpoint.
//!
//! The file is posted as a multipart body (field `file`). The response is
//! only mined for informational metadata; any non-success status is a
//! transport failure regardless of the body.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{SubmissionError, SubmissionResult};
use crate::models::SelectedFile;

/// File metadata reported back by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadMetadata {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// The two response shapes in use.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UploadResponseBody {
    Flat {
        name: String,
        size: u64,
        #[serde(rename = "type")]
        mime_type: String,
    },
    Nested {
        file: StoredFile,
    },
}

#[derive(Debug, Deserialize)]
struct StoredFile {
    original_name: String,
    size: u64,
    mime: String,
}

impl From<UploadResponseBody> for UploadMetadata {
    fn from(body: UploadResponseBody) -> Self {
        match body {
            UploadResponseBody::Flat {
                name,
                size,
                mime_type,
            } => UploadMetadata {
                name,
                size,
                mime_type,
            },
            UploadResponseBody::Nested { file } => UploadMetadata {
                name: file.original_name,
                size: file.size,
                mime_type: file.mime,
            },
        }
    }
}

/// Read metadata from a response body. Unknown shapes and non-JSON yield `None`.
pub fn extract_metadata(body: &str) -> Option<UploadMetadata> {
    serde_json::from_str::<UploadResponseBody>(body)
        .ok()
        .map(UploadMetadata::from)
}

/// HTTP client posting files to the upload endpoint.
#[derive(Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    upload_url: String,
}

impl UploadClient {
    pub fn new(upload_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: upload_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.upload_url())
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Post the file. No timeout is applied.
    pub async fn upload(&self, file: &SelectedFile) -> SubmissionResult<Option<UploadMetadata>> {
        let form = Form::new().part("file", file_part(file));

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::Transport(format!(
                "server returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body = response.text().await?;
        Ok(extract_metadata(&body))
    }
}

fn file_part(file: &SelectedFile) -> Part {
    let part = || Part::bytes(file.bytes.clone()).file_name(file.name.clone());
    if file.media_type.is_empty() {
        return part();
    }
    // an invalid declared media type is dropped rather than failing the upload
    part().mime_str(&file.media_type).unwrap_or_else(|_| part())
}
