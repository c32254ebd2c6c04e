//! REST API types.
//!
//! Students are returned already sorted, least accumulated time first.

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{ParsedStudent, SelectedFile};
use crate::parser::FileFormat;
use crate::roster::LoadedRoster;

/// Response sent after a roster file is parsed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready", "warning"
    pub status: String,

    pub students: Vec<ParsedStudent>,

    pub metadata: RosterMetadata,
}

/// What was learned about the file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterMetadata {
    pub file_name: String,
    pub media_type: String,
    pub format: FileFormat,
    /// Rows extracted before filtering
    pub row_count: usize,
    pub student_count: usize,
}

impl RosterResponse {
    /// `warning` when some rows were skipped for lacking a name or a time.
    pub fn new(file: &SelectedFile, loaded: LoadedRoster) -> Self {
        let status = if loaded.skipped_rows() == 0 { "ready" } else { "warning" };
        let metadata = RosterMetadata {
            file_name: file.name.clone(),
            media_type: file.media_type.clone(),
            format: loaded.format,
            row_count: loaded.row_count,
            student_count: loaded.roster.len(),
        };

        RosterResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            students: loaded.roster.into_students(),
            metadata,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "students": [],
    })
}
