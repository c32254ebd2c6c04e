//! Error types for the roster extraction pipeline.
//!
//! - [`FormatError`] - the file content cannot be decoded in its detected format
//! - [`SubmissionError`] - terminal failures of one upload attempt
//! - [`ServerError`] - HTTP layer failures
//!
//! Conversion is automatic via `From` implementations, so `?` works
//! across layer boundaries.

use thiserror::Error;

// =============================================================================
// Format Errors
// =============================================================================

/// The file could not be decoded according to its detected format.
///
/// Distinct from "no rows found": an empty roster is not a format error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// The markup document is not well-formed.
    #[error("Malformed XML document: {0}")]
    MalformedMarkup(String),

    /// The spreadsheet binary could not be opened.
    #[error("Cannot open spreadsheet: {0}")]
    UnreadableWorkbook(String),

    /// The workbook has no worksheet to read.
    #[error("Spreadsheet contains no worksheet")]
    NoWorksheet,

    /// Delimited text could not be read.
    #[error("Cannot read delimited text: {0}")]
    UnreadableText(String),

    /// The file is neither a spreadsheet nor an XML export.
    #[error("Unsupported file type: {0}")]
    Unsupported(String),
}

// =============================================================================
// Submission Errors
// =============================================================================

/// Terminal failures of one submission. None of them is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    /// No file was chosen; no request was sent.
    #[error("No file selected")]
    NoFileSelected,

    /// The selected file has no content.
    #[error("The selected file is empty")]
    EmptyFile,

    /// The selected file exceeds the accepted size.
    #[error("File is too large ({size} bytes, max {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    /// The upload request failed or returned a non-success status.
    #[error("Upload failed: {0}")]
    Transport(String),

    /// The file content could not be decoded.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The file decoded but no row looks like a student record.
    #[error("The file was uploaded, but it contains no student with a name and a recorded time")]
    EmptyRoster,

    /// Another submission is still in flight.
    #[error("A submission is already in progress")]
    AlreadySubmitting,
}

impl SubmissionError {
    /// Whether the failure happened before any I/O took place.
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            Self::NoFileSelected | Self::EmptyFile | Self::FileTooLarge { .. }
        )
    }
}

impl From<reqwest::Error> for SubmissionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Submission-level error surfaced through the API.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The request body exceeded the accepted size before the file was read.
    #[error("Request too large: {0}")]
    PayloadTooLarge(String),

    /// IO failure while binding or serving.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decoding operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Result type for submissions.
pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_converts_to_submission_error() {
        let err: SubmissionError = FormatError::MalformedMarkup("unexpected end".into()).into();
        assert!(matches!(err, SubmissionError::Format(_)));
        assert!(err.to_string().contains("unexpected end"));
    }

    #[test]
    fn test_selection_errors() {
        assert!(SubmissionError::NoFileSelected.is_selection_error());
        assert!(SubmissionError::FileTooLarge { size: 10, max: 5 }.is_selection_error());
        assert!(!SubmissionError::EmptyRoster.is_selection_error());
        assert!(!SubmissionError::Transport("503".into()).is_selection_error());
    }

    #[test]
    fn test_empty_roster_message_differs_from_format_error() {
        let empty = SubmissionError::EmptyRoster.to_string();
        let format = SubmissionError::from(FormatError::NoWorksheet).to_string();
        assert_ne!(empty, format);
        assert!(empty.contains("no student"));
    }
}
