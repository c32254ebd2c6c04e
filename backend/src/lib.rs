//! # Rosterload - course activity exports to student rosters
//!
//! Rosterload reads activity exports from learning platforms (spreadsheets,
//! delimited text or XML), finds the student name and accumulated time in
//! each record whatever the column spelling, and returns the students
//! sorted by least time spent.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  XLSX/CSV/  │────▶│   Parser    │────▶│   Fields +  │────▶│   Roster    │
//! │     XML     │     │  (raw rows) │     │  Durations  │     │  (sorted)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        └──────────▶ upload endpoint (concurrently, metadata only)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rosterload::{load_roster, SelectedFile};
//!
//! let file = SelectedFile::from_path(Path::new("curso.xlsx"), None)?;
//! let loaded = load_roster(&file)?;
//! println!("{} students", loaded.roster.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`config`] - Environment-based settings
//! - [`models`] - Selected file, raw rows, students and roster
//! - [`parser`] - Format detection and row extraction
//! - [`roster`] - Field resolution, duration parsing, roster building
//! - [`submit`] - Upload client and submission state machine
//! - [`api`] - HTTP API server and log stream

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Row extraction
pub mod parser;

// Roster building
pub mod roster;

// Submission
pub mod submit;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    FormatError, FormatResult, ServerError, ServerResult, SubmissionError, SubmissionResult,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::Settings;

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{ParsedStudent, RawRow, RawValue, Roster, SelectedFile};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    detect_format,
    extract_rows,
    parse_delimited,
    parse_markup,
    parse_workbook,
    FileFormat,
};

// =============================================================================
// Re-exports - Roster
// =============================================================================

pub use roster::{
    build_roster,
    format_duration,
    load_roster,
    matching_grammar,
    parse_duration,
    resolve,
    CanonicalField,
    LoadedRoster,
};

// =============================================================================
// Re-exports - Submission
// =============================================================================

pub use submit::{
    extract_metadata,
    submit_file,
    StatusKind,
    StatusMessage,
    SubmissionOutcome,
    SubmissionState,
    SubmissionTracker,
    UploadClient,
    UploadMetadata,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, RosterMetadata, RosterResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
