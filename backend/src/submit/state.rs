//! Submission state machine.
//!
//! `Idle -> Submitting -> {Succeeded | Failed}`. Each submission holds a
//! ticket carrying a monotonically increasing sequence number; only the
//! latest ticket may move the machine out of `Submitting`, so a late
//! response from an abandoned attempt can never overwrite a newer result.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use super::client::UploadMetadata;
use crate::error::{SubmissionError, SubmissionResult};
use crate::models::{Roster, SelectedFile};

/// What a successful submission produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The file was uploaded and parsed into a roster.
    WithRoster {
        roster: Roster,
        metadata: Option<UploadMetadata>,
    },
    /// The file was uploaded but is not a roster format; only metadata is shown.
    WithMetadata(Option<UploadMetadata>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting {
        sequence: u64,
    },
    Succeeded(SubmissionOutcome),
    Failed(SubmissionError),
}

/// Styling flag for status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

impl SubmissionState {
    /// Short message for terminal states. `Idle` and `Submitting` have none.
    pub fn status_message(&self) -> Option<StatusMessage> {
        match self {
            Self::Idle | Self::Submitting { .. } => None,
            Self::Failed(err) => Some(StatusMessage::error(err.to_string())),
            Self::Succeeded(SubmissionOutcome::WithRoster { roster, .. }) => {
                let noun = if roster.len() == 1 { "student" } else { "students" };
                Some(StatusMessage::success(format!(
                    "File uploaded: {} {} loaded",
                    roster.len(),
                    noun
                )))
            }
            Self::Succeeded(SubmissionOutcome::WithMetadata(Some(meta))) => {
                Some(StatusMessage::success(format!(
                    "File uploaded: {} ({} bytes, {})",
                    meta.name, meta.size, meta.mime_type
                )))
            }
            Self::Succeeded(SubmissionOutcome::WithMetadata(None)) => {
                Some(StatusMessage::success("File uploaded"))
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

/// Proof that a submission was started. Not cloneable; consumed by `finish`.
#[derive(Debug, PartialEq, Eq)]
pub struct SubmissionTicket {
    sequence: u64,
}

impl SubmissionTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[derive(Debug, Default)]
struct TrackerInner {
    state: SubmissionState,
    latest: u64,
}

/// Shared submission state with a non-reentrant in-flight lock.
#[derive(Debug, Default)]
pub struct SubmissionTracker {
    inner: Mutex<TrackerInner>,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TrackerInner> {
        // state is replaced whole, a poisoned guard is still consistent
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a submission. Fails while another one is in flight.
    pub fn begin(&self) -> SubmissionResult<SubmissionTicket> {
        let mut inner = self.lock();
        if matches!(inner.state, SubmissionState::Submitting { .. }) {
            return Err(SubmissionError::AlreadySubmitting);
        }
        inner.latest += 1;
        let sequence = inner.latest;
        inner.state = SubmissionState::Submitting { sequence };
        Ok(SubmissionTicket { sequence })
    }

    /// Apply the result of a submission.
    ///
    /// Returns the new state, or `None` when the ticket is stale and the
    /// result was discarded. An empty roster becomes `Failed(EmptyRoster)`.
    pub fn finish(
        &self,
        ticket: SubmissionTicket,
        result: SubmissionResult<SubmissionOutcome>,
    ) -> Option<SubmissionState> {
        let mut inner = self.lock();
        let in_flight = matches!(
            inner.state,
            SubmissionState::Submitting { sequence } if sequence == ticket.sequence
        );
        if !in_flight || ticket.sequence != inner.latest {
            return None;
        }

        inner.state = match result {
            Ok(SubmissionOutcome::WithRoster { roster, .. }) if roster.is_empty() => {
                SubmissionState::Failed(SubmissionError::EmptyRoster)
            }
            Ok(outcome) => SubmissionState::Succeeded(outcome),
            Err(err) => SubmissionState::Failed(err),
        };
        Some(inner.state.clone())
    }

    /// Back to `Idle`. An in-flight submission is abandoned and its result discarded.
    pub fn reset(&self) {
        self.lock().state = SubmissionState::Idle;
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state.clone()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.lock().state, SubmissionState::Submitting { .. })
    }
}

/// Pre-flight checks run before any I/O.
pub fn validate_selection(file: Option<&SelectedFile>, max_size: usize) -> SubmissionResult<&SelectedFile> {
    let file = file.ok_or(SubmissionError::NoFileSelected)?;
    if file.bytes.is_empty() {
        return Err(SubmissionError::EmptyFile);
    }
    if file.size() > max_size {
        return Err(SubmissionError::FileTooLarge {
            size: file.size(),
            max: max_size,
        });
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParsedStudent;

    fn student(name: &str, secs: u64) -> ParsedStudent {
        ParsedStudent {
            full_name: name.to_string(),
            email: None,
            total_seconds: secs,
            display_time: crate::roster::format_duration(secs),
        }
    }

    #[test]
    fn test_second_begin_is_rejected_while_in_flight() {
        let tracker = SubmissionTracker::new();
        let ticket = tracker.begin().unwrap();
        assert!(tracker.is_submitting());
        assert_eq!(tracker.begin().unwrap_err(), SubmissionError::AlreadySubmitting);

        tracker.finish(ticket, Ok(SubmissionOutcome::WithMetadata(None)));
        assert!(!tracker.is_submitting());
        assert_eq!(tracker.begin().unwrap().sequence(), 2);
    }

    #[test]
    fn test_empty_roster_becomes_failure() {
        let tracker = SubmissionTracker::new();
        let ticket = tracker.begin().unwrap();
        let state = tracker
            .finish(
                ticket,
                Ok(SubmissionOutcome::WithRoster {
                    roster: Roster::default(),
                    metadata: None,
                }),
            )
            .unwrap();

        assert_eq!(state, SubmissionState::Failed(SubmissionError::EmptyRoster));
        assert_eq!(state.status_message().unwrap().kind, StatusKind::Error);
    }

    #[test]
    fn test_stale_result_is_discarded_after_reset() {
        let tracker = SubmissionTracker::new();
        let stale = tracker.begin().unwrap();
        tracker.reset();
        let fresh = tracker.begin().unwrap();

        assert!(tracker
            .finish(stale, Err(SubmissionError::Transport("timeout".into())))
            .is_none());
        assert!(tracker.is_submitting());

        let roster = Roster::from_students(vec![student("Ana García", 60)]);
        let state = tracker
            .finish(fresh, Ok(SubmissionOutcome::WithRoster { roster, metadata: None }))
            .unwrap();
        let message = state.status_message().unwrap();
        assert_eq!(message.kind, StatusKind::Success);
        assert_eq!(message.text, "File uploaded: 1 student loaded");
    }

    #[test]
    fn test_ticket_after_reset_to_idle_is_stale() {
        let tracker = SubmissionTracker::new();
        let ticket = tracker.begin().unwrap();
        tracker.reset();
        assert!(tracker.finish(ticket, Ok(SubmissionOutcome::WithMetadata(None))).is_none());
        assert_eq!(tracker.state(), SubmissionState::Idle);
    }

    #[test]
    fn test_metadata_status_message() {
        let state = SubmissionState::Succeeded(SubmissionOutcome::WithMetadata(Some(UploadMetadata {
            name: "notas.pdf".into(),
            size: 10,
            mime_type: "application/pdf".into(),
        })));
        assert_eq!(
            state.status_message().unwrap().text,
            "File uploaded: notas.pdf (10 bytes, application/pdf)"
        );
        assert!(SubmissionState::Idle.status_message().is_none());
    }

    #[test]
    fn test_validate_selection() {
        assert_eq!(validate_selection(None, 10).unwrap_err(), SubmissionError::NoFileSelected);

        let empty = SelectedFile::new("a.csv", "", Vec::new());
        assert_eq!(validate_selection(Some(&empty), 10).unwrap_err(), SubmissionError::EmptyFile);

        let big = SelectedFile::new("a.csv", "", vec![b'x'; 11]);
        assert_eq!(
            validate_selection(Some(&big), 10).unwrap_err(),
            SubmissionError::FileTooLarge { size: 11, max: 10 }
        );

        let ok = SelectedFile::new("a.csv", "", vec![b'x'; 10]);
        assert!(validate_selection(Some(&ok), 10).is_ok());
    }
}
