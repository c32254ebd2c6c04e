//! Submission of a selected file.
//!
//! The upload to the remote endpoint and the local roster parse are
//! independent; they run concurrently and their results are combined into
//! one terminal [`SubmissionState`].

pub mod client;
pub mod state;

pub use client::{extract_metadata, UploadClient, UploadMetadata};
pub use state::{
    validate_selection, StatusKind, StatusMessage, SubmissionOutcome, SubmissionState,
    SubmissionTicket, SubmissionTracker,
};

use crate::api::logs::{log_error, log_info, log_success};
use crate::error::{FormatError, SubmissionError, SubmissionResult};
use crate::models::SelectedFile;
use crate::roster::{load_roster, LoadedRoster};

/// Run one submission through the tracker.
///
/// Returns `Err(AlreadySubmitting)` when another submission is in flight,
/// `Ok(None)` when this submission was abandoned before it finished, and
/// the terminal state otherwise.
pub async fn submit_file(
    tracker: &SubmissionTracker,
    client: &UploadClient,
    file: Option<&SelectedFile>,
    max_file_size: usize,
) -> SubmissionResult<Option<SubmissionState>> {
    let ticket = tracker.begin()?;

    let result = match validate_selection(file, max_file_size) {
        Ok(file) => run_submission(client, file).await,
        Err(err) => Err(err),
    };

    let state = tracker.finish(ticket, result);
    if let Some(message) = state.as_ref().and_then(SubmissionState::status_message) {
        match message.kind {
            StatusKind::Success => log_success(message.text),
            StatusKind::Error => log_error(message.text),
        }
    }
    Ok(state)
}

async fn run_submission(
    client: &UploadClient,
    file: &SelectedFile,
) -> SubmissionResult<SubmissionOutcome> {
    log_info(format!("📤 Uploading {} to {}", file.name, client.upload_url()));

    let (uploaded, parsed) = tokio::join!(client.upload(file), async { load_roster(file) });
    combine(uploaded, parsed)
}

fn combine(
    uploaded: SubmissionResult<Option<UploadMetadata>>,
    parsed: Result<LoadedRoster, FormatError>,
) -> SubmissionResult<SubmissionOutcome> {
    let metadata = uploaded?;
    match parsed {
        Ok(loaded) => Ok(SubmissionOutcome::WithRoster {
            roster: loaded.roster,
            metadata,
        }),
        Err(FormatError::Unsupported(_)) => Ok(SubmissionOutcome::WithMetadata(metadata)),
        Err(err) => Err(SubmissionError::Format(err)),
    }
}
