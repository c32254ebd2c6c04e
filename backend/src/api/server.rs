//! HTTP Server for the rosterload API.
//!
//! Parses roster files posted by a browser front end. The remote upload is
//! not performed here; see [`crate::submit`] for that.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/roster`     | Parse a roster file                  |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, RosterResponse};
use crate::config::Settings;
use crate::error::{ServerError, ServerResult, SubmissionError};
use crate::models::SelectedFile;
use crate::roster::load_roster;
use crate::submit::validate_selection;

type ApiError = (StatusCode, Json<Value>);

const MULTIPART_HEADROOM: usize = 64 * 1024;

/// Build the application router.
pub fn router(settings: Arc<Settings>) -> Router {
    // permissive CORS for the browser front end
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    // headroom for multipart framing so oversize files reach the 413 check
    let body_limit = settings.max_file_size.saturating_add(MULTIPART_HEADROOM);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/roster", post(upload_roster))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(settings)
}

/// Start the HTTP server
pub async fn start_server(settings: Settings) -> ServerResult<()> {
    let port = settings.port;
    let app = router(Arc::new(settings));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Rosterload server running on http://localhost:{}", port);
    println!("   POST /api/roster - Parse a roster file");
    println!("   GET  /api/logs   - SSE log stream");
    println!("   GET  /health     - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "rosterload",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "roster": "POST /api/roster",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // lagged receivers skip the missed entries
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Roster upload endpoint
async fn upload_roster(
    State(settings): State<Arc<Settings>>,
    multipart: Multipart,
) -> Result<Json<RosterResponse>, ApiError> {
    let file = read_file_field(multipart).await.map_err(to_api_error)?;

    if let Some(ref file) = file {
        println!("\n{}", "=".repeat(70));
        println!("📄 NEW ROSTER: {} ({} bytes)", file.name, file.size());
        println!("{}\n", "=".repeat(70));
    }

    let response = roster_response(file.as_ref(), settings.max_file_size).map_err(|e| {
        log_error(e.to_string());
        to_api_error(e)
    })?;

    log_info(format!(
        "📊 {} of {} rows kept",
        response.metadata.student_count, response.metadata.row_count
    ));
    Ok(Json(response))
}

async fn read_file_field(mut multipart: Multipart) -> ServerResult<Option<SelectedFile>> {
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let media_type = field.content_type().unwrap_or("").to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        file = Some(SelectedFile::new(name, media_type, bytes.to_vec()));
    }

    Ok(file)
}

/// Body-limit rejections keep their 413; anything else is a bad request.
fn multipart_error(err: MultipartError) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(err.body_text())
    } else {
        ServerError::BadRequest(format!("Multipart error: {}", err.body_text()))
    }
}

/// Validate and parse one posted file. An empty roster is an error here.
pub fn roster_response(file: Option<&SelectedFile>, max_file_size: usize) -> ServerResult<RosterResponse> {
    let file = validate_selection(file, max_file_size)?;
    let loaded = load_roster(file).map_err(SubmissionError::from)?;
    if loaded.roster.is_empty() {
        return Err(SubmissionError::EmptyRoster.into());
    }
    Ok(RosterResponse::new(file, loaded))
}

fn status_for(err: &ServerError) -> StatusCode {
    match err {
        ServerError::Submission(SubmissionError::FileTooLarge { .. })
        | ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        ServerError::Submission(SubmissionError::Transport(_)) => StatusCode::BAD_GATEWAY,
        ServerError::Submission(SubmissionError::AlreadySubmitting) => StatusCode::CONFLICT,
        ServerError::Submission(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn to_api_error(err: ServerError) -> ApiError {
    (status_for(&err), Json(error_response(&err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::multipart::{Form, Part};

    async fn spawn(max_file_size: usize) -> String {
        let settings = Settings {
            max_file_size,
            ..Settings::default()
        };
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(Arc::new(settings))).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn post_file(base: &str, name: &str, mime: &str, bytes: &[u8]) -> (StatusCode, Value) {
        let part = Part::bytes(bytes.to_vec()).file_name(name.to_string()).mime_str(mime).unwrap();
        let response = reqwest::Client::new()
            .post(format!("{}/api/roster", base))
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    #[test]
    fn test_roster_response_errors() {
        let err = roster_response(None, 10).unwrap_err();
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);

        let big = SelectedFile::new("a.csv", "text/csv", vec![b'a'; 11]);
        let err = roster_response(Some(&big), 10).unwrap_err();
        assert_eq!(status_for(&err), StatusCode::PAYLOAD_TOO_LARGE);

        let no_time = SelectedFile::new("a.csv", "text/csv", b"Nombre,Apellidos\nAna,Garc\xc3\xada\n".to_vec());
        let err = roster_response(Some(&no_time), 100).unwrap_err();
        assert!(matches!(err, ServerError::Submission(SubmissionError::EmptyRoster)));
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn(1024).await;
        let body: Value = reqwest::get(format!("{}/health", base)).await.unwrap().json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "rosterload");
    }

    #[tokio::test]
    async fn test_upload_markup_roster() {
        let base = spawn(4096).await;
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <curso>
              <alumno nombre="Ana" apellidos="García"><tiempo>1:05:00</tiempo></alumno>
              <alumno nombre="Luis" apellidos="Ruiz"><tiempo>0:10</tiempo></alumno>
            </curso>"#;

        let (status, body) = post_file(&base, "curso.xml", "application/xml", xml.as_bytes()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["metadata"]["format"], "hierarchical");
        assert_eq!(body["students"][0]["fullName"], "Luis Ruiz");
        assert_eq!(body["students"][1]["totalSeconds"], 3900);
    }

    #[tokio::test]
    async fn test_upload_errors_map_to_status_codes() {
        let base = spawn(64).await;

        let (status, body) = post_file(&base, "a.xml", "text/xml", b"<curso><alumno>").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        let (status, _) = post_file(&base, "a.csv", "text/csv", &[b'x'; 100]).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_body_beyond_limit_is_payload_too_large() {
        let base = spawn(64).await;
        let (status, body) = post_file(&base, "a.csv", "text/csv", &vec![b'x'; 200_000]).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["status"], "error");
    }
}
