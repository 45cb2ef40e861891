use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Deserialize;

use floodaware_common::api::analyze::IMAGE_FIELD;
use floodaware_common::ids::PageId;
use floodaware_common::types::{AnalysisMode, CoordinateInput};

use crate::render;
use crate::server::AppState;
use crate::submission::{SubmissionFlow, SubmissionSnapshot, SubmitOutcome};

type RouteError = (StatusCode, String);

const ANALYZER_PATH: &str = "/flood-detection";

#[derive(Debug, Deserialize)]
pub struct ModeForm {
    pub mode: String,
}

// ---------------------------------------------------------------------------
// Static pages
// ---------------------------------------------------------------------------

/// GET /: Landing page.
pub async fn home_handler() -> Html<String> {
    Html(render::home_page())
}

/// GET /about
pub async fn about_handler() -> Html<String> {
    Html(render::about_page())
}

// ---------------------------------------------------------------------------
// Page lifecycle
// ---------------------------------------------------------------------------

/// GET /flood-detection: Mount a fresh page and send the browser to it.
pub async fn mount_handler(State(state): State<Arc<AppState>>) -> Redirect {
    let flow = state.registry.mount().await;
    Redirect::to(&render::page_path(flow.page_id()))
}

/// GET /flood-detection/{id}: Render a mounted page. Unknown or expired
/// pages start over with a fresh mount.
pub async fn page_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let Some(flow) = lookup(&state, &raw_id).await else {
        return Redirect::to(ANALYZER_PATH).into_response();
    };
    let snapshot = flow.snapshot();
    Html(render::flood_detection_page(
        flow.page_id(),
        &snapshot,
        state.max_image_bytes,
    ))
    .into_response()
}

/// GET /flood-detection/{id}/state: The page state as JSON.
pub async fn state_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<SubmissionSnapshot>, RouteError> {
    let flow = mounted(&state, &raw_id).await?;
    Ok(Json(flow.snapshot()))
}

/// POST /flood-detection/{id}/close: Unmount the page.
pub async fn close_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Redirect, RouteError> {
    let page_id = parse_page_id(&raw_id)?;
    if !state.registry.unmount(page_id).await {
        return Err(not_found(&raw_id));
    }
    Ok(Redirect::to("/"))
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// POST /flood-detection/{id}/mode
pub async fn mode_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Form(form): Form<ModeForm>,
) -> Result<Redirect, RouteError> {
    let flow = mounted(&state, &raw_id).await?;
    let mode: AnalysisMode = form
        .mode
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;
    flow.select_mode(mode);
    Ok(back_to(&flow))
}

/// POST /flood-detection/{id}/coordinates: Validate and analyze.
pub async fn coordinates_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Form(input): Form<CoordinateInput>,
) -> Result<Redirect, RouteError> {
    let flow = mounted(&state, &raw_id).await?;
    settle(&flow, flow.submit_coordinates(input)).await;
    Ok(back_to(&flow))
}

/// POST /flood-detection/{id}/image: Select an image (multipart field `file`).
/// The part is streamed and buffered only up to the image limit; anything
/// larger is drained and rejected as too large.
pub async fn select_image_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Redirect, RouteError> {
    let flow = mounted(&state, &raw_id).await?;
    let mut handled = false;

    while let Some(mut field) = multipart.next_field().await.map_err(bad_multipart)? {
        if handled || field.name() != Some(IMAGE_FIELD) {
            drain(&mut field).await.map_err(bad_multipart)?;
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        // A rejected file is recorded as the page's error.
        match read_capped(&mut field, state.max_image_bytes)
            .await
            .map_err(bad_multipart)?
        {
            Upload::TooLarge(size) => {
                flow.reject_image_size(size);
                handled = true;
            }
            // Browsers send an empty unnamed part when no file was chosen.
            Upload::Complete(bytes) if bytes.is_empty() && file_name.is_empty() => {}
            Upload::Complete(bytes) => {
                let _ = flow.select_image(&file_name, &content_type, bytes);
                handled = true;
            }
        }
    }

    Ok(back_to(&flow))
}

/// POST /flood-detection/{id}/image/remove
pub async fn remove_image_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Redirect, RouteError> {
    let flow = mounted(&state, &raw_id).await?;
    flow.remove_image();
    Ok(back_to(&flow))
}

/// GET /flood-detection/{id}/image/preview: The selected image's bytes.
pub async fn image_preview_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, RouteError> {
    let flow = mounted(&state, &raw_id).await?;
    let (content_type, bytes) = flow
        .image_preview()
        .ok_or_else(|| (StatusCode::NOT_FOUND, "no image selected".to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type.as_mime()),
            (header::CACHE_CONTROL, "no-store"),
        ],
        bytes,
    )
        .into_response())
}

/// POST /flood-detection/{id}/image/analyze
pub async fn analyze_image_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Redirect, RouteError> {
    let flow = mounted(&state, &raw_id).await?;
    settle(&flow, flow.submit_image()).await;
    Ok(back_to(&flow))
}

/// POST /flood-detection/{id}/dismiss: Acknowledge the error dialog.
pub async fn dismiss_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Redirect, RouteError> {
    let flow = mounted(&state, &raw_id).await?;
    flow.dismiss_error();
    Ok(back_to(&flow))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

enum Upload {
    Complete(Vec<u8>),
    /// Total size of a part that went past the cap.
    TooLarge(u64),
}

/// Read a multipart part, keeping at most `cap` bytes in memory. A larger
/// part is read to the end and only its size is kept.
async fn read_capped(field: &mut Field<'_>, cap: u64) -> Result<Upload, MultipartError> {
    let mut bytes = Vec::new();
    let mut total: u64 = 0;
    while let Some(chunk) = field.chunk().await? {
        total = total.saturating_add(chunk.len() as u64);
        if total > cap {
            bytes = Vec::new();
        } else {
            bytes.extend_from_slice(&chunk);
        }
    }
    if total > cap {
        Ok(Upload::TooLarge(total))
    } else {
        Ok(Upload::Complete(bytes))
    }
}

async fn drain(field: &mut Field<'_>) -> Result<(), MultipartError> {
    while field.chunk().await?.is_some() {}
    Ok(())
}

fn bad_multipart(e: MultipartError) -> RouteError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn parse_page_id(raw_id: &str) -> Result<PageId, RouteError> {
    raw_id.parse().map_err(|_| not_found(raw_id))
}

fn not_found(raw_id: &str) -> RouteError {
    (StatusCode::NOT_FOUND, format!("page {} is not mounted", raw_id))
}

async fn lookup(state: &AppState, raw_id: &str) -> Option<Arc<SubmissionFlow>> {
    let page_id: PageId = raw_id.parse().ok()?;
    state.registry.get(page_id).await
}

async fn mounted(state: &AppState, raw_id: &str) -> Result<Arc<SubmissionFlow>, RouteError> {
    lookup(state, raw_id).await.ok_or_else(|| not_found(raw_id))
}

/// Wait for a started attempt to finish so the redirect shows its outcome.
/// If the client goes away first, the attempt keeps running and the next
/// render shows the loading state.
async fn settle(flow: &SubmissionFlow, outcome: SubmitOutcome) {
    if let SubmitOutcome::Started(_) = outcome {
        flow.wait_idle().await;
    }
}

fn back_to(flow: &SubmissionFlow) -> Redirect {
    Redirect::to(&render::page_path(flow.page_id()))
}
