//! ECG upload endpoint

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, info};

use ecgv_common::LayoutKind;

use super::{ApiError, ApiResult};
use crate::{ecg, AppState};

/// Multipart field carrying the XML export
pub const FILE_FIELD: &str = "ecg_file";

/// Query parameters for POST /upload_ecg
#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    /// `stacked` or `clinical`; the configured default when absent
    pub layout: Option<String>,
}

/// POST /upload_ecg
///
/// Reads the `ecg_file` part, renders it and answers with the PNG. The
/// render runs on the blocking pool.
pub async fn upload_ecg(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let layout = match params.layout.as_deref() {
        Some(text) => text
            .parse::<LayoutKind>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => state.render.default_layout,
    };

    let (filename, bytes) = read_file_part(multipart).await?;
    info!(
        "Received '{}' ({} bytes), rendering {} layout",
        filename,
        bytes.len(),
        layout
    );

    let rasterizer = state.rasterizer.clone();
    let dpi = state.render.dpi;
    let png = tokio::task::spawn_blocking(move || {
        ecg::render_upload(&bytes, layout, dpi, &rasterizer)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("render task failed: {}", e)))??;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Find the file part and read it whole
///
/// A part only counts as a file when it carries a filename. Other parts are
/// skipped.
async fn read_file_part(mut multipart: Multipart) -> ApiResult<(String, Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            debug!("Field '{}' has no filename, not a file part", FILE_FIELD);
            continue;
        };
        if filename.is_empty() {
            return Err(ApiError::BadRequest("No file selected".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read upload", e))?;
        return Ok((filename, bytes));
    }

    Err(ApiError::BadRequest("No file part".to_string()))
}

/// 413 when the body limit cut the stream short, 400 otherwise
fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(format!("{}: {}", context, e))
    }
}
