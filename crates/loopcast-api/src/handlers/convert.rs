//! Conversion submission handler.

use std::sync::atomic::Ordering;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use loopcast_models::{ConversionParams, OutputKind};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ConvertResponse {
    /// Path the finished artifact is served under.
    pub output: String,
    pub format: OutputKind,
}

/// Accept one video upload and convert it synchronously.
///
/// The response is sent only after the conversion has finished; progress in
/// the meantime is observable on the `/stream-output` endpoint. Only one
/// conversion may run at a time.
pub async fn convert(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ConvertResponse>> {
    let mut filename: Option<String> = None;
    let mut bytes: Vec<u8> = Vec::new();
    let mut params = ConversionParams::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        // Detach the name; reading the field's body consumes it.
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("video") => {
                filename = field.file_name().map(|n| n.to_string());
                bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?
                    .to_vec();
            }
            // Out-of-set values silently fall back, matching the closed
            // sets the submission form offers.
            Some("fps") => {
                if let Ok(text) = field.text().await {
                    params.fps = text.parse().unwrap_or_default();
                }
            }
            Some("scale") => {
                if let Ok(text) = field.text().await {
                    params.scale = text.parse().unwrap_or_default();
                }
            }
            Some("format") => {
                if let Ok(text) = field.text().await {
                    params.kind = text.parse().unwrap_or_default();
                }
            }
            other => {
                warn!("Ignoring unexpected form field: {:?}", other);
            }
        }
    }

    let filename = match filename {
        Some(name) if !name.is_empty() => name,
        _ => return Err(ApiError::NoFileSupplied),
    };

    // Single-flight: reject a second submission while one is running.
    if state
        .converting
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(ApiError::Conflict(
            "A conversion is already in progress".to_string(),
        ));
    }
    let converting = state.converting.clone();
    let _release = scopeguard::guard((), move |_| {
        converting.store(false, Ordering::SeqCst);
    });

    info!(
        fps = params.fps.as_u32(),
        scale = %params.scale,
        format = %params.kind,
        "Received conversion request for {}",
        filename
    );

    let outcome = state.converter.convert(&filename, &bytes, params).await?;

    Ok(Json(ConvertResponse {
        output: format!("/output/{}", outcome.output_name),
        format: outcome.format,
    }))
}
