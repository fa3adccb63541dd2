use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::FlyerResponse;
use crate::server::response::{ApiError, ApiResponse, RepoOptionExt, RepoResultExt};
use crate::server::validation::validate_analysis;
use crate::types::FlyerAnalysis;

/// Keeps the status axum assigns, so a body over the size limit stays a 413.
fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    let status = e.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large("Upload exceeds maximum allowed size");
    }
    ApiError {
        status,
        message: format!("{context}: {e}"),
    }
}

struct FlyerUpload {
    image: Vec<u8>,
    analysis: FlyerAnalysis,
}

async fn parse_flyer_upload(
    multipart: &mut Multipart,
    max_upload_bytes: usize,
) -> Result<FlyerUpload, ApiError> {
    let mut image: Option<Vec<u8>> = None;
    let mut analysis: Option<FlyerAnalysis> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        match field.name() {
            Some("flyer_image") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read image", e))?;
                if data.len() > max_upload_bytes {
                    return Err(ApiError::payload_too_large(format!(
                        "Image size ({} bytes) exceeds maximum allowed size ({max_upload_bytes} bytes)",
                        data.len()
                    )));
                }
                image = Some(data.to_vec());
            }
            Some("flyer_data") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read flyer data", e))?;
                analysis = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| ApiError::bad_request(format!("Invalid flyer data: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ApiError::bad_request("No image was sent"))?;
    if image.is_empty() {
        return Err(ApiError::bad_request("Image is empty"));
    }
    let analysis = analysis.ok_or_else(|| ApiError::bad_request("flyer_data field is required"))?;

    Ok(FlyerUpload { image, analysis })
}

/// POST /flyer/upload - Store an analyzed flyer
pub async fn upload_flyer(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = parse_flyer_upload(&mut multipart, state.config.max_upload_bytes).await?;

    validate_analysis(&upload.analysis)?;

    let saved = state
        .repository
        .save_flyer(&upload.image, &upload.analysis)
        .api_err("Failed to save flyer data")?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(FlyerResponse::from_saved(
            saved,
            upload.analysis,
        ))),
    ))
}

/// GET /flyer/{store_id} - Most recent flyer for a store
pub async fn get_flyer(
    State(state): State<Arc<AppState>>,
    Path(store_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let flyer = state
        .repository
        .get_flyer_by_store_id(&store_id)
        .api_err("Failed to get flyer")?
        .or_not_found("No flyer found for this store")?;

    Ok(Json(ApiResponse::success(FlyerResponse::from(flyer))))
}
