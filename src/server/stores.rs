use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::error::Error;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, RepoOptionExt, RepoResultExt};
use crate::server::validation::validate_store;
use crate::types::StoreInfo;

/// POST /stores - Register a store ahead of its first flyer
pub async fn create_store(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StoreInfo>,
) -> Result<impl IntoResponse, ApiError> {
    validate_store(&req)?;

    let store = match state.repository.create_store(&req) {
        Err(Error::AlreadyExists) => return Err(ApiError::conflict("Store already exists")),
        result => result.api_err("Failed to create store")?,
    };

    Ok((StatusCode::CREATED, Json(ApiResponse::success(store))))
}

pub async fn list_stores(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stores = state
        .repository
        .list_stores()
        .api_err("Failed to list stores")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(stores)))
}

pub async fn get_store(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state
        .repository
        .get_store(&id)
        .api_err("Failed to get store")?
        .or_not_found("Store not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(store)))
}
