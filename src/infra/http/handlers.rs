use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use super::HttpState;
use super::error::ApiError;
use super::models::{CreateCategoryRequest, UpdateCategoryRequest};

type PathId = Result<Path<Uuid>, PathRejection>;

fn category_id(path: PathId) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id).map_err(ApiError::invalid_id)
}

pub async fn index() -> &'static str {
    "arbor category service"
}

pub async fn health(State(state): State<HttpState>) -> Response {
    match state.categories.health_check().await {
        Ok(()) => (StatusCode::OK, "ok").into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

pub async fn create_category(
    State(state): State<HttpState>,
    body: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(ApiError::invalid_body)?;
    let record = state.categories.create_category(request.into()).await?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

pub async fn list_categories(State(state): State<HttpState>) -> Result<Response, ApiError> {
    let records = state.categories.list_categories().await?;
    Ok(Json(records).into_response())
}

pub async fn get_category(
    State(state): State<HttpState>,
    path: PathId,
) -> Result<Response, ApiError> {
    let id = category_id(path)?;
    let record = state.categories.get_category(id).await?;
    Ok(Json(record).into_response())
}

pub async fn update_category(
    State(state): State<HttpState>,
    path: PathId,
    body: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = category_id(path)?;
    let Json(request) = body.map_err(ApiError::invalid_body)?;
    let record = state.categories.update_category(id, request.into()).await?;
    Ok(Json(record).into_response())
}

pub async fn delete_category(
    State(state): State<HttpState>,
    path: PathId,
) -> Result<Response, ApiError> {
    let id = category_id(path)?;
    state.categories.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn category_lineage(
    State(state): State<HttpState>,
    path: PathId,
) -> Result<Response, ApiError> {
    let id = category_id(path)?;
    let records = state.categories.category_lineage(id).await?;
    Ok(Json(records).into_response())
}
