use crate::{error::AppError, extract::JsonOrForm, response::ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use core_types::GradeRecord;
use database::DbError;
use serde_json::{json, Value};
use std::sync::Arc;
use validation::{validate_create, validate_update, CreateGradeRequest, UpdateGradeRequest};

/// # GET /api/
/// Describes the API and its endpoints.
pub async fn api_index() -> Json<Value> {
    Json(json!({
        "message": "Student grades API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "list": "GET /api/notas",
            "fetch": "GET /api/notas/:name",
            "create": "POST /api/notas/inserir",
            "update": "PUT /api/editar/:name",
            "delete": "DELETE /api/excluir/:name"
        }
    }))
}

/// # GET /api/notas
pub async fn list_grades(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<GradeRecord>>>, AppError> {
    let records = state.repo.list_all().await?;
    let total = records.len();
    Ok(Json(ApiResponse::data(records).with_total(total)))
}

/// # GET /api/notas/:name
pub async fn get_grade(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<GradeRecord>>, AppError> {
    let name = name.trim();
    let record = state
        .repo
        .find_by_name(name)
        .await?
        .ok_or_else(|| DbError::NotFound(name.to_string()))?;
    Ok(Json(ApiResponse::data(record)))
}

/// # POST /api/notas/inserir
/// The body (JSON or form-encoded) is validated in full before the repository
/// is touched.
pub async fn create_grade(
    State(state): State<Arc<AppState>>,
    JsonOrForm(request): JsonOrForm<CreateGradeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GradeRecord>>), AppError> {
    let new_record = validate_create(&request)?;
    let record = state.repo.create(new_record).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(record).with_message("student created")),
    ))
}

/// # PUT /api/editar/:name
/// Partial update: only the grades present in the body change.
pub async fn update_grade(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    JsonOrForm(request): JsonOrForm<UpdateGradeRequest>,
) -> Result<Json<ApiResponse<GradeRecord>>, AppError> {
    let update = validate_update(&request)?;
    let record = state.repo.update(name.trim(), update).await?;
    Ok(Json(ApiResponse::data(record).with_message("student updated")))
}

/// # DELETE /api/excluir/:name
pub async fn delete_grade(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<GradeRecord>>, AppError> {
    let record = state.repo.delete(name.trim()).await?;
    Ok(Json(ApiResponse::data(record).with_message("student deleted")))
}

/// # GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let database = state.repo.connection_state().await;
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "database": database.label(),
    }))
}

/// Any request that matched no route.
pub async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}
