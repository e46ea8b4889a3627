use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{UpdateInstitution, INSTITUTION_STATUSES};
use crate::services::InstitutionService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_institutions))
        .route("/:id", put(update_institution).delete(delete_institution))
}

async fn list_institutions(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let service = InstitutionService::new(state.db.clone());
    let institutions = service.list().await?;

    Ok(Json(json!({
        "success": true,
        "data": institutions,
    })))
}

async fn update_institution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInstitution>,
) -> Result<Json<serde_json::Value>> {
    if !INSTITUTION_STATUSES.contains(&payload.status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Estado desconocido: {}",
            payload.status
        )));
    }

    let service = InstitutionService::new(state.db.clone());
    let institution = service.update(id, payload).await?;

    Ok(Json(json!({
        "success": true,
        "data": institution,
    })))
}

async fn delete_institution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let service = InstitutionService::new(state.db.clone());
    service.delete(id).await?;

    Ok(Json(json!({ "success": true })))
}
