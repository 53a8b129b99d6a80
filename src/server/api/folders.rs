use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::{CreateFolderRequest, UpdateFolderRequest};
use crate::server::response::{ApiError, OperationResponse, StoreResultExt};
use crate::types::DiagramSummary;

/// The tree is wrapped in a list of top-level nodes; there is only ever one.
pub async fn get_folder_tree(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tree = state
        .folders()
        .get_tree()
        .api_err("Failed to retrieve folders")?;

    Ok::<_, ApiError>(Json(vec![tree]))
}

pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateFolderRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;

    let Some(name) = req.name else {
        return Err(ApiError::missing_fields());
    };

    let folder = state
        .folders()
        .create(&name, req.parent_id, req.is_root)
        .api_err("Failed to create folder")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(folder)))
}

pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let folder = state.folders().get(id).api_err("Failed to get folder")?;

    Ok::<_, ApiError>(Json(folder))
}

pub async fn update_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateFolderRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;

    if req.name.is_none() && req.parent_id.is_none() {
        return Err(ApiError::missing_fields());
    }

    let folder = state
        .folders()
        .update(id, req.into())
        .api_err("Failed to update folder")?;

    Ok::<_, ApiError>(Json(folder))
}

pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state
        .folders()
        .delete(id)
        .api_err("Failed to delete folder")?;

    Ok::<_, ApiError>(Json(OperationResponse::ok(format!("Folder {id} deleted"))))
}

pub async fn list_folder_diagrams(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let diagrams = state
        .diagrams()
        .get_by_folder(id)
        .api_err("Failed to list folder diagrams")?;

    let summaries: Vec<DiagramSummary> = diagrams.iter().map(DiagramSummary::from).collect();

    Ok::<_, ApiError>(Json(summaries))
}
