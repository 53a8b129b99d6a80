use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::{
    CreateDiagramRequest, LatestDiagramResponse, MoveDiagramRequest, UpdateDiagramRequest,
};
use crate::server::response::{ApiError, OperationResponse, StoreResultExt};
use crate::types::DiagramSummary;

pub async fn list_diagrams(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let diagrams = state
        .diagrams()
        .get_all()
        .api_err("Failed to retrieve diagrams")?;

    let summaries: Vec<DiagramSummary> = diagrams.iter().map(DiagramSummary::from).collect();

    Ok::<_, ApiError>(Json(summaries))
}

pub async fn get_latest_diagram(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let latest = state
        .diagrams()
        .get_latest()
        .api_err("Failed to retrieve diagram")?;

    let response = match latest {
        Some(diagram) => LatestDiagramResponse::Found(diagram),
        None => LatestDiagramResponse::Empty { content: None },
    };

    Ok::<_, ApiError>(Json(response))
}

pub async fn create_diagram(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateDiagramRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;

    let Some(content) = req.content else {
        return Err(ApiError::missing_fields());
    };
    if content.is_empty() {
        return Err(ApiError::bad_request("Invalid request. Empty content."));
    }

    let diagram = state
        .diagrams()
        .create(&content, req.name.as_deref(), req.folder_id)
        .api_err("Failed to create diagram")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(diagram)))
}

pub async fn get_diagram(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let diagram = state
        .diagrams()
        .get(id)
        .api_err("Failed to retrieve diagram")?;

    Ok::<_, ApiError>(Json(diagram))
}

pub async fn update_diagram(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateDiagramRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;

    if req.content.is_none() && req.name.is_none() {
        return Err(ApiError::missing_fields());
    }

    let diagram = state
        .diagrams()
        .update(id, req.into())
        .api_err("Failed to update diagram")?;

    Ok::<_, ApiError>(Json(diagram))
}

pub async fn delete_diagram(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state
        .diagrams()
        .delete(id)
        .api_err("Failed to delete diagram")?;

    Ok::<_, ApiError>(Json(OperationResponse::ok(format!(
        "Diagram {id} deleted"
    ))))
}

pub async fn move_diagram(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<MoveDiagramRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;

    let Some(folder_id) = req.folder_id else {
        return Err(ApiError::missing_fields());
    };

    state
        .diagrams()
        .move_to(id, folder_id)
        .api_err("Failed to move diagram")?;

    Ok::<_, ApiError>(Json(OperationResponse::ok(format!(
        "Diagram {id} moved to folder {folder_id}"
    ))))
}
