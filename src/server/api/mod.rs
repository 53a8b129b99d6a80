mod diagrams;
mod folders;
mod rewrite;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post, put},
};

use crate::server::AppState;
use crate::server::dto::HealthResponse;

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Diagmarm Builder API is running",
    })
}

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        // Model-assisted edits
        .route("/update-diagram", post(rewrite::update_diagram_with_ai))
        // Diagrams
        .route("/diagrams", get(diagrams::list_diagrams))
        .route(
            "/diagram",
            get(diagrams::get_latest_diagram).post(diagrams::create_diagram),
        )
        .route(
            "/diagram/{id}",
            get(diagrams::get_diagram)
                .put(diagrams::update_diagram)
                .delete(diagrams::delete_diagram),
        )
        .route("/diagram/{id}/move", put(diagrams::move_diagram))
        // Folders (hierarchical, single root)
        .route("/folders", get(folders::get_folder_tree))
        .route("/folder", post(folders::create_folder))
        .route(
            "/folder/{id}",
            get(folders::get_folder)
                .put(folders::update_folder)
                .delete(folders::delete_folder),
        )
        .route("/folder/{id}/diagrams", get(folders::list_folder_diagrams))
}
