use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};

use crate::rewrite::rewrite_or_original;
use crate::server::AppState;
use crate::server::dto::{RewriteRequest, RewriteResponse};
use crate::server::response::ApiError;

pub async fn update_diagram_with_ai(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RewriteRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = payload?;

    let (Some(current_code), Some(user_request)) = (req.current_code, req.user_request) else {
        return Err(ApiError::missing_fields());
    };

    if current_code.is_empty() || user_request.trim().is_empty() {
        return Err(ApiError::bad_request("Invalid request. Empty fields."));
    }

    let Some(rewriter) = state.rewriter.as_deref() else {
        return Err(ApiError::service_unavailable(
            "Diagram rewriting is not configured",
        ));
    };

    let updated_code = rewrite_or_original(rewriter, &current_code, &user_request).await;

    Ok::<_, ApiError>(Json(RewriteResponse { updated_code }))
}
