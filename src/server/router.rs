use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use super::api::api_router;
use crate::rewrite::DiagramRewriter;
use crate::service::{DiagramService, FolderService};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Absent when no model credentials are configured.
    pub rewriter: Option<Arc<dyn DiagramRewriter>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, rewriter: Option<Arc<dyn DiagramRewriter>>) -> Self {
        Self { store, rewriter }
    }

    pub fn folders(&self) -> FolderService<'_> {
        FolderService::new(self.store.as_ref())
    }

    pub fn diagrams(&self) -> DiagramService<'_> {
        DiagramService::new(self.store.as_ref())
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

/// `*` allows any origin; otherwise only the listed origins are allowed.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

pub fn create_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn(log_request))
        .layer(build_cors_layer(cors_origins))
        .with_state(state)
}
