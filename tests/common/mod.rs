//! Shared helpers for driving the router in-process.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use diagmarm::error::{Error, Result};
use diagmarm::rewrite::DiagramRewriter;
use diagmarm::server::{AppState, create_router};
use diagmarm::service::FolderService;
use diagmarm::store::{SqliteStore, Store};
use serde_json::Value;
use tower::ServiceExt;

/// Answers every rewrite with the same text.
pub struct FixedRewriter(pub String);

#[async_trait]
impl DiagramRewriter for FixedRewriter {
    async fn rewrite(&self, _current_code: &str, _user_request: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Fails every rewrite, like an unreachable model.
pub struct FailingRewriter;

#[async_trait]
impl DiagramRewriter for FailingRewriter {
    async fn rewrite(&self, _current_code: &str, _user_request: &str) -> Result<String> {
        Err(Error::Rewrite("model unavailable".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteStore>,
}

impl TestApp {
    /// Bootstrapped in-memory app without a rewriter.
    pub fn new() -> Self {
        Self::with_rewriter(None)
    }

    pub fn with_rewriter(rewriter: Option<Arc<dyn DiagramRewriter>>) -> Self {
        let store = SqliteStore::in_memory().expect("open in-memory store");
        store.initialize().expect("initialize schema");
        FolderService::new(&store)
            .bootstrap()
            .expect("bootstrap root folder");

        let store = Arc::new(store);
        let state = Arc::new(AppState::new(store.clone(), rewriter));
        let router = create_router(state, &["*".to_string()]);

        Self { router, store }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    pub fn root_id(&self) -> i64 {
        FolderService::new(self.store.as_ref())
            .get_root()
            .expect("query root")
            .expect("root exists")
            .id
    }
}
