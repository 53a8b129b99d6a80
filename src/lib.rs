//! # Diagmarm
//!
//! A Mermaid diagram builder backend: diagrams organized in a single-root
//! folder tree, persisted in SQLite, with model-assisted rewrites. Usable
//! both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! diagmarm = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use diagmarm::server::{AppState, create_router};
//! use diagmarm::service::FolderService;
//! use diagmarm::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./diagrams.db").unwrap();
//! store.initialize().unwrap();
//! FolderService::new(&store).bootstrap().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), None));
//! let router = create_router(state, &["*".to_string()]);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Pulls in clap for the `diagmarm` binary. Disable with
//!   `default-features = false`.

pub mod config;
pub mod error;
pub mod rewrite;
pub mod server;
pub mod service;
pub mod store;
pub mod types;
