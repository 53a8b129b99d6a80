use serde::{Deserialize, Serialize};

use crate::service::{DiagramUpdate, FolderUpdate};
use crate::types::Diagram;

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    #[serde(default)]
    pub current_code: Option<String>,
    #[serde(default)]
    pub user_request: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RewriteResponse {
    pub updated_code: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateDiagramRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub folder_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDiagramRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<UpdateDiagramRequest> for DiagramUpdate {
    fn from(req: UpdateDiagramRequest) -> Self {
        Self {
            content: req.content,
            name: req.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MoveDiagramRequest {
    #[serde(default)]
    pub folder_id: Option<i64>,
}

/// `GET /api/diagram` answers `{"content": null}` when nothing is stored.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LatestDiagramResponse {
    Found(Diagram),
    Empty { content: Option<String> },
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub is_root: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFolderRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

impl From<UpdateFolderRequest> for FolderUpdate {
    fn from(req: UpdateFolderRequest) -> Self {
        Self {
            name: req.name,
            parent_id: req.parent_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}
