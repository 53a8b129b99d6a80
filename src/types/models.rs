use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub is_root: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Folder row before the store has assigned it an id.
#[derive(Debug, Clone)]
pub struct NewFolder {
    pub name: String,
    pub parent_id: Option<i64>,
    pub is_root: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    #[serde(flatten)]
    pub folder: Folder,
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Number of folders in this subtree, including this one.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(FolderNode::len).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: i64,
    pub content: String,
    pub name: Option<String>,
    pub folder_id: Option<i64>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDiagram {
    pub content: String,
    pub name: Option<String>,
    pub folder_id: i64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramSummary {
    pub id: i64,
    pub name: String,
    pub folder_id: Option<i64>,
    pub last_updated: DateTime<Utc>,
}

impl From<&Diagram> for DiagramSummary {
    fn from(diagram: &Diagram) -> Self {
        Self {
            id: diagram.id,
            name: diagram
                .name
                .clone()
                .unwrap_or_else(|| format!("Untitled Diagram {}", diagram.id)),
            folder_id: diagram.folder_id,
            last_updated: diagram.last_updated,
        }
    }
}
