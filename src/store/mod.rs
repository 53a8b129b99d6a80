mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the persistence interface.
///
/// Implementations only read and write rows. Tree and ownership invariants
/// are enforced by the services in [`crate::service`].
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Folder operations
    fn create_folder(&self, folder: &NewFolder) -> Result<Folder>;
    fn get_folder(&self, id: i64) -> Result<Option<Folder>>;
    fn get_root_folder(&self) -> Result<Option<Folder>>;
    fn list_folder_children(&self, parent_id: i64) -> Result<Vec<Folder>>;
    fn update_folder(&self, folder: &Folder) -> Result<()>;
    fn delete_folder(&self, id: i64) -> Result<bool>;

    // Diagram operations
    fn create_diagram(&self, diagram: &NewDiagram) -> Result<Diagram>;
    fn get_diagram(&self, id: i64) -> Result<Option<Diagram>>;
    fn list_diagrams(&self) -> Result<Vec<Diagram>>;
    fn get_latest_diagram(&self) -> Result<Option<Diagram>>;
    fn list_folder_diagrams(&self, folder_id: i64) -> Result<Vec<Diagram>>;
    fn count_folder_diagrams(&self, folder_id: i64) -> Result<i64>;
    fn update_diagram(&self, diagram: &Diagram) -> Result<()>;
    fn delete_diagram(&self, id: i64) -> Result<bool>;

    /// Moves every diagram without a folder into `folder_id`. Returns the
    /// number of rows changed.
    fn assign_unfiled_diagrams(&self, folder_id: i64) -> Result<usize>;
}
