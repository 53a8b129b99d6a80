use super::folders::FolderService;
use super::now;
use super::validation::{validate_content, validate_diagram_name};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Diagram, NewDiagram};

#[derive(Debug, Default, Clone)]
pub struct DiagramUpdate {
    pub content: Option<String>,
    /// An empty name leaves the current name in place.
    pub name: Option<String>,
}

/// CRUD for diagrams. Every diagram belongs to an existing folder.
#[derive(Clone, Copy)]
pub struct DiagramService<'a> {
    store: &'a dyn Store,
    folders: FolderService<'a>,
}

impl<'a> DiagramService<'a> {
    #[must_use]
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            folders: FolderService::new(store),
        }
    }

    /// Creates a diagram in `folder_id`, or in the root folder when none is
    /// given.
    pub fn create(
        &self,
        content: &str,
        name: Option<&str>,
        folder_id: Option<i64>,
    ) -> Result<Diagram> {
        validate_content(content)?;
        let name = normalize_name(name)?;

        let folder_id = match folder_id {
            Some(id) => self.existing_folder(id)?,
            None => self.folders.ensure_root()?.id,
        };

        let diagram = self.store.create_diagram(&NewDiagram {
            content: content.to_string(),
            name,
            folder_id,
            last_updated: now(),
        })?;

        tracing::debug!(id = diagram.id, folder_id, "Created diagram");
        Ok(diagram)
    }

    pub fn get(&self, id: i64) -> Result<Diagram> {
        self.store
            .get_diagram(id)?
            .ok_or_else(|| Error::not_found(format!("Diagram with id {id} not found")))
    }

    /// All diagrams, most recently updated first.
    pub fn get_all(&self) -> Result<Vec<Diagram>> {
        self.store.list_diagrams()
    }

    pub fn get_latest(&self) -> Result<Option<Diagram>> {
        self.store.get_latest_diagram()
    }

    pub fn get_by_folder(&self, folder_id: i64) -> Result<Vec<Diagram>> {
        self.existing_folder(folder_id)?;
        self.store.list_folder_diagrams(folder_id)
    }

    pub fn update(&self, id: i64, update: DiagramUpdate) -> Result<Diagram> {
        let mut diagram = self.get(id)?;

        if let Some(content) = update.content {
            validate_content(&content)?;
            diagram.content = content;
        }

        if let Some(name) = normalize_name(update.name.as_deref())? {
            diagram.name = Some(name);
        }

        diagram.last_updated = now();
        self.store.update_diagram(&diagram)?;

        Ok(diagram)
    }

    /// Reassigns a diagram to another folder.
    pub fn move_to(&self, id: i64, folder_id: i64) -> Result<Diagram> {
        let mut diagram = self.get(id)?;
        self.existing_folder(folder_id)?;

        diagram.folder_id = Some(folder_id);
        diagram.last_updated = now();
        self.store.update_diagram(&diagram)?;

        tracing::debug!(id, folder_id, "Moved diagram");
        Ok(diagram)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        if !self.store.delete_diagram(id)? {
            return Err(Error::not_found(format!("Diagram with id {id} not found")));
        }
        Ok(())
    }

    fn existing_folder(&self, folder_id: i64) -> Result<i64> {
        self.store
            .get_folder(folder_id)?
            .map(|f| f.id)
            .ok_or_else(|| Error::not_found(format!("Folder with id {folder_id} not found")))
    }
}

/// Treats blank names as absent and validates the rest.
fn normalize_name(name: Option<&str>) -> Result<Option<String>> {
    match name {
        Some(name) if !name.trim().is_empty() => {
            validate_diagram_name(name)?;
            Ok(Some(name.to_string()))
        }
        _ => Ok(None),
    }
}
