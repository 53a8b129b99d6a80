use std::collections::HashSet;

use tracing::info;

use super::now;
use super::validation::validate_folder_name;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Folder, FolderNode, NewFolder};

pub const ROOT_FOLDER_NAME: &str = "Root";

/// Fields a caller may change on an existing folder. `None` leaves the
/// field untouched.
#[derive(Debug, Default, Clone)]
pub struct FolderUpdate {
    pub name: Option<String>,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub root: Folder,
    pub created_root: bool,
    pub migrated_diagrams: usize,
}

/// Maintains the single-root folder tree.
#[derive(Clone, Copy)]
pub struct FolderService<'a> {
    store: &'a dyn Store,
}

impl<'a> FolderService<'a> {
    #[must_use]
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    pub fn create(&self, name: &str, parent_id: Option<i64>, is_root: bool) -> Result<Folder> {
        validate_folder_name(name)?;

        if is_root {
            if parent_id.is_some() {
                return Err(Error::validation("Root folder cannot have a parent"));
            }
            if self.store.get_root_folder()?.is_some() {
                return Err(Error::conflict("A root folder already exists"));
            }
        } else {
            let Some(parent_id) = parent_id else {
                return Err(Error::validation("Non-root folders must have a parent"));
            };
            self.store
                .get_folder(parent_id)?
                .ok_or_else(|| Error::not_found("Parent folder not found"))?;
        }

        let folder = self.store.create_folder(&NewFolder {
            name: name.to_string(),
            parent_id,
            is_root,
            created_at: now(),
        })?;

        tracing::debug!(id = folder.id, parent_id = ?folder.parent_id, "Created folder");
        Ok(folder)
    }

    pub fn get(&self, id: i64) -> Result<Folder> {
        self.store
            .get_folder(id)?
            .ok_or_else(|| Error::not_found(format!("Folder with id {id} not found")))
    }

    pub fn get_root(&self) -> Result<Option<Folder>> {
        self.store.get_root_folder()
    }

    pub fn get_children(&self, parent_id: i64) -> Result<Vec<Folder>> {
        self.store.list_folder_children(parent_id)
    }

    /// Assembles the subtree under `root` from repeated child lookups.
    pub fn get_hierarchy(&self, root: Folder) -> Result<FolderNode> {
        let children = self
            .get_children(root.id)?
            .into_iter()
            .map(|child| self.get_hierarchy(child))
            .collect::<Result<Vec<_>>>()?;

        Ok(FolderNode {
            folder: root,
            children,
        })
    }

    /// The whole tree, starting from the root folder.
    pub fn get_tree(&self) -> Result<FolderNode> {
        let root = self
            .get_root()?
            .ok_or_else(|| Error::not_found("Root folder not found"))?;
        self.get_hierarchy(root)
    }

    pub fn update(&self, id: i64, update: FolderUpdate) -> Result<Folder> {
        let mut folder = self.get(id)?;

        if let Some(ref name) = update.name {
            validate_folder_name(name)?;
        }

        if let Some(parent_id) = update.parent_id {
            if folder.is_root {
                return Err(Error::validation("Root folder cannot have a parent"));
            }
            if parent_id == folder.id {
                return Err(Error::validation("Folder cannot be its own parent"));
            }

            self.store
                .get_folder(parent_id)?
                .ok_or_else(|| Error::not_found("Parent folder not found"))?;

            if self.is_ancestor_of(folder.id, parent_id)? {
                return Err(Error::validation("Moving folder would create a cycle"));
            }

            folder.parent_id = Some(parent_id);
        }

        if let Some(name) = update.name {
            folder.name = name;
        }

        folder.last_updated = now();
        self.store.update_folder(&folder)?;

        Ok(folder)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let folder = self.get(id)?;

        if folder.is_root {
            return Err(Error::conflict("Cannot delete the root folder"));
        }

        if !self.get_children(folder.id)?.is_empty() {
            return Err(Error::conflict(
                "Cannot delete folder: it contains subfolders",
            ));
        }

        if self.store.count_folder_diagrams(folder.id)? > 0 {
            return Err(Error::conflict("Cannot delete folder: it contains diagrams"));
        }

        if !self.store.delete_folder(folder.id)? {
            return Err(Error::not_found(format!("Folder with id {id} not found")));
        }

        tracing::debug!(id, "Deleted folder");
        Ok(())
    }

    /// Ensures a root folder exists and that every diagram belongs to a
    /// folder. Safe to run on every start.
    pub fn bootstrap(&self) -> Result<BootstrapReport> {
        let (root, created_root) = match self.get_root()? {
            Some(root) => (root, false),
            None => {
                let root = self.create(ROOT_FOLDER_NAME, None, true)?;
                info!("Created root folder (id {})", root.id);
                (root, true)
            }
        };

        let migrated_diagrams = self.store.assign_unfiled_diagrams(root.id)?;
        if migrated_diagrams > 0 {
            info!(
                "Moved {} diagram(s) without a folder into the root folder",
                migrated_diagrams
            );
        }

        Ok(BootstrapReport {
            root,
            created_root,
            migrated_diagrams,
        })
    }

    /// Returns the root folder, bootstrapping it if it does not exist yet.
    pub fn ensure_root(&self) -> Result<Folder> {
        match self.get_root()? {
            Some(root) => Ok(root),
            None => Ok(self.bootstrap()?.root),
        }
    }

    /// Walks parent links upward from `start`, returning true if `ancestor`
    /// is `start` itself or one of its ancestors.
    fn is_ancestor_of(&self, ancestor: i64, start: i64) -> Result<bool> {
        let mut visited = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            if !visited.insert(id) {
                tracing::warn!(id, "Folder parent links already contain a cycle");
                return Ok(true);
            }
            current = self.store.get_folder(id)?.and_then(|f| f.parent_id);
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::types::NewDiagram;

    fn store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    fn add_diagram(store: &SqliteStore, folder_id: i64) -> i64 {
        store
            .create_diagram(&NewDiagram {
                content: "graph TD\nA-->B".to_string(),
                name: None,
                folder_id,
                last_updated: now(),
            })
            .unwrap()
            .id
    }

    #[test]
    fn test_create_root_then_child() {
        let store = store();
        let folders = FolderService::new(&store);

        let root = folders.create("Root", None, true).unwrap();
        assert!(root.is_root);
        assert_eq!(root.parent_id, None);

        let work = folders.create("Work", Some(root.id), false).unwrap();
        assert!(!work.is_root);
        assert_eq!(work.parent_id, Some(root.id));
        assert_eq!(work.created_at, work.last_updated);
        assert_eq!(folders.get(work.id).unwrap(), work);
    }

    #[test]
    fn test_second_root_is_conflict() {
        let store = store();
        let folders = FolderService::new(&store);

        folders.create("Root", None, true).unwrap();
        let result = folders.create("Another", None, true);
        assert!(matches!(result, Err(Error::Conflict(_))));

        let roots = store
            .connection()
            .query_row("SELECT COUNT(*) FROM folders WHERE is_root = 1", [], |row| {
                row.get::<_, i64>(0)
            })
            .unwrap();
        assert_eq!(roots, 1);
    }

    #[test]
    fn test_create_validation() {
        let store = store();
        let folders = FolderService::new(&store);
        let root = folders.create("Root", None, true).unwrap();

        let result = folders.create("", Some(root.id), false);
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = folders.create("Orphan", None, false);
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = folders.create("Missing parent", Some(404), false);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_root_with_parent_is_rejected() {
        let store = store();
        let folders = FolderService::new(&store);

        let result = folders.create("Root", Some(1), true);
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(folders.get_root().unwrap().is_none());
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = store();
        let folders = FolderService::new(&store);
        assert!(matches!(folders.get(7), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_hierarchy() {
        let store = store();
        let folders = FolderService::new(&store);
        let root = folders.create("Root", None, true).unwrap();
        let work = folders.create("Work", Some(root.id), false).unwrap();
        folders.create("Home", Some(root.id), false).unwrap();
        let reports = folders.create("Reports", Some(work.id), false).unwrap();
        folders.create("2024", Some(reports.id), false).unwrap();

        let tree = folders.get_tree().unwrap();
        assert_eq!(tree.folder.id, root.id);
        assert_eq!(tree.len(), 5);

        let names: Vec<&str> = tree.children.iter().map(|n| n.folder.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Work"]);

        let work_node = &tree.children[1];
        assert_eq!(work_node.children.len(), 1);
        assert_eq!(work_node.children[0].children[0].folder.name, "2024");
    }

    #[test]
    fn test_tree_without_root_is_not_found() {
        let store = store();
        let folders = FolderService::new(&store);
        assert!(matches!(folders.get_tree(), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_update_rename_and_reparent() {
        let store = store();
        let folders = FolderService::new(&store);
        let root = folders.create("Root", None, true).unwrap();
        let a = folders.create("A", Some(root.id), false).unwrap();
        let b = folders.create("B", Some(root.id), false).unwrap();

        let updated = folders
            .update(
                b.id,
                FolderUpdate {
                    name: Some("B2".to_string()),
                    parent_id: Some(a.id),
                },
            )
            .unwrap();
        assert_eq!(updated.name, "B2");
        assert_eq!(updated.parent_id, Some(a.id));
        assert!(updated.last_updated >= b.last_updated);
        assert_eq!(folders.get(b.id).unwrap(), updated);
    }

    #[test]
    fn test_self_parent_is_rejected() {
        let store = store();
        let folders = FolderService::new(&store);
        let root = folders.create("Root", None, true).unwrap();
        let a = folders.create("A", Some(root.id), false).unwrap();

        let result = folders.update(
            a.id,
            FolderUpdate {
                parent_id: Some(a.id),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_root_parent_is_immutable() {
        let store = store();
        let folders = FolderService::new(&store);
        let root = folders.create("Root", None, true).unwrap();
        let a = folders.create("A", Some(root.id), false).unwrap();

        for parent_id in [a.id, root.id, 12345] {
            let result = folders.update(
                root.id,
                FolderUpdate {
                    parent_id: Some(parent_id),
                    ..Default::default()
                },
            );
            assert!(matches!(result, Err(Error::Validation(_))));
        }
        assert_eq!(folders.get(root.id).unwrap().parent_id, None);
    }

    #[test]
    fn test_indirect_cycle_is_rejected() {
        let store = store();
        let folders = FolderService::new(&store);
        let root = folders.create("Root", None, true).unwrap();
        let a = folders.create("A", Some(root.id), false).unwrap();
        let b = folders.create("B", Some(a.id), false).unwrap();
        let c = folders.create("C", Some(b.id), false).unwrap();

        let result = folders.update(
            a.id,
            FolderUpdate {
                parent_id: Some(c.id),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(folders.get(a.id).unwrap().parent_id, Some(root.id));
    }

    #[test]
    fn test_update_missing_folder_or_parent() {
        let store = store();
        let folders = FolderService::new(&store);
        let root = folders.create("Root", None, true).unwrap();
        let a = folders.create("A", Some(root.id), false).unwrap();

        let result = folders.update(99, FolderUpdate::default());
        assert!(matches!(result, Err(Error::NotFound(_))));

        let result = folders.update(
            a.id,
            FolderUpdate {
                parent_id: Some(99),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_update_with_empty_name_is_rejected() {
        let store = store();
        let folders = FolderService::new(&store);
        let root = folders.create("Root", None, true).unwrap();

        let result = folders.update(
            root.id,
            FolderUpdate {
                name: Some(String::new()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_delete_safety() {
        let store = store();
        let folders = FolderService::new(&store);
        let root = folders.create("Root", None, true).unwrap();
        let parent = folders.create("Parent", Some(root.id), false).unwrap();
        let child = folders.create("Child", Some(parent.id), false).unwrap();

        assert!(matches!(folders.delete(root.id), Err(Error::Conflict(_))));
        assert!(matches!(folders.delete(parent.id), Err(Error::Conflict(_))));

        let diagram_id = add_diagram(&store, child.id);
        let err = folders.delete(child.id).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(err.to_string().contains("contains diagrams"));

        store.delete_diagram(diagram_id).unwrap();
        folders.delete(child.id).unwrap();
        folders.delete(parent.id).unwrap();

        assert!(matches!(folders.get(parent.id), Err(Error::NotFound(_))));
        assert!(matches!(folders.delete(parent.id), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_bootstrap_creates_root_and_migrates() {
        let store = store();
        store
            .connection()
            .execute_batch(
                "INSERT INTO diagrams (content, last_updated) VALUES ('graph TD\nA', '2024-01-01 00:00:00');
                 INSERT INTO diagrams (content, last_updated) VALUES ('graph TD\nB', '2024-01-02 00:00:00');",
            )
            .unwrap();
        let folders = FolderService::new(&store);

        let report = folders.bootstrap().unwrap();
        assert!(report.created_root);
        assert_eq!(report.root.name, ROOT_FOLDER_NAME);
        assert_eq!(report.migrated_diagrams, 2);

        for diagram in store.list_diagrams().unwrap() {
            assert_eq!(diagram.folder_id, Some(report.root.id));
        }
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let store = store();
        let folders = FolderService::new(&store);

        let first = folders.bootstrap().unwrap();
        add_diagram(&store, first.root.id);
        let before = store.list_diagrams().unwrap();

        let second = folders.bootstrap().unwrap();
        assert!(!second.created_root);
        assert_eq!(second.root.id, first.root.id);
        assert_eq!(second.migrated_diagrams, 0);
        assert_eq!(store.list_diagrams().unwrap(), before);
    }

    #[test]
    fn test_ensure_root_reuses_existing() {
        let store = store();
        let folders = FolderService::new(&store);

        let created = folders.ensure_root().unwrap();
        let again = folders.ensure_root().unwrap();
        assert_eq!(created.id, again.id);
    }
}
