pub const SCHEMA: &str = r#"
-- Folders form a single-root tree; parent links are checked by the service layer
CREATE TABLE IF NOT EXISTS folders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    parent_id INTEGER,            -- NULL only for the root
    is_root INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    last_updated TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Diagrams hold mermaid source
CREATE TABLE IF NOT EXISTS diagrams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    last_updated TEXT DEFAULT (datetime('now')),
    name TEXT,

    -- Owning folder (NULL only for rows that predate folders, until bootstrap)
    folder_id INTEGER
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_folders_parent ON folders(parent_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_folders_single_root ON folders(is_root) WHERE is_root = 1;
CREATE INDEX IF NOT EXISTS idx_diagrams_last_updated ON diagrams(last_updated);
"#;

/// Applied after `SCHEMA` so that it also runs against `diagrams` tables
/// created before the `folder_id` column existed.
pub const DIAGRAM_FOLDER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_diagrams_folder ON diagrams(folder_id);";
