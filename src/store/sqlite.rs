use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::{DIAGRAM_FOLDER_INDEX, SCHEMA};
use crate::error::{Error, Result};
use crate::types::*;

const FOLDER_COLUMNS: &str = "id, name, parent_id, is_root, created_at, last_updated";
const DIAGRAM_COLUMNS: &str = "id, content, name, folder_id, last_updated";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database. Contents are lost on drop.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite's datetime('now') and older rows: "YYYY-MM-DD HH:MM:SS[.ffffff]"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    // Fixed width so that text ordering matches chronological ordering
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn folder_from_row(row: &Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_id: row.get(2)?,
        is_root: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        last_updated: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn diagram_from_row(row: &Row<'_>) -> rusqlite::Result<Diagram> {
    Ok(Diagram {
        id: row.get(0)?,
        content: row.get(1)?,
        name: row.get(2)?,
        folder_id: row.get(3)?,
        last_updated: row
            .get::<_, Option<String>>(4)?
            .map(|s| parse_datetime(&s))
            .unwrap_or_default(),
    })
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA)?;

        if !has_column(&conn, "diagrams", "folder_id")? {
            tracing::info!("Adding folder_id column to existing diagrams table");
            conn.execute_batch("ALTER TABLE diagrams ADD COLUMN folder_id INTEGER")?;
        }
        conn.execute_batch(DIAGRAM_FOLDER_INDEX)?;

        Ok(())
    }

    // Folder operations

    fn create_folder(&self, folder: &NewFolder) -> Result<Folder> {
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO folders (name, parent_id, is_root, created_at, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![
                folder.name,
                folder.parent_id,
                folder.is_root,
                format_datetime(&folder.created_at),
            ],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation && folder.is_root =>
            {
                return Err(Error::conflict("A root folder already exists"));
            }
            Err(e) => return Err(Error::from(e)),
        }

        Ok(Folder {
            id: conn.last_insert_rowid(),
            name: folder.name.clone(),
            parent_id: folder.parent_id,
            is_root: folder.is_root,
            created_at: folder.created_at,
            last_updated: folder.created_at,
        })
    }

    fn get_folder(&self, id: i64) -> Result<Option<Folder>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ?1"),
            params![id],
            folder_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_root_folder(&self) -> Result<Option<Folder>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE is_root = 1 ORDER BY id LIMIT 1"),
            [],
            folder_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_folder_children(&self, parent_id: i64) -> Result<Vec<Folder>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE parent_id = ?1 ORDER BY name, id"
        ))?;

        let rows = stmt.query_map(params![parent_id], folder_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_folder(&self, folder: &Folder) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE folders SET name = ?1, parent_id = ?2, last_updated = ?3 WHERE id = ?4",
            params![
                folder.name,
                folder.parent_id,
                format_datetime(&folder.last_updated),
                folder.id
            ],
        )?;

        if rows == 0 {
            return Err(Error::not_found("Folder not found"));
        }
        Ok(())
    }

    fn delete_folder(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM folders WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Diagram operations

    fn create_diagram(&self, diagram: &NewDiagram) -> Result<Diagram> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO diagrams (content, name, folder_id, last_updated)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                diagram.content,
                diagram.name,
                diagram.folder_id,
                format_datetime(&diagram.last_updated),
            ],
        )?;

        Ok(Diagram {
            id: conn.last_insert_rowid(),
            content: diagram.content.clone(),
            name: diagram.name.clone(),
            folder_id: Some(diagram.folder_id),
            last_updated: diagram.last_updated,
        })
    }

    fn get_diagram(&self, id: i64) -> Result<Option<Diagram>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {DIAGRAM_COLUMNS} FROM diagrams WHERE id = ?1"),
            params![id],
            diagram_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_diagrams(&self) -> Result<Vec<Diagram>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {DIAGRAM_COLUMNS} FROM diagrams ORDER BY last_updated DESC, id DESC"
        ))?;

        let rows = stmt.query_map([], diagram_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_latest_diagram(&self) -> Result<Option<Diagram>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {DIAGRAM_COLUMNS} FROM diagrams ORDER BY last_updated DESC, id DESC LIMIT 1"
            ),
            [],
            diagram_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_folder_diagrams(&self, folder_id: i64) -> Result<Vec<Diagram>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {DIAGRAM_COLUMNS} FROM diagrams WHERE folder_id = ?1
             ORDER BY last_updated DESC, id DESC"
        ))?;

        let rows = stmt.query_map(params![folder_id], diagram_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_folder_diagrams(&self, folder_id: i64) -> Result<i64> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM diagrams WHERE folder_id = ?1",
            params![folder_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn update_diagram(&self, diagram: &Diagram) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE diagrams SET content = ?1, name = ?2, folder_id = ?3, last_updated = ?4
             WHERE id = ?5",
            params![
                diagram.content,
                diagram.name,
                diagram.folder_id,
                format_datetime(&diagram.last_updated),
                diagram.id
            ],
        )?;

        if rows == 0 {
            return Err(Error::not_found("Diagram not found"));
        }
        Ok(())
    }

    fn delete_diagram(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM diagrams WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn assign_unfiled_diagrams(&self, folder_id: i64) -> Result<usize> {
        let rows = self.conn().execute(
            "UPDATE diagrams SET folder_id = ?1 WHERE folder_id IS NULL",
            params![folder_id],
        )?;
        Ok(rows)
    }
}
