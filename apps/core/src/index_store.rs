use std::path::Path;

use rusqlite::{params, Connection, Row};

use crate::model::{Category, SearchResult};

const CREATE_CATALOG_TABLE: &str = "CREATE TABLE IF NOT EXISTS catalog_entry (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    category TEXT NOT NULL,
    target_url TEXT NOT NULL
)";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to prepare catalog directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog row: {0}")]
    InvalidRow(#[from] crate::model::ValidationError),
}

pub fn open_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    conn.execute(CREATE_CATALOG_TABLE, [])?;
    Ok(conn)
}

pub fn open(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute(CREATE_CATALOG_TABLE, [])?;
    Ok(conn)
}

/// Inserts a row, or replaces its fields in place so catalog order is kept.
pub fn upsert_item(db: &Connection, item: &SearchResult) -> Result<(), StoreError> {
    db.execute(
        "INSERT INTO catalog_entry (id, title, description, category, target_url)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            title=excluded.title,
            description=excluded.description,
            category=excluded.category,
            target_url=excluded.target_url",
        params![
            item.id,
            item.title,
            item.description,
            item.category.as_str(),
            item.target_url
        ],
    )?;
    Ok(())
}

pub fn get_item(db: &Connection, id: &str) -> Result<Option<SearchResult>, StoreError> {
    let mut stmt = db.prepare(
        "SELECT id, title, description, category, target_url FROM catalog_entry WHERE id = ?1",
    )?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_item(row)?)),
        None => Ok(None),
    }
}

pub fn list_items(db: &Connection) -> Result<Vec<SearchResult>, StoreError> {
    let mut stmt = db.prepare(
        "SELECT id, title, description, category, target_url FROM catalog_entry ORDER BY seq",
    )?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(row_to_item(row)?);
    }
    Ok(items)
}

pub fn count_items(db: &Connection) -> Result<usize, StoreError> {
    let count: i64 = db.query_row("SELECT COUNT(*) FROM catalog_entry", [], |row| row.get(0))?;
    Ok(count.max(0) as usize)
}

fn row_to_item(row: &Row<'_>) -> Result<SearchResult, StoreError> {
    let category: String = row.get(3)?;
    let item = SearchResult::from_owned(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        Category::parse(&category),
        row.get(4)?,
    )?;
    Ok(item)
}
