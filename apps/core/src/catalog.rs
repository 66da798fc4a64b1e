//! Catalog providers the search session queries.
//!
//! The filter logic lives in [`crate::search`]; providers only decide where
//! the records come from.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use walkdir::WalkDir;

use crate::index_store::{self, StoreError};
use crate::model::{SearchResult, ValidationError};
use crate::search::search;

const FIXTURE_EXTENSION: &str = "json5";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse catalog file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid catalog entry: {0}")]
    Validation(#[from] ValidationError),
    #[error("catalog store error: {0}")]
    Store(#[from] StoreError),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only source of searchable records.
pub trait CatalogProvider {
    fn query(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: Vec<SearchResult>,
}

impl StaticCatalog {
    pub fn new(items: Vec<SearchResult>) -> Result<Self, CatalogError> {
        ensure_unique_ids(&items)?;
        Ok(Self { items })
    }

    /// Loads one fixture file, or every `*.json5` file under a directory in
    /// path order.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let files = if path.is_dir() {
            fixture_files(path)?
        } else {
            vec![path.to_path_buf()]
        };

        let mut items = Vec::new();
        for file in files {
            items.extend(read_fixture(&file)?);
        }
        log::info!(
            "event=catalog_loaded source={} items={}",
            path.display(),
            items.len()
        );
        Self::new(items)
    }

    pub fn items(&self) -> &[SearchResult] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl CatalogProvider for StaticCatalog {
    fn query(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError> {
        Ok(search(&self.items, query))
    }
}

pub struct SqliteCatalog {
    db: Connection,
}

impl SqliteCatalog {
    pub fn new(db: Connection) -> Self {
        Self { db }
    }

    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        Ok(Self::new(index_store::open(path)?))
    }

    pub fn upsert(&self, item: &SearchResult) -> Result<(), CatalogError> {
        index_store::upsert_item(&self.db, item)?;
        Ok(())
    }

    /// Copies every record of another catalog into the table.
    pub fn import(&self, items: &[SearchResult]) -> Result<usize, CatalogError> {
        for item in items {
            self.upsert(item)?;
        }
        Ok(index_store::count_items(&self.db)?)
    }

    pub fn get(&self, id: &str) -> Result<Option<SearchResult>, CatalogError> {
        Ok(index_store::get_item(&self.db, id)?)
    }
}

impl CatalogProvider for SqliteCatalog {
    fn query(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let all = index_store::list_items(&self.db)?;
        Ok(search(&all, query))
    }
}

fn fixture_files(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|error| CatalogError::Io {
            path: dir.to_path_buf(),
            source: error
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
        })?;
        let path = entry.path();
        let is_fixture = entry.file_type().is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(FIXTURE_EXTENSION))
                .unwrap_or(false);
        if is_fixture {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn read_fixture(path: &Path) -> Result<Vec<SearchResult>, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    json5::from_str::<Vec<SearchResult>>(&text).map_err(|error| CatalogError::Parse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

fn ensure_unique_ids(items: &[SearchResult]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::DuplicateId(item.id.clone()));
        }
    }
    Ok(())
}
