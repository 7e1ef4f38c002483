use crate::store::MemoryStore;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid block store {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read a text file and return its content
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}

/// Load a JSON block store, giving every block without an id a fresh one
pub fn load_store(path: &Path) -> Result<MemoryStore, IoError> {
    let content = read_file(path)?;
    let mut store: MemoryStore =
        serde_json::from_str(&content).map_err(|source| IoError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    store.ensure_ids();
    Ok(store)
}

/// Save a block store as pretty-printed JSON
pub fn save_store(path: &Path, store: &MemoryStore) -> Result<(), IoError> {
    let content = serde_json::to_string_pretty(store).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_file(path, &content)
}
