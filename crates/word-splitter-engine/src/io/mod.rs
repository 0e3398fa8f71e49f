use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid input directory: {0}")]
    InvalidInputDir(String),
}

/// Extensions picked up by the scanner, compared case-insensitively.
pub const WORD_EXTENSIONS: [&str; 2] = ["docx", "doc"];

/// Prefix Word uses for lock files of documents that are open.
const LOCK_FILE_PREFIX: char = '~';

/// List the Word documents directly inside `input_dir`, sorted by path.
pub fn scan_documents(input_dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_input_dir(input_dir)?;

    let mut files = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() && is_word_document(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Whether `path` names a Word document that is not a lock file.
pub fn is_word_document(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with(LOCK_FILE_PREFIX) {
        return false;
    }

    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| WORD_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

pub fn validate_input_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidInputDir(format!(
            "{} does not exist",
            path.display()
        )));
    }

    Ok(())
}

/// Write bytes to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &[u8]) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}
