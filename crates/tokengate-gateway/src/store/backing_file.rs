//! Backing token file I/O.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tokengate_core::error::{Result, TokenGateError};
use tokengate_core::token::EMPTY_TOKEN_LIST;

fn io_err(path: &Path, op: &str, e: std::io::Error) -> TokenGateError {
    TokenGateError::BackingFileIo(format!("{op} {} failed: {e}", path.display()))
}

/// Create the file (and its parent directory) holding an empty list if it
/// does not exist. Returns true when the file was created.
pub fn ensure_exists(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => return Ok(false),
        Ok(_) => {
            return Err(TokenGateError::BackingFileIo(format!(
                "{} exists but is not a file",
                path.display()
            )))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(path, "stat", e)),
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, "create dir", e))?;
    }
    write_empty(path)?;
    Ok(true)
}

pub fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| io_err(path, "read", e))
}

/// Overwrite the file with the canonical empty list.
pub fn write_empty(path: &Path) -> Result<()> {
    fs::write(path, EMPTY_TOKEN_LIST).map_err(|e| io_err(path, "write", e))
}

/// Whether `raw` is exactly what `write_empty` produces.
pub fn is_reset_content(raw: &str) -> bool {
    raw.trim() == EMPTY_TOKEN_LIST
}
