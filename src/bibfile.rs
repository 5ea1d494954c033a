//! Reading and writing `.bib` files.
//!
//! The path `-` stands for stdin when reading and stdout when writing.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when reading or writing a bibliography.
#[derive(Error, Debug)]
pub enum BibFileError {
    #[error("failed to read '{}': {}", .path.display(), .source)]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{}': {}", .path.display(), .source)]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to read from stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] io::Error),
}

/// Whether `path` means stdin/stdout.
pub fn is_stdio(path: &Path) -> bool {
    path == Path::new("-")
}

/// Loads a bibliography file as UTF-8 text.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn load_bib(path: &Path) -> Result<String, BibFileError> {
    if is_stdio(path) {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(BibFileError::Stdin)?;
        return Ok(buf);
    }

    fs::read_to_string(path).map_err(|source| BibFileError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the relabelled bibliography.
pub fn write_bib(path: &Path, content: &str) -> Result<(), BibFileError> {
    if is_stdio(path) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        return handle
            .write_all(content.as_bytes())
            .and_then(|()| handle.flush())
            .map_err(BibFileError::Stdout);
    }

    fs::write(path, content).map_err(|source| BibFileError::Write {
        path: path.to_path_buf(),
        source,
    })
}
