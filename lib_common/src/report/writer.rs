//! Writes the rendered page to disk, and the error type shared with
//! rendering.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

/// # Report Error
#[derive(Debug, Error)]
pub enum ReportError {
    /// The page template failed to render.
    #[error("cannot render report: {0}")]
    Render(#[from] askama::Error),

    /// The parent directory could not be created.
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file could not be written.
    #[error("cannot write report {path}: {source}")]
    Write {
        /// Target file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// # Write Report
///
/// Writes `html` as UTF-8 to `path`, creating missing parent directories.
/// An existing file is replaced.
///
/// # Errors
/// `CreateDir` or `Write` on any I/O failure.
pub fn write_report(path: &Path, html: &str) -> Result<PathBuf, ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, html).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Report written to {} ({} bytes)", path.display(), html.len());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("site").join("daily").join("index.html");

        let written = write_report(&target, "<p>ok</p>").unwrap();

        assert_eq!(written, target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "<p>ok</p>");
    }

    #[test]
    fn test_overwrites_existing_report() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("index.html");
        fs::write(&target, "old").unwrap();

        write_report(&target, "new 🟢").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new 🟢");
    }

    #[test]
    fn test_directory_target_fails() {
        let dir = tempdir().unwrap();
        let err = write_report(dir.path(), "x").unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
    }
}
