//! Compressed-container resolution.
//!
//! A `.reqifz` archive is extracted into a uniquely named temporary
//! directory and the largest contained `.reqif` file becomes the document
//! to parse. The temp directory's lifetime is tied to the returned
//! [`ResolvedDocument`]: dropping it removes the directory recursively, on
//! success and error paths alike.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipArchive;

use crate::error::ReqifError;

const DOCUMENT_EXTENSION: &str = "reqif";
const ARCHIVE_EXTENSION: &str = "reqifz";

/// A parseable document path plus the scoped cleanup handle for any
/// extraction directory behind it.
#[derive(Debug)]
pub struct ResolvedDocument {
    path: PathBuf,
    temp: Option<TempDir>,
}

impl ResolvedDocument {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the document came out of an archive.
    pub fn is_extracted(&self) -> bool {
        self.temp.is_some()
    }
}

pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
        .unwrap_or(false)
}

/// Resolve `path` to a parseable document. Plain documents pass through
/// untouched; archives are extracted and the largest candidate selected,
/// ties broken by lexicographically first path.
pub fn resolve(path: &Path) -> Result<ResolvedDocument, ReqifError> {
    if !path.exists() {
        return Err(ReqifError::DocumentNotFound(path.to_path_buf()));
    }
    if !is_archive(path) {
        return Ok(ResolvedDocument {
            path: path.to_path_buf(),
            temp: None,
        });
    }

    let temp = TempDir::new()?;
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|err| ReqifError::ParseFailure(format!("cannot read archive: {err}")))?;
    archive
        .extract(temp.path())
        .map_err(|err| ReqifError::ParseFailure(format!("cannot extract archive: {err}")))?;

    let mut candidates = collect_documents(temp.path())?;
    if candidates.is_empty() {
        return Err(ReqifError::NoDocumentFound(path.to_path_buf()));
    }

    // Largest first; equal sizes fall back to path order.
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let document = candidates.swap_remove(0).0;

    Ok(ResolvedDocument {
        path: document,
        temp: Some(temp),
    })
}

/// All `.reqif` files under `dir` with their sizes, via an iterative walk.
fn collect_documents(dir: &Path) -> Result<Vec<(PathBuf, u64)>, ReqifError> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let entry_path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(entry_path);
            } else if entry_path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
                .unwrap_or(false)
            {
                let size = entry.metadata()?.len();
                found.push((entry_path, size));
            }
        }
    }

    Ok(found)
}
