//! Top-level document API: single parse, batch parse with per-path error
//! isolation, and the lightweight document info probe.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use reqsync_core::RequirementRecord;

use crate::archive;
use crate::catalog;
use crate::dom;
use crate::error::ReqifError;
use crate::extract::{self, SkippedElement};
use crate::ns::NamespaceContext;

/// Diagnostics for one parse. Always returned, even on a fully successful
/// run — the skip-and-continue policies in the pipeline can hide
/// data-quality problems when these counters are not surfaced.
#[derive(Debug, Default, Serialize)]
pub struct ParseStats {
    pub namespace_uri: Option<String>,
    /// Declaration elements found per tag.
    pub elements_found: BTreeMap<String, usize>,
    pub definitions_cataloged: usize,
    pub enumerations_cataloged: usize,
    pub types_cataloged: usize,
    pub skipped_declarations: usize,
    /// Catalog ids that were defined more than once (last one won).
    pub duplicate_ids: usize,
    pub spec_objects_processed: usize,
    pub records_produced: usize,
    pub content_extractions: usize,
    pub values_without_definition: usize,
    pub skipped_elements: Vec<SkippedElement>,
}

/// Records plus diagnostics for one document.
#[derive(Debug, Serialize)]
pub struct ParseOutcome {
    pub records: Vec<RequirementRecord>,
    pub stats: ParseStats,
}

/// Parse a single document or archive into requirement records.
///
/// Catalogs are built fresh for this invocation; nothing is shared between
/// parses, so concurrent calls on different documents are independent.
pub fn parse_document(path: &Path) -> Result<ParseOutcome, ReqifError> {
    let resolved = archive::resolve(path)?;
    let xml = read_document(resolved.path())?;

    let root = dom::parse_tree(&xml)?;
    let ctx = NamespaceContext::from_root(&root);
    let catalogs = catalog::build(&root, &ctx);
    let extraction = extract::extract(&root, &ctx, &catalogs);

    let stats = ParseStats {
        namespace_uri: ctx.uri.clone(),
        elements_found: catalogs.elements_found.clone(),
        definitions_cataloged: catalogs.attribute_definitions.len(),
        enumerations_cataloged: catalogs.enumerations.len(),
        types_cataloged: catalogs.spec_object_types.len(),
        skipped_declarations: catalogs.skipped_declarations,
        duplicate_ids: catalogs.duplicate_ids,
        spec_objects_processed: extraction.spec_objects_processed,
        records_produced: extraction.records.len(),
        content_extractions: extraction.counters.content_extractions,
        values_without_definition: extraction.counters.values_without_definition,
        skipped_elements: extraction.skipped,
    };

    Ok(ParseOutcome {
        records: extraction.records,
        stats,
    })
}

fn read_document(path: &Path) -> Result<String, ReqifError> {
    std::fs::read_to_string(path).map_err(|err| match err.kind() {
        // Not UTF-8 readable is a structural problem of the document, not a
        // resource failure.
        ErrorKind::InvalidData => {
            ReqifError::ParseFailure(format!("{}: {err}", path.display()))
        }
        ErrorKind::NotFound => ReqifError::DocumentNotFound(path.to_path_buf()),
        _ => ReqifError::Io(format!("{}: {err}", path.display())),
    })
}

// ---------------------------------------------------------------------------
// Batch parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct BatchSummary {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Batch result: per-path outcomes and per-path error messages. A failing
/// path never aborts the rest of the batch.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub results: BTreeMap<PathBuf, ParseOutcome>,
    pub errors: BTreeMap<PathBuf, String>,
    pub summary: BatchSummary,
}

/// Parse several documents independently. The progress callback, when
/// given, is invoked with `(index, total, label)` before each path and once
/// more after the batch completes.
pub fn parse_documents(
    paths: &[PathBuf],
    mut on_progress: Option<&mut dyn FnMut(usize, usize, &str)>,
) -> BatchOutcome {
    let total = paths.len();
    let mut outcome = BatchOutcome::default();

    for (index, path) in paths.iter().enumerate() {
        if let Some(progress) = on_progress.as_mut() {
            progress(index, total, &path.display().to_string());
        }
        match parse_document(path) {
            Ok(parsed) => {
                outcome.results.insert(path.clone(), parsed);
            }
            Err(err) => {
                outcome.errors.insert(path.clone(), err.to_string());
            }
        }
    }

    if let Some(progress) = on_progress.as_mut() {
        progress(total, total, "completed");
    }

    outcome.summary = BatchSummary {
        total_files: total,
        successful: outcome.results.len(),
        failed: outcome.errors.len(),
    };
    outcome
}

// ---------------------------------------------------------------------------
// Document info
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Plain,
    Archive,
}

/// Summary information about one document, produced by a full parse.
#[derive(Debug, Serialize)]
pub struct DocumentInfo {
    pub file_name: String,
    pub kind: DocumentKind,
    pub file_size: u64,
    pub requirement_count: usize,
    pub namespace_uri: Option<String>,
    pub definitions_cataloged: usize,
    pub content_extractions: usize,
}

pub fn info(path: &Path) -> Result<DocumentInfo, ReqifError> {
    let parsed = parse_document(path)?;
    let metadata = std::fs::metadata(path)?;
    Ok(DocumentInfo {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        kind: if archive::is_archive(path) {
            DocumentKind::Archive
        } else {
            DocumentKind::Plain
        },
        file_size: metadata.len(),
        requirement_count: parsed.records.len(),
        namespace_uri: parsed.stats.namespace_uri,
        definitions_cataloged: parsed.stats.definitions_cataloged,
        content_extractions: parsed.stats.content_extractions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, name: &str, xml: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, xml).unwrap();
        path
    }

    const SMALL_DOC: &str = r#"<REQ-IF>
        <ATTRIBUTE-DEFINITION-STRING IDENTIFIER="ad1" LONG-NAME="Title"/>
        <SPEC-OBJECT IDENTIFIER="R1"><VALUES>
            <ATTRIBUTE-VALUE-STRING THE-VALUE="hello" ATTRIBUTE-DEFINITION-REF="ad1"/>
        </VALUES></SPEC-OBJECT>
    </REQ-IF>"#;

    #[test]
    fn parse_document_returns_records_and_stats() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "m.reqif", SMALL_DOC);

        let outcome = parse_document(&path).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.stats.records_produced, 1);
        assert_eq!(outcome.stats.definitions_cataloged, 1);
        assert_eq!(outcome.stats.content_extractions, 1);
        assert!(outcome.stats.skipped_elements.is_empty());
    }

    #[test]
    fn missing_document_error() {
        let err = parse_document(Path::new("/no/such/file.reqif")).unwrap_err();
        assert!(matches!(err, ReqifError::DocumentNotFound(_)));
    }

    #[test]
    fn malformed_document_is_parse_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "bad.reqif", "<REQ-IF><oops</REQ-IF>");
        let err = parse_document(&path).unwrap_err();
        assert!(matches!(err, ReqifError::ParseFailure(_)));
    }

    #[test]
    fn batch_isolates_failures_and_reports_progress() {
        let dir = TempDir::new().unwrap();
        let good = write_doc(&dir, "good.reqif", SMALL_DOC);
        let bad = write_doc(&dir, "bad.reqif", "not xml at all <");
        let missing = dir.path().join("missing.reqif");

        let mut calls: Vec<(usize, usize)> = Vec::new();
        let mut progress = |index: usize, total: usize, _label: &str| {
            calls.push((index, total));
        };

        let paths = vec![good.clone(), bad.clone(), missing.clone()];
        let outcome = parse_documents(&paths, Some(&mut progress));

        assert_eq!(outcome.summary.total_files, 3);
        assert_eq!(outcome.summary.successful, 1);
        assert_eq!(outcome.summary.failed, 2);
        assert!(outcome.results.contains_key(&good));
        assert!(outcome.errors.contains_key(&bad));
        assert!(outcome.errors.contains_key(&missing));
        // One call per path plus the completion call.
        assert_eq!(calls, vec![(0, 3), (1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn info_reports_document_shape() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "m.reqif", SMALL_DOC);

        let document_info = info(&path).unwrap();
        assert_eq!(document_info.file_name, "m.reqif");
        assert_eq!(document_info.kind, DocumentKind::Plain);
        assert_eq!(document_info.requirement_count, 1);
        assert!(document_info.file_size > 0);
    }
}
