//! `reqsync-reqif` — namespace-tolerant parsing of requirements-interchange
//! documents.
//!
//! Pipeline: archive resolution → XML tree → namespace context → definition
//! catalogs → requirement extraction. Read-only: there is no write-back of
//! the source format.
//!
//! Every top-level call returns its diagnostics alongside the records —
//! skipped elements, duplicate ids and unresolved references are counted,
//! never silently dropped, because the conservative skip-and-continue
//! policies below can otherwise mask data-quality problems.

pub mod archive;
pub mod catalog;
pub mod dom;
pub mod error;
pub mod extract;
pub mod ns;
pub mod parser;

pub use archive::ResolvedDocument;
pub use catalog::Catalogs;
pub use error::ReqifError;
pub use extract::ExtractionOutput;
pub use ns::NamespaceContext;
pub use parser::{parse_document, parse_documents, BatchOutcome, DocumentInfo, ParseOutcome, ParseStats};
