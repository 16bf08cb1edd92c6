//! `reqsync-core` — shared model types for the reconciliation pipeline.
//!
//! Pure types crate: requirement records, the normalized status taxonomy,
//! and the content fingerprint used for change detection. No IO.

pub mod record;
pub mod status;

pub use record::{Attributes, RequirementRecord};
pub use status::NormalizedStatus;
