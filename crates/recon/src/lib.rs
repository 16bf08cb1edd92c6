//! `reqsync-recon` — status harmonization and cross-supplier reconciliation.
//!
//! Pure engine crate: receives pre-parsed requirement records, returns
//! matched feedback, conflict reports and diagnostics. No document IO.

pub mod conflict;
pub mod engine;
pub mod error;
pub mod harmonize;
pub mod matcher;
pub mod model;

pub use engine::run;
pub use error::ReconError;
pub use harmonize::StatusHarmonizer;
pub use model::{ConflictReport, ConflictScan, FeedbackMatch, MatchOutput, ReconReport};
