use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use reqsync_core::NormalizedStatus;

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// A supplier record successfully joined to a master requirement.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackMatch {
    pub master_requirement_id: String,
    pub supplier_identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_status: Option<String>,
    pub normalized_status: NormalizedStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Why one supplier record failed to match. Recorded, never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// The record carries no source identifier at all.
    MissingIdentifier { index: usize },
    /// No master requirement has this identifier.
    NoMasterMatch { id: String },
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIdentifier { index } => {
                write!(f, "record {index}: missing identifier")
            }
            Self::NoMasterMatch { id } => {
                write!(f, "no master requirement for id {id}")
            }
        }
    }
}

/// Output of matching one supplier's records against the master set.
#[derive(Debug, Default, Serialize)]
pub struct MatchOutput {
    pub matches: Vec<FeedbackMatch>,
    pub unmatched: Vec<UnmatchedReason>,
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

/// Two or more suppliers answered the same master requirement with
/// different non-empty normalized statuses. Ephemeral: recomputed on
/// demand, never persisted as authoritative state.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictReport {
    pub master_requirement_id: String,
    /// Contributing suppliers grouped by their status. `NotSet` never
    /// appears here.
    pub statuses: BTreeMap<NormalizedStatus, Vec<String>>,
}

impl ConflictReport {
    pub fn distinct_statuses(&self) -> Vec<NormalizedStatus> {
        self.statuses.keys().copied().collect()
    }

    /// All contributing suppliers, in status order then insertion order.
    pub fn contributing_suppliers(&self) -> Vec<String> {
        self.statuses.values().flatten().cloned().collect()
    }
}

/// Project-wide conflict scan.
#[derive(Debug, Default, Serialize)]
pub struct ConflictScan {
    pub conflicts: BTreeMap<String, ConflictReport>,
    pub total_requirements: usize,
    pub conflicted_requirements: usize,
    pub conflict_percentage: f64,
    pub unique_suppliers_in_conflicts: usize,
}

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
}

/// Aggregate counts for one reconciliation run. This is the caller-facing
/// diagnostic: a "successful" run with quiet data problems still shows its
/// unmatched and unknown-status counts here.
#[derive(Debug, Default, Serialize)]
pub struct ReconSummary {
    pub suppliers: usize,
    pub total_matches: usize,
    pub unmatched_missing_identifier: usize,
    pub unmatched_no_master: usize,
    pub conflicted_requirements: usize,
    pub conflict_percentage: f64,
    pub statuses_normalized: usize,
    pub unknown_statuses: usize,
}

/// Full result of a master + N-supplier reconciliation run.
#[derive(Debug, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub supplier_results: BTreeMap<String, MatchOutput>,
    pub conflicts: ConflictScan,
    pub summary: ReconSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_reason_messages() {
        let missing = UnmatchedReason::MissingIdentifier { index: 3 };
        assert_eq!(missing.to_string(), "record 3: missing identifier");

        let no_master = UnmatchedReason::NoMasterMatch { id: "R9".into() };
        assert_eq!(no_master.to_string(), "no master requirement for id R9");
    }

    #[test]
    fn conflict_report_views() {
        let mut statuses = BTreeMap::new();
        statuses.insert(NormalizedStatus::Accepted, vec!["acme".to_string()]);
        statuses.insert(
            NormalizedStatus::Rejected,
            vec!["globex".to_string(), "initech".to_string()],
        );
        let report = ConflictReport {
            master_requirement_id: "R1".into(),
            statuses,
        };

        assert_eq!(
            report.distinct_statuses(),
            vec![NormalizedStatus::Accepted, NormalizedStatus::Rejected]
        );
        assert_eq!(
            report.contributing_suppliers(),
            vec!["acme", "globex", "initech"]
        );
    }
}
