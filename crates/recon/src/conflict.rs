//! Conflict detection: different non-empty normalized statuses from
//! different suppliers on the same master requirement.

use std::collections::{BTreeMap, BTreeSet};

use reqsync_core::NormalizedStatus;

use crate::model::{ConflictReport, ConflictScan, FeedbackMatch};

/// Detect a status conflict for one master requirement. `NotSet` responses
/// never participate; a conflict needs at least two distinct remaining
/// statuses.
pub fn detect_conflicts(
    master_requirement_id: &str,
    matches: &[FeedbackMatch],
) -> Option<ConflictReport> {
    let mut statuses: BTreeMap<NormalizedStatus, Vec<String>> = BTreeMap::new();

    for feedback in matches {
        if feedback.master_requirement_id != master_requirement_id {
            continue;
        }
        if feedback.normalized_status == NormalizedStatus::NotSet {
            continue;
        }
        statuses
            .entry(feedback.normalized_status)
            .or_default()
            .push(feedback.supplier_identity.clone());
    }

    if statuses.len() < 2 {
        return None;
    }
    Some(ConflictReport {
        master_requirement_id: master_requirement_id.to_string(),
        statuses,
    })
}

/// Project-wide variant: every conflicted requirement plus the share of
/// the total they represent.
pub fn scan_conflicts(total_requirements: usize, matches: &[FeedbackMatch]) -> ConflictScan {
    let mut by_requirement: BTreeMap<&str, Vec<FeedbackMatch>> = BTreeMap::new();
    for feedback in matches {
        by_requirement
            .entry(feedback.master_requirement_id.as_str())
            .or_default()
            .push(feedback.clone());
    }

    let mut conflicts = BTreeMap::new();
    let mut suppliers_in_conflicts: BTreeSet<String> = BTreeSet::new();

    for (requirement_id, requirement_matches) in &by_requirement {
        if let Some(report) = detect_conflicts(requirement_id, requirement_matches) {
            suppliers_in_conflicts.extend(report.contributing_suppliers());
            conflicts.insert(requirement_id.to_string(), report);
        }
    }

    let conflicted_requirements = conflicts.len();
    let conflict_percentage = if total_requirements > 0 {
        conflicted_requirements as f64 / total_requirements as f64 * 100.0
    } else {
        0.0
    };

    ConflictScan {
        conflicts,
        total_requirements,
        conflicted_requirements,
        conflict_percentage,
        unique_suppliers_in_conflicts: suppliers_in_conflicts.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(requirement: &str, supplier: &str, status: NormalizedStatus) -> FeedbackMatch {
        FeedbackMatch {
            master_requirement_id: requirement.into(),
            supplier_identity: supplier.into(),
            raw_status: None,
            normalized_status: status,
            comment: None,
        }
    }

    #[test]
    fn distinct_statuses_are_a_conflict() {
        let matches = vec![
            feedback("R1", "acme", NormalizedStatus::Accepted),
            feedback("R1", "globex", NormalizedStatus::Rejected),
        ];
        let report = detect_conflicts("R1", &matches).unwrap();
        assert_eq!(
            report.distinct_statuses(),
            vec![NormalizedStatus::Accepted, NormalizedStatus::Rejected]
        );
        assert_eq!(report.contributing_suppliers(), vec!["acme", "globex"]);
    }

    #[test]
    fn agreement_is_not_a_conflict() {
        let matches = vec![
            feedback("R1", "acme", NormalizedStatus::Accepted),
            feedback("R1", "globex", NormalizedStatus::Accepted),
        ];
        assert!(detect_conflicts("R1", &matches).is_none());
    }

    #[test]
    fn not_set_does_not_conflict() {
        let matches = vec![
            feedback("R1", "acme", NormalizedStatus::NotSet),
            feedback("R1", "globex", NormalizedStatus::Accepted),
        ];
        assert!(detect_conflicts("R1", &matches).is_none());
    }

    #[test]
    fn single_response_is_never_a_conflict() {
        let matches = vec![feedback("R1", "acme", NormalizedStatus::Rejected)];
        assert!(detect_conflicts("R1", &matches).is_none());
    }

    #[test]
    fn other_requirements_matches_are_ignored() {
        let matches = vec![
            feedback("R1", "acme", NormalizedStatus::Accepted),
            feedback("R2", "globex", NormalizedStatus::Rejected),
        ];
        assert!(detect_conflicts("R1", &matches).is_none());
    }

    #[test]
    fn scan_reports_percentage_and_unique_suppliers() {
        let matches = vec![
            feedback("R1", "acme", NormalizedStatus::Accepted),
            feedback("R1", "globex", NormalizedStatus::Rejected),
            feedback("R2", "acme", NormalizedStatus::Accepted),
            feedback("R2", "globex", NormalizedStatus::Accepted),
            feedback("R3", "acme", NormalizedStatus::Rejected),
            feedback("R3", "initech", NormalizedStatus::ClarificationNeeded),
        ];
        let scan = scan_conflicts(4, &matches);

        assert_eq!(scan.conflicted_requirements, 2);
        assert!(scan.conflicts.contains_key("R1"));
        assert!(scan.conflicts.contains_key("R3"));
        assert_eq!(scan.total_requirements, 4);
        assert!((scan.conflict_percentage - 50.0).abs() < f64::EPSILON);
        assert_eq!(scan.unique_suppliers_in_conflicts, 3);
    }

    #[test]
    fn empty_project_scans_clean() {
        let scan = scan_conflicts(0, &[]);
        assert_eq!(scan.conflicted_requirements, 0);
        assert_eq!(scan.conflict_percentage, 0.0);
    }
}
