//! One-call reconciliation: master records plus N supplier record sets in,
//! full report out.

use std::collections::BTreeMap;

use reqsync_core::RequirementRecord;

use crate::conflict::scan_conflicts;
use crate::harmonize::StatusHarmonizer;
use crate::matcher::match_feedback;
use crate::model::{FeedbackMatch, ReconMeta, ReconReport, ReconSummary, UnmatchedReason};

/// Run a reconciliation over one review cycle. Suppliers are processed in
/// the given order; the harmonizer is consulted per record and its
/// counters end up in the summary.
pub fn run(
    master_records: &[RequirementRecord],
    suppliers: &[(String, Vec<RequirementRecord>)],
    harmonizer: &mut StatusHarmonizer,
) -> ReconReport {
    let mut supplier_results = BTreeMap::new();
    let mut all_matches: Vec<FeedbackMatch> = Vec::new();

    for (identity, records) in suppliers {
        let output = match_feedback(master_records, records, identity, harmonizer);
        all_matches.extend(output.matches.iter().cloned());
        supplier_results.insert(identity.clone(), output);
    }

    let conflicts = scan_conflicts(master_records.len(), &all_matches);

    let mut summary = ReconSummary {
        suppliers: suppliers.len(),
        total_matches: all_matches.len(),
        conflicted_requirements: conflicts.conflicted_requirements,
        conflict_percentage: conflicts.conflict_percentage,
        statuses_normalized: harmonizer.stats().total_normalized,
        unknown_statuses: harmonizer.stats().unknown_fallbacks,
        ..Default::default()
    };
    for output in supplier_results.values() {
        for reason in &output.unmatched {
            match reason {
                UnmatchedReason::MissingIdentifier { .. } => {
                    summary.unmatched_missing_identifier += 1;
                }
                UnmatchedReason::NoMasterMatch { .. } => {
                    summary.unmatched_no_master += 1;
                }
            }
        }
    }

    ReconReport {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        supplier_results,
        conflicts,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqsync_core::{Attributes, NormalizedStatus, RequirementRecord};

    fn master(id: &str) -> RequirementRecord {
        RequirementRecord {
            id: id.into(),
            ..Default::default()
        }
    }

    fn response(id: &str, status: &str) -> RequirementRecord {
        let mut attributes = Attributes::new();
        attributes.push("SupplierStatus".into(), status.into());
        RequirementRecord {
            id: id.into(),
            attributes,
            ..Default::default()
        }
    }

    #[test]
    fn full_run_produces_conflicts_and_summary() {
        let masters = vec![master("R1"), master("R2"), master("R3")];
        let suppliers = vec![
            (
                "acme".to_string(),
                vec![response("R1", "agreed"), response("R2", "ok")],
            ),
            (
                "globex".to_string(),
                vec![
                    response("R1", "rejected"),
                    response("R2", "accepted"),
                    response("R9", "ok"),
                ],
            ),
        ];

        let mut harmonizer = StatusHarmonizer::new();
        let report = run(&masters, &suppliers, &mut harmonizer);

        assert_eq!(report.summary.suppliers, 2);
        assert_eq!(report.summary.total_matches, 4);
        assert_eq!(report.summary.unmatched_no_master, 1);
        assert_eq!(report.summary.unmatched_missing_identifier, 0);

        // R1: accepted vs rejected is the only conflict.
        assert_eq!(report.conflicts.conflicted_requirements, 1);
        let conflict = &report.conflicts.conflicts["R1"];
        assert_eq!(
            conflict.distinct_statuses(),
            vec![NormalizedStatus::Accepted, NormalizedStatus::Rejected]
        );

        // Normalization only runs for matched records, one call each.
        assert_eq!(report.summary.statuses_normalized, 4);
        assert!(!report.meta.run_at.is_empty());
    }

    #[test]
    fn report_serializes_to_json() {
        let masters = vec![master("R1")];
        let suppliers = vec![("acme".to_string(), vec![response("R1", "ok")])];
        let mut harmonizer = StatusHarmonizer::new();
        let report = run(&masters, &suppliers, &mut harmonizer);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["total_matches"], 1);
        assert_eq!(
            json["supplier_results"]["acme"]["matches"][0]["normalized_status"],
            "Accepted"
        );
    }
}
