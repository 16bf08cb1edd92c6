//! Identifier matching: join one supplier's records against the master set.
//!
//! Matching is exact-string on the identifier; fuzzy treatment applies to
//! status text only, never to identifiers.

use std::collections::BTreeSet;

use reqsync_core::RequirementRecord;

use crate::harmonize::StatusHarmonizer;
use crate::model::{FeedbackMatch, MatchOutput, UnmatchedReason};

/// Status attribute names probed on a supplier record, first hit wins.
const STATUS_ATTRIBUTES: [&str; 3] = ["ReqIF-WF.SupplierStatus", "SupplierStatus", "Status"];
/// Comment attribute names, same ladder.
const COMMENT_ATTRIBUTES: [&str; 3] = ["ReqIF-WF.SupplierComment", "SupplierComment", "Comment"];

pub fn supplier_status(record: &RequirementRecord) -> Option<&str> {
    STATUS_ATTRIBUTES
        .iter()
        .find_map(|name| record.attribute(name))
}

pub fn supplier_comment(record: &RequirementRecord) -> Option<&str> {
    COMMENT_ATTRIBUTES
        .iter()
        .find_map(|name| record.attribute(name))
}

/// Join supplier records to master requirements by identifier. Records
/// that cannot match are reported in `unmatched`, never silently dropped.
pub fn match_feedback(
    master_records: &[RequirementRecord],
    supplier_records: &[RequirementRecord],
    supplier_identity: &str,
    harmonizer: &mut StatusHarmonizer,
) -> MatchOutput {
    let master_ids: BTreeSet<&str> = master_records
        .iter()
        .map(|record| record.id.as_str())
        .collect();

    let mut output = MatchOutput::default();

    for (index, record) in supplier_records.iter().enumerate() {
        if record.generated_id || record.id.is_empty() {
            output
                .unmatched
                .push(UnmatchedReason::MissingIdentifier { index });
            continue;
        }
        if !master_ids.contains(record.id.as_str()) {
            output.unmatched.push(UnmatchedReason::NoMasterMatch {
                id: record.id.clone(),
            });
            continue;
        }

        let raw_status = supplier_status(record).map(str::to_string);
        let normalized_status =
            harmonizer.normalize(raw_status.as_deref(), Some(supplier_identity));

        output.matches.push(FeedbackMatch {
            master_requirement_id: record.id.clone(),
            supplier_identity: supplier_identity.to_string(),
            raw_status,
            normalized_status,
            comment: supplier_comment(record).map(str::to_string),
        });
    }

    output
}
