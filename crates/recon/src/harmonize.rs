//! Status harmonization: free-form supplier vocabulary into the closed
//! four-value taxonomy.
//!
//! Resolution order, short-circuiting on first hit:
//! 1. empty input → `NotSet`
//! 2. per-supplier override table
//! 3. global default table
//! 4. substring keyword fallback (accept before clarify before reject)
//! 5. `ClarificationNeeded` — an unknown status needs human attention
//!    rather than a silent accept or reject.
//!
//! Lookups try the compacted key (trimmed, lower-cased, spaces removed)
//! first, then the space-preserving form, in both the override and the
//! default table.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use reqsync_core::NormalizedStatus;

use crate::error::ReconError;

/// Unknown raw statuses kept for diagnostic review.
const MAX_UNKNOWN_SAMPLES: usize = 20;

const ACCEPT_HINTS: [&str; 6] = ["accept", "agree", "ok", "comply", "confirm", "approved"];
const CLARIFY_HINTS: [&str; 7] = [
    "clarif",
    "question",
    "unclear",
    "pending",
    "tbc",
    "to be clarified",
    "needs discussion",
];
const REJECT_HINTS: [&str; 7] = [
    "reject",
    "decline",
    "not accept",
    "disagree",
    "nok",
    "not ok",
    "refused",
];

/// Process-local harmonization counters. Statistics, not persisted state.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct HarmonizerStats {
    pub total_normalized: usize,
    pub default_table_hits: usize,
    pub override_hits: usize,
    pub unknown_fallbacks: usize,
}

/// Per-supplier mapping tables in TOML form:
///
/// ```toml
/// [suppliers."Acme Gmbh"]
/// "ok-ish" = "Rejected"
/// "fine by us" = "Accepted"
/// ```
#[derive(Debug, Deserialize)]
struct MappingFile {
    #[serde(default)]
    suppliers: BTreeMap<String, BTreeMap<String, String>>,
}

/// Maps raw supplier status strings to [`NormalizedStatus`].
///
/// A plain owned value: share nothing, construct one per reconciliation
/// run. The counters make `normalize` take `&mut self`; the returned status
/// itself is a pure function of the input and the loaded override tables.
#[derive(Debug, Default)]
pub struct StatusHarmonizer {
    overrides: HashMap<String, HashMap<String, NormalizedStatus>>,
    stats: HarmonizerStats,
    unknown_samples: Vec<String>,
}

impl StatusHarmonizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize one raw status, using `supplier_scope`'s override table
    /// when one is loaded.
    pub fn normalize(
        &mut self,
        raw_status: Option<&str>,
        supplier_scope: Option<&str>,
    ) -> NormalizedStatus {
        let Some(raw) = raw_status else {
            return NormalizedStatus::NotSet;
        };
        let spaced = raw.trim().to_lowercase();
        if spaced.is_empty() {
            return NormalizedStatus::NotSet;
        }
        let compact: String = spaced.chars().filter(|c| !c.is_whitespace()).collect();

        if let Some(table) = supplier_scope.and_then(|scope| self.overrides.get(scope)) {
            if let Some(&status) = table.get(&compact).or_else(|| table.get(&spaced)) {
                self.stats.override_hits += 1;
                self.stats.total_normalized += 1;
                return status;
            }
        }

        if let Some(status) = default_lookup(&compact).or_else(|| default_lookup(&spaced)) {
            self.stats.default_table_hits += 1;
            self.stats.total_normalized += 1;
            return status;
        }

        if let Some(status) = fuzzy_match(&spaced) {
            self.stats.default_table_hits += 1;
            self.stats.total_normalized += 1;
            return status;
        }

        self.stats.unknown_fallbacks += 1;
        if self.unknown_samples.len() < MAX_UNKNOWN_SAMPLES {
            self.unknown_samples.push(raw.to_string());
        }
        NormalizedStatus::ClarificationNeeded
    }

    /// Replace the override table for one supplier scope. Raw keys are
    /// registered in both the compacted and the space-preserving form;
    /// unrecognized normalized names map to `NotSet` instead of failing
    /// the load.
    pub fn load_overrides(&mut self, supplier_scope: &str, mappings: &BTreeMap<String, String>) {
        let mut table = HashMap::new();
        for (raw, normalized_name) in mappings {
            let status =
                NormalizedStatus::from_name(normalized_name).unwrap_or(NormalizedStatus::NotSet);
            let spaced = raw.trim().to_lowercase();
            let compact: String = spaced.chars().filter(|c| !c.is_whitespace()).collect();
            table.insert(spaced, status);
            table.insert(compact, status);
        }
        self.overrides.insert(supplier_scope.to_string(), table);
    }

    /// Load override tables for any number of suppliers from a TOML
    /// mapping document. Returns the number of supplier scopes loaded.
    pub fn load_overrides_toml(&mut self, content: &str) -> Result<usize, ReconError> {
        let file: MappingFile =
            toml::from_str(content).map_err(|err| ReconError::MappingParse(err.to_string()))?;
        let count = file.suppliers.len();
        for (supplier, mappings) in &file.suppliers {
            self.load_overrides(supplier, mappings);
        }
        Ok(count)
    }

    pub fn stats(&self) -> HarmonizerStats {
        self.stats
    }

    pub fn unknown_samples(&self) -> &[String] {
        &self.unknown_samples
    }

    pub fn reset_stats(&mut self) {
        self.stats = HarmonizerStats::default();
        self.unknown_samples.clear();
    }
}

/// Fixed vocabulary table. Spellings cover both the compacted and the
/// space-preserving lookup key.
fn default_lookup(key: &str) -> Option<NormalizedStatus> {
    let status = match key {
        "ok" | "accepted" | "agreed" | "compliant" | "confirmed" | "yes" => {
            NormalizedStatus::Accepted
        }
        "needs clarification" | "needsclarification" | "to be clarified" | "tobeclarified"
        | "unclear" | "question" | "pending" => NormalizedStatus::ClarificationNeeded,
        "not accepted" | "notaccepted" | "rejected" | "not agreed" | "notagreed" | "declined"
        | "no" | "nok" => NormalizedStatus::Rejected,
        _ => return None,
    };
    Some(status)
}

/// Keyword containment fallback on the space-preserving key. Set order is
/// the tie-break contract: accept beats clarify beats reject.
fn fuzzy_match(spaced: &str) -> Option<NormalizedStatus> {
    if ACCEPT_HINTS.iter().any(|hint| spaced.contains(hint)) {
        return Some(NormalizedStatus::Accepted);
    }
    if CLARIFY_HINTS.iter().any(|hint| spaced.contains(hint)) {
        return Some(NormalizedStatus::ClarificationNeeded);
    }
    if REJECT_HINTS.iter().any(|hint| spaced.contains(hint)) {
        return Some(NormalizedStatus::Rejected);
    }
    None
}
