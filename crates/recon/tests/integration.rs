use std::collections::BTreeMap;

use reqsync_core::{Attributes, NormalizedStatus, RequirementRecord};
use reqsync_recon::conflict::detect_conflicts;
use reqsync_recon::engine::run;
use reqsync_recon::harmonize::StatusHarmonizer;
use reqsync_recon::model::UnmatchedReason;

fn master(id: &str) -> RequirementRecord {
    RequirementRecord {
        id: id.into(),
        ..Default::default()
    }
}

fn response(id: &str, status: Option<&str>, comment: Option<&str>) -> RequirementRecord {
    let mut attributes = Attributes::new();
    if let Some(status) = status {
        attributes.push("ReqIF-WF.SupplierStatus".into(), status.into());
    }
    if let Some(comment) = comment {
        attributes.push("ReqIF-WF.SupplierComment".into(), comment.into());
    }
    RequirementRecord {
        id: id.into(),
        attributes,
        ..Default::default()
    }
}

// -------------------------------------------------------------------------
// Review cycle end-to-end
// -------------------------------------------------------------------------

#[test]
fn review_cycle_with_overrides_and_conflicts() {
    let masters: Vec<RequirementRecord> =
        ["R1", "R2", "R3", "R4"].iter().map(|id| master(id)).collect();

    // Acme's vocabulary is nonstandard enough to need an override table.
    let mut harmonizer = StatusHarmonizer::new();
    harmonizer
        .load_overrides_toml(
            r#"
[suppliers.acme]
"ok-ish" = "Rejected"
"done deal" = "Accepted"
"#,
        )
        .unwrap();

    let suppliers = vec![
        (
            "acme".to_string(),
            vec![
                response("R1", Some("done deal"), None),
                response("R2", Some("ok-ish"), Some("tolerances too tight")),
                response("R3", Some("compliant"), None),
            ],
        ),
        (
            "globex".to_string(),
            vec![
                response("R1", Some("not agreed"), Some("cost impact")),
                response("R2", Some("accepted"), None),
                response("R3", None, None),
                response("R5", Some("ok"), None),
            ],
        ),
    ];

    let report = run(&masters, &suppliers, &mut harmonizer);

    // Matches: acme 3, globex 3 (R5 has no master).
    assert_eq!(report.summary.total_matches, 6);
    assert_eq!(
        report.supplier_results["globex"].unmatched,
        vec![UnmatchedReason::NoMasterMatch { id: "R5".into() }]
    );

    // R1 conflicts (Accepted vs Rejected), R2 conflicts (Rejected via
    // override vs Accepted). R3 does not: one real status plus NotSet.
    assert_eq!(report.conflicts.conflicted_requirements, 2);
    assert!(report.conflicts.conflicts.contains_key("R1"));
    assert!(report.conflicts.conflicts.contains_key("R2"));
    assert!(!report.conflicts.conflicts.contains_key("R3"));
    assert!((report.conflicts.conflict_percentage - 50.0).abs() < f64::EPSILON);

    let r2 = &report.conflicts.conflicts["R2"];
    assert_eq!(
        r2.statuses[&NormalizedStatus::Rejected],
        vec!["acme".to_string()]
    );
    assert_eq!(
        r2.statuses[&NormalizedStatus::Accepted],
        vec!["globex".to_string()]
    );

    // Override hits show up in the harmonizer's counters.
    assert_eq!(harmonizer.stats().override_hits, 2);
    assert_eq!(harmonizer.stats().unknown_fallbacks, 0);
}

#[test]
fn detect_conflicts_direct_api() {
    let masters = vec![master("R1")];
    let suppliers = vec![
        ("acme".to_string(), vec![response("R1", Some("yes"), None)]),
        ("globex".to_string(), vec![response("R1", Some("no"), None)]),
    ];
    let mut harmonizer = StatusHarmonizer::new();
    let report = run(&masters, &suppliers, &mut harmonizer);

    let all_matches: Vec<_> = report
        .supplier_results
        .values()
        .flat_map(|output| output.matches.iter().cloned())
        .collect();

    let conflict = detect_conflicts("R1", &all_matches).unwrap();
    assert_eq!(conflict.contributing_suppliers(), vec!["acme", "globex"]);
    assert!(detect_conflicts("R2", &all_matches).is_none());
}

#[test]
fn comments_travel_with_matches() {
    let masters = vec![master("R1")];
    let suppliers = vec![(
        "acme".to_string(),
        vec![response("R1", Some("unclear"), Some("which variant applies?"))],
    )];
    let mut harmonizer = StatusHarmonizer::new();
    let report = run(&masters, &suppliers, &mut harmonizer);

    let matched = &report.supplier_results["acme"].matches[0];
    assert_eq!(matched.normalized_status, NormalizedStatus::ClarificationNeeded);
    assert_eq!(matched.raw_status.as_deref(), Some("unclear"));
    assert_eq!(matched.comment.as_deref(), Some("which variant applies?"));
}

#[test]
fn one_harmonizer_per_run_keeps_counters_scoped() {
    let masters = vec![master("R1")];
    let suppliers = vec![(
        "acme".to_string(),
        vec![response("R1", Some("gibberish value"), None)],
    )];

    let mut first = StatusHarmonizer::new();
    let first_report = run(&masters, &suppliers, &mut first);
    assert_eq!(first_report.summary.unknown_statuses, 1);
    assert_eq!(first.unknown_samples(), ["gibberish value"]);

    let mut second = StatusHarmonizer::new();
    let second_report = run(&masters, &suppliers, &mut second);
    assert_eq!(second_report.summary.unknown_statuses, 1);
}

#[test]
fn mapping_table_round_trips_through_plain_maps() {
    let mut mappings = BTreeMap::new();
    mappings.insert("will comply".to_string(), "Accepted".to_string());
    mappings.insert("garbage target".to_string(), "NoSuchStatus".to_string());

    let mut harmonizer = StatusHarmonizer::new();
    harmonizer.load_overrides("acme", &mappings);

    assert_eq!(
        harmonizer.normalize(Some("Will Comply"), Some("acme")),
        NormalizedStatus::Accepted
    );
    // Invalid normalized names degrade to NotSet instead of failing the load.
    assert_eq!(
        harmonizer.normalize(Some("garbage target"), Some("acme")),
        NormalizedStatus::NotSet
    );
}
