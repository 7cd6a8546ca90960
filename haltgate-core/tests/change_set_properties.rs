//! Property tests for net change-set extraction.

use haltgate_core::changes::{extract, parse_name_status};
use haltgate_core::StatusRecord;
use proptest::prelude::*;

fn arb_record() -> impl Strategy<Value = StatusRecord> {
    let path = prop::sample::select(vec!["a", "b", ".github/HALT", "src/lib.rs"]);
    (0u8..4, path).prop_map(|(kind, path)| match kind {
        0 => StatusRecord::Added(path.to_string()),
        1 => StatusRecord::Removed(path.to_string()),
        2 => StatusRecord::Modified(path.to_string()),
        _ => StatusRecord::Unrecognized,
    })
}

fn first_event_for(records: &[StatusRecord], path: &str) -> Option<&'static str> {
    records.iter().find_map(|r| match r {
        StatusRecord::Added(p) if p == path => Some("added"),
        StatusRecord::Removed(p) if p == path => Some("removed"),
        _ => None,
    })
}

proptest! {
    /// No path is ever both added and removed.
    #[test]
    fn additions_and_removals_are_disjoint(records in prop::collection::vec(arb_record(), 0..24)) {
        let changes = extract(records);
        for path in changes.additions().iter() {
            prop_assert!(!changes.removals().contains(path), "{path} in both sets");
        }
    }

    /// The most recent add/delete record for a path decides its set.
    #[test]
    fn most_recent_event_decides(records in prop::collection::vec(arb_record(), 0..24)) {
        let changes = extract(records.clone());
        for path in ["a", "b", ".github/HALT", "src/lib.rs"] {
            match first_event_for(&records, path) {
                Some("added") => prop_assert!(changes.additions().contains(path)),
                Some("removed") => prop_assert!(changes.removals().contains(path)),
                _ => {
                    prop_assert!(!changes.additions().contains(path));
                    prop_assert!(!changes.removals().contains(path));
                }
            }
        }
    }

    /// Each path is reported at most once.
    #[test]
    fn sets_hold_no_duplicates(records in prop::collection::vec(arb_record(), 0..24)) {
        let changes = extract(records);
        let mut seen = std::collections::HashSet::new();
        for path in changes.additions().iter().chain(changes.removals().iter()) {
            prop_assert!(seen.insert(path.to_string()));
        }
    }
}

#[test]
fn added_older_removed_newer_nets_to_removed() {
    // Newest first: the removal at t0 is scanned before the addition at t1.
    let records = vec![
        StatusRecord::Removed("P".to_string()),
        StatusRecord::Added("P".to_string()),
    ];
    let changes = extract(records);
    assert!(changes.additions().is_empty());
    assert_eq!(changes.removals().as_slice(), ["P"]);
}

#[test]
fn order_is_first_observed_not_alphabetical() {
    let changes = extract(parse_name_status("A\tzeta\nA\talpha\nD\tmid\nA\tbeta\n"));
    assert_eq!(changes.additions().as_slice(), ["zeta", "alpha", "beta"]);
    assert_eq!(changes.removals().as_slice(), ["mid"]);
}

#[test]
fn malformed_lines_are_skipped() {
    let output = "commit deadbeef\n\nAdd things\nA\tkept.txt\nX\tunknown\nD\n";
    let changes = extract(parse_name_status(output));
    assert_eq!(changes.additions().as_slice(), ["kept.txt"]);
    assert!(changes.removals().is_empty());
}
