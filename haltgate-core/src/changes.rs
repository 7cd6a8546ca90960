//! Net change-set extraction from revision-history status records.
//!
//! Records arrive most-recent-change-first. The first record seen for a
//! path decides its outcome: an `Added` is dropped when the path was
//! already removed, and a `Removed` is dropped when the path was already
//! added. Modified paths never appear in the result.

use crate::types::{ChangeSet, ChangedFile, StatusRecord};

/// Folds status records into a net [`ChangeSet`].
pub fn extract<I>(records: I) -> ChangeSet
where
    I: IntoIterator<Item = StatusRecord>,
{
    let mut changes = ChangeSet::default();
    for record in records {
        match record {
            StatusRecord::Added(path) => {
                if !changes.removals.contains(&path) {
                    changes.additions.insert(path);
                }
            }
            StatusRecord::Removed(path) => {
                if !changes.additions.contains(&path) {
                    changes.removals.insert(path);
                }
            }
            StatusRecord::Modified(_) | StatusRecord::Unrecognized => {}
        }
    }
    changes
}

/// Parses one line of `git diff --name-status` output.
///
/// Only single-letter `A`, `D` and `M` records followed by whitespace and a
/// path are recognised.
pub fn parse_status_line(line: &str) -> StatusRecord {
    let line = line.trim_end_matches('\r');
    let Some((mode, rest)) = line.split_once(|c: char| c.is_ascii_whitespace()) else {
        return StatusRecord::Unrecognized;
    };
    let path = rest.trim_start();
    if path.is_empty() {
        return StatusRecord::Unrecognized;
    }
    match mode {
        "A" => StatusRecord::Added(path.to_string()),
        "D" => StatusRecord::Removed(path.to_string()),
        "M" => StatusRecord::Modified(path.to_string()),
        _ => StatusRecord::Unrecognized,
    }
}

/// Parses a whole `--name-status` listing, one record per line.
pub fn parse_name_status(output: &str) -> Vec<StatusRecord> {
    output.lines().map(parse_status_line).collect()
}

impl ChangeSet {
    /// Builds a change set from a proposal's changed-file list.
    pub fn from_changed_files<I>(files: I) -> Self
    where
        I: IntoIterator<Item = ChangedFile>,
    {
        extract(files.into_iter().flat_map(ChangedFile::into_records))
    }

    /// Builds a change set from raw `--name-status` output.
    pub fn from_name_status(output: &str) -> Self {
        extract(parse_name_status(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(p: &str) -> StatusRecord {
        StatusRecord::Added(p.to_string())
    }

    fn removed(p: &str) -> StatusRecord {
        StatusRecord::Removed(p.to_string())
    }

    #[test]
    fn empty_input_yields_empty_change_set() {
        let changes = extract(Vec::new());
        assert!(changes.is_empty());
    }

    #[test]
    fn newer_removal_wins_over_older_addition() {
        let changes = extract(vec![removed(".github/HALT"), added(".github/HALT")]);
        assert!(changes.additions().is_empty());
        assert_eq!(changes.removals().as_slice(), [".github/HALT"]);
    }

    #[test]
    fn newer_addition_wins_over_older_removal() {
        let changes = extract(vec![added("x"), removed("x")]);
        assert_eq!(changes.additions().as_slice(), ["x"]);
        assert!(changes.removals().is_empty());
    }

    #[test]
    fn duplicate_records_are_collapsed() {
        let changes = extract(vec![added("a"), added("b"), added("a")]);
        assert_eq!(changes.additions().as_slice(), ["a", "b"]);
    }

    #[test]
    fn modified_and_unrecognized_are_ignored() {
        let changes = extract(vec![
            StatusRecord::Modified("m".to_string()),
            StatusRecord::Unrecognized,
        ]);
        assert!(changes.is_empty());
    }

    #[test]
    fn parse_handles_tab_separated_git_output() {
        assert_eq!(parse_status_line("A\t.github/HALT"), added(".github/HALT"));
        assert_eq!(parse_status_line("D\tsrc/old.rs\r"), removed("src/old.rs"));
        assert_eq!(
            parse_status_line("M  src/lib.rs"),
            StatusRecord::Modified("src/lib.rs".to_string())
        );
    }

    #[test]
    fn parse_rejects_words_starting_with_status_letters() {
        assert_eq!(parse_status_line("Another line"), StatusRecord::Unrecognized);
        assert_eq!(parse_status_line("A"), StatusRecord::Unrecognized);
        assert_eq!(parse_status_line("A   "), StatusRecord::Unrecognized);
        assert_eq!(parse_status_line("R100\told\tnew"), StatusRecord::Unrecognized);
        assert_eq!(parse_status_line(""), StatusRecord::Unrecognized);
    }

    #[test]
    fn from_name_status_parses_multiline_output() {
        let changes = ChangeSet::from_name_status("A\tnew.txt\nM\tlib.rs\nD\tgone.txt\n");
        assert_eq!(changes.additions().as_slice(), ["new.txt"]);
        assert_eq!(changes.removals().as_slice(), ["gone.txt"]);
    }
}
