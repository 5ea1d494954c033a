//! Output generation for relabelled bibliographies.
//!
//! Renders entries back to file text, names the output file, and builds the
//! JSON summary of key changes.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::label::{OutputEntry, Outcome, Skip};

/// Appended to the input file stem to name the output file.
pub const LABELLED_SUFFIX: &str = "_labelled.bib";

/// Joins entries into file text.
///
/// Each entry keeps its own lines and closing `}` line; entries are
/// separated by a single `"\n"`, which restores the blank line between
/// records.
pub fn render_entries(entries: &[OutputEntry]) -> String {
    entries
        .iter()
        .map(OutputEntry::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The sibling path the relabelled file is written to.
///
/// `refs/library.bib` becomes `refs/library_labelled.bib`. Only the last
/// extension is dropped.
pub fn labelled_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}{}", stem, LABELLED_SUFFIX))
}

/// One line of the `--json` summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyChange {
    /// Key in the input, if the block had one.
    pub original: Option<String>,
    /// Key in the output.
    pub label: Option<String>,
    pub status: ChangeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeStatus {
    Relabelled,
    NoAuthor,
    Malformed,
    Exhausted,
}

/// Summarizes what happened to each entry, in file order.
///
/// Blocks that are not entries (stray text between records) are left out.
pub fn key_changes(entries: &[OutputEntry]) -> Vec<KeyChange> {
    entries
        .iter()
        .filter(|e| e.original_key().is_some() || e.is_relabelled())
        .map(|e| {
            let status = match e.outcome() {
                Outcome::Relabelled { .. } => ChangeStatus::Relabelled,
                Outcome::Unchanged(Skip::NoAuthor) => ChangeStatus::NoAuthor,
                Outcome::Unchanged(Skip::Structural(_)) => ChangeStatus::Malformed,
                Outcome::Unchanged(Skip::Exhausted) => ChangeStatus::Exhausted,
            };
            KeyChange {
                original: e.original_key().map(str::to_string),
                label: e.key().map(str::to_string),
                status,
            }
        })
        .collect()
}

/// The key-change summary as pretty-printed JSON.
pub fn summary_json(entries: &[OutputEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&key_changes(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::relabel;

    const TWO_ENTRIES: &str = "@book{RN123,\nauthor = {Bresnan, Joan},\nyear = {2016}\n}\n\n@book{RN9,\ntitle = {Handbook}\n}\n";

    // ===========================================
    // Tests for render_entries
    // ===========================================

    #[test]
    fn test_render_restores_blank_line_between_entries() {
        // Given: two entries separated by a blank line
        let result = relabel(TWO_ENTRIES);

        // When: we render them
        let text = render_entries(&result.entries);

        // Then: the layout is the input's, with the new key
        assert_eq!(
            text,
            "@book{bresnan2016,\nauthor = {Bresnan, Joan},\nyear = {2016}\n}\n\n@book{RN9,\ntitle = {Handbook}\n}\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_entries(&[]), "");
    }

    // ===========================================
    // Tests for labelled_path
    // ===========================================

    #[test]
    fn test_labelled_path_sibling() {
        assert_eq!(
            labelled_path(Path::new("refs/library.bib")),
            PathBuf::from("refs/library_labelled.bib")
        );
    }

    #[test]
    fn test_labelled_path_bare_name() {
        assert_eq!(
            labelled_path(Path::new("library.bib")),
            PathBuf::from("library_labelled.bib")
        );
    }

    #[test]
    fn test_labelled_path_only_last_extension_dropped() {
        assert_eq!(
            labelled_path(Path::new("/tmp/my.refs.bib")),
            PathBuf::from("/tmp/my.refs_labelled.bib")
        );
    }

    #[test]
    fn test_labelled_path_without_extension() {
        assert_eq!(
            labelled_path(Path::new("data/library")),
            PathBuf::from("data/library_labelled.bib")
        );
    }

    // ===========================================
    // Tests for key_changes / summary_json
    // ===========================================

    #[test]
    fn test_key_changes() {
        let result = relabel(TWO_ENTRIES);

        let changes = key_changes(&result.entries);

        assert_eq!(
            changes,
            vec![
                KeyChange {
                    original: Some("RN123".to_string()),
                    label: Some("bresnan2016".to_string()),
                    status: ChangeStatus::Relabelled,
                },
                KeyChange {
                    original: Some("RN9".to_string()),
                    label: Some("RN9".to_string()),
                    status: ChangeStatus::NoAuthor,
                },
            ]
        );
    }

    #[test]
    fn test_key_changes_skip_stray_text() {
        let result = relabel("% comment\n@book{RN9,\ntitle = {Handbook}\n}\n");

        assert_eq!(key_changes(&result.entries).len(), 1);
    }

    #[test]
    fn test_summary_json_shape() {
        let result = relabel(TWO_ENTRIES);

        let json = summary_json(&result.entries).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(parsed.is_array());
        assert_eq!(parsed[0]["original"], "RN123");
        assert_eq!(parsed[0]["label"], "bresnan2016");
        assert_eq!(parsed[0]["status"], "relabelled");
        assert_eq!(parsed[1]["status"], "no-author");
    }
}
