//! Relabelling a whole bibliography.
//!
//! Drives one run: segments the file, relabels every entry in file order
//! against a single [`LabelRegistry`], and collects the results.

use crate::fields::FieldScanner;
use crate::label::{LabelDeriver, LabelError, OutputEntry, Skip};
use crate::output::render_entries;
use crate::registry::LabelRegistry;
use crate::segment::segment_entries;

/// The result of relabelling one file.
#[derive(Debug, Clone, Default)]
pub struct Relabelled {
    /// Every block of the input, in file order.
    pub entries: Vec<OutputEntry>,
    /// Entries that could not get a unique label. They are still present in
    /// `entries` with their original key.
    pub failures: Vec<LabelError>,
}

impl Relabelled {
    /// The file text to write out.
    pub fn render(&self) -> String {
        render_entries(&self.entries)
    }

    /// Number of bibliographic entries, not counting stray text blocks.
    pub fn entry_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_entry()).count()
    }

    pub fn relabelled_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_relabelled()).count()
    }

    /// Entries that kept their original key.
    pub fn unchanged_count(&self) -> usize {
        self.entry_count() - self.relabelled_count()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Relabels the entries of a `.bib` file with a fresh registry.
///
/// # Examples
///
/// ```
/// use bib_labelmaker::relabel;
///
/// let bib = "@book{RN1,\nauthor = {Smith, John},\nyear = {2019}\n}\n";
/// let result = relabel(bib);
/// assert_eq!(result.render(), "@book{smith2019,\nauthor = {Smith, John},\nyear = {2019}\n}\n");
/// ```
pub fn relabel(content: &str) -> Relabelled {
    let mut registry = LabelRegistry::new();
    relabel_with(content, &LabelDeriver::for_export(), &mut registry)
}

/// Relabels the entries of a `.bib` file using the given deriver and
/// registry.
///
/// Entries are finalized strictly in file order, so collisions are always
/// suffixed the same way for the same input.
pub fn relabel_with<S: FieldScanner>(
    content: &str,
    deriver: &LabelDeriver<S>,
    registry: &mut LabelRegistry,
) -> Relabelled {
    let mut result = Relabelled::default();

    for entry in segment_entries(content) {
        match deriver.relabel(&entry, registry) {
            Ok(output) => result.entries.push(output),
            Err(err) => {
                tracing::error!(error = %err, "entry keeps its original key");
                result.entries.push(OutputEntry::unchanged(&entry, Skip::Exhausted));
                result.failures.push(err);
            }
        }
    }

    tracing::debug!(labels = ?registry.labels(), "labels assigned");
    tracing::info!(
        entries = result.entry_count(),
        relabelled = result.relabelled_count(),
        failures = result.failures.len(),
        "relabelling complete"
    );

    result
}
