//! bib-labelmaker: rewrite BibTeX citation keys to author-year labels.
//!
//! This library provides functionality to:
//! - Split an exported `.bib` file into entries
//! - Read author surnames and the publication year of each entry
//! - Derive `smith2019`-style labels and resolve collisions with letter suffixes
//! - Write the entries back with every other line untouched
//!
//! Field extraction is text scanning tuned to one reference manager's export
//! format, not a BibTeX grammar.

pub mod bibfile;
pub mod fields;
pub mod label;
pub mod output;
pub mod processor;
pub mod registry;
pub mod segment;

pub use bibfile::{load_bib, write_bib, BibFileError};
pub use fields::{ExportScanner, FieldError, FieldScanner, Year};
pub use label::{
    build_label, normalize_surname, LabelDeriver, LabelError, Outcome, OutputEntry, Skip,
};
pub use output::{
    key_changes, labelled_path, render_entries, summary_json, ChangeStatus, KeyChange,
};
pub use processor::{relabel, relabel_with, Relabelled};
pub use registry::{LabelRegistry, RegistryError};
pub use segment::{segment_entries, RawEntry};
