//! Label derivation.
//!
//! Turns the authors and year of an entry into an author-year label,
//! finalizes it against the run's [`LabelRegistry`] and rewrites the
//! entry's header with it.
//!
//! Labels follow three rules:
//! - one author: `surname` + year (`smith2019`)
//! - two authors: both surnames + year (`bassoperi2021`)
//! - three or more: first surname + `etal` + year (`rakosietal2020`)

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::fields::{raw_surname, ExportScanner, FieldError, FieldScanner, Year};
use crate::registry::{LabelRegistry, RegistryError};
use crate::segment::RawEntry;

/// Marker used in place of the co-authors' surnames.
pub const ET_AL: &str = "etal";

/// Author count from which co-authors are abbreviated.
const ET_AL_THRESHOLD: usize = 3;

/// Errors that stop an entry from being labelled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("entry '{key}': no free label for '{candidate}' (26 suffixes already in use)")]
    Exhausted { key: String, candidate: String },
}

/// Why an entry kept its original key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// No author list on the line after the header.
    NoAuthor,
    /// The entry does not have the expected exported shape.
    Structural(FieldError),
    /// Every suffixed variant of the label was already taken.
    Exhausted,
}

/// What happened to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Relabelled { from: String, to: String },
    Unchanged(Skip),
}

/// An entry ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry {
    lines: Vec<String>,
    original_key: Option<String>,
    outcome: Outcome,
    is_entry: bool,
}

impl OutputEntry {
    /// The entry exactly as read, tagged with the reason it was skipped.
    pub fn unchanged(entry: &RawEntry, skip: Skip) -> Self {
        Self {
            lines: entry.lines().to_vec(),
            original_key: entry.key().map(str::to_string),
            outcome: Outcome::Unchanged(skip),
            is_entry: entry.is_entry(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.concat()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// The key the entry had in the input.
    pub fn original_key(&self) -> Option<&str> {
        self.original_key.as_deref()
    }

    /// The key the entry carries in the output.
    pub fn key(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Relabelled { to, .. } => Some(to.as_str()),
            Outcome::Unchanged(_) => self.original_key(),
        }
    }

    /// Whether the block is a bibliographic entry rather than stray text
    /// between records.
    pub fn is_entry(&self) -> bool {
        self.is_entry
    }

    pub fn is_relabelled(&self) -> bool {
        matches!(self.outcome, Outcome::Relabelled { .. })
    }
}

/// Normalizes a raw surname for use in a label.
///
/// Lowercases, folds to ASCII and drops whitespace and punctuation.
/// Diacritics are removed by NFKD decomposition; a few letters that have
/// no decomposition are folded by hand.
///
/// ```
/// use bib_labelmaker::normalize_surname;
///
/// assert_eq!(normalize_surname("Rákosi"), "rakosi");
/// assert_eq!(normalize_surname("van der Berg"), "vanderberg");
/// assert_eq!(normalize_surname("O'Brien"), "obrien");
/// ```
pub fn normalize_surname(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.nfkd() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if let Some(folded) = fold_letter(c) {
            out.push_str(folded);
        }
    }
    out
}

/// ASCII spelling of letters NFKD leaves alone.
fn fold_letter(c: char) -> Option<&'static str> {
    let folded = match c {
        'ø' | 'Ø' => "o",
        'ł' | 'Ł' => "l",
        'đ' | 'Đ' | 'ð' | 'Ð' => "d",
        'ħ' | 'Ħ' => "h",
        'ı' => "i",
        'ß' | 'ẞ' => "ss",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        'þ' | 'Þ' => "th",
        _ => return None,
    };
    Some(folded)
}

/// Builds a label from normalized surnames and a year.
///
/// ```
/// use bib_labelmaker::{build_label, Year};
///
/// let year = Year::Value("2021".to_string());
/// assert_eq!(build_label(&["basso", "peri"], &year), "bassoperi2021");
/// ```
pub fn build_label<S: AsRef<str>>(surnames: &[S], year: &Year) -> String {
    let mut label = String::new();
    if surnames.len() >= ET_AL_THRESHOLD {
        label.push_str(surnames[0].as_ref());
        label.push_str(ET_AL);
    } else {
        for surname in surnames {
            label.push_str(surname.as_ref());
        }
    }
    label.push_str(year.as_label_part());
    label
}

/// Derives labels for entries, using a [`FieldScanner`] to read them.
#[derive(Debug, Clone)]
pub struct LabelDeriver<S = ExportScanner> {
    scanner: S,
}

impl LabelDeriver<ExportScanner> {
    /// A deriver for files in the exported layout.
    pub fn for_export() -> Self {
        Self {
            scanner: ExportScanner,
        }
    }
}

impl Default for LabelDeriver<ExportScanner> {
    fn default() -> Self {
        Self::for_export()
    }
}

impl<S: FieldScanner> LabelDeriver<S> {
    pub fn new(scanner: S) -> Self {
        Self { scanner }
    }

    /// The label an entry would get before collision resolution.
    ///
    /// `Ok(None)` when the entry has no author list.
    pub fn candidate(&self, entry: &RawEntry) -> Result<Option<String>, FieldError> {
        let Some(authors) = self.scanner.authors(entry)? else {
            return Ok(None);
        };

        let surnames: Vec<String> = authors
            .iter()
            .map(|author| normalize_surname(raw_surname(author)))
            .collect();
        if surnames.iter().any(String::is_empty) {
            tracing::debug!(key = ?entry.key(), "author with an empty surname");
        }

        let year = self.scanner.year(entry);
        Ok(Some(build_label(&surnames, &year)))
    }

    /// Relabels one entry, registering its final label in `registry`.
    ///
    /// Entries without an author list, or that do not have the expected
    /// shape, come back unchanged. Only label exhaustion is an error.
    pub fn relabel(
        &self,
        entry: &RawEntry,
        registry: &mut LabelRegistry,
    ) -> Result<OutputEntry, LabelError> {
        let candidate = match self.candidate(entry) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return Ok(OutputEntry::unchanged(entry, Skip::NoAuthor)),
            Err(err) => {
                tracing::warn!(error = %err, "leaving entry unchanged");
                return Ok(OutputEntry::unchanged(entry, Skip::Structural(err)));
            }
        };

        let Some((start, end)) = entry.key_span() else {
            let err = FieldError::MalformedHeader {
                line: entry.header().trim_end().to_string(),
            };
            tracing::warn!(error = %err, "leaving entry unchanged");
            return Ok(OutputEntry::unchanged(entry, Skip::Structural(err)));
        };

        let header = entry.header();
        let from = header[start..end].trim().to_string();

        let label = registry.finalize(&candidate).map_err(|err| match err {
            RegistryError::Exhausted { candidate } => LabelError::Exhausted {
                key: from.clone(),
                candidate,
            },
        })?;

        let mut lines = Vec::with_capacity(entry.lines().len());
        lines.push(format!("{}{}{}", &header[..start], label, &header[end..]));
        lines.extend(entry.field_lines().iter().cloned());

        tracing::debug!(from = %from, to = %label, "relabelled entry");

        Ok(OutputEntry {
            lines,
            original_key: Some(from.clone()),
            outcome: Outcome::Relabelled { from, to: label },
            is_entry: true,
        })
    }
}
