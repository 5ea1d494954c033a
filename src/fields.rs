//! Field scanning for exported entries.
//!
//! This is not a BibTeX parser. It reads the narrow shape one reference
//! manager exports:
//!
//! - the author list sits on the line right after the `@type{key,` header,
//! - values are wrapped in a single pair of braces, never nested,
//! - dates are plain `origdate`, `year` or `date` fields.
//!
//! Anything outside that shape is reported as a [`FieldError`] for the
//! entry, never patched up. The [`FieldScanner`] trait is the seam where a
//! grammar-aware parser can replace [`ExportScanner`].

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::segment::RawEntry;

/// Index of the line expected to hold the author list.
pub const AUTHOR_LINE: usize = 1;

/// Separator between authors inside the author value.
pub const AUTHOR_SEPARATOR: &str = " and ";

/// Date fields, highest priority first.
pub const DATE_FIELD_PRIORITY: [&str; 3] = ["origdate", "year", "date"];

/// Number of characters read from a date value.
const YEAR_WIDTH: usize = 4;

const FORTHCOMING: &str = "forthcoming";

static DATE_FIELD_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    DATE_FIELD_PRIORITY
        .iter()
        .map(|field| {
            let pattern = format!(r"(?m)^[ \t]*{field}[ \t]*=[ \t]*\{{");
            let re = Regex::new(&pattern).expect("date field pattern is a valid regex");
            (*field, re)
        })
        .collect()
});

/// Errors for entries that do not have the expected exported shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("entry '{key}': {field} field has no opening brace")]
    MissingBrace { key: String, field: &'static str },

    #[error("entry '{key}': {field} field has no closing brace on its line")]
    UnclosedValue { key: String, field: &'static str },

    #[error("header line '{line}' has no '{{key,' citation key")]
    MalformedHeader { line: String },
}

/// Publication year as used in a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Year {
    /// The characters read from the date field, verbatim.
    Value(String),
    /// The date field reads `forthcoming`.
    Forthcoming,
    /// None of the date fields is present.
    Missing,
}

impl Year {
    /// Interprets the characters read from a date value.
    pub fn from_slice(slice: &str) -> Self {
        if slice.eq_ignore_ascii_case(&FORTHCOMING[..YEAR_WIDTH]) {
            Year::Forthcoming
        } else {
            Year::Value(slice.to_string())
        }
    }

    /// The text appended to a label.
    pub fn as_label_part(&self) -> &str {
        match self {
            Year::Value(value) => value,
            Year::Forthcoming => FORTHCOMING,
            Year::Missing => "",
        }
    }
}

/// Reads the author list and year out of an entry.
pub trait FieldScanner {
    /// The authors of the entry, in order.
    ///
    /// `Ok(None)` means the entry has no author list where one is expected
    /// and must be left untouched.
    fn authors(&self, entry: &RawEntry) -> Result<Option<Vec<String>>, FieldError>;

    /// The entry's publication year.
    fn year(&self, entry: &RawEntry) -> Year;
}

/// Scanner for the fixed line layout of exported files.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportScanner;

impl FieldScanner for ExportScanner {
    fn authors(&self, entry: &RawEntry) -> Result<Option<Vec<String>>, FieldError> {
        let Some(line) = entry.line(AUTHOR_LINE) else {
            return Ok(None);
        };
        if !line.contains("author") {
            return Ok(None);
        }

        let value = braced_value(line).map_err(|kind| kind.into_error(entry, "author"))?;
        let authors = value.split(AUTHOR_SEPARATOR).map(str::to_string).collect();
        Ok(Some(authors))
    }

    fn year(&self, entry: &RawEntry) -> Year {
        let text = entry.text();
        for (field, re) in DATE_FIELD_PATTERNS.iter() {
            if let Some(found) = re.find(&text) {
                let slice = year_slice(&text[found.end()..]);
                tracing::trace!(field, slice, "date field found");
                return Year::from_slice(slice);
            }
        }
        Year::Missing
    }
}

/// The last name of an author written as `Last, First Middle`.
///
/// Authors without a comma are taken whole.
pub fn raw_surname(author: &str) -> &str {
    author
        .split_once(',')
        .map_or(author, |(surname, _)| surname)
}

enum BraceProblem {
    NoOpening,
    NoClosing,
}

impl BraceProblem {
    fn into_error(self, entry: &RawEntry, field: &'static str) -> FieldError {
        let key = entry.key().unwrap_or_else(|| entry.header().trim_end()).to_string();
        match self {
            BraceProblem::NoOpening => FieldError::MissingBrace { key, field },
            BraceProblem::NoClosing => FieldError::UnclosedValue { key, field },
        }
    }
}

/// The text between the first `{` and the first `}` after it.
fn braced_value(line: &str) -> Result<&str, BraceProblem> {
    let start = line.find('{').ok_or(BraceProblem::NoOpening)? + 1;
    let len = line[start..].find('}').ok_or(BraceProblem::NoClosing)?;
    Ok(&line[start..start + len])
}

/// Up to four characters of a date value, stopping at the closing brace or
/// the end of the line.
fn year_slice(value: &str) -> &str {
    let end = value
        .char_indices()
        .take_while(|(_, c)| !matches!(c, '}' | '\n' | '\r'))
        .take(YEAR_WIDTH)
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());
    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment_entries;

    fn entry(text: &str) -> RawEntry {
        segment_entries(text).remove(0)
    }

    // --- Tests for ExportScanner::authors ---

    #[test]
    fn test_authors_single() {
        // Given: an entry with one author on the second line
        let e = entry("@book{RN1,\nauthor = {Smith, John},\nyear = {2019}\n}\n");

        // When: we scan the authors
        let authors = ExportScanner.authors(&e).unwrap();

        // Then: the single author is returned
        assert_eq!(authors, Some(vec!["Smith, John".to_string()]));
    }

    #[test]
    fn test_authors_split_on_and() {
        let e = entry(
            "@article{RN2,\nauthor = {Basso, Gaetano and Peri, Giovanni and Rahman, Ahmed S.},\n}\n",
        );

        let authors = ExportScanner.authors(&e).unwrap().unwrap();

        assert_eq!(
            authors,
            vec!["Basso, Gaetano", "Peri, Giovanni", "Rahman, Ahmed S."]
        );
    }

    #[test]
    fn test_authors_absent_from_second_line() {
        // Given: an entry whose second line is the title
        let e = entry("@book{RN3,\ntitle = {Anonymous Work},\nauthor = {Doe, Jane},\n}\n");

        // When: we scan the authors
        let authors = ExportScanner.authors(&e).unwrap();

        // Then: no author list is reported, the entry is left alone
        assert_eq!(authors, None);
    }

    #[test]
    fn test_authors_header_only_entry() {
        let e = RawEntry::from_lines(["@book{RN4,\n"]);

        assert_eq!(ExportScanner.authors(&e).unwrap(), None);
    }

    #[test]
    fn test_authors_missing_opening_brace() {
        let e = entry("@book{RN5,\nauthor = Smith, John,\n}\n");

        let err = ExportScanner.authors(&e).unwrap_err();

        assert_eq!(
            err,
            FieldError::MissingBrace {
                key: "RN5".to_string(),
                field: "author"
            }
        );
        assert!(err.to_string().contains("RN5"));
    }

    #[test]
    fn test_authors_value_spanning_lines() {
        let e = entry("@book{RN6,\nauthor = {Smith, John and\nDoe, Jane},\n}\n");

        let err = ExportScanner.authors(&e).unwrap_err();

        assert!(matches!(err, FieldError::UnclosedValue { ref key, .. } if key == "RN6"));
    }

    // --- Tests for ExportScanner::year ---

    #[test]
    fn test_year_plain() {
        let e = entry("@book{RN1,\nauthor = {Smith, John},\nyear = {2019}\n}\n");

        assert_eq!(ExportScanner.year(&e), Year::Value("2019".to_string()));
    }

    #[test]
    fn test_year_origdate_wins_over_year() {
        // Given: both origdate and year, year listed first
        let e = entry(
            "@book{RN1,\nauthor = {Smith, John},\nyear = {2020},\norigdate = {1995}\n}\n",
        );

        // When: we read the year
        // Then: origdate has priority
        assert_eq!(ExportScanner.year(&e), Year::Value("1995".to_string()));
    }

    #[test]
    fn test_year_wins_over_date() {
        // Given: a date field listed before the year field
        let e = entry(
            "@book{RN1,\nauthor = {Doe, Jane},\ndate = {2018-01-01},\nyear = {2020}\n}\n",
        );

        // When: we read the year
        // Then: year has priority over date
        assert_eq!(ExportScanner.year(&e), Year::Value("2020".to_string()));
    }

    #[test]
    fn test_year_falls_back_to_date() {
        let e = entry("@online{RN1,\nauthor = {Smith, John},\ndate = {2018-05-02}\n}\n");

        assert_eq!(ExportScanner.year(&e), Year::Value("2018".to_string()));
    }

    #[test]
    fn test_year_ignores_urldate() {
        let e = entry("@online{RN1,\nauthor = {Smith, John},\nurldate = {2018-05-02}\n}\n");

        assert_eq!(ExportScanner.year(&e), Year::Missing);
    }

    #[test]
    fn test_year_forthcoming() {
        let e = entry("@inbook{RN1,\nauthor = {Smith, John},\nyear = {forthcoming}\n}\n");

        assert_eq!(ExportScanner.year(&e), Year::Forthcoming);
        assert_eq!(ExportScanner.year(&e).as_label_part(), "forthcoming");
    }

    #[test]
    fn test_year_short_value_stops_at_brace() {
        let e = entry("@book{RN1,\nauthor = {Smith, John},\nyear = {99},\n}\n");

        assert_eq!(ExportScanner.year(&e), Year::Value("99".to_string()));
    }

    #[test]
    fn test_year_missing() {
        let e = entry("@book{RN1,\nauthor = {Smith, John},\ntitle = {The year = {x}}\n}\n");

        assert_eq!(ExportScanner.year(&e), Year::Missing);
        assert_eq!(Year::Missing.as_label_part(), "");
    }

    // --- Tests for helpers ---

    #[test]
    fn test_raw_surname() {
        assert_eq!(raw_surname("Rákosi, György"), "Rákosi");
        assert_eq!(raw_surname("van der Berg, Anna"), "van der Berg");
        assert_eq!(raw_surname("UNESCO"), "UNESCO");
    }

    #[test]
    fn test_year_slice_counts_characters_not_bytes() {
        assert_eq!(year_slice("ŕ999},"), "ŕ999");
        assert_eq!(year_slice("}"), "");
        assert_eq!(year_slice("2021-03-04}"), "2021");
    }

    #[test]
    fn test_year_from_slice_is_case_insensitive_for_forthcoming() {
        assert_eq!(Year::from_slice("Fort"), Year::Forthcoming);
        assert_eq!(Year::from_slice("2020"), Year::Value("2020".to_string()));
    }
}
