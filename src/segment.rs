//! Entry segmentation.
//!
//! Splits the text of an exported `.bib` file into entry blocks. An entry
//! starts at a line beginning with `@` and ends at the first line holding
//! nothing but `}`. Blank lines separate entries and are dropped.
//!
//! Lines keep their original terminators so that an entry can be written
//! back byte-for-byte.

use std::sync::LazyLock;

use regex::Regex;

/// An `@type{` header line. A bare `@` on a continuation line of a field
/// value does not match.
static HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@\w+\s*\{").expect("header pattern is a valid regex"));

/// One bibliographic record as it appeared in the input.
///
/// The first line is the header (`@type{key,`), the remaining lines are the
/// field lines followed by the closing `}` line, all with their terminators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    lines: Vec<String>,
}

impl RawEntry {
    /// Builds an entry from already-split lines (terminators included).
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// All lines of the entry, header first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The `@type{key,` line, or an empty string for an empty block.
    pub fn header(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or("")
    }

    /// The line at `index` (0 is the header).
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Every line after the header, in order.
    pub fn field_lines(&self) -> &[String] {
        self.lines.get(1..).unwrap_or(&[])
    }

    /// Whether the block opens with an `@` marker.
    ///
    /// Stray text outside any entry is still segmented into a block so it
    /// survives the rewrite, but it is not an entry.
    pub fn is_entry(&self) -> bool {
        self.header().starts_with('@')
    }

    /// The word between `@` and `{`, e.g. `book`.
    pub fn entry_type(&self) -> Option<&str> {
        let rest = self.header().strip_prefix('@')?;
        let open = rest.find('{')?;
        Some(rest[..open].trim())
    }

    /// Byte range of the citation key inside the header line.
    ///
    /// The key is whatever sits between the header's first `{` and the
    /// following `,`, untrimmed, so that replacing this range leaves the
    /// rest of the header intact.
    pub fn key_span(&self) -> Option<(usize, usize)> {
        if !self.is_entry() {
            return None;
        }
        let header = self.header();
        let start = header.find('{')? + 1;
        let end = start + header[start..].find(',')?;
        Some((start, end))
    }

    /// The original citation key, trimmed.
    pub fn key(&self) -> Option<&str> {
        self.key_span()
            .map(|(start, end)| self.header()[start..end].trim())
    }

    /// The entry text exactly as read.
    pub fn text(&self) -> String {
        self.lines.concat()
    }
}

/// Splits file content into entry blocks, in file order.
///
/// # Examples
///
/// ```
/// use bib_labelmaker::segment_entries;
///
/// let bib = "@book{RN1,\nauthor = {Doe, Jane},\n}\n\n@book{RN2,\ntitle = {X},\n}\n";
/// let entries = segment_entries(bib);
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[1].key(), Some("RN2"));
/// ```
pub fn segment_entries(content: &str) -> Vec<RawEntry> {
    let mut entries = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in content.split_inclusive('\n') {
        if is_blank_line(line) {
            continue;
        }

        // A new header while an entry is still open means the previous one
        // lost its closing brace; keep the two records apart.
        if !current.is_empty() && is_header_line(line) {
            entries.push(RawEntry {
                lines: std::mem::take(&mut current),
            });
        }

        current.push(line.to_string());

        if is_closing_line(line) {
            entries.push(RawEntry {
                lines: std::mem::take(&mut current),
            });
        }
    }

    // Truncated file: the last record has no closing line.
    if !current.is_empty() {
        entries.push(RawEntry { lines: current });
    }

    entries
}

fn is_header_line(line: &str) -> bool {
    HEADER_LINE.is_match(line)
}

fn is_blank_line(line: &str) -> bool {
    line == "\n" || line == "\r\n"
}

fn is_closing_line(line: &str) -> bool {
    line == "}\n" || line == "}\r\n"
}
