//! Markdown pipe-table support.
//!
//! Model replies often carry a pipe table such as:
//!
//! ```text
//! | Language | Typing  |
//! |----------|:-------:|
//! | Rust     | Static  |
//! ```
//!
//! This module recognises that shape and exposes the rows of the first
//! table block through [`markdown_reader::MarkdownTableItemReader`], so they
//! can flow through a step into any item writer (typically the CSV writer).
//!
//! Detection is a heuristic, not a Markdown parser. Any line that starts and
//! ends with `|` is treated as a row, so pipe-delimited code samples may be
//! picked up as tables.
use once_cell::sync::Lazy;
use regex::Regex;

/// A pipe-delimited row immediately followed by a separator row.
///
/// Blank space between the two uses the same whitespace set as [`trim`],
/// and a row never spans a line terminator.
static TABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\|[^\n\r\x{2028}\x{2029}]*\|[[\s\x{FEFF}]--[\x{85}]]*\n[[\s\x{FEFF}]--[\x{85}]]*\|[-:| ]+\|",
    )
    .expect("valid table pattern")
});

/// A whole trimmed line made only of pipes, dashes, colons and spaces.
static SEPARATOR_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|[-:| ]+\|$").expect("valid separator pattern"));

/// A module providing a reader over the rows of the first table in a text.
pub mod markdown_reader;

/// Whitespace as understood by Markdown emitted from web front ends: the
/// Unicode `White_Space` set plus the byte-order mark, minus U+0085.
fn is_blank(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// Trims leading and trailing [`is_blank`] characters.
pub(crate) fn trim(text: &str) -> &str {
    text.trim_matches(is_blank)
}

/// Returns `true` when `text` contains a row followed by a separator row.
pub fn contains_table(text: &str) -> bool {
    TABLE_PATTERN.is_match(text)
}

/// A trimmed line that starts and ends with `|`.
pub(crate) fn is_row_candidate(trimmed: &str) -> bool {
    trimmed.starts_with('|') && trimmed.ends_with('|')
}

pub(crate) fn is_separator_row(trimmed: &str) -> bool {
    SEPARATOR_ROW.is_match(trimmed)
}

/// Splits a trimmed row candidate into trimmed cells.
///
/// The outer pipes are dropped; a lone `|` gives a single empty cell.
pub(crate) fn split_cells(trimmed: &str) -> Vec<String> {
    let inner = trimmed
        .strip_prefix('|')
        .and_then(|rest| rest.strip_suffix('|'))
        .unwrap_or("");

    inner.split('|').map(|cell| trim(cell).to_string()).collect()
}
