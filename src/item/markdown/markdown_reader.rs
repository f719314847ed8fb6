use std::{
    cell::{Cell, RefCell},
    io::Read,
    vec::IntoIter,
};

use log::debug;
use serde::Serialize;

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::BatchError,
};

use super::{is_row_candidate, is_separator_row, split_cells, trim};

/// One non-separator row of a Markdown table, as trimmed cells.
///
/// Serializes as a plain sequence so a CSV writer emits one record per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow(pub Vec<String>);

impl TableRow {
    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reads the rows of the first contiguous table block found in a text.
///
/// Lines before the first row are skipped. The separator row is consumed
/// without being returned. The first line that is not a row after the
/// table has started ends the block, and everything after it is ignored,
/// including later tables.
///
/// Rows are returned as they are: no check is made that they have as many
/// cells as the header.
///
/// # Examples
///
/// ```
/// use tablecast::item::markdown::markdown_reader::MarkdownTableItemReaderBuilder;
/// use tablecast::core::item::ItemReader;
///
/// let text = "Results:\n| A | B |\n|---|---|\n| 1 | 2 |\n\n| x |\n|---|";
/// let reader = MarkdownTableItemReaderBuilder::new().from_text(text);
///
/// assert_eq!(reader.read().unwrap().unwrap().cells(), ["A", "B"]);
/// assert_eq!(reader.read().unwrap().unwrap().cells(), ["1", "2"]);
/// assert!(reader.read().unwrap().is_none());
/// ```
pub struct MarkdownTableItemReader {
    lines: RefCell<IntoIter<String>>,
    inside_table: Cell<bool>,
    finished: Cell<bool>,
}

impl MarkdownTableItemReader {
    fn new(text: &str) -> Self {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        Self {
            lines: RefCell::new(lines.into_iter()),
            inside_table: Cell::new(false),
            finished: Cell::new(false),
        }
    }

    /// Whether a row or separator has been seen yet.
    pub fn is_inside_table(&self) -> bool {
        self.inside_table.get()
    }
}

impl ItemReader<TableRow> for MarkdownTableItemReader {
    fn read(&self) -> ItemReaderResult<TableRow> {
        if self.finished.get() {
            return Ok(None);
        }

        let mut lines = self.lines.borrow_mut();

        for line in lines.by_ref() {
            let trimmed = trim(&line);

            if is_row_candidate(trimmed) {
                self.inside_table.set(true);

                if is_separator_row(trimmed) {
                    continue;
                }

                return Ok(Some(TableRow(split_cells(trimmed))));
            }

            if self.inside_table.get() {
                debug!("End of first table block");
                break;
            }
        }

        self.finished.set(true);
        Ok(None)
    }
}

/// Builder for [`MarkdownTableItemReader`].
#[derive(Default)]
pub struct MarkdownTableItemReaderBuilder {}

impl MarkdownTableItemReaderBuilder {
    pub fn new() -> Self {
        Self {}
    }

    pub fn from_text(self, text: &str) -> MarkdownTableItemReader {
        MarkdownTableItemReader::new(text)
    }

    /// Reads the whole source into memory first.
    ///
    /// # Errors
    /// `BatchError::ItemReader` when the source cannot be read as UTF-8 text.
    pub fn from_reader<R: Read>(self, mut rdr: R) -> Result<MarkdownTableItemReader, BatchError> {
        let mut text = String::new();
        rdr.read_to_string(&mut text)
            .map_err(|e| BatchError::ItemReader(format!("Unable to read markdown: {}", e)))?;
        Ok(MarkdownTableItemReader::new(&text))
    }
}
