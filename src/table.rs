//! Markdown table detection and CSV export.
//!
//! [`detect_table`] decides whether a text is worth offering an export for,
//! [`convert_first_table_to_csv`] turns the first table block into CSV, and
//! [`trigger_download`] hands the result to the host.
//!
//! The conversion runs as a chunk-oriented step: a
//! [`MarkdownTableItemReader`] feeds table rows through a pass-through
//! processor into a fully quoting [`CsvItemWriter`](crate::item::csv::csv_writer::CsvItemWriter).
//!
//! ```
//! use tablecast::table::{convert_first_table_to_csv, detect_table};
//!
//! let reply = "| A | B |\n|---|---|\n| 1 | 2 |";
//!
//! assert!(detect_table(reply));
//! assert_eq!(
//!     convert_first_table_to_csv(reply).as_deref(),
//!     Some("\"A\",\"B\"\n\"1\",\"2\"")
//! );
//! ```

use csv::{QuoteStyle, Terminator};
use log::{debug, error, warn};

use crate::{
    core::{
        item::PassThroughProcessor,
        step::{Step, StepBuilder, StepExecution},
    },
    item::{
        csv::csv_writer::CsvItemWriterBuilder,
        markdown::{
            contains_table,
            markdown_reader::{MarkdownTableItemReader, MarkdownTableItemReaderBuilder, TableRow},
        },
    },
    tasklet::download::{DownloadTaskletBuilder, FileSaver},
    BatchError,
};

const CONVERT_STEP: &str = "markdown-table-to-csv";
const DOWNLOAD_STEP: &str = "csv-download";
const CHUNK_SIZE: u16 = 64;

/// Returns `true` when `text` holds a row immediately followed by a
/// separator row of `-`, `:`, `|` and spaces.
///
/// This is a heuristic: pipe-delimited text that merely looks like a table
/// is reported as one.
pub fn detect_table(text: &str) -> bool {
    contains_table(text)
}

/// Converts the first contiguous Markdown table of `text` to CSV.
///
/// Every cell is trimmed, wrapped in double quotes, and has embedded quotes
/// doubled. Rows are joined with `\n`, without a trailing newline. The
/// separator row is dropped and nothing after the first block is read.
///
/// Returns `None` when no row was found.
pub fn convert_first_table_to_csv(text: &str) -> Option<String> {
    TableCsvConverter::default().convert(text)
}

/// Offers `csv_text` to the host as a `text/csv` file named `filename`.
///
/// Fire-and-forget: any failure is logged and dropped.
pub fn trigger_download(csv_text: &str, filename: &str, saver: &dyn FileSaver) {
    let tasklet = match DownloadTaskletBuilder::new()
        .content(csv_text)
        .filename(filename)
        .saver(saver)
        .build()
    {
        Ok(tasklet) => tasklet,
        Err(error) => {
            warn!("Download of {} not started: {}", filename, error);
            return;
        }
    };

    let result = StepBuilder::new(DOWNLOAD_STEP)
        .tasklet(&tasklet)
        .build()
        .and_then(|step| step.execute(&mut StepExecution::new(DOWNLOAD_STEP)));

    if let Err(error) = result {
        warn!("Download of {} failed: {}", filename, error);
    }
}

/// File name used when exporting the table of a chat reply.
pub fn chat_export_filename(message_id: &str) -> String {
    format!("gemini-table-{message_id}.csv")
}

/// Table to CSV converter with a configurable field delimiter.
#[derive(Debug, Clone)]
pub struct TableCsvConverter {
    delimiter: u8,
}

impl Default for TableCsvConverter {
    fn default() -> Self {
        TableCsvConverterBuilder::new().build()
    }
}

impl TableCsvConverter {
    pub fn detect(&self, text: &str) -> bool {
        detect_table(text)
    }

    /// See [`convert_first_table_to_csv`].
    pub fn convert(&self, text: &str) -> Option<String> {
        let reader = MarkdownTableItemReaderBuilder::new().from_text(text);

        match self.run(&reader) {
            Ok(csv) => csv,
            Err(err) => {
                error!("Table conversion failed: {}", err);
                None
            }
        }
    }

    fn run(&self, reader: &MarkdownTableItemReader) -> Result<Option<String>, BatchError> {
        let processor = PassThroughProcessor;
        let writer = CsvItemWriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(Vec::new());

        let mut step_execution = StepExecution::new(CONVERT_STEP);
        {
            let step = StepBuilder::new(CONVERT_STEP)
                .chunk::<TableRow, TableRow>(CHUNK_SIZE)
                .reader(reader)
                .processor(&processor)
                .writer(&writer)
                .build()?;
            step.execute(&mut step_execution)?;
        }

        debug!("Converted {} table rows", step_execution.write_count);

        if step_execution.write_count == 0 {
            return Ok(None);
        }

        let bytes = writer.into_inner()?;
        let mut csv = String::from_utf8(bytes)
            .map_err(|e| BatchError::ItemWriter(format!("CSV output is not UTF-8: {}", e)))?;

        if csv.ends_with('\n') {
            csv.pop();
        }
        Ok(Some(csv))
    }
}

/// Builder for [`TableCsvConverter`]. Defaults to a comma delimiter.
#[derive(Debug, Clone)]
pub struct TableCsvConverterBuilder {
    delimiter: u8,
}

impl Default for TableCsvConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableCsvConverterBuilder {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn build(self) -> TableCsvConverter {
        TableCsvConverter {
            delimiter: self.delimiter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        chat_export_filename, convert_first_table_to_csv, detect_table, TableCsvConverterBuilder,
    };

    #[test]
    fn text_without_pipes_has_no_table() {
        let text = "Just a paragraph.\nAnd another line.";

        assert!(!detect_table(text));
        assert_eq!(convert_first_table_to_csv(text), None);
    }

    #[test]
    fn empty_text_has_no_table() {
        assert!(!detect_table(""));
        assert_eq!(convert_first_table_to_csv(""), None);
    }

    #[test]
    fn simple_table_is_converted_without_separator() {
        let text = "| A | B |\n|---|---|\n| 1 | 2 |";

        assert!(detect_table(text));
        assert_eq!(
            convert_first_table_to_csv(text).as_deref(),
            Some("\"A\",\"B\"\n\"1\",\"2\"")
        );
    }

    #[test]
    fn only_the_first_block_is_converted() {
        let text = "| A | B |\n|---|---|\n| 1 | 2 |\n\nSome prose in between.\n\n| C | D |\n|---|---|\n| 3 | 4 |";

        assert_eq!(
            convert_first_table_to_csv(text).as_deref(),
            Some("\"A\",\"B\"\n\"1\",\"2\"")
        );
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let text = "| Quote |\n|---|\n| He said \"hi\" |";

        assert_eq!(
            convert_first_table_to_csv(text).as_deref(),
            Some("\"Quote\"\n\"He said \"\"hi\"\"\"")
        );
    }

    #[test]
    fn csv_output_is_not_a_table() {
        let csv = convert_first_table_to_csv("| A | B |\n|---|---|\n| 1 | 2 |").unwrap();

        assert!(!detect_table(&csv));
        assert_eq!(convert_first_table_to_csv(&csv), None);
    }

    #[test]
    fn ragged_rows_are_converted_line_by_line() {
        let text = "| A | B |\n|---|---|\n| 1 | 2 | 3 |\n| 4 |";

        assert_eq!(
            convert_first_table_to_csv(text).as_deref(),
            Some("\"A\",\"B\"\n\"1\",\"2\",\"3\"\n\"4\"")
        );
    }

    #[test]
    fn empty_cells_and_lone_pipes_are_kept() {
        let text = "|  | x |\n|\n";

        assert_eq!(
            convert_first_table_to_csv(text).as_deref(),
            Some("\"\",\"x\"\n\"\"")
        );
    }

    #[test]
    fn rows_without_separator_are_still_converted() {
        let text = "intro\n| a | b |\n| c | d |\noutro";

        assert!(!detect_table(text));
        assert_eq!(
            convert_first_table_to_csv(text).as_deref(),
            Some("\"a\",\"b\"\n\"c\",\"d\"")
        );
    }

    #[test]
    fn rows_after_a_leading_separator_are_converted() {
        assert_eq!(
            convert_first_table_to_csv("|---|---|\n| A |").as_deref(),
            Some("\"A\"")
        );
    }

    #[test]
    fn separator_only_block_has_no_rows() {
        assert_eq!(convert_first_table_to_csv("|---|---|\nend\n| A |"), None);
    }

    #[test]
    fn byte_order_mark_is_treated_as_blank_space() {
        assert_eq!(
            convert_first_table_to_csv("\u{feff}| bom |\n|---|\n| 1 |").as_deref(),
            Some("\"bom\"\n\"1\"")
        );
        assert_eq!(
            convert_first_table_to_csv("| \u{feff}A |").as_deref(),
            Some("\"A\"")
        );
        assert!(detect_table("| A |\n\u{feff}|---|"));
    }

    #[test]
    fn next_line_character_after_a_row_is_kept() {
        assert_eq!(convert_first_table_to_csv("| A |\u{85}"), None);
    }

    #[test]
    fn commas_inside_cells_stay_in_one_field() {
        assert_eq!(
            convert_first_table_to_csv("| 1,000 | ok |").as_deref(),
            Some("\"1,000\",\"ok\"")
        );
    }

    #[test]
    fn converter_delimiter_can_be_changed() {
        let converter = TableCsvConverterBuilder::new().delimiter(b';').build();

        assert!(converter.detect("| A |\n|---|"));
        assert_eq!(
            converter.convert("| A | B |\n|---|---|").as_deref(),
            Some("\"A\";\"B\"")
        );
    }

    #[test]
    fn chat_exports_are_named_after_the_message() {
        assert_eq!(chat_export_filename("42"), "gemini-table-42.csv");
    }
}
