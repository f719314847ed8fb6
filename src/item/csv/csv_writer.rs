use std::{
    cell::RefCell,
    fs::File,
    io::{self, Write},
    path::Path,
    result,
};

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use serde::Serialize;

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    BatchError,
};

/// Serializes items as CSV records.
///
/// Each item becomes one record: structs and maps produce named columns,
/// sequences (such as a table row) produce one field per element.
pub struct CsvItemWriter<T: Write> {
    wrapper: RefCell<Writer<T>>,
}

impl<T: Write, R: Serialize> ItemWriter<R> for CsvItemWriter<T> {
    fn write(&self, items: &[R]) -> ItemWriterResult {
        let mut wrapper = self.wrapper.borrow_mut();
        for item in items {
            wrapper
                .serialize(item)
                .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        }
        Ok(())
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// Note that this also flushes the underlying writer.
    fn flush(&self) -> ItemWriterResult {
        self.wrapper
            .borrow_mut()
            .flush()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

impl<T: Write> CsvItemWriter<T> {
    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> result::Result<T, BatchError> {
        self.wrapper
            .into_inner()
            .into_inner()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

/// Builder for [`CsvItemWriter`].
///
/// Defaults: comma delimiter, no header row, quote only when needed,
/// `\n` terminator, strict record lengths.
pub struct CsvItemWriterBuilder {
    delimiter: u8,
    has_headers: bool,
    quote_style: QuoteStyle,
    terminator: Terminator,
    flexible: bool,
}

impl Default for CsvItemWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvItemWriterBuilder {
    pub fn new() -> CsvItemWriterBuilder {
        CsvItemWriterBuilder {
            delimiter: b',',
            has_headers: false,
            quote_style: QuoteStyle::Necessary,
            terminator: Terminator::Any(b'\n'),
            flexible: false,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> CsvItemWriterBuilder {
        self.delimiter = delimiter;
        self
    }

    pub fn has_headers(mut self, yes: bool) -> CsvItemWriterBuilder {
        self.has_headers = yes;
        self
    }

    /// `QuoteStyle::Always` wraps every field in double quotes.
    pub fn quote_style(mut self, quote_style: QuoteStyle) -> CsvItemWriterBuilder {
        self.quote_style = quote_style;
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> CsvItemWriterBuilder {
        self.terminator = terminator;
        self
    }

    /// Allows records with different numbers of fields.
    pub fn flexible(mut self, yes: bool) -> CsvItemWriterBuilder {
        self.flexible = yes;
        self
    }

    fn configure(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .quote_style(self.quote_style)
            .terminator(self.terminator)
            .double_quote(true)
            .flexible(self.flexible);
        builder
    }

    pub fn from_path<R: AsRef<Path>>(self, path: R) -> Result<CsvItemWriter<File>, BatchError> {
        let wtr = self
            .configure()
            .from_path(path)
            .map_err(|error| BatchError::ItemWriter(error.to_string()))?;

        Ok(CsvItemWriter {
            wrapper: RefCell::new(wtr),
        })
    }

    /// Builds a writer over any `io::Write` destination.
    ///
    /// ```
    /// # use std::error::Error;
    /// # use tablecast::{item::csv::csv_writer::CsvItemWriterBuilder, core::item::ItemWriter};
    /// #[derive(serde::Serialize)]
    /// struct Row<'a> {
    ///     city: &'a str,
    ///     country: &'a str,
    ///     #[serde(rename = "popcount")]
    ///     population: u64,
    /// }
    ///
    /// # fn main() { example().unwrap(); }
    /// fn example() -> Result<(), Box<dyn Error>> {
    ///     let wtr = CsvItemWriterBuilder::new()
    ///         .has_headers(true)
    ///         .from_writer(vec![]);
    ///
    ///     wtr.write(&[
    ///         Row { city: "Boston", country: "United States", population: 4628910 },
    ///         Row { city: "Concord", country: "United States", population: 42695 },
    ///     ])?;
    ///
    ///     let data = String::from_utf8(wtr.into_inner()?)?;
    ///     assert_eq!(data, "\
    /// city,country,popcount
    /// Boston,United States,4628910
    /// Concord,United States,42695
    /// ");
    ///     Ok(())
    /// }
    /// ```
    pub fn from_writer<W: io::Write>(self, wtr: W) -> CsvItemWriter<W> {
        let wtr = self.configure().from_writer(wtr);

        CsvItemWriter {
            wrapper: RefCell::new(wtr),
        }
    }
}
