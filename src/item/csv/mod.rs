//! CSV output for items.
//!
//! [`csv_writer::CsvItemWriter`] implements the core `ItemWriter` trait on
//! top of the `csv` crate, so any serde-serializable item can be written as
//! one CSV record. Delimiter, header row, quoting and record terminator are
//! set through [`csv_writer::CsvItemWriterBuilder`].
//!
//! Writers borrow their destination until dropped. To read an in-memory
//! buffer back, call `into_inner` on the writer.
//!
//! # Examples
//!
//! ```
//! use csv::QuoteStyle;
//! use tablecast::item::csv::csv_writer::CsvItemWriterBuilder;
//! use tablecast::core::item::ItemWriter;
//!
//! let writer = CsvItemWriterBuilder::new()
//!     .quote_style(QuoteStyle::Always)
//!     .from_writer(vec![]);
//!
//! writer.write(&[vec!["name", "age"], vec!["Alice", "28"]]).unwrap();
//!
//! let csv = String::from_utf8(writer.into_inner().unwrap()).unwrap();
//! assert_eq!(csv, "\"name\",\"age\"\n\"Alice\",\"28\"\n");
//! ```

/// A module providing facilities for writing CSV data records.
pub mod csv_writer;
