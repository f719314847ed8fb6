#[cfg(feature = "csv")]
/// This module provides a CSV item writer.
pub mod csv;

#[cfg(feature = "markdown")]
/// This module provides Markdown table detection and a table row reader.
pub mod markdown;
