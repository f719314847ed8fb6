#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # tablecast

 Markdown table detection and CSV export for text coming back from a
 generative-text service, plus the typed plumbing used to talk to that
 service (prompts, response schemas, chat history).

 ## Core Concepts

- **ItemReader:** retrieves the input of a step one item at a time. The
  Markdown reader yields the rows of the first table found in a text.
- **ItemProcessor:** business logic applied to each item.
- **ItemWriter:** output of a step, one chunk at a time. The CSV writer
  serializes rows as quoted CSV records.
- **Step:** reads, processes and writes items in chunks, or runs a single
  `Tasklet` such as a download.
- **Job:** runs steps in order and stops at the first failure.

 ## Features

| **Feature** | **Description**                                                  |
|-------------|------------------------------------------------------------------|
| csv         | Enables the CSV `ItemWriter`                                     |
| markdown    | Enables table detection, the table reader and the `table` module |
| gemini      | Enables the blocking Gemini `generateContent` client             |
| cli         | Builds the `tablecast` command-line front end                    |
| full        | Enables all available features                                   |

 ## Getting Started

```rust
use tablecast::table::{convert_first_table_to_csv, detect_table, trigger_download};
use tablecast::tasklet::download::FilesystemSaver;
use std::env::temp_dir;

let reply = "Here is the comparison:

| Crate | Purpose |
|-------|---------|
| csv   | \"RFC 4180\" output |

Let me know if you need more.";

if detect_table(reply) {
    if let Some(csv) = convert_first_table_to_csv(reply) {
        assert_eq!(csv, "\"Crate\",\"Purpose\"\n\"csv\",\"\"\"RFC 4180\"\" output\"");

        let saver = FilesystemSaver::new(temp_dir().join("tablecast-readme"));
        trigger_download(&csv, "comparison.csv", &saver);
    }
}
```
 */

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of item readers / writers (markdown table reader, csv writer)
pub mod item;

/// Generative-text service integration
pub mod service;

/// Markdown table to CSV conversion
#[cfg(feature = "markdown")]
pub mod table;

/// Tasklets, such as handing a file to the host for download
pub mod tasklet;
