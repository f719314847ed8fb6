#![allow(dead_code)]

mod mocks;

pub use mocks::{MockSaver, MockService};

/// A model reply carrying two tables separated by prose.
pub const REPLY_WITH_TWO_TABLES: &str = "Here is the comparison you asked for:

| Crate | Downloads | Notes |
|:------|----------:|-------|
| serde | 300M | \"de facto\" standard |
| csv   | 60M  | RFC 4180 |

And the runtimes:

| Runtime | Kind |
|---|---|
| tokio | async |";
