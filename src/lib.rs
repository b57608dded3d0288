//! Parser for vendor settlement-report flat files.
//!
//! A settlement report arrives as one or more ordered delimited text files
//! (tab- or comma-separated, never mixed within a run). Every row starts
//! with a type code: `RH`/`FH`/`SH` declare the report, file and section
//! headers, `CH` establishes the transaction column names, `SB` rows carry
//! the transactions themselves, and `RC` closes the report with a total
//! count that must match what was accumulated. [`parse_files`] and
//! [`parse_strings`] consume a whole report and return either a
//! [`SettlementReport`] or the first validation error encountered.

pub mod error;
pub mod input;
pub mod process;
pub mod report;

pub use error::ParseError;
pub use input::Format;
pub use process::{parse_files, parse_strings};
pub use report::{FieldValue, Record, SettlementReport};
