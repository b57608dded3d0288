use tracing::debug;

use crate::error::ParseError;
use crate::report::{Record, SettlementReport};

/// Write `value` into `slot` only when the slot is still empty. Report
/// header fields are first-writer-wins across the whole run.
pub(crate) fn set_once<T>(slot: &mut Option<T>, value: T) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Accumulated parse state. One instance per parse call, owned by the
/// orchestrator and threaded by `&mut` through the row classifier and the
/// boundary finalizers; consumed by [`ParseState::into_report`] at the end.
#[derive(Debug, Default)]
pub(crate) struct ParseState {
    pub(crate) generation_date: Option<i64>,
    pub(crate) reporting_window: Option<String>,
    pub(crate) account_id: Option<String>,
    pub(crate) report_version: Option<i64>,

    /// 1-based position of the file currently being read.
    pub(crate) file_index: usize,
    /// Identifier of the current file; only used in diagnostics.
    pub(crate) file_name: String,

    pub(crate) file_header_seen: bool,
    pub(crate) report_header_seen: bool,
    pub(crate) section_header_seen: bool,

    /// Transaction column names from the first CH row of the report.
    /// Survives file boundaries; cleared only when the whole report closes.
    pub(crate) columns: Option<Vec<String>>,
    pub(crate) transactions: Vec<Record>,
}

impl ParseState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Enter the `index`-th input (1-based), resetting the per-file flags.
    pub(crate) fn begin_file(&mut self, index: usize, name: String) {
        self.file_index = index;
        self.file_name = name;
        self.file_header_seen = false;
        self.report_header_seen = false;
        self.section_header_seen = false;
    }

    /// Close the current file. Each of RH, FH and SH must have appeared;
    /// each missing one is its own terminal error naming the file. Flags
    /// and the transient file fields are cleared for the next file.
    pub(crate) fn finalize_file(&mut self) -> Result<(), ParseError> {
        if !self.report_header_seen {
            return Err(ParseError::MissingRow {
                code: "RH",
                file: self.file_name.clone(),
            });
        }
        if !self.file_header_seen {
            return Err(ParseError::MissingRow {
                code: "FH",
                file: self.file_name.clone(),
            });
        }
        if !self.section_header_seen {
            return Err(ParseError::MissingRow {
                code: "SH",
                file: self.file_name.clone(),
            });
        }

        debug!(file = %self.file_name, index = self.file_index, "file finalized");
        self.file_header_seen = false;
        self.report_header_seen = false;
        self.section_header_seen = false;
        self.file_index = 0;
        self.file_name.clear();
        Ok(())
    }

    /// Close the whole report. The column schema lives until here so a CH
    /// row in an early file covers SB rows in later ones.
    pub(crate) fn finalize_report(&mut self) {
        self.columns = None;
    }

    /// Consume the state into the caller-facing report.
    pub(crate) fn into_report(self) -> Result<SettlementReport, ParseError> {
        let (Some(account_id), Some(generation_date), Some(report_version), Some(reporting_window)) = (
            self.account_id,
            self.generation_date,
            self.report_version,
            self.reporting_window,
        ) else {
            return Err(ParseError::MissingRow {
                code: "RH",
                file: "<report>".to_string(),
            });
        };

        Ok(SettlementReport {
            account_id,
            generation_date,
            report_version,
            reporting_window,
            transactions: self.transactions,
        })
    }
}
