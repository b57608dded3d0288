// src/process/mod.rs

pub mod dates;
mod rows;
mod state;

use std::path::Path;
use tracing::info;

use crate::error::ParseError;
use crate::input::{self, Format};
use crate::report::SettlementReport;
use rows::apply_row;
use state::ParseState;

/// Parse an ordered list of report files into one [`SettlementReport`].
///
/// The delimiter format is `format` if given, otherwise inferred from the
/// first path's extension. Files are consumed strictly in order; the first
/// validation or I/O error aborts the whole parse and no partial result is
/// returned.
#[tracing::instrument(level = "info", skip(paths), fields(files = paths.len()))]
pub fn parse_files<P: AsRef<Path>>(
    paths: &[P],
    format: Option<Format>,
) -> Result<SettlementReport, ParseError> {
    if paths.is_empty() {
        return Err(ParseError::NoInput);
    }
    let format = format.unwrap_or_else(|| Format::from_path(paths[0].as_ref()));

    let mut state = ParseState::new();
    for (position, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        let text = input::read_report_file(path)?;
        consume_input(
            &mut state,
            position + 1,
            path.display().to_string(),
            &text,
            format,
        )?;
    }
    finish(state)
}

/// Parse in-memory text blocks, one per report file, in order.
///
/// The delimiter format is `format` if given, otherwise inferred from the
/// first block (a tab character anywhere in it means tab mode). Blocks are
/// identified as `<string N>` in diagnostics.
#[tracing::instrument(level = "info", skip(blocks), fields(blocks = blocks.len()))]
pub fn parse_strings<S: AsRef<str>>(
    blocks: &[S],
    format: Option<Format>,
) -> Result<SettlementReport, ParseError> {
    if blocks.is_empty() {
        return Err(ParseError::NoInput);
    }
    let format = format.unwrap_or_else(|| Format::from_text(blocks[0].as_ref()));

    let mut state = ParseState::new();
    for (position, block) in blocks.iter().enumerate() {
        let name = format!("<string {}>", position + 1);
        consume_input(&mut state, position + 1, name, block.as_ref(), format)?;
    }
    finish(state)
}

/// Feed every row of one input through the classifier, then close the file.
fn consume_input(
    state: &mut ParseState,
    index: usize,
    name: String,
    text: &str,
    format: Format,
) -> Result<(), ParseError> {
    state.begin_file(index, name);
    for row in input::rows(text, format) {
        let row = row?;
        apply_row(state, &row)?;
    }
    state.finalize_file()
}

fn finish(mut state: ParseState) -> Result<SettlementReport, ParseError> {
    state.finalize_report();
    let report = state.into_report()?;
    info!(
        transactions = report.transactions.len(),
        account = %report.account_id,
        "report parsed"
    );
    Ok(report)
}
