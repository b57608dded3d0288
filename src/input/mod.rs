// src/input/mod.rs

use std::{fs, io::Cursor, path::Path};
use tracing::debug;

use crate::error::ParseError;

/// Field delimiter for a whole run. Reports never mix delimiters, so one
/// format is fixed up front and applied to every input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Tsv,
    Csv,
}

impl Format {
    /// Infer from a file name: a `.csv` extension means comma-delimited,
    /// anything else tab-delimited.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Format::Csv,
            _ => Format::Tsv,
        }
    }

    /// Infer from in-memory text: a tab character anywhere in the first
    /// block means tab-delimited.
    pub fn from_text(text: &str) -> Self {
        if text.contains('\t') {
            Format::Tsv
        } else {
            Format::Csv
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            Format::Tsv => b'\t',
            Format::Csv => b',',
        }
    }
}

/// Read a report file as UTF-8, stripping a leading byte-order mark if the
/// exporter wrote one.
pub fn read_report_file(path: &Path) -> Result<String, ParseError> {
    let text = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = text.len(), "read input file");
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Tokenize one input into ordered field rows, lazily. Comma mode keeps
/// RFC 4180 quoting; tab mode treats every tab as a field break and quotes
/// as literal characters.
pub fn rows(
    text: &str,
    format: Format,
) -> impl Iterator<Item = Result<Vec<String>, csv::Error>> + '_ {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .delimiter(format.delimiter());
    if format == Format::Tsv {
        builder.quoting(false);
    }

    builder
        .from_reader(Cursor::new(text.as_bytes()))
        .into_records()
        .map(|record| record.map(|rec| rec.iter().map(str::to_string).collect()))
}
