use thiserror::Error;

/// All errors a parse can return. Every variant carries the concrete
/// offending values so a diagnostic can be acted on without re-reading the
/// input. The first error aborts the whole parse; there is no recovery or
/// skip-and-continue.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A second RH, FH or SH row appeared within one file.
    #[error("duplicate {code} row in {file}")]
    DuplicateRow { code: &'static str, file: String },

    /// RH, FH or SH never appeared before the file ended.
    #[error("no {code} row seen in {file}")]
    MissingRow { code: &'static str, file: String },

    /// The RH row declared a schema revision this parser does not speak.
    #[error("unsupported report version {declared}, only version 11 is supported")]
    UnsupportedVersion { declared: String },

    /// The FH row's declared sequence number does not match the file's
    /// position in the input list.
    #[error("file sequence mismatch in {file}: FH declares {declared}, expected {expected}")]
    FileSequenceMismatch {
        declared: String,
        expected: usize,
        file: String,
    },

    /// An SB row arrived before any CH row established the column names.
    #[error("SB row in {file} before any CH row established transaction columns")]
    SectionBodyBeforeColumns { file: String },

    /// The RC row's declared total does not match the accumulated
    /// transaction count.
    #[error("report count mismatch: RC row declares {declared}, found {found} transactions")]
    CountMismatch { declared: usize, found: usize },

    /// The RC row's count field is not a number.
    #[error("RC row declares an invalid count {value:?}")]
    InvalidCount { value: String },

    /// The RH generation-date field did not parse in any accepted layout.
    #[error("RH row has unparseable generation date {value:?}")]
    InvalidGenerationDate { value: String },

    /// A `*Date` transaction field did not parse in any accepted layout.
    #[error("unparseable date {value:?} in column {column}")]
    InvalidDateField { column: String, value: String },

    /// A row was too short for its type code's required fields.
    #[error("truncated {code} row in {file}: {found} fields, {required} required")]
    TruncatedRow {
        code: &'static str,
        found: usize,
        required: usize,
        file: String,
    },

    /// The leading type code is not one this format defines.
    #[error("unrecognized row type {code:?}")]
    UnrecognizedRowType { code: String },

    /// No files or text blocks were supplied.
    #[error("no input files or text blocks supplied")]
    NoInput,

    /// The delimited input itself was malformed (e.g. an unterminated
    /// quote in comma mode).
    #[error("malformed delimited input: {0}")]
    Tokenize(#[from] csv::Error),

    /// An input could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Numeric error class: 400 for malformed report input, 500 for
    /// environment failures.
    pub fn class(&self) -> u16 {
        match self {
            ParseError::Io(_) => 500,
            _ => 400,
        }
    }
}
