use tracing::{debug, trace};

use crate::error::ParseError;
use crate::process::dates;
use crate::process::state::{set_once, ParseState};
use crate::report::{FieldValue, Record};

/// The only report schema revision this parser accepts.
pub(crate) const SUPPORTED_VERSION: i64 = 11;

/// Apply one tokenized row to the parse state, dispatching on the type
/// code in the first field. Row order is significant; the caller feeds
/// rows strictly in file order and stops at the first error.
pub(crate) fn apply_row(state: &mut ParseState, row: &[String]) -> Result<(), ParseError> {
    let code = row.first().map(|field| field.trim()).unwrap_or_default();
    trace!(code, fields = row.len(), "row");

    match code {
        "RH" => report_header(state, row),
        "FH" => file_header(state, row),
        "SH" => section_header(state),
        "CH" => column_header(state, row),
        "SB" => section_body(state, row),
        // Footers carry no data yet.
        "SF" | "FF" | "RF" => Ok(()),
        // Section counts are declared but not cross-checked.
        "SC" => Ok(()),
        "RC" => report_count(state, row),
        other => Err(ParseError::UnrecognizedRowType {
            code: other.to_string(),
        }),
    }
}

fn require_fields(
    code: &'static str,
    row: &[String],
    required: usize,
    state: &ParseState,
) -> Result<(), ParseError> {
    if row.len() < required {
        return Err(ParseError::TruncatedRow {
            code,
            found: row.len(),
            required,
            file: state.file_name.clone(),
        });
    }
    Ok(())
}

/// RH: report-level metadata. The first RH of the run wins each field;
/// every RH row still has its declared version checked.
fn report_header(state: &mut ParseState, row: &[String]) -> Result<(), ParseError> {
    if state.report_header_seen {
        return Err(ParseError::DuplicateRow {
            code: "RH",
            file: state.file_name.clone(),
        });
    }
    state.report_header_seen = true;
    require_fields("RH", row, 5, state)?;

    let generated = dates::parse_timestamp_millis(&row[1]).ok_or_else(|| {
        ParseError::InvalidGenerationDate {
            value: row[1].clone(),
        }
    })?;
    set_once(&mut state.generation_date, generated);
    set_once(&mut state.reporting_window, row[2].clone());
    set_once(&mut state.account_id, row[3].clone());

    let declared = row[4].trim();
    let version: i64 = declared.parse().map_err(|_| ParseError::UnsupportedVersion {
        declared: declared.to_string(),
    })?;
    set_once(&mut state.report_version, version);
    if version != SUPPORTED_VERSION {
        return Err(ParseError::UnsupportedVersion {
            declared: declared.to_string(),
        });
    }

    debug!(account = %row[3], version, "report header recorded");
    Ok(())
}

/// FH: no data beyond validation. The declared sequence number must match
/// the file's 1-based position in the input list.
fn file_header(state: &mut ParseState, row: &[String]) -> Result<(), ParseError> {
    if state.file_header_seen {
        return Err(ParseError::DuplicateRow {
            code: "FH",
            file: state.file_name.clone(),
        });
    }
    state.file_header_seen = true;
    require_fields("FH", row, 2, state)?;

    let declared = row[1].trim();
    if declared.parse::<usize>() != Ok(state.file_index) {
        return Err(ParseError::FileSequenceMismatch {
            declared: declared.to_string(),
            expected: state.file_index,
            file: state.file_name.clone(),
        });
    }
    Ok(())
}

fn section_header(state: &mut ParseState) -> Result<(), ParseError> {
    if state.section_header_seen {
        return Err(ParseError::DuplicateRow {
            code: "SH",
            file: state.file_name.clone(),
        });
    }
    state.section_header_seen = true;
    Ok(())
}

/// CH: the first CH of the whole report establishes the column names;
/// later CH rows are ignored.
fn column_header(state: &mut ParseState, row: &[String]) -> Result<(), ParseError> {
    if state.columns.is_none() {
        let columns: Vec<String> = row[1..].to_vec();
        debug!(count = columns.len(), "transaction columns captured");
        state.columns = Some(columns);
    }
    Ok(())
}

/// SB: zip the established column names with the row's fields
/// positionally. A `*Date` column with a non-empty field is parsed to
/// epoch millis; everything else is stored verbatim.
fn section_body(state: &mut ParseState, row: &[String]) -> Result<(), ParseError> {
    let Some(columns) = state.columns.as_ref() else {
        return Err(ParseError::SectionBodyBeforeColumns {
            file: state.file_name.clone(),
        });
    };

    let mut record = Record::new();
    for (column, field) in columns.iter().zip(&row[1..]) {
        let value = if column.ends_with("Date") && !field.is_empty() {
            let millis = dates::parse_timestamp_millis(field).ok_or_else(|| {
                ParseError::InvalidDateField {
                    column: column.clone(),
                    value: field.clone(),
                }
            })?;
            FieldValue::Timestamp(millis)
        } else {
            FieldValue::Text(field.clone())
        };
        record.insert(column.clone(), value);
    }

    state.transactions.push(record);
    Ok(())
}

/// RC: the declared grand total must match the accumulated transactions.
fn report_count(state: &mut ParseState, row: &[String]) -> Result<(), ParseError> {
    require_fields("RC", row, 2, state)?;

    let declared: usize =
        row[1]
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidCount {
                value: row[1].trim().to_string(),
            })?;
    let found = state.transactions.len();
    if declared != found {
        return Err(ParseError::CountMismatch { declared, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn fresh_state() -> ParseState {
        let mut state = ParseState::new();
        state.begin_file(1, "report.tsv".to_string());
        state
    }

    #[test]
    fn rh_records_metadata_once() {
        let mut state = fresh_state();
        apply_row(
            &mut state,
            &row(&["RH", "2024-01-05 10:30:00", "A", "ACC123", "11"]),
        )
        .unwrap();

        assert_eq!(state.account_id.as_deref(), Some("ACC123"));
        assert_eq!(state.reporting_window.as_deref(), Some("A"));
        assert_eq!(state.report_version, Some(11));
        assert_eq!(state.generation_date, Some(1_704_450_600_000));

        // An RH in a later file must not overwrite what the first one set.
        state.begin_file(2, "part2.tsv".to_string());
        apply_row(
            &mut state,
            &row(&["RH", "2025-06-06", "B", "OTHER", "11"]),
        )
        .unwrap();
        assert_eq!(state.account_id.as_deref(), Some("ACC123"));
        assert_eq!(state.reporting_window.as_deref(), Some("A"));
        assert_eq!(state.generation_date, Some(1_704_450_600_000));
    }

    #[test]
    fn second_rh_in_same_file_is_rejected() {
        let mut state = fresh_state();
        apply_row(&mut state, &row(&["RH", "2024-01-01", "A", "ACC123", "11"])).unwrap();
        let err = apply_row(&mut state, &row(&["RH", "2024-01-01", "A", "ACC123", "11"]))
            .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateRow { code: "RH", .. }));
    }

    #[test]
    fn unsupported_version_still_records_other_fields() {
        let mut state = fresh_state();
        let err = apply_row(&mut state, &row(&["RH", "2024-01-01", "A", "ACC123", "10"]))
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("11"));
        assert_eq!(err.class(), 400);
        // Fields from the offending RH were recorded before rejection.
        assert_eq!(state.account_id.as_deref(), Some("ACC123"));
        assert_eq!(state.report_version, Some(10));
    }

    #[test]
    fn fh_sequence_must_match_position() {
        let mut state = fresh_state();
        assert!(apply_row(&mut state, &row(&["FH", "1"])).is_ok());

        state.begin_file(2, "part2.tsv".to_string());
        let err = apply_row(&mut state, &row(&["FH", "3"])).unwrap_err();
        match err {
            ParseError::FileSequenceMismatch {
                declared,
                expected,
                file,
            } => {
                assert_eq!(declared, "3");
                assert_eq!(expected, 2);
                assert_eq!(file, "part2.tsv");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_sh_is_rejected() {
        let mut state = fresh_state();
        apply_row(&mut state, &row(&["SH"])).unwrap();
        let err = apply_row(&mut state, &row(&["SH"])).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateRow { code: "SH", .. }));
    }

    #[test]
    fn first_ch_wins() {
        let mut state = fresh_state();
        apply_row(&mut state, &row(&["CH", "Name", "Date"])).unwrap();
        apply_row(&mut state, &row(&["CH", "Other", "Columns", "Entirely"])).unwrap();
        assert_eq!(
            state.columns,
            Some(vec!["Name".to_string(), "Date".to_string()])
        );
    }

    #[test]
    fn sb_before_ch_is_rejected() {
        let mut state = fresh_state();
        let err = apply_row(&mut state, &row(&["SB", "Alice", "2024-01-01"])).unwrap_err();
        assert!(matches!(err, ParseError::SectionBodyBeforeColumns { .. }));
    }

    #[test]
    fn sb_parses_date_suffixed_columns() {
        let mut state = fresh_state();
        apply_row(&mut state, &row(&["CH", "Name", "PostedDate", "Note"])).unwrap();
        apply_row(&mut state, &row(&["SB", "Alice", "2024-01-01", "ok"])).unwrap();

        let record = &state.transactions[0];
        assert_eq!(record["Name"], FieldValue::Text("Alice".to_string()));
        assert_eq!(record["PostedDate"], FieldValue::Timestamp(1_704_067_200_000));
        assert_eq!(record["Note"], FieldValue::Text("ok".to_string()));
    }

    #[test]
    fn sb_keeps_empty_date_fields_textual() {
        let mut state = fresh_state();
        apply_row(&mut state, &row(&["CH", "Name", "PostedDate"])).unwrap();
        apply_row(&mut state, &row(&["SB", "Alice", ""])).unwrap();
        assert_eq!(
            state.transactions[0]["PostedDate"],
            FieldValue::Text(String::new())
        );
    }

    #[test]
    fn sb_with_unparseable_date_is_rejected() {
        let mut state = fresh_state();
        apply_row(&mut state, &row(&["CH", "PostedDate"])).unwrap();
        let err = apply_row(&mut state, &row(&["SB", "yesterday-ish"])).unwrap_err();
        match err {
            ParseError::InvalidDateField { column, value } => {
                assert_eq!(column, "PostedDate");
                assert_eq!(value, "yesterday-ish");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_sb_rows_fill_leading_columns_only() {
        let mut state = fresh_state();
        apply_row(&mut state, &row(&["CH", "A", "B", "C"])).unwrap();
        apply_row(&mut state, &row(&["SB", "1"])).unwrap();

        let record = &state.transactions[0];
        assert_eq!(record.len(), 1);
        assert_eq!(record["A"], FieldValue::Text("1".to_string()));
    }

    #[test]
    fn rc_matching_count_passes() {
        let mut state = fresh_state();
        apply_row(&mut state, &row(&["CH", "Name"])).unwrap();
        apply_row(&mut state, &row(&["SB", "Alice"])).unwrap();
        assert!(apply_row(&mut state, &row(&["RC", "1"])).is_ok());
    }

    #[test]
    fn rc_mismatch_reports_both_counts() {
        let mut state = fresh_state();
        apply_row(&mut state, &row(&["CH", "Name"])).unwrap();
        apply_row(&mut state, &row(&["SB", "Alice"])).unwrap();
        let err = apply_row(&mut state, &row(&["RC", "2"])).unwrap_err();
        match err {
            ParseError::CountMismatch { declared, found } => {
                assert_eq!(declared, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn footers_and_section_counts_are_ignored() {
        let mut state = fresh_state();
        for code in ["SF", "FF", "RF"] {
            assert!(apply_row(&mut state, &row(&[code])).is_ok());
        }
        assert!(apply_row(&mut state, &row(&["SC", "999"])).is_ok());
        assert!(state.transactions.is_empty());
    }

    #[test]
    fn unknown_code_is_quoted_in_the_error() {
        let mut state = fresh_state();
        let err = apply_row(&mut state, &row(&["ZZ", "1"])).unwrap_err();
        assert!(err.to_string().contains("\"ZZ\""));
    }

    #[test]
    fn truncated_rh_is_rejected() {
        let mut state = fresh_state();
        let err = apply_row(&mut state, &row(&["RH", "2024-01-01"])).unwrap_err();
        assert!(matches!(
            err,
            ParseError::TruncatedRow {
                code: "RH",
                found: 2,
                required: 5,
                ..
            }
        ));
    }
}
