// src/report.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parsed transaction field. Columns whose name ends in `Date` carry
/// epoch-millisecond timestamps; everything else stays textual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Timestamp(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Timestamp(_) => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            FieldValue::Timestamp(ms) => Some(*ms),
            FieldValue::Text(_) => None,
        }
    }
}

/// One transaction, keyed by the column names the CH row established.
pub type Record = BTreeMap<String, FieldValue>;

/// The normalized result of a successful parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub account_id: String,
    /// Report generation time, epoch milliseconds UTC.
    pub generation_date: i64,
    pub report_version: i64,
    pub reporting_window: String,
    pub transactions: Vec<Record>,
}
