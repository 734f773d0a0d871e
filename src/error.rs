//! Error types for loading and aggregating grade records.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GradeError {
    #[error("file format error: {0}")]
    FileFormat(#[from] FileFormatError),

    #[error("{} invalid row(s): {}", .0.len(), join_issues(.0))]
    Validation(Vec<RowIssue>),

    #[error("computation error: {0}")]
    Computation(#[from] ComputationError),
}

/// The input could not be read as a grade sheet at all.
#[derive(Debug, Error)]
pub enum FileFormatError {
    #[error("unable to read {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("unsupported file type {0:?}, expected .xlsx, .xlsm, .xls, .ods or .csv")]
    UnsupportedExtension(String),

    #[error("workbook contains no worksheets")]
    NoWorksheet,

    #[error("sheet has no header row")]
    MissingHeader,

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[derive(Debug, Error, PartialEq)]
pub enum ComputationError {
    #[error("semester {semester:?} has a total of {credit_hours} credit hours")]
    ZeroCreditHours { semester: String, credit_hours: f64 },
}

/// A single problem found on a data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// Spreadsheet row number; the header occupies row 1.
    pub row: usize,
    pub column: String,
    pub problem: String,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} {}: {}", self.row, self.column, self.problem)
    }
}

fn join_issues(issues: &[RowIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
