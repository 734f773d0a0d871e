use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::{debug, info, warn};

use crate::config::{LoadOptions, RowPolicy};
use crate::error::{FileFormatError, GradeError, RowIssue};
use crate::models::CourseRecord;

pub const COL_SEMESTER: &str = "Semester";
pub const COL_CODE: &str = "Code";
pub const COL_NAME: &str = "Course Name";
pub const COL_CREDIT_HOURS: &str = "CrdHrs";
pub const COL_GRADE: &str = "Grade";
pub const COL_POINTS: &str = "Points";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_SEMESTER,
    COL_CODE,
    COL_NAME,
    COL_CREDIT_HOURS,
    COL_GRADE,
    COL_POINTS,
];

#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub records: Vec<CourseRecord>,
    /// Issues for rows dropped under [`RowPolicy::Skip`].
    pub skipped: Vec<RowIssue>,
}

impl LoadOutcome {
    pub fn skipped_rows(&self) -> usize {
        let mut rows: Vec<usize> = self.skipped.iter().map(|issue| issue.row).collect();
        rows.dedup();
        rows.len()
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    fn from_text(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(value) => Cell::Number(*value as f64),
            Data::Float(value) => Cell::Number(*value),
            Data::String(value) => Cell::from_text(value),
            other => Cell::from_text(&other.to_string()),
        }
    }
}

/// Header labels plus data rows tagged with their spreadsheet row number.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<(usize, Vec<Cell>)>,
}

#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    semester: usize,
    code: usize,
    name: usize,
    credit_hours: usize,
    grade: usize,
    points: usize,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<Self, FileFormatError> {
        let position = |label: &str| headers.iter().position(|header| header.trim() == label);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|label| position(label).is_none())
            .map(|label| label.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(FileFormatError::MissingColumns(missing));
        }

        let lookup = |label: &str| {
            position(label).ok_or_else(|| FileFormatError::MissingColumns(vec![label.to_string()]))
        };

        Ok(ColumnMap {
            semester: lookup(COL_SEMESTER)?,
            code: lookup(COL_CODE)?,
            name: lookup(COL_NAME)?,
            credit_hours: lookup(COL_CREDIT_HOURS)?,
            grade: lookup(COL_GRADE)?,
            points: lookup(COL_POINTS)?,
        })
    }
}

/// Reads a grade sheet from disk and validates every row.
///
/// Workbooks (`.xlsx`, `.xlsm`, `.xls`, `.ods`) are read from their first
/// worksheet; `.csv` files are read directly.
pub fn load_records(path: &Path, options: &LoadOptions) -> Result<LoadOutcome, GradeError> {
    let sheet = read_sheet(path)?;
    debug!(
        path = %path.display(),
        rows = sheet.rows.len(),
        columns = sheet.headers.len(),
        "sheet read"
    );

    let outcome = parse_sheet(&sheet, options)?;
    info!(
        path = %path.display(),
        records = outcome.records.len(),
        skipped_rows = outcome.skipped_rows(),
        "grade records loaded"
    );
    Ok(outcome)
}

fn read_sheet(path: &Path) -> Result<RawSheet, GradeError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path),
        "csv" => read_csv(path),
        _ => Err(FileFormatError::UnsupportedExtension(extension).into()),
    }
}

fn unreadable(path: &Path, error: impl std::fmt::Display) -> FileFormatError {
    FileFormatError::Unreadable {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

fn read_workbook(path: &Path) -> Result<RawSheet, GradeError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(FileFormatError::NoWorksheet)?
        .map_err(|e| unreadable(path, e))?;

    // A range starts at its first non-empty cell, not necessarily A1.
    let first_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(FileFormatError::MissingHeader)?
        .iter()
        .map(|data| match Cell::from(data) {
            Cell::Text(text) => text,
            Cell::Number(value) => value.to_string(),
            Cell::Empty => String::new(),
        })
        .collect();

    let rows: Vec<(usize, Vec<Cell>)> = rows
        .enumerate()
        .map(|(index, cells)| (first_row + index + 1, cells.iter().map(Cell::from).collect()))
        .collect();

    Ok(RawSheet { headers, rows })
}

fn read_csv(path: &Path) -> Result<RawSheet, GradeError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| unreadable(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| unreadable(path, e))?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(FileFormatError::MissingHeader.into());
    }

    let mut rows: Vec<(usize, Vec<Cell>)> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| unreadable(path, e))?;
        let line = record
            .position()
            .map(|position| position.line() as usize)
            .unwrap_or(rows.len() + 2);
        rows.push((line, record.iter().map(Cell::from_text).collect()));
    }

    Ok(RawSheet { headers, rows })
}

pub(crate) fn parse_sheet(sheet: &RawSheet, options: &LoadOptions) -> Result<LoadOutcome, GradeError> {
    let columns = ColumnMap::resolve(&sheet.headers)?;
    let mut outcome = LoadOutcome::default();
    let mut rejected = Vec::new();

    for (row, cells) in &sheet.rows {
        if cells.iter().all(Cell::is_empty) {
            continue;
        }

        match parse_row(*row, cells, &columns, options.max_points) {
            Ok(record) => outcome.records.push(record),
            Err(issues) => {
                for issue in &issues {
                    warn!(row = issue.row, column = %issue.column, problem = %issue.problem, "invalid row");
                }
                rejected.extend(issues);
            }
        }
    }

    match options.policy {
        RowPolicy::Reject if !rejected.is_empty() => Err(GradeError::Validation(rejected)),
        _ => {
            outcome.skipped = rejected;
            Ok(outcome)
        }
    }
}

fn parse_row(
    row: usize,
    cells: &[Cell],
    columns: &ColumnMap,
    max_points: f64,
) -> Result<CourseRecord, Vec<RowIssue>> {
    let mut issues = Vec::new();
    let cell = |index: usize| cells.get(index).unwrap_or(&EMPTY_CELL);

    let semester = required_text(row, COL_SEMESTER, cell(columns.semester), &mut issues);
    let grade = required_text(row, COL_GRADE, cell(columns.grade), &mut issues);
    let credit_hours = number(row, COL_CREDIT_HOURS, cell(columns.credit_hours), &mut issues)
        .and_then(|value| {
            if value > 0.0 {
                Some(value)
            } else {
                issues.push(issue(row, COL_CREDIT_HOURS, format!("must be positive, got {value}")));
                None
            }
        });
    let points = number(row, COL_POINTS, cell(columns.points), &mut issues).and_then(|value| {
        if (0.0..=max_points).contains(&value) {
            Some(value)
        } else {
            issues.push(issue(
                row,
                COL_POINTS,
                format!("{value} is outside the 0 to {max_points} scale"),
            ));
            None
        }
    });

    match (semester, grade, credit_hours, points) {
        (Some(semester), Some(grade), Some(credit_hours), Some(points)) if issues.is_empty() => {
            Ok(CourseRecord {
                semester,
                code: optional_text(cell(columns.code)),
                name: optional_text(cell(columns.name)),
                credit_hours,
                grade,
                points,
            })
        }
        _ => Err(issues),
    }
}

fn issue(row: usize, column: &str, problem: impl Into<String>) -> RowIssue {
    RowIssue {
        row,
        column: column.to_string(),
        problem: problem.into(),
    }
}

fn optional_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(text) => text.clone(),
        Cell::Number(value) => value.to_string(),
    }
}

fn required_text(row: usize, column: &str, cell: &Cell, issues: &mut Vec<RowIssue>) -> Option<String> {
    match cell {
        Cell::Empty => {
            issues.push(issue(row, column, "missing"));
            None
        }
        other => Some(optional_text(other)),
    }
}

fn number(row: usize, column: &str, cell: &Cell, issues: &mut Vec<RowIssue>) -> Option<f64> {
    let value = match cell {
        Cell::Empty => {
            issues.push(issue(row, column, "missing"));
            return None;
        }
        Cell::Number(value) => *value,
        Cell::Text(text) => match text.parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                issues.push(issue(row, column, format!("not a number ({text:?})")));
                return None;
            }
        },
    };

    if value.is_finite() {
        Some(value)
    } else {
        issues.push(issue(row, column, "not a finite number"));
        None
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn text(value: &str) -> Cell {
        Cell::Text(value.to_string())
    }

    fn headers() -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|h| h.to_string()).collect()
    }

    fn row(semester: &str, code: &str, credit_hours: Cell, grade: &str, points: Cell) -> Vec<Cell> {
        vec![
            Cell::from_text(semester),
            text(code),
            text("Course"),
            credit_hours,
            Cell::from_text(grade),
            points,
        ]
    }

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn preserves_row_order_and_accepts_numeric_text() {
        let sheet = RawSheet {
            headers: headers(),
            rows: vec![
                (2, row("Fall 2025", "CS101", Cell::Number(3.0), "A", Cell::Number(4.0))),
                (3, row("Fall 2025", "MA102", text("4"), "B+", text("3.3"))),
                (4, row("Spring 2026", "CS102", Cell::Number(3.0), "A-", Cell::Number(3.7))),
            ],
        };

        let outcome = parse_sheet(&sheet, &LoadOptions::default()).unwrap();
        let codes: Vec<&str> = outcome.records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["CS101", "MA102", "CS102"]);
        assert_eq!(outcome.records[1].credit_hours, 4.0);
        assert_eq!(outcome.records[1].points, 3.3);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn reject_policy_lists_every_offending_row() {
        let sheet = RawSheet {
            headers: headers(),
            rows: vec![
                (2, row("Fall 2025", "CS101", Cell::Number(3.0), "A", Cell::Number(4.0))),
                (3, row("Fall 2025", "MA102", text("three"), "B", Cell::Number(3.0))),
                (4, row("", "CS102", Cell::Number(0.0), "A", Cell::Number(4.5))),
            ],
        };

        let error = parse_sheet(&sheet, &LoadOptions::default()).unwrap_err();
        let GradeError::Validation(issues) = error else {
            panic!("expected validation error, got {error:?}");
        };
        let flagged: Vec<(usize, &str)> = issues.iter().map(|i| (i.row, i.column.as_str())).collect();
        assert_eq!(
            flagged,
            vec![
                (3, COL_CREDIT_HOURS),
                (4, COL_SEMESTER),
                (4, COL_CREDIT_HOURS),
                (4, COL_POINTS),
            ]
        );
    }

    #[test]
    fn skip_policy_keeps_valid_rows() {
        let sheet = RawSheet {
            headers: headers(),
            rows: vec![
                (2, row("Fall 2025", "CS101", Cell::Number(3.0), "A", Cell::Number(4.0))),
                (3, row("Fall 2025", "MA102", Cell::Empty, "", Cell::Number(3.0))),
                (4, row("Spring 2026", "CS102", Cell::Number(3.0), "A-", Cell::Number(3.7))),
            ],
        };
        let options = LoadOptions {
            policy: RowPolicy::Skip,
            ..LoadOptions::default()
        };

        let outcome = parse_sheet(&sheet, &options).unwrap();
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped_rows(), 1);
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let sheet = RawSheet {
            headers: headers(),
            rows: vec![(2, row("Fall 2025", "CS101", text("NaN"), "A", text("inf")))],
        };

        let error = parse_sheet(&sheet, &LoadOptions::default()).unwrap_err();
        let GradeError::Validation(issues) = error else {
            panic!("expected validation error, got {error:?}");
        };
        let flagged: Vec<(usize, &str, &str)> = issues
            .iter()
            .map(|i| (i.row, i.column.as_str(), i.problem.as_str()))
            .collect();
        assert_eq!(
            flagged,
            vec![
                (2, COL_CREDIT_HOURS, "not a finite number"),
                (2, COL_POINTS, "not a finite number"),
            ]
        );
    }

    #[test]
    fn custom_scale_accepts_higher_points() {
        let sheet = RawSheet {
            headers: headers(),
            rows: vec![(2, row("Fall 2025", "CS101", Cell::Number(3.0), "A+", Cell::Number(4.3)))],
        };
        assert!(parse_sheet(&sheet, &LoadOptions::default()).is_err());

        let options = LoadOptions {
            max_points: 4.3,
            ..LoadOptions::default()
        };
        assert_eq!(parse_sheet(&sheet, &options).unwrap().records.len(), 1);
    }

    #[test]
    fn missing_columns_fail_fast() {
        let sheet = RawSheet {
            headers: vec!["Semester".to_string(), "Code".to_string(), "Grade".to_string()],
            rows: vec![],
        };

        let error = parse_sheet(&sheet, &LoadOptions::default()).unwrap_err();
        match error {
            GradeError::FileFormat(FileFormatError::MissingColumns(missing)) => {
                assert_eq!(missing, vec![COL_NAME, COL_CREDIT_HOURS, COL_POINTS]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn loads_csv_with_padded_headers_and_blank_rows() {
        let file = write_csv(
            " Semester ,Code,Course Name,CrdHrs,Grade, Points,Instructor\n\
             Fall 2025,CS101,Intro to Programming,3,A,4.0,Smith\n\
             ,,,,,,\n\
             Spring 2026,CS102,Data Structures,3,A-,3.7,Jones\n",
        );

        let outcome = load_records(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].name, "Intro to Programming");
        assert_eq!(outcome.records[1].semester, "Spring 2026");
    }

    #[test]
    fn csv_issues_report_file_line_numbers() {
        let file = write_csv(
            "Semester,Code,Course Name,CrdHrs,Grade,Points\n\
             Fall 2025,CS101,Intro,3,A,4.0\n\
             Fall 2025,CS103,Ethics,3,B,n/a\n",
        );

        let error = load_records(file.path(), &LoadOptions::default()).unwrap_err();
        let GradeError::Validation(issues) = error else {
            panic!("expected validation error");
        };
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row, 3);
        assert_eq!(issues[0].column, COL_POINTS);
    }

    #[test]
    fn loads_first_worksheet_of_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grades.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (col, header) in REQUIRED_COLUMNS.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header).unwrap();
        }
        worksheet.write_string(1, 0, "Fall2025").unwrap();
        worksheet.write_string(1, 1, "CS101").unwrap();
        worksheet.write_string(1, 2, "Intro to Programming").unwrap();
        worksheet.write_number(1, 3, 3.0).unwrap();
        worksheet.write_string(1, 4, "A").unwrap();
        worksheet.write_number(1, 5, 4.0).unwrap();
        workbook.save(&path).unwrap();

        let outcome = load_records(&path, &LoadOptions::default()).unwrap();
        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.semester, "Fall2025");
        assert_eq!(record.credit_hours, 3.0);
        assert_eq!(record.points, 4.0);
    }

    #[test]
    fn unknown_extension_is_a_format_error() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let error = load_records(file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            error,
            GradeError::FileFormat(FileFormatError::UnsupportedExtension(ref ext)) if ext == "txt"
        ));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let error = load_records(Path::new("/nonexistent/grades.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(
            error,
            GradeError::FileFormat(FileFormatError::Unreadable { .. })
        ));
    }
}
