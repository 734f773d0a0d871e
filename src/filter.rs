use std::collections::HashSet;

use crate::models::CourseRecord;

/// Records whose semester is in `selected`, in their original order.
pub fn filter_by_semester(records: &[CourseRecord], selected: &HashSet<String>) -> Vec<CourseRecord> {
    records
        .iter()
        .filter(|record| selected.contains(&record.semester))
        .cloned()
        .collect()
}

/// Distinct semester labels in first-seen order.
pub fn semester_labels(records: &[CourseRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.semester.as_str()))
        .map(|record| record.semester.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(semester: &str, code: &str) -> CourseRecord {
        CourseRecord {
            semester: semester.to_string(),
            code: code.to_string(),
            name: String::new(),
            credit_hours: 3.0,
            grade: "A".to_string(),
            points: 4.0,
        }
    }

    fn records() -> Vec<CourseRecord> {
        vec![
            record("Fall 2025", "CS101"),
            record("Spring 2026", "CS102"),
            record("Fall 2025", "MA102"),
        ]
    }

    #[test]
    fn empty_selection_selects_nothing() {
        assert!(filter_by_semester(&records(), &HashSet::new()).is_empty());
    }

    #[test]
    fn full_selection_returns_input() {
        let records = records();
        let all: HashSet<String> = semester_labels(&records).into_iter().collect();
        assert_eq!(filter_by_semester(&records, &all), records);
    }

    #[test]
    fn partial_selection_keeps_order() {
        let selected: HashSet<String> = ["Fall 2025".to_string()].into_iter().collect();
        let codes: Vec<String> = filter_by_semester(&records(), &selected)
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(codes, vec!["CS101", "MA102"]);
    }

    #[test]
    fn labels_are_distinct_and_first_seen() {
        assert_eq!(semester_labels(&records()), vec!["Fall 2025", "Spring 2026"]);
    }
}
