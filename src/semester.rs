use std::collections::HashMap;

use tracing::debug;

use crate::config::SemesterOrder;
use crate::error::{ComputationError, GradeError};
use crate::models::{CourseRecord, SemesterSummary};

/// Credit-weighted SGPA per semester, in the order semesters first appear.
pub fn compute_sgpa(records: &[CourseRecord]) -> Result<Vec<SemesterSummary>, GradeError> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<SemesterSummary> = Vec::new();

    for record in records {
        let index = *positions.entry(record.semester.as_str()).or_insert_with(|| {
            summaries.push(SemesterSummary {
                semester: record.semester.clone(),
                course_count: 0,
                total_credit_hours: 0.0,
                weighted_point_sum: 0.0,
                sgpa: 0.0,
            });
            summaries.len() - 1
        });

        let entry = &mut summaries[index];
        entry.course_count += 1;
        entry.total_credit_hours += record.credit_hours;
        entry.weighted_point_sum += record.quality_points();
    }

    for summary in summaries.iter_mut() {
        if !summary.total_credit_hours.is_finite() || summary.total_credit_hours <= 0.0 {
            return Err(ComputationError::ZeroCreditHours {
                semester: summary.semester.clone(),
                credit_hours: summary.total_credit_hours,
            }
            .into());
        }
        summary.sgpa = summary.weighted_point_sum / summary.total_credit_hours;
        debug!(
            semester = %summary.semester,
            courses = summary.course_count,
            credit_hours = summary.total_credit_hours,
            sgpa = summary.sgpa,
            "semester aggregated"
        );
    }

    Ok(summaries)
}

pub fn order_semesters(mut summaries: Vec<SemesterSummary>, order: SemesterOrder) -> Vec<SemesterSummary> {
    if order == SemesterOrder::Chronological {
        // Stable, so unparsed labels keep their relative order at the end.
        summaries.sort_by_key(|summary| term_key(&summary.semester).unwrap_or((u32::MAX, u8::MAX)));
    }
    summaries
}

fn season_rank(season: &str) -> Option<u8> {
    match season.to_ascii_lowercase().as_str() {
        "spring" => Some(1),
        "summer" => Some(2),
        "fall" | "autumn" => Some(3),
        "winter" => Some(4),
        _ => None,
    }
}

/// Parses labels such as `Fall 2025`, `Fall2025` or `spring-2026` into a
/// `(year, season)` sort key. An unrecognised season ranks 0, ahead of
/// Spring of the same year.
pub fn term_key(label: &str) -> Option<(u32, u8)> {
    let label = label.trim();
    let split = label.find(|c: char| c.is_ascii_digit())?;
    let (season, year) = label.split_at(split);
    let season = season.trim_end_matches(|c: char| c.is_whitespace() || c == '-' || c == '_');
    if season.is_empty() {
        return None;
    }
    let year: u32 = year.trim().parse().ok()?;
    Some((year, season_rank(season).unwrap_or(0)))
}
