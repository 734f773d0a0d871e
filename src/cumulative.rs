use tracing::debug;

use crate::error::{ComputationError, GradeError};
use crate::models::{CumulativeSummary, SemesterSummary};

/// Running CGPA after each semester, in the order given.
///
/// Totals carry credit hours and weighted points forward, so each entry
/// equals the GPA over every course up to and including that semester.
pub fn compute_cgpa(summaries: &[SemesterSummary]) -> Result<Vec<CumulativeSummary>, GradeError> {
    let mut credit_hours = 0.0;
    let mut weighted_points = 0.0;
    let mut cumulative = Vec::with_capacity(summaries.len());

    for summary in summaries {
        credit_hours += summary.total_credit_hours;
        weighted_points += summary.weighted_point_sum;

        if !credit_hours.is_finite() || credit_hours <= 0.0 {
            return Err(ComputationError::ZeroCreditHours {
                semester: summary.semester.clone(),
                credit_hours,
            }
            .into());
        }

        let cgpa = weighted_points / credit_hours;
        debug!(semester = %summary.semester, credit_hours, cgpa, "cumulative step");
        cumulative.push(CumulativeSummary {
            semester: summary.semester.clone(),
            cumulative_credit_hours: credit_hours,
            cumulative_weighted_points: weighted_points,
            cgpa,
        });
    }

    Ok(cumulative)
}
