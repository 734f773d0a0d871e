use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRecord {
    pub semester: String,
    pub code: String,
    pub name: String,
    pub credit_hours: f64,
    pub grade: String,
    pub points: f64,
}

impl CourseRecord {
    pub fn quality_points(&self) -> f64 {
        self.points * self.credit_hours
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterSummary {
    pub semester: String,
    pub course_count: usize,
    pub total_credit_hours: f64,
    pub weighted_point_sum: f64,
    pub sgpa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeSummary {
    pub semester: String,
    pub cumulative_credit_hours: f64,
    pub cumulative_weighted_points: f64,
    pub cgpa: f64,
}

/// Grade label to number of courses that received it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GradeDistribution {
    counts: BTreeMap<String, usize>,
}

impl GradeDistribution {
    pub fn record(&mut self, grade: &str) {
        *self.counts.entry(grade.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, grade: &str) -> usize {
        self.counts.get(grade).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Labels ordered by descending count, ties broken by label.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(grade, count)| (grade.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub latest_cgpa: Option<f64>,
    pub total_credit_hours: f64,
    pub total_courses: usize,
    pub semester_count: usize,
    pub average_points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub metrics: DashboardMetrics,
    pub semesters: Vec<SemesterSummary>,
    pub cumulative: Vec<CumulativeSummary>,
    pub distribution: GradeDistribution,
    pub records: Vec<CourseRecord>,
}
