use crate::models::{CourseRecord, GradeDistribution};

pub fn compute_distribution(records: &[CourseRecord]) -> GradeDistribution {
    let mut distribution = GradeDistribution::default();
    for record in records {
        distribution.record(record.grade.trim());
    }
    distribution
}
