use std::fmt::Write;

use crate::models::Dashboard;
use crate::session::Session;

fn format_gpa(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |gpa| format!("{gpa:.2}"))
}

pub fn build_report(session: &Session, dashboard: &Dashboard, scope: Option<&[String]>) -> String {
    let mut output = String::new();
    let scope_label = match scope {
        Some(semesters) if !semesters.is_empty() => semesters.join(", "),
        _ => "all semesters".to_string(),
    };
    let metrics = &dashboard.metrics;

    let _ = writeln!(output, "# Academic Performance Report");
    let _ = writeln!(
        output,
        "Generated from {} (loaded {}) for {}",
        session.source.display(),
        session.loaded_at.format("%Y-%m-%d %H:%M UTC"),
        scope_label
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Latest CGPA: {}", format_gpa(metrics.latest_cgpa));
    let _ = writeln!(output, "- Total credit hours: {:.1}", metrics.total_credit_hours);
    let _ = writeln!(output, "- Total courses: {}", metrics.total_courses);
    let _ = writeln!(output, "- Semesters: {}", metrics.semester_count);
    let _ = writeln!(output, "- Average grade points: {}", format_gpa(metrics.average_points));

    let _ = writeln!(output);
    let _ = writeln!(output, "## GPA Trend");

    if dashboard.semesters.is_empty() {
        let _ = writeln!(output, "No courses recorded for this selection.");
    } else {
        let _ = writeln!(output, "| Semester | Courses | Credit Hours | Quality Points | SGPA | CGPA |");
        let _ = writeln!(output, "|---|---:|---:|---:|---:|---:|");
        for (semester, cumulative) in dashboard.semesters.iter().zip(&dashboard.cumulative) {
            let _ = writeln!(
                output,
                "| {} | {} | {:.1} | {:.2} | {:.2} | {:.2} |",
                semester.semester,
                semester.course_count,
                semester.total_credit_hours,
                semester.weighted_point_sum,
                semester.sgpa,
                cumulative.cgpa
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Grade Distribution");

    let total = dashboard.distribution.total();
    if total == 0 {
        let _ = writeln!(output, "No grades recorded for this selection.");
    } else {
        for (grade, count) in dashboard.distribution.ranked() {
            let _ = writeln!(
                output,
                "- {}: {} course(s) ({:.1}%)",
                grade,
                count,
                count as f64 * 100.0 / total as f64
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Courses");

    if dashboard.records.is_empty() {
        let _ = writeln!(output, "No courses recorded for this selection.");
    } else {
        let _ = writeln!(output, "| Semester | Code | Course Name | CrdHrs | Grade | Points |");
        let _ = writeln!(output, "|---|---|---|---:|---|---:|");
        for record in &dashboard.records {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} | {:.2} |",
                record.semester, record.code, record.name, record.credit_hours, record.grade, record.points
            );
        }
    }

    if !session.skipped.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Skipped Rows");
        for issue in &session.skipped {
            let _ = writeln!(output, "- {issue}");
        }
    }

    output
}
