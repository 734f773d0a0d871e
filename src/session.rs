//! Session context for one loaded grade sheet.
//!
//! A session is created per load and owns the records read from that file.
//! Loading another file produces a new session; nothing carries over.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::config::{LoadOptions, SemesterOrder};
use crate::cumulative::compute_cgpa;
use crate::distribution::compute_distribution;
use crate::error::{GradeError, RowIssue};
use crate::filter::{filter_by_semester, semester_labels};
use crate::loader::load_records;
use crate::models::{CourseRecord, Dashboard, DashboardMetrics};
use crate::semester::{compute_sgpa, order_semesters};

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub source: PathBuf,
    pub records: Vec<CourseRecord>,
    pub skipped: Vec<RowIssue>,
}

impl Session {
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self, GradeError> {
        let outcome = load_records(path, options)?;
        let session = Session {
            id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            source: path.to_path_buf(),
            records: outcome.records,
            skipped: outcome.skipped,
        };
        info!(session = %session.id, records = session.records.len(), "session started");
        Ok(session)
    }

    pub fn from_records(source: impl Into<PathBuf>, records: Vec<CourseRecord>) -> Self {
        Session {
            id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            source: source.into(),
            records,
            skipped: Vec::new(),
        }
    }

    pub fn semesters(&self) -> Vec<String> {
        semester_labels(&self.records)
    }

    /// Recomputes every metric for the selected semesters, or for the whole
    /// sheet when `selection` is `None`.
    pub fn dashboard(
        &self,
        selection: Option<&HashSet<String>>,
        order: SemesterOrder,
    ) -> Result<Dashboard, GradeError> {
        let records = match selection {
            Some(selected) => filter_by_semester(&self.records, selected),
            None => self.records.clone(),
        };
        build_dashboard(records, order)
    }
}

pub fn build_dashboard(records: Vec<CourseRecord>, order: SemesterOrder) -> Result<Dashboard, GradeError> {
    let semesters = order_semesters(compute_sgpa(&records)?, order);
    let cumulative = compute_cgpa(&semesters)?;
    let distribution = compute_distribution(&records);

    let total_credit_hours = records.iter().map(|r| r.credit_hours).sum();
    let average_points = if records.is_empty() {
        None
    } else {
        Some(records.iter().map(|r| r.points).sum::<f64>() / records.len() as f64)
    };

    let metrics = DashboardMetrics {
        latest_cgpa: cumulative.last().map(|c| c.cgpa),
        total_credit_hours,
        total_courses: records.len(),
        semester_count: semesters.len(),
        average_points,
    };

    Ok(Dashboard {
        metrics,
        semesters,
        cumulative,
        distribution,
        records,
    })
}
