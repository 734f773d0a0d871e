//! Semester and cumulative GPA analytics over a sheet of course grades.
//!
//! The aggregation functions are pure: they take in-memory records and
//! return in-memory summaries. [`session::Session`] ties one loaded file to
//! those functions.

pub mod config;
pub mod cumulative;
pub mod distribution;
pub mod error;
pub mod filter;
pub mod loader;
pub mod models;
pub mod report;
pub mod semester;
pub mod session;

pub use config::{AnalyticsConfig, LoadOptions, RowPolicy, SemesterOrder};
pub use cumulative::compute_cgpa;
pub use distribution::compute_distribution;
pub use error::{ComputationError, FileFormatError, GradeError, RowIssue};
pub use filter::{filter_by_semester, semester_labels};
pub use models::{
    CourseRecord, CumulativeSummary, Dashboard, DashboardMetrics, GradeDistribution,
    SemesterSummary,
};
pub use semester::compute_sgpa;
pub use session::Session;
