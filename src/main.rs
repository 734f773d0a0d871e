use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use grade_analytics::config::validate_max_points;
use grade_analytics::{report, AnalyticsConfig, Dashboard, RowPolicy, SemesterOrder, Session};

#[derive(Parser)]
#[command(name = "grade-dashboard")]
#[command(about = "Semester and cumulative GPA analytics from a grade sheet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Grade sheet (.xlsx, .xls, .ods or .csv) with Semester, Code, Course Name, CrdHrs, Grade, Points
    #[arg(short, long)]
    file: PathBuf,
    /// Limit metrics to a semester; repeat for several
    #[arg(long = "semester", value_name = "LABEL")]
    semesters: Vec<String>,
    /// Semester ordering for the cumulative GPA
    #[arg(long, value_enum)]
    order: Option<OrderArg>,
    /// Drop invalid rows instead of rejecting the file
    #[arg(long)]
    skip_invalid: bool,
    /// Top of the grade point scale
    #[arg(long)]
    max_points: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    FirstSeen,
    Chronological,
}

impl From<OrderArg> for SemesterOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::FirstSeen => SemesterOrder::FirstSeen,
            OrderArg::Chronological => SemesterOrder::Chronological,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print headline metrics and the SGPA/CGPA trend
    Summary {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// List the semesters found in the sheet
    Semesters {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the dashboard as JSON
    Export {
        #[command(flatten)]
        source: SourceArgs,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn init_tracing() {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    tracing_subscriber::registry().with(stderr_layer).init();
}

fn resolve_config(source: &SourceArgs) -> anyhow::Result<AnalyticsConfig> {
    let mut config = AnalyticsConfig::from_env().context("invalid grade configuration")?;
    if let Some(order) = source.order {
        config.order = order.into();
    }
    if source.skip_invalid {
        config.load.policy = RowPolicy::Skip;
    }
    if let Some(max_points) = source.max_points {
        config.load.max_points = validate_max_points(max_points)?;
    }
    Ok(config)
}

fn open_session(source: &SourceArgs) -> anyhow::Result<(Session, AnalyticsConfig)> {
    let config = resolve_config(source)?;
    info!(
        order = %config.order,
        policy = ?config.load.policy,
        max_points = config.load.max_points,
        "configuration resolved"
    );
    let session = Session::load(&source.file, &config.load)
        .with_context(|| format!("failed to load {}", source.file.display()))?;

    if !session.skipped.is_empty() {
        warn!(issues = session.skipped.len(), "invalid rows were skipped");
    }
    Ok((session, config))
}

fn build_dashboard(session: &Session, source: &SourceArgs, order: SemesterOrder) -> anyhow::Result<Dashboard> {
    let selection: Option<HashSet<String>> = if source.semesters.is_empty() {
        None
    } else {
        let known = session.semesters();
        for label in &source.semesters {
            if !known.contains(label) {
                warn!(semester = %label, "selected semester not present in sheet");
            }
        }
        Some(source.semesters.iter().cloned().collect())
    };

    session
        .dashboard(selection.as_ref(), order)
        .context("failed to compute grade metrics")
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { source } => {
            let (session, config) = open_session(&source)?;
            let dashboard = build_dashboard(&session, &source, config.order)?;

            if dashboard.semesters.is_empty() {
                println!("No courses found for this selection.");
                return Ok(());
            }

            let metrics = &dashboard.metrics;
            if let Some(cgpa) = metrics.latest_cgpa {
                println!("Latest CGPA {cgpa:.2}");
            }
            println!(
                "{:.1} credit hours across {} courses in {} semesters",
                metrics.total_credit_hours, metrics.total_courses, metrics.semester_count
            );
            println!("SGPA / CGPA by semester:");
            for (semester, cumulative) in dashboard.semesters.iter().zip(&dashboard.cumulative) {
                println!(
                    "- {}: SGPA {:.2} over {:.1} credit hours, CGPA {:.2}",
                    semester.semester, semester.sgpa, semester.total_credit_hours, cumulative.cgpa
                );
            }
            println!("Grade distribution:");
            for (grade, count) in dashboard.distribution.ranked() {
                println!("- {grade}: {count}");
            }
        }
        Commands::Semesters { source } => {
            let (session, _) = open_session(&source)?;
            for label in session.semesters() {
                println!("{label}");
            }
        }
        Commands::Report { source, out } => {
            let (session, config) = open_session(&source)?;
            let dashboard = build_dashboard(&session, &source, config.order)?;
            let scope = (!source.semesters.is_empty()).then_some(source.semesters.as_slice());
            let report = report::build_report(&session, &dashboard, scope);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write report to {}", out.display()))?;
            info!(path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
        Commands::Export { source, out } => {
            let (session, config) = open_session(&source)?;
            let dashboard = build_dashboard(&session, &source, config.order)?;
            let json = serde_json::to_string_pretty(&dashboard)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Dashboard written to {}.", path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}
