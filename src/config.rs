//! Load and ordering options, resolved from the environment with CLI overrides.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context};

pub const DEFAULT_MAX_POINTS: f64 = 4.0;

pub const ENV_MAX_POINTS: &str = "GRADE_MAX_POINTS";
pub const ENV_SEMESTER_ORDER: &str = "GRADE_SEMESTER_ORDER";
pub const ENV_SKIP_INVALID: &str = "GRADE_SKIP_INVALID";

/// What the loader does with rows that fail validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Fail the whole load and report every offending row.
    #[default]
    Reject,
    /// Drop offending rows and hand them back alongside the records.
    Skip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SemesterOrder {
    #[default]
    FirstSeen,
    Chronological,
}

impl FromStr for SemesterOrder {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first-seen" | "first_seen" | "input" => Ok(SemesterOrder::FirstSeen),
            "chronological" | "chrono" => Ok(SemesterOrder::Chronological),
            other => bail!("unknown semester order {other:?}"),
        }
    }
}

impl fmt::Display for SemesterOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemesterOrder::FirstSeen => write!(f, "first-seen"),
            SemesterOrder::Chronological => write!(f, "chronological"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub policy: RowPolicy,
    /// Upper bound of the institution's grade point scale.
    pub max_points: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            policy: RowPolicy::Reject,
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalyticsConfig {
    pub load: LoadOptions,
    pub order: SemesterOrder,
}

impl AnalyticsConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AnalyticsConfig::default();

        if let Some(raw) = lookup(ENV_MAX_POINTS) {
            let max_points: f64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_POINTS} must be a number, got {raw:?}"))?;
            config.load.max_points = validate_max_points(max_points)?;
        }

        if let Some(raw) = lookup(ENV_SEMESTER_ORDER) {
            config.order = raw
                .parse()
                .with_context(|| format!("invalid {ENV_SEMESTER_ORDER}"))?;
        }

        if let Some(raw) = lookup(ENV_SKIP_INVALID) {
            if parse_flag(&raw).with_context(|| format!("invalid {ENV_SKIP_INVALID}"))? {
                config.load.policy = RowPolicy::Skip;
            }
        }

        Ok(config)
    }
}

pub fn validate_max_points(max_points: f64) -> anyhow::Result<f64> {
    if !max_points.is_finite() || max_points <= 0.0 {
        bail!("grade scale maximum must be a positive number, got {max_points}");
    }
    Ok(max_points)
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected true or false, got {other:?}"),
    }
}
