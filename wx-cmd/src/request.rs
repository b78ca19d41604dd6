//! Request parameters, their defaults and bounds.
//!
//! One [`RequestDetail`] is sent per location; everything except the
//! location is shared across a submission.

use chrono::{Datelike, Local};
use clap::Args;
use log::warn;
use wx_core::error::{Result, TrendError};
use wx_core::metric::is_known_metric;

/// Earliest year the service has data for.
pub const MIN_START_YEAR: i32 = 1950;
pub const MIN_END_YEAR: i32 = MIN_START_YEAR + 1;
/// Default span between start and end year.
pub const DEFAULT_SPAN_YEARS: i32 = 30;
pub const MAX_AVERAGE_YEARS: u32 = 10;
pub const MAX_REGRESSION_DEGREE: u32 = 5;

/// Parameters of one per-location analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDetail {
    pub location: String,
    pub metrics: Vec<String>,
    pub average_years: u32,
    pub start_year: i32,
    pub end_year: i32,
    pub regression_degree: u32,
}

/// Request parameters as given on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// Location to analyze; repeat for several locations
    #[arg(short = 'l', long = "location", required = true)]
    pub locations: Vec<String>,

    /// Metric identifier (e.g. AVERAGE_TEMPERATURE); repeat for several metrics
    #[arg(short = 'm', long = "metric", required = true)]
    pub metrics: Vec<String>,

    /// Years to include in the moving average (1-10) [default: 1]
    #[arg(short = 'a', long)]
    pub average_years: Option<u32>,

    /// First year of the analysis [default: end year - 30]
    #[arg(short = 's', long)]
    pub start_year: Option<i32>,

    /// Last year of the analysis [default: last year]
    #[arg(short = 'e', long)]
    pub end_year: Option<i32>,

    /// Degree of the fitted polynomial (1-5) [default: 1]
    #[arg(short = 'd', long)]
    pub regression_degree: Option<u32>,
}

impl RequestArgs {
    /// Apply defaults and check bounds against the current local year.
    pub fn resolve(&self) -> Result<Vec<RequestDetail>> {
        self.resolve_for_year(Local::now().year())
    }

    /// Apply defaults and check bounds, with `current_year` as "now".
    pub fn resolve_for_year(&self, current_year: i32) -> Result<Vec<RequestDetail>> {
        let latest_end_year = current_year - 1;

        let locations: Vec<String> = self
            .locations
            .iter()
            .map(|location| location.trim().to_string())
            .collect();
        if locations.is_empty() || locations.iter().any(String::is_empty) {
            return Err(invalid("at least one non-empty location is required"));
        }

        if self.metrics.is_empty() {
            return Err(invalid("at least one metric is required"));
        }
        for metric in &self.metrics {
            if !is_enum_identifier(metric) {
                return Err(invalid(format!("{metric:?} is not a metric identifier")));
            }
            if !is_known_metric(metric) {
                warn!("Metric {} is not known to the service; sending it anyway", metric);
            }
        }

        let average_years = self.average_years.unwrap_or(1);
        if !(1..=MAX_AVERAGE_YEARS).contains(&average_years) {
            return Err(invalid(format!(
                "average years must be between 1 and {MAX_AVERAGE_YEARS}, got {average_years}"
            )));
        }

        let end_year = self.end_year.unwrap_or(latest_end_year);
        if !(MIN_END_YEAR..=latest_end_year).contains(&end_year) {
            return Err(invalid(format!(
                "end year must be between {MIN_END_YEAR} and {latest_end_year}, got {end_year}"
            )));
        }

        let start_year = self
            .start_year
            .unwrap_or((end_year - DEFAULT_SPAN_YEARS).max(MIN_START_YEAR));
        if start_year < MIN_START_YEAR || start_year >= end_year {
            return Err(invalid(format!(
                "start year must be at least {MIN_START_YEAR} and before the end year {end_year}, got {start_year}"
            )));
        }

        let regression_degree = self.regression_degree.unwrap_or(1);
        if !(1..=MAX_REGRESSION_DEGREE).contains(&regression_degree) {
            return Err(invalid(format!(
                "regression degree must be between 1 and {MAX_REGRESSION_DEGREE}, got {regression_degree}"
            )));
        }

        Ok(locations
            .into_iter()
            .map(|location| RequestDetail {
                location,
                metrics: self.metrics.clone(),
                average_years,
                start_year,
                end_year,
                regression_degree,
            })
            .collect())
    }
}

fn invalid(message: impl Into<String>) -> TrendError {
    TrendError::InvalidRequest(message.into())
}

/// GraphQL enum values are bare names: `[A-Za-z_][A-Za-z0-9_]*`.
fn is_enum_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
