//! Wire types returned by the weather analysis service and their
//! normalized counterparts.
//!
//! The `Raw*` types mirror the GraphQL payload field for field (camelCase,
//! timestamps as strings). `HistoricalPoint` and `RegressionResult` are the
//! same records after their timestamps have been normalized to calendar days.

use crate::error::TrendError;
use crate::normalized_date::normalize_timestamp;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily value for one metric, as sent by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHistoricalPoint {
    pub metric: String,
    pub value: f64,
    pub date: String,
}

/// Significance test attached to a regression fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    /// p-value in [0, 1]
    pub p_value: f64,
    pub significant: bool,
    pub f_statistic: f64,
}

/// Polynomial regression fit as sent by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRegressionResult {
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    pub test_results: TestResults,
    pub base_date: String,
}

/// Regression fit for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRegression {
    pub metric: String,
    pub results: RawRegressionResult,
}

/// Everything the service returns for one requested location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub historical_data: Vec<RawHistoricalPoint>,
    pub regression: Vec<MetricRegression>,
    pub location_name: String,
}

impl ApiResponse {
    /// Distinct metric identifiers among the observed points, in the order
    /// they first appear.
    pub fn observed_metrics(&self) -> Vec<&str> {
        let mut metrics: Vec<&str> = Vec::new();
        for point in &self.historical_data {
            if !metrics.contains(&point.metric.as_str()) {
                metrics.push(point.metric.as_str());
            }
        }
        metrics
    }

    /// The regression for `metric`, if the service sent one.
    pub fn regression_for(&self, metric: &str) -> Option<&RawRegressionResult> {
        self.regression
            .iter()
            .find(|r| r.metric == metric)
            .map(|r| &r.results)
    }
}

/// A single observed value on a normalized calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub metric: String,
    pub date: NaiveDate,
    pub value: f64,
}

impl TryFrom<&RawHistoricalPoint> for HistoricalPoint {
    type Error = TrendError;

    fn try_from(raw: &RawHistoricalPoint) -> Result<Self, Self::Error> {
        Ok(HistoricalPoint {
            metric: raw.metric.clone(),
            date: normalize_timestamp(&raw.date)?,
            value: raw.value,
        })
    }
}

/// Regression fit with its base date normalized to a calendar day.
///
/// `coefficients[i]` multiplies `x^i`, where `x` is the number of days since
/// `base_date`, so `coefficients.len()` is the degree plus one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    pub test_results: TestResults,
    pub base_date: NaiveDate,
}

impl RegressionResult {
    /// Polynomial degree of the fit.
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }
}

impl TryFrom<&RawRegressionResult> for RegressionResult {
    type Error = TrendError;

    fn try_from(raw: &RawRegressionResult) -> Result<Self, Self::Error> {
        if raw.coefficients.is_empty() {
            return Err(TrendError::MalformedResponse(
                "regression has no coefficients".to_string(),
            ));
        }
        let base_date = normalize_timestamp(&raw.base_date).map_err(|_| {
            TrendError::MalformedResponse(format!(
                "regression base date {:?} is not a timestamp",
                raw.base_date
            ))
        })?;
        Ok(RegressionResult {
            coefficients: raw.coefficients.clone(),
            r_squared: raw.r_squared,
            test_results: raw.test_results,
            base_date,
        })
    }
}
