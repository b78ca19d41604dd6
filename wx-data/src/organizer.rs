//! Reshape per-location responses into location → metric series.
//!
//! The metric universe comes from the first response: every location is
//! assumed to report the same metric set. A later location that lacks one
//! of those metrics gets an empty series with no regression; metrics that
//! only later locations report are ignored.
//!
//! A series whose data is inconsistent (observed points without a matching
//! regression, or a regression that cannot be decoded) carries its fault
//! instead of failing the whole dataset, so the remaining series can still
//! be charted. [`OrganizedDataset::ensure_consistent`] restores the strict
//! behavior for callers that want it.

use chrono::NaiveDate;
use log::{debug, warn};
use std::ops::Deref;
use std::rc::Rc;
use wx_core::error::{Result, TrendError};
use wx_core::response::{ApiResponse, HistoricalPoint, RegressionResult};

/// Observed points and regression fit for one metric at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub metric: String,
    /// Chronological observed points with valid dates.
    pub observed_points: Vec<HistoricalPoint>,
    /// `None` when the location did not report the metric, or on a fault.
    pub regression: Option<RegressionResult>,
    /// Why this series cannot be charted, if anything.
    pub fault: Option<TrendError>,
}

impl MetricSeries {
    /// Date of the latest observed point.
    pub fn last_observed_date(&self) -> Option<NaiveDate> {
        self.observed_points.last().map(|point| point.date)
    }

    /// The fit and the last observed day, if the series can be charted.
    pub fn chartable(&self) -> Option<(&RegressionResult, NaiveDate)> {
        if self.fault.is_some() {
            return None;
        }
        Some((self.regression.as_ref()?, self.last_observed_date()?))
    }
}

/// All metric series for one requested location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSeries {
    pub location: String,
    /// One entry per metric, in discovery order; metric ids are unique.
    pub metrics: Vec<MetricSeries>,
}

impl LocationSeries {
    /// The series for `metric`, if it is part of this location's metric set.
    pub fn get(&self, metric: &str) -> Option<&MetricSeries> {
        self.metrics.iter().find(|series| series.metric == metric)
    }
}

/// Location series, index-aligned with the responses they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizedDataset {
    pub locations: Vec<LocationSeries>,
    /// Observed points dropped because their date could not be parsed.
    pub excluded_points: usize,
}

impl OrganizedDataset {
    /// Every per-series fault, in location then metric order.
    pub fn faults(&self) -> impl Iterator<Item = &TrendError> {
        self.locations
            .iter()
            .flat_map(|location| location.metrics.iter())
            .filter_map(|series| series.fault.as_ref())
    }

    /// Fail on the first per-series fault.
    pub fn ensure_consistent(&self) -> Result<()> {
        match self.faults().next() {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }
}

impl Deref for OrganizedDataset {
    type Target = [LocationSeries];

    fn deref(&self) -> &Self::Target {
        &self.locations
    }
}

/// Organize responses into per-location, per-metric series.
///
/// Output order matches input order; metric order within each location is
/// the order metrics first appear in the first response.
pub fn organize(responses: &[ApiResponse]) -> OrganizedDataset {
    let universe: Vec<String> = match responses.first() {
        Some(first) => first
            .observed_metrics()
            .into_iter()
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };
    debug!(
        "Organizing {} responses over {} metrics",
        responses.len(),
        universe.len()
    );

    let mut dataset = OrganizedDataset::default();
    for response in responses {
        let location = &response.location_name;
        for extra in response
            .observed_metrics()
            .into_iter()
            .filter(|metric| !universe.iter().any(|known| known.as_str() == *metric))
        {
            debug!("Ignoring metric {} reported only by {}", extra, location);
        }

        let mut points = Vec::with_capacity(response.historical_data.len());
        for raw in &response.historical_data {
            match HistoricalPoint::try_from(raw) {
                Ok(point) => points.push(point),
                Err(e) => {
                    warn!("Excluding {} point in {}: {}", raw.metric, location, e);
                    dataset.excluded_points += 1;
                }
            }
        }

        let metrics = universe
            .iter()
            .map(|metric| organize_metric(response, metric, &points))
            .collect();
        dataset.locations.push(LocationSeries {
            location: location.clone(),
            metrics,
        });
    }
    dataset
}

fn organize_metric(response: &ApiResponse, metric: &str, points: &[HistoricalPoint]) -> MetricSeries {
    let location = &response.location_name;
    let mut observed_points: Vec<HistoricalPoint> = points
        .iter()
        .filter(|point| point.metric == metric)
        .cloned()
        .collect();
    observed_points.sort_by_key(|point| point.date);

    let reported = response.historical_data.iter().any(|raw| raw.metric == metric);
    let (regression, fault) = match response.regression_for(metric) {
        Some(raw) => match RegressionResult::try_from(raw) {
            Ok(result) => (Some(result), None),
            Err(e) => {
                let fault = TrendError::MalformedResponse(format!("{} in {}: {}", metric, location, e));
                (None, Some(fault))
            }
        },
        None if reported => {
            let fault = TrendError::MissingRegression {
                location: location.clone(),
                metric: metric.to_string(),
            };
            (None, Some(fault))
        }
        None => (None, None),
    };
    if let Some(fault) = &fault {
        warn!("Skipping series: {}", fault);
    }

    MetricSeries {
        metric: metric.to_string(),
        observed_points,
        regression,
        fault,
    }
}

/// Memoizing front for [`organize`], keyed on the identity of the response
/// array rather than its contents.
///
/// Handing in the same `Rc` again returns the same output `Rc` without
/// recomputing; any other `Rc`, even one with equal contents, recomputes.
#[derive(Debug, Default)]
pub struct SeriesOrganizer {
    last: Option<(Rc<[ApiResponse]>, Rc<OrganizedDataset>)>,
}

impl SeriesOrganizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn organize(&mut self, responses: &Rc<[ApiResponse]>) -> Rc<OrganizedDataset> {
        if let Some((input, output)) = &self.last {
            if Rc::ptr_eq(input, responses) {
                debug!("Reusing organized dataset for unchanged responses");
                return Rc::clone(output);
            }
        }
        let output = Rc::new(organize(responses));
        self.last = Some((Rc::clone(responses), Rc::clone(&output)));
        output
    }

    /// The most recently organized dataset, if any.
    pub fn current(&self) -> Option<Rc<OrganizedDataset>> {
        self.last.as_ref().map(|(_, output)| Rc::clone(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wx_core::response::{MetricRegression, RawHistoricalPoint};

    const BOSTON_JSON: &str = include_str!("../../fixtures/boston_response.json");
    const DENVER_JSON: &str = include_str!("../../fixtures/denver_response.json");

    fn boston() -> ApiResponse {
        serde_json::from_str(BOSTON_JSON).unwrap()
    }

    fn denver() -> ApiResponse {
        serde_json::from_str(DENVER_JSON).unwrap()
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_preserves_location_count_and_order() {
        let responses = vec![denver(), boston()];
        let organized = organize(&responses);
        assert_eq!(organized.len(), responses.len());
        for (series, response) in organized.iter().zip(&responses) {
            assert_eq!(series.location, response.location_name);
        }
    }

    #[test]
    fn test_metric_order_follows_first_response() {
        let organized = organize(&[boston(), denver()]);
        for location in organized.iter() {
            let metrics: Vec<&str> = location.metrics.iter().map(|m| m.metric.as_str()).collect();
            assert_eq!(metrics, vec!["AVERAGE_TEMPERATURE", "SNOWFALL"]);
        }
    }

    #[test]
    fn test_series_contents() {
        let organized = organize(&[boston()]);
        let temperature = organized[0].get("AVERAGE_TEMPERATURE").unwrap();
        assert_eq!(temperature.observed_points.len(), 3);
        assert!(temperature
            .observed_points
            .iter()
            .all(|p| p.metric == "AVERAGE_TEMPERATURE"));
        assert_eq!(temperature.last_observed_date(), Some(ymd(2020, 4, 10)));
        let regression = temperature.regression.as_ref().unwrap();
        assert_eq!(regression.coefficients, vec![50.0, 0.01]);
        assert_eq!(regression.base_date, ymd(2020, 1, 1));
        assert!(temperature.chartable().is_some());
        assert!(organized.ensure_consistent().is_ok());
    }

    #[test]
    fn test_observed_points_are_chronological() {
        let mut response = boston();
        response.historical_data.reverse();
        let organized = organize(&[response]);
        let snowfall = organized[0].get("SNOWFALL").unwrap();
        assert!(snowfall
            .observed_points
            .windows(2)
            .all(|w| w[0].date <= w[1].date));
        // discovery order follows the reversed input
        assert_eq!(organized[0].metrics[0].metric, "SNOWFALL");
    }

    #[test]
    fn test_missing_regression_is_isolated_to_its_series() {
        let mut response = boston();
        response.regression.retain(|r| r.metric != "SNOWFALL");
        let organized = organize(&[response, denver()]);

        let snowfall = organized[0].get("SNOWFALL").unwrap();
        assert_eq!(
            snowfall.fault,
            Some(TrendError::MissingRegression {
                location: "Boston".to_string(),
                metric: "SNOWFALL".to_string(),
            })
        );
        assert!(snowfall.chartable().is_none());
        assert!(organized[0].get("AVERAGE_TEMPERATURE").unwrap().chartable().is_some());
        assert!(organized[1].get("SNOWFALL").unwrap().chartable().is_some());

        assert_eq!(organized.faults().count(), 1);
        assert!(organized.ensure_consistent().unwrap_err().is_data_integrity());
    }

    #[test]
    fn test_undecodable_regression_is_a_fault() {
        let mut response = boston();
        response.regression[0].results.base_date = "garbage".to_string();
        let organized = organize(&[response]);
        let temperature = organized[0].get("AVERAGE_TEMPERATURE").unwrap();
        assert!(matches!(temperature.fault, Some(TrendError::MalformedResponse(_))));
        assert!(temperature.regression.is_none());
    }

    #[test]
    fn test_invalid_dates_are_excluded() {
        let mut response = boston();
        response.historical_data.push(RawHistoricalPoint {
            metric: "AVERAGE_TEMPERATURE".to_string(),
            value: 99.0,
            date: "2020-02-31T00:00:00Z".to_string(),
        });
        let organized = organize(&[response]);
        assert_eq!(organized.excluded_points, 1);
        let temperature = organized[0].get("AVERAGE_TEMPERATURE").unwrap();
        assert_eq!(temperature.observed_points.len(), 3);
        assert!(temperature.fault.is_none());
    }

    // Every location is assumed to report the first location's metric set.
    // These pin down what happens when that assumption does not hold.
    #[test]
    fn test_divergent_metric_sets_missing_metric() {
        let mut partial = denver();
        partial.historical_data.retain(|p| p.metric != "SNOWFALL");
        partial.regression.retain(|r| r.metric != "SNOWFALL");
        let organized = organize(&[boston(), partial]);

        let snowfall = organized[1].get("SNOWFALL").unwrap();
        assert!(snowfall.observed_points.is_empty());
        assert!(snowfall.regression.is_none());
        assert!(snowfall.fault.is_none());
        assert!(snowfall.chartable().is_none());
    }

    #[test]
    fn test_divergent_metric_sets_extra_metric_ignored() {
        let mut extended = denver();
        extended.historical_data.push(RawHistoricalPoint {
            metric: "MAX_WIND_SPEED".to_string(),
            value: 12.0,
            date: "2020-01-01T00:00:00Z".to_string(),
        });
        extended.regression.push(MetricRegression {
            metric: "MAX_WIND_SPEED".to_string(),
            results: boston().regression[0].results.clone(),
        });
        let organized = organize(&[boston(), extended]);
        assert!(organized[1].get("MAX_WIND_SPEED").is_none());
        assert_eq!(organized[1].metrics.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let organized = organize(&[]);
        assert!(organized.is_empty());
        assert_eq!(organized.faults().count(), 0);
    }

    #[test]
    fn test_memoized_on_input_identity() {
        let mut organizer = SeriesOrganizer::new();
        assert!(organizer.current().is_none());

        let responses: Rc<[ApiResponse]> = Rc::from(vec![boston(), denver()]);
        let first = organizer.organize(&responses);
        let second = organizer.organize(&responses);
        assert!(Rc::ptr_eq(&first, &second));

        let alias = Rc::clone(&responses);
        assert!(Rc::ptr_eq(&first, &organizer.organize(&alias)));

        // equal contents, different array instance
        let refetched: Rc<[ApiResponse]> = Rc::from(vec![boston(), denver()]);
        let third = organizer.organize(&refetched);
        assert!(!Rc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
        assert!(Rc::ptr_eq(&third, &organizer.current().unwrap()));
    }
}
