//! Organized series → ordered trace list for one chart category.

use crate::color::{ColorRegistry, SeriesKey};
use crate::trace::{StrokeWeight, Trace, TraceKind, TracePoint};
use log::{debug, warn};
use wx_core::metric::Category;
use wx_data::labels::metric_label;
use wx_data::organizer::{MetricSeries, OrganizedDataset};
use wx_data::regression::{curve_over_observed, project_forward, Projection};

/// Suffix that marks the regression half of a trace pair.
pub const REGRESSION_SUFFIX: &str = " (Regression)";

/// Builds observed/regression trace pairs and owns the color identity of
/// every series it has drawn.
#[derive(Debug)]
pub struct TraceAssembler {
    colors: ColorRegistry,
    average_years: u32,
    projection: Projection,
}

impl TraceAssembler {
    pub fn new(average_years: u32) -> Self {
        Self {
            colors: ColorRegistry::new(),
            average_years,
            projection: Projection::default(),
        }
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn set_average_years(&mut self, average_years: u32) {
        self.average_years = average_years;
    }

    pub fn average_years(&self) -> u32 {
        self.average_years
    }

    pub fn colors(&self) -> &ColorRegistry {
        &self.colors
    }

    /// Two traces per chartable (location, metric) pair in `category`:
    /// observed first, then its regression, in dataset order.
    ///
    /// Series without observed points, without a regression, or carrying a
    /// fault are skipped and get no color.
    pub fn build_traces(&mut self, organized: &OrganizedDataset, category: Category) -> Vec<Trace> {
        let mut traces = Vec::new();
        for location in organized.iter() {
            for series in location
                .metrics
                .iter()
                .filter(|series| category.includes(&series.metric))
            {
                match self.build_pair(&location.location, series) {
                    Some([observed, regression]) => {
                        traces.push(observed);
                        traces.push(regression);
                    }
                    None => match &series.fault {
                        Some(fault) => warn!("Skipping {} in {}: {}", series.metric, location.location, fault),
                        None => debug!(
                            "No traces for {} in {}: nothing chartable",
                            series.metric, location.location
                        ),
                    },
                }
            }
        }
        traces
    }

    fn build_pair(&mut self, location: &str, series: &MetricSeries) -> Option<[Trace; 2]> {
        let (regression, last_observed) = series.chartable()?;
        let color = self.colors.color_for(&SeriesKey::new(location, &series.metric));
        let label = metric_label(&series.metric, location, self.average_years);

        let observed = Trace {
            label: label.clone(),
            kind: TraceKind::Observed,
            points: series
                .observed_points
                .iter()
                .map(|point| TracePoint {
                    x: point.date,
                    y: point.value,
                })
                .collect(),
            color,
            stroke_weight: StrokeWeight::Thin,
        };

        let coefficients = &regression.coefficients;
        let mut curve = curve_over_observed(&series.observed_points, regression.base_date, coefficients);
        curve.extend(project_forward(
            last_observed,
            regression.base_date,
            coefficients,
            self.projection,
        ));
        let fitted = Trace {
            label: label + REGRESSION_SUFFIX,
            kind: TraceKind::Regression,
            points: curve.into_iter().map(TracePoint::from).collect(),
            color,
            stroke_weight: StrokeWeight::Thick,
        };

        Some([observed, fitted])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::nth_color;
    use chrono::NaiveDate;
    use wx_core::response::ApiResponse;
    use wx_data::organizer::organize;

    const BOSTON_JSON: &str = include_str!("../../fixtures/boston_response.json");
    const DENVER_JSON: &str = include_str!("../../fixtures/denver_response.json");

    fn responses() -> Vec<ApiResponse> {
        vec![
            serde_json::from_str(BOSTON_JSON).unwrap(),
            serde_json::from_str(DENVER_JSON).unwrap(),
        ]
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_pairs_in_dataset_order() {
        let organized = organize(&responses());
        let mut assembler = TraceAssembler::new(5);
        let traces = assembler.build_traces(&organized, Category::Temperature);

        let labels: Vec<&str> = traces.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "daily average temperature in Boston (5-year average) (°F)",
                "daily average temperature in Boston (5-year average) (°F) (Regression)",
                "daily average temperature in Denver (5-year average) (°F)",
                "daily average temperature in Denver (5-year average) (°F) (Regression)",
            ]
        );
        let kinds: Vec<TraceKind> = traces.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TraceKind::Observed,
                TraceKind::Regression,
                TraceKind::Observed,
                TraceKind::Regression
            ]
        );
    }

    #[test]
    fn test_observed_and_regression_traces() {
        let organized = organize(&responses());
        let mut assembler = TraceAssembler::new(1);
        let traces = assembler.build_traces(&organized, Category::Temperature);
        let (observed, regression) = (&traces[0], &traces[1]);

        assert_eq!(observed.stroke_weight, StrokeWeight::Thin);
        assert_eq!(observed.points.len(), 3);
        assert_eq!(observed.points[2], TracePoint { x: ymd(2020, 4, 10), y: 52.25 });

        assert_eq!(regression.stroke_weight, StrokeWeight::Thick);
        assert_eq!(regression.color, observed.color);
        assert_eq!(regression.points.len(), 3 + 243);
        assert_eq!(regression.points[0].y, 50.0);
        assert!((regression.points[2].y - 51.0).abs() < 1e-12);
        assert_eq!(regression.points[3].x, ymd(2020, 5, 10));
        assert!(regression.points.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn test_category_filter() {
        let organized = organize(&responses());
        let mut assembler = TraceAssembler::new(1);
        let precip = assembler.build_traces(&organized, Category::PrecipitationOrSnow);
        assert_eq!(precip.len(), 4);
        assert!(precip.iter().all(|t| t.label.starts_with("daily snowfall")));
        assert!(assembler.build_traces(&organized, Category::Wind).is_empty());
    }

    #[test]
    fn test_colors_stable_across_builds() {
        let organized = organize(&responses());
        let mut assembler = TraceAssembler::new(1);
        let first = assembler.build_traces(&organized, Category::Temperature);
        let second = assembler.build_traces(&organized, Category::Temperature);
        let colors = |traces: &[Trace]| traces.iter().map(|t| t.color).collect::<Vec<_>>();
        assert_eq!(colors(&first), colors(&second));
        assert_ne!(first[0].color, first[2].color);
    }

    #[test]
    fn test_colors_survive_refetch_and_category_switch() {
        let mut assembler = TraceAssembler::new(1);
        let temperature = assembler.build_traces(&organize(&responses()), Category::Temperature);
        let snowfall = assembler.build_traces(&organize(&responses()), Category::PrecipitationOrSnow);
        // a fresh dataset with the same keys keeps the colors it had
        let refetched = assembler.build_traces(&organize(&responses()), Category::Temperature);

        assert_eq!(temperature[0].color, nth_color(0));
        assert_eq!(temperature[2].color, nth_color(1));
        assert_eq!(snowfall[0].color, nth_color(2));
        assert_eq!(snowfall[2].color, nth_color(3));
        assert_eq!(refetched[0].color, temperature[0].color);
        assert_eq!(refetched[2].color, temperature[2].color);
        assert_eq!(assembler.colors().len(), 4);
    }

    #[test]
    fn test_location_order_changes_do_not_reassign_colors() {
        let mut assembler = TraceAssembler::new(1);
        let forward = assembler.build_traces(&organize(&responses()), Category::Temperature);
        let mut reversed_input = responses();
        reversed_input.reverse();
        let reversed = assembler.build_traces(&organize(&reversed_input), Category::Temperature);
        assert_eq!(reversed[0].color, forward[2].color);
        assert_eq!(reversed[2].color, forward[0].color);
    }

    #[test]
    fn test_faulty_series_skipped() {
        let mut input = responses();
        input[0].regression.retain(|r| r.metric != "AVERAGE_TEMPERATURE");
        let organized = organize(&input);
        let mut assembler = TraceAssembler::new(1);
        let traces = assembler.build_traces(&organized, Category::Temperature);
        assert_eq!(traces.len(), 2);
        assert!(traces[0].label.contains("Denver"));
        assert_eq!(assembler.colors().len(), 1);
    }

    #[test]
    fn test_custom_projection() {
        let organized = organize(&responses());
        let mut assembler = TraceAssembler::new(1).with_projection(Projection {
            horizon_days: 90,
            step_days: 30,
        });
        let traces = assembler.build_traces(&organized, Category::Temperature);
        assert_eq!(traces[1].points.len(), 3 + 3);
        assert_eq!(traces[1].last_date(), Some(ymd(2020, 7, 9)));
    }
}
