//! Data processing for weather trend charts.
//!
//! This crate turns raw per-location responses into organized series and
//! evaluates the regression fits that arrive alongside them.

pub mod organizer;

/// Polynomial evaluation over calendar days.
pub mod regression {
    use chrono::NaiveDate;
    use serde::Serialize;
    use wx_core::normalized_date::DateStride;
    use wx_core::response::HistoricalPoint;

    /// How far past the last observation the trend is drawn (20 years).
    pub const PROJECTION_HORIZON_DAYS: i64 = 365 * 20;

    /// Spacing between projected points.
    pub const PROJECTION_STEP_DAYS: i64 = 30;

    /// A single (date, value) point on a regression curve.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct CurvePoint {
        pub date: NaiveDate,
        pub value: f64,
    }

    /// Evaluate `Σ coefficients[i] * x^i` using Horner's method.
    ///
    /// An empty coefficient list evaluates to 0.
    pub fn evaluate(coefficients: &[f64], x: f64) -> f64 {
        coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, coefficient| acc * x + coefficient)
    }

    /// Whole days from `base_date` to `date`; negative before the base date.
    pub fn day_offset_of(date: NaiveDate, base_date: NaiveDate) -> i64 {
        (date - base_date).num_days()
    }

    /// Evaluate the regression on a calendar day.
    pub fn evaluate_on(coefficients: &[f64], base_date: NaiveDate, date: NaiveDate) -> f64 {
        evaluate(coefficients, day_offset_of(date, base_date) as f64)
    }

    /// Span and stride of a forward projection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Projection {
        pub horizon_days: i64,
        pub step_days: i64,
    }

    impl Default for Projection {
        fn default() -> Self {
            Self {
                horizon_days: PROJECTION_HORIZON_DAYS,
                step_days: PROJECTION_STEP_DAYS,
            }
        }
    }

    impl Projection {
        /// Number of projected points: `floor(horizon / step)`, or zero for a
        /// non-positive horizon or step.
        pub fn point_count(&self) -> usize {
            if self.step_days <= 0 || self.horizon_days <= 0 {
                return 0;
            }
            (self.horizon_days / self.step_days) as usize
        }
    }

    /// Extend the fitted trend past `last_observed`.
    ///
    /// The first point falls one step after `last_observed`; points are
    /// strictly increasing in date. Nothing is refit: each value is the
    /// regression evaluated at that day's offset from `base_date`.
    pub fn project_forward(
        last_observed: NaiveDate,
        base_date: NaiveDate,
        coefficients: &[f64],
        projection: Projection,
    ) -> Vec<CurvePoint> {
        DateStride::new(last_observed, projection.step_days, projection.point_count())
            .map(|date| CurvePoint {
                date,
                value: evaluate_on(coefficients, base_date, date),
            })
            .collect()
    }

    /// The fitted value on each observed day, for drawing over the scatter of
    /// actual values.
    pub fn curve_over_observed(
        observed: &[HistoricalPoint],
        base_date: NaiveDate,
        coefficients: &[f64],
    ) -> Vec<CurvePoint> {
        observed
            .iter()
            .map(|point| CurvePoint {
                date: point.date,
                value: evaluate_on(coefficients, base_date, point.date),
            })
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
            NaiveDate::from_ymd_opt(year, month, day).unwrap()
        }

        #[test]
        fn test_evaluate_at_zero_is_intercept() {
            for coefficients in [vec![3.5], vec![-2.0, 7.0], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]] {
                assert_eq!(evaluate(&coefficients, 0.0), coefficients[0]);
            }
            assert_eq!(evaluate(&[], 12.0), 0.0);
        }

        #[test]
        fn test_evaluate_linear_and_cubic() {
            assert!((evaluate(&[50.0, 0.01], 100.0) - 51.0).abs() < 1e-12);
            // 1 + 2*2 + 3*4 + 4*8 = 49
            assert_eq!(evaluate(&[1.0, 2.0, 3.0, 4.0], 2.0), 49.0);
            assert_eq!(evaluate(&[1.0, 2.0, 3.0, 4.0], -1.0), -2.0);
        }

        #[test]
        fn test_evaluate_is_repeatable() {
            let coefficients = [0.3, -1.7e-3, 2.2e-7];
            let first = evaluate(&coefficients, 8123.0);
            let second = evaluate(&coefficients, 8123.0);
            assert_eq!(first.to_bits(), second.to_bits());
        }

        #[test]
        fn test_day_offset_of() {
            assert_eq!(day_offset_of(ymd(2020, 4, 10), ymd(2020, 1, 1)), 100);
            assert_eq!(day_offset_of(ymd(2020, 1, 1), ymd(2020, 1, 1)), 0);
            assert_eq!(day_offset_of(ymd(2019, 12, 31), ymd(2020, 1, 1)), -1);
        }

        #[test]
        fn test_project_forward_default_count_and_order() {
            let last = ymd(2020, 4, 10);
            let projected = project_forward(last, ymd(2020, 1, 1), &[50.0, 0.01], Projection::default());
            assert_eq!(projected.len(), 243);
            assert_eq!(projected[0].date, ymd(2020, 5, 10));
            assert!(projected.iter().all(|p| p.date > last));
            assert!(projected.windows(2).all(|w| w[0].date < w[1].date));
            // day 130 from base
            assert!((projected[0].value - 51.3).abs() < 1e-9);
        }

        #[test]
        fn test_project_forward_custom_projection() {
            let projection = Projection {
                horizon_days: 100,
                step_days: 7,
            };
            assert_eq!(projection.point_count(), 14);
            let projected = project_forward(ymd(2021, 1, 1), ymd(2021, 1, 1), &[0.0, 1.0], projection);
            assert_eq!(projected.len(), 14);
            assert_eq!(projected[13].date, ymd(2021, 4, 9));
            assert_eq!(projected[13].value, 98.0);
        }

        #[test]
        fn test_project_forward_degenerate_projection() {
            for (horizon_days, step_days) in [(0, 30), (7300, 0), (-30, 30), (20, 30)] {
                let projection = Projection {
                    horizon_days,
                    step_days,
                };
                assert!(project_forward(ymd(2021, 1, 1), ymd(2021, 1, 1), &[1.0], projection).is_empty());
            }
        }

        #[test]
        fn test_curve_over_observed() {
            let observed = vec![
                HistoricalPoint {
                    metric: "AVERAGE_TEMPERATURE".to_string(),
                    date: ymd(2020, 1, 1),
                    value: 31.5,
                },
                HistoricalPoint {
                    metric: "AVERAGE_TEMPERATURE".to_string(),
                    date: ymd(2020, 4, 10),
                    value: 52.25,
                },
            ];
            let curve = curve_over_observed(&observed, ymd(2020, 1, 1), &[50.0, 0.01]);
            assert_eq!(curve.len(), 2);
            assert_eq!(curve[0].date, ymd(2020, 1, 1));
            assert_eq!(curve[0].value, 50.0);
            assert!((curve[1].value - 51.0).abs() < 1e-12);
        }
    }
}

/// Human-readable labels and regression summaries.
pub mod labels {
    use wx_core::metric::unit_for;
    use wx_core::response::RegressionResult;

    /// Legend label for a metric at a location, e.g.
    /// `daily average temperature in Boston (5-year average) (°F)`.
    pub fn metric_label(metric: &str, location: &str, average_years: u32) -> String {
        format!(
            "daily {} in {} ({}-year average) ({})",
            metric.replace('_', " ").to_lowercase(),
            location,
            average_years,
            unit_for(metric)
        )
    }

    /// Name of a polynomial of the given degree.
    pub fn degree_text(degree: usize) -> String {
        match degree {
            1 => "linear".to_string(),
            2 => "quadratic".to_string(),
            3 => "cubic".to_string(),
            4 => "quartic".to_string(),
            5 => "quintic".to_string(),
            n => format!("{}-th degree polynomial", n),
        }
    }

    /// Round to three decimal places.
    pub fn to_nearest_thousandth(value: f64) -> f64 {
        (value * 1000.0).round() / 1000.0
    }

    /// One-paragraph plain-language summary of a regression fit.
    pub fn describe_regression(
        metric: &str,
        location: &str,
        average_years: u32,
        regression: &RegressionResult,
    ) -> String {
        let label = metric_label(metric, location, average_years);
        let coefficients = &regression.coefficients;
        let direction = if coefficients.last().copied().unwrap_or(0.0) > 0.0 {
            "increasing"
        } else {
            "decreasing"
        };
        let rate = match coefficients.as_slice() {
            [_, slope] => format!(" at a rate of {}{} per day", slope, unit_for(metric)),
            _ => String::new(),
        };
        let significance = if regression.test_results.significant {
            ""
        } else {
            "not "
        };
        format!(
            "The {label} is {direction}{rate}. This trend is {significance}statistically \
             significant with a P-Value of {p_value}. {explained}% of the variation in {label} \
             can be explained by the {degree} relationship with the date.",
            p_value = to_nearest_thousandth(regression.test_results.p_value),
            explained = to_nearest_thousandth(regression.r_squared * 100.0),
            degree = degree_text(regression.degree()),
        )
    }

}
