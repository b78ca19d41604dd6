//! Plot traces handed to a rendering surface.
//!
//! All structs derive `Serialize` so they can be passed to the chart
//! script as JSON.

use crate::color::Rgb;
use chrono::NaiveDate;
use serde::Serialize;
use wx_core::error::{Result, TrendError};
use wx_core::normalized_date::CalendarDay;
use wx_data::regression::CurvePoint;

/// Line weight of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeWeight {
    /// Observed values: thin line with visible points
    Thin,
    /// Regression curve: thick line, no points
    Thick,
}

impl StrokeWeight {
    /// Line width in pixels.
    pub fn border_width(&self) -> u32 {
        match self {
            StrokeWeight::Thin => 2,
            StrokeWeight::Thick => 3,
        }
    }

    /// Point marker radius in pixels.
    pub fn point_radius(&self) -> u32 {
        match self {
            StrokeWeight::Thin => 2,
            StrokeWeight::Thick => 0,
        }
    }
}

/// Which half of a (location, metric) pair a trace draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Observed,
    Regression,
}

/// A single (date, value) point of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TracePoint {
    pub x: NaiveDate,
    pub y: f64,
}

impl From<CurvePoint> for TracePoint {
    fn from(point: CurvePoint) -> Self {
        TracePoint {
            x: point.date,
            y: point.value,
        }
    }
}

/// One line on the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub label: String,
    pub kind: TraceKind,
    pub points: Vec<TracePoint>,
    pub color: Rgb,
    pub stroke_weight: StrokeWeight,
}

impl Trace {
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|point| point.x)
    }
}

/// A point as the chart script plots it: `t` is local midnight of the day
/// in epoch milliseconds.
#[derive(Debug, Serialize)]
struct PlotPoint {
    t: i64,
    y: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlotTrace<'a> {
    label: &'a str,
    kind: TraceKind,
    color: Rgb,
    border_width: u32,
    point_radius: u32,
    points: Vec<PlotPoint>,
}

/// JSON handed to `renderTrendChart`.
///
/// Days without a local midnight (DST gap at 00:00) are left out.
pub fn chart_payload(traces: &[Trace]) -> Result<String> {
    let plot: Vec<PlotTrace> = traces
        .iter()
        .map(|trace| PlotTrace {
            label: &trace.label,
            kind: trace.kind,
            color: trace.color,
            border_width: trace.stroke_weight.border_width(),
            point_radius: trace.stroke_weight.point_radius(),
            points: trace
                .points
                .iter()
                .filter_map(|point| {
                    Some(PlotPoint {
                        t: point.x.local_midnight()?.timestamp_millis(),
                        y: point.y,
                    })
                })
                .collect(),
        })
        .collect();
    serde_json::to_string(&plot).map_err(|e| TrendError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_json_shape() {
        let trace = Trace {
            label: "daily snowfall in Boston (1-year average) (in)".to_string(),
            kind: TraceKind::Observed,
            points: vec![TracePoint {
                x: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
                y: 0.5,
            }],
            color: Rgb(0x1f, 0x77, 0xb4),
            stroke_weight: StrokeWeight::Thin,
        };
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "label": "daily snowfall in Boston (1-year average) (in)",
                "kind": "observed",
                "points": [{ "x": "2020-01-02", "y": 0.5 }],
                "color": "#1f77b4",
                "strokeWeight": "thin",
            })
        );
    }

    #[test]
    fn test_chart_payload_uses_local_midnight() {
        let day = NaiveDate::from_ymd_opt(2021, 7, 4).unwrap();
        let trace = Trace {
            label: "fit".to_string(),
            kind: TraceKind::Regression,
            points: vec![TracePoint { x: day, y: 10.5 }],
            color: Rgb(0xff, 0x7f, 0x0e),
            stroke_weight: StrokeWeight::Thick,
        };
        let payload: serde_json::Value =
            serde_json::from_str(&chart_payload(&[trace]).unwrap()).unwrap();
        let expected_t = day.local_midnight().unwrap().timestamp_millis();
        assert_eq!(
            payload,
            serde_json::json!([{
                "label": "fit",
                "kind": "regression",
                "color": "#ff7f0e",
                "borderWidth": 3,
                "pointRadius": 0,
                "points": [{ "t": expected_t, "y": 10.5 }],
            }])
        );
        assert_eq!(chart_payload(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_stroke_weights() {
        assert!(StrokeWeight::Thick.border_width() > StrokeWeight::Thin.border_width());
        assert_eq!(StrokeWeight::Thick.point_radius(), 0);
    }
}
