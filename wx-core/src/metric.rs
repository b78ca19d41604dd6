//! Metric identifier classification.
//!
//! Matching is a case-sensitive substring test against the exact identifier
//! sent by the weather analysis service. Add identifiers to
//! [`KNOWN_METRICS`] rather than changing the match rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display category a metric is charted under.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Category {
    Temperature,
    PrecipitationOrSnow,
    Wind,
    Unclassified,
}

impl Category {
    /// Categories that have their own chart.
    pub const CHARTED: [Category; 3] = [
        Category::Temperature,
        Category::PrecipitationOrSnow,
        Category::Wind,
    ];

    /// True if `metric` is charted under this category.
    pub fn includes(&self, metric: &str) -> bool {
        classify(metric) == *self
    }

    /// Short name used by the chart selector (`temp`, `precip`, `wind`).
    pub fn selector_name(&self) -> &'static str {
        match self {
            Category::Temperature => "temp",
            Category::PrecipitationOrSnow => "precip",
            Category::Wind => "wind",
            Category::Unclassified => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self {
            Category::Temperature => "Temperature",
            Category::PrecipitationOrSnow => "Precipitation",
            Category::Wind => "Wind",
            Category::Unclassified => "Other",
        };
        f.write_str(title)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temp" => Ok(Category::Temperature),
            "precip" => Ok(Category::PrecipitationOrSnow),
            "wind" => Ok(Category::Wind),
            other => Err(format!(
                "unknown category {other:?}, expected temp, precip or wind"
            )),
        }
    }
}

/// Metric identifiers accepted by the weather analysis service, with the
/// label shown next to their checkbox.
pub const KNOWN_METRICS: [(&str, &str); 5] = [
    ("AVERAGE_TEMPERATURE", "Average Temperature"),
    ("AVERAGE_APPARENT_TEMPERATURE", "Average Apparent Temperature"),
    ("PRECIPITATION", "Precipitation"),
    ("SNOWFALL", "Snowfall"),
    ("MAX_WIND_SPEED", "Max Wind Speed"),
];

/// Returns true if the service is known to accept this metric identifier.
pub fn is_known_metric(metric: &str) -> bool {
    KNOWN_METRICS.iter().any(|(id, _)| *id == metric)
}

/// Map a metric identifier to the chart category it belongs to.
pub fn classify(metric: &str) -> Category {
    if metric.contains("TEMP") {
        Category::Temperature
    } else if metric.contains("PRECIP") || metric.contains("SNOW") {
        Category::PrecipitationOrSnow
    } else if metric.contains("WIND") {
        Category::Wind
    } else {
        Category::Unclassified
    }
}

/// Unit label for a metric identifier.
pub fn unit_for(metric: &str) -> &'static str {
    if metric.contains("TEMPERATURE") {
        "°F"
    } else if metric.contains("PRECIPITATION") || metric.contains("SNOWFALL") {
        "in"
    } else {
        "mph"
    }
}
