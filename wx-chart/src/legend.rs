//! Legend entries and the rendering-surface seam.

use crate::color::Rgb;
use crate::trace::Trace;
use serde::{Deserialize, Serialize};
use wx_core::error::Result;

/// A single legend row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub name: String,
    pub color: Rgb,
}

/// What a surface reports back about a trace it drew.
///
/// Surfaces may rename or recolor traces (a chart library canonicalizing
/// labels, say); the legend follows whatever they report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderedTrace {
    pub label: String,
    #[serde(deserialize_with = "deserialize_rgb")]
    pub color: Rgb,
}

fn deserialize_rgb<'de, D>(deserializer: D) -> std::result::Result<Rgb, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Something that can draw an ordered trace list.
pub trait RenderSurface {
    /// Draw `traces`. `Ok(Some(..))` carries the canonical list the surface
    /// actually drew; `Ok(None)` means it drew `traces` as given.
    fn render(&mut self, traces: &[Trace]) -> Result<Option<Vec<RenderedTrace>>>;
}

/// One entry per trace, in trace order.
pub fn build_legend(traces: &[Trace]) -> Vec<LegendEntry> {
    traces
        .iter()
        .map(|trace| LegendEntry {
            name: trace.label.clone(),
            color: trace.color,
        })
        .collect()
}

/// Legend from the surface's canonical list when it returned one, otherwise
/// from the assembled traces.
pub fn legend_for(rendered: Option<&[RenderedTrace]>, traces: &[Trace]) -> Vec<LegendEntry> {
    match rendered {
        Some(rendered) => rendered
            .iter()
            .map(|trace| LegendEntry {
                name: trace.label.clone(),
                color: trace.color,
            })
            .collect(),
        None => build_legend(traces),
    }
}
