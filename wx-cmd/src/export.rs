//! Export surfaces: write assembled traces instead of drawing them.

use chrono::NaiveDate;
use clap::ValueEnum;
use log::info;
use serde::Serialize;
use std::io::Write;
use wx_chart::color::Rgb;
use wx_chart::legend::{RenderSurface, RenderedTrace};
use wx_chart::state::SeriesSummary;
use wx_chart::trace::{chart_payload, StrokeWeight, Trace};
use wx_core::error::{Result, TrendError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The payload the D3 chart script receives
    Json,
    /// One row per point: label,date,value,color,stroke
    Csv,
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    label: &'a str,
    date: NaiveDate,
    value: f64,
    color: Rgb,
    stroke: StrokeWeight,
}

/// A [`RenderSurface`] that writes traces to `writer`.
pub struct ExportSurface<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> ExportSurface<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_json(&mut self, traces: &[Trace]) -> Result<()> {
        let payload = chart_payload(traces)?;
        writeln!(self.writer, "{}", payload).map_err(render_error)
    }

    fn write_csv(&mut self, traces: &[Trace]) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(&mut self.writer);
        for trace in traces {
            for point in &trace.points {
                wtr.serialize(ExportRow {
                    label: &trace.label,
                    date: point.x,
                    value: point.y,
                    color: trace.color,
                    stroke: trace.stroke_weight,
                })
                .map_err(render_error)?;
            }
        }
        wtr.flush().map_err(render_error)
    }
}

impl<W: Write> RenderSurface for ExportSurface<W> {
    fn render(&mut self, traces: &[Trace]) -> Result<Option<Vec<RenderedTrace>>> {
        match self.format {
            OutputFormat::Json => self.write_json(traces)?,
            OutputFormat::Csv => self.write_csv(traces)?,
        }
        self.writer.flush().map_err(render_error)?;
        info!("Exported {} traces as {:?}", traces.len(), self.format);
        Ok(None)
    }
}

fn render_error(err: impl std::fmt::Display) -> TrendError {
    TrendError::Render(err.to_string())
}

/// Write one summary paragraph per series, each under a `location / metric`
/// heading.
pub fn write_summaries<W: Write>(mut writer: W, summaries: &[SeriesSummary]) -> std::io::Result<()> {
    for summary in summaries {
        writeln!(writer, "{} / {}", summary.location, summary.metric)?;
        writeln!(writer, "  {}", summary.text)?;
    }
    writer.flush()
}
