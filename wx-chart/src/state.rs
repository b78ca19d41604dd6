//! State owned by one chart instance.
//!
//! `ChartState` bundles the memoizing organizer, the assembler (and with it
//! the color map), the selected category and the legend of the last render.
//! Two charts on one page each own a `ChartState` and never share colors.

use crate::assembler::TraceAssembler;
use crate::legend::{legend_for, LegendEntry, RenderSurface};
use crate::trace::Trace;
use log::info;
use serde::Serialize;
use std::rc::Rc;
use wx_core::error::{Result, TrendError};
use wx_core::metric::Category;
use wx_core::response::ApiResponse;
use wx_data::labels::describe_regression;
use wx_data::organizer::{OrganizedDataset, SeriesOrganizer};

/// Plain-language summary of one visible series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub location: String,
    pub metric: String,
    pub text: String,
}

#[derive(Debug)]
pub struct ChartState {
    category: Category,
    organizer: SeriesOrganizer,
    assembler: TraceAssembler,
    /// Traces handed to the surface on the last successful render
    traces: Vec<Trace>,
    legend: Vec<LegendEntry>,
    /// Error message if something went wrong
    error_msg: Option<String>,
}

impl ChartState {
    pub fn new(category: Category, average_years: u32) -> Self {
        Self::with_assembler(category, TraceAssembler::new(average_years))
    }

    pub fn with_assembler(category: Category, assembler: TraceAssembler) -> Self {
        Self {
            category,
            organizer: SeriesOrganizer::new(),
            assembler,
            traces: Vec::new(),
            legend: Vec::new(),
            error_msg: None,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Switch category. Takes effect on the next render or redraw.
    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    pub fn set_average_years(&mut self, average_years: u32) {
        self.assembler.set_average_years(average_years);
    }

    /// The organized form of `responses`. A later `render` of the same `Rc`
    /// reuses it.
    pub fn dataset(&mut self, responses: &Rc<[ApiResponse]>) -> Rc<OrganizedDataset> {
        self.organizer.organize(responses)
    }

    /// Organize `responses` (memoized on the `Rc`), assemble this chart's
    /// traces and hand them to `surface`.
    pub fn render<S: RenderSurface>(
        &mut self,
        responses: &Rc<[ApiResponse]>,
        surface: &mut S,
    ) -> Result<&[LegendEntry]> {
        let organized = self.organizer.organize(responses);
        self.draw(&organized, surface)
    }

    /// Re-render the last organized dataset, e.g. after a category switch.
    /// Does nothing before the first render.
    pub fn redraw<S: RenderSurface>(&mut self, surface: &mut S) -> Result<&[LegendEntry]> {
        match self.organizer.current() {
            Some(organized) => self.draw(&organized, surface),
            None => Ok(&self.legend),
        }
    }

    fn draw<S: RenderSurface>(
        &mut self,
        organized: &OrganizedDataset,
        surface: &mut S,
    ) -> Result<&[LegendEntry]> {
        let traces = self.assembler.build_traces(organized, self.category);
        info!("Rendering {} traces for the {} chart", traces.len(), self.category);

        match surface.render(&traces) {
            Ok(rendered) => {
                self.legend = legend_for(rendered.as_deref(), &traces);
                self.traces = traces;
                self.error_msg = None;
                Ok(&self.legend)
            }
            Err(err) => {
                self.show_error(&err);
                Err(err)
            }
        }
    }

    /// Record a failure for display. Fetch failures also clear the chart.
    pub fn show_error(&mut self, err: &TrendError) {
        if matches!(err, TrendError::Fetch(_)) {
            self.traces.clear();
            self.legend.clear();
        }
        self.error_msg = Some(err.user_message());
    }

    pub fn error_msg(&self) -> Option<&str> {
        self.error_msg.as_deref()
    }

    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Regression summaries for every chartable series in this chart's
    /// category, in dataset order.
    pub fn summaries(&self) -> Vec<SeriesSummary> {
        let Some(organized) = self.organizer.current() else {
            return Vec::new();
        };
        let category = self.category;
        let average_years = self.assembler.average_years();
        let summaries = organized
            .iter()
            .flat_map(move |location| {
                location
                    .metrics
                    .iter()
                    .filter(move |series| category.includes(&series.metric))
                    .filter_map(move |series| {
                        let (regression, _) = series.chartable()?;
                        Some(SeriesSummary {
                            location: location.location.clone(),
                            metric: series.metric.clone(),
                            text: describe_regression(
                                &series.metric,
                                &location.location,
                                average_years,
                                regression,
                            ),
                        })
                    })
            })
            .collect();
        summaries
    }
}
