//! D3.js rendering surface via `js_sys::eval()`.
//!
//! The chart script in `assets/js/trend-chart.js` is evaluated once as a
//! global (no ES modules) and exposes `window.renderTrendChart`. This module
//! serializes traces and calls it, reading back the list of traces the
//! script actually drew.

use crate::legend::{RenderSurface, RenderedTrace};
use crate::trace::{chart_payload, Trace};
use log::{debug, warn};
use wasm_bindgen::JsValue;
use wx_core::error::{Result, TrendError};

static TREND_CHART_JS: &str = include_str!("../assets/js/trend-chart.js");

/// Evaluate the chart script at global scope once D3 has loaded. Call once
/// at app startup.
pub fn init_charts() {
    let store_js = match serde_json::to_string(TREND_CHART_JS) {
        Ok(script) => format!("window.__wxChartScript = {};", script),
        Err(e) => {
            warn!("Could not embed chart script: {}", e);
            return;
        }
    };
    let _ = js_sys::eval(&store_js);

    let init_js = r#"
        (function() {
            var waitForD3 = setInterval(function() {
                if (typeof d3 !== 'undefined') {
                    clearInterval(waitForD3);
                    (0, eval)(window.__wxChartScript);
                    delete window.__wxChartScript;
                    if (typeof renderTrendChart !== 'undefined') window.renderTrendChart = renderTrendChart;
                    window.__wxChartsReady = true;
                }
            }, 100);
        })();
    "#;
    let _ = js_sys::eval(init_js);
}

/// Whether `init_charts` has finished and `renderTrendChart` is callable.
pub fn charts_ready() -> bool {
    js_sys::eval("!!(window.__wxChartsReady && window.renderTrendChart)")
        .map(|ready| ready.is_truthy())
        .unwrap_or(false)
}

/// Clear a chart container.
pub fn destroy_chart(container_id: &str) {
    if let Some(element) = container(container_id) {
        element.set_inner_html("");
    }
}

fn container(container_id: &str) -> Option<web_sys::Element> {
    web_sys::window()?
        .document()?
        .get_element_by_id(container_id)
}

/// Draws traces into one DOM container.
#[derive(Debug, Clone)]
pub struct D3Surface {
    container_id: String,
}

impl D3Surface {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
        }
    }
}

impl RenderSurface for D3Surface {
    fn render(&mut self, traces: &[Trace]) -> Result<Option<Vec<RenderedTrace>>> {
        if container(&self.container_id).is_none() {
            return Err(TrendError::Render(format!(
                "no element with id {:?}",
                self.container_id
            )));
        }
        if !charts_ready() {
            return Err(TrendError::Render("chart script not loaded".to_string()));
        }

        let payload = chart_payload(traces)?;
        let id_literal = serde_json::to_string(&self.container_id)
            .map_err(|e| TrendError::Render(e.to_string()))?;
        let payload_literal =
            serde_json::to_string(&payload).map_err(|e| TrendError::Render(e.to_string()))?;

        let rendered = js_sys::eval(&format!(
            "window.renderTrendChart({}, {})",
            id_literal, payload_literal
        ))
        .map_err(|e: JsValue| {
            TrendError::Render(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
        })?;

        match rendered.as_string() {
            Some(json) => {
                let canonical: Vec<RenderedTrace> = serde_json::from_str(&json)
                    .map_err(|e| TrendError::Render(format!("bad trace list from chart: {}", e)))?;
                debug!("Chart {} drew {} traces", self.container_id, canonical.len());
                Ok(Some(canonical))
            }
            None => Ok(None),
        }
    }
}
