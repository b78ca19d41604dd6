//! GraphQL client for the weather analysis service.
//!
//! One POST per location to `{api_url}/graphql`. A submission is
//! all-or-nothing: the first failing location fails the whole fetch.

use crate::request::RequestDetail;
use futures::future::try_join_all;
use log::info;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use wx_core::error::{Result, TrendError};
use wx_core::response::ApiResponse;

/// Path of the GraphQL endpoint under the service base URL.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Default HTTP client timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const SELECTION: &str = "historicalData { date metric value } \
     regression { metric results { coefficients rSquared \
     testResults { fStatistic pValue significant } baseDate } } \
     locationName";

/// Full endpoint URL for a service base URL.
pub fn graphql_endpoint(api_url: &str) -> String {
    format!("{}{}", api_url.trim_end_matches('/'), GRAPHQL_PATH)
}

/// GraphQL document for one location.
///
/// Metrics are written as bare enum values, so they must already be valid
/// GraphQL names; the location is written as a JSON string literal.
pub fn build_query(request: &RequestDetail) -> Result<String> {
    let location = serde_json::to_string(&request.location)
        .map_err(|e| TrendError::InvalidRequest(e.to_string()))?;
    Ok(format!(
        "query {{ weatherAnalysis(input: {{ location: {}, startYear: {}, endYear: {}, \
         averageYears: {}, regressionDegree: {}, metrics: [{}] }}) {{ {} }} }}",
        location,
        request.start_year,
        request.end_year,
        request.average_years,
        request.regression_degree,
        request.metrics.join(", "),
        SELECTION
    ))
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<EnvelopeData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeData {
    weather_analysis: Option<ApiResponse>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Extract `data.weatherAnalysis` from a GraphQL response body.
///
/// A non-empty `errors` list is a fetch failure even when partial data came
/// back; a body that does not decode is a malformed response.
pub fn parse_envelope(body: &str) -> Result<ApiResponse> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| TrendError::MalformedResponse(e.to_string()))?;
    if !envelope.errors.is_empty() {
        let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(TrendError::Fetch(messages.join("; ")));
    }
    envelope
        .data
        .and_then(|data| data.weather_analysis)
        .ok_or_else(|| TrendError::MalformedResponse("no weatherAnalysis in response".to_string()))
}

/// HTTP client bound to one service endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    endpoint: String,
}

impl WeatherClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrendError::Fetch(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: graphql_endpoint(api_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the analysis for one location.
    pub async fn fetch(&self, request: &RequestDetail) -> Result<ApiResponse> {
        let query = build_query(request)?;
        info!("Fetching {} metrics for {}", request.metrics.len(), request.location);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| TrendError::Fetch(format!("{}: {}", request.location, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrendError::Fetch(format!(
                "{}: service answered {}",
                request.location, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TrendError::Fetch(format!("{}: {}", request.location, e)))?;
        parse_envelope(&body)
    }

    /// Fetch every location concurrently. Results are in request order; any
    /// failure fails the whole set.
    pub async fn fetch_all(&self, requests: &[RequestDetail]) -> Result<Vec<ApiResponse>> {
        let responses = try_join_all(requests.iter().map(|request| self.fetch(request))).await?;
        info!("Fetched {} locations from {}", responses.len(), self.endpoint);
        Ok(responses)
    }
}
