//! Command implementations for the weather trend CLI.
//!
//! Provides subcommands for fetching trend analyses from the weather
//! analysis service and exporting the resulting chart traces.

use clap::{Args, Subcommand};
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use wx_chart::state::ChartState;
use wx_core::error::TrendError;
use wx_core::metric::{Category, KNOWN_METRICS};
use wx_core::response::ApiResponse;

pub mod export;
pub mod query;
pub mod request;
pub mod submission;

use export::{write_summaries, ExportSurface, OutputFormat};
use query::{WeatherClient, DEFAULT_TIMEOUT_SECS};
use request::RequestArgs;
use submission::{outcome, SubmissionGate};

/// Where the analysis service lives.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Base URL of the weather analysis service (`/graphql` is appended)
    #[arg(long, env = "WEATHER_API_URL")]
    pub api_url: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch trend analyses and export one chart's traces
    Trends {
        #[command(flatten)]
        service: ServiceArgs,

        #[command(flatten)]
        request: RequestArgs,

        /// Chart to build: temp, precip or wind
        #[arg(short = 'c', long, default_value = "temp")]
        category: Category,

        /// Output format for the traces
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output path for the traces (stdout if omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Print a plain-language summary of each regression to stderr
        #[arg(long)]
        summaries: bool,

        /// Fail if any series has missing or malformed data instead of
        /// charting the rest
        #[arg(long)]
        strict: bool,
    },

    /// List the metric identifiers the service is known to accept
    Metrics,
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Trends {
            service,
            request,
            category,
            format,
            output,
            summaries,
            strict,
        } => {
            let options = TrendOptions {
                category,
                format,
                output,
                summaries,
                strict,
            };
            run_trends(&service, &request, &options).await
        }
        Command::Metrics => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for (id, name) in KNOWN_METRICS {
                writeln!(out, "{:<30} {}", id, name)?;
            }
            Ok(())
        }
    }
}

/// Message for the user: the generic retry text for fetch failures, the
/// full error chain otherwise.
pub fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<TrendError>() {
        Some(trend_error) => trend_error.user_message(),
        None => format!("{:#}", err),
    }
}

struct TrendOptions {
    category: Category,
    format: OutputFormat,
    output: Option<PathBuf>,
    summaries: bool,
    strict: bool,
}

async fn run_trends(
    service: &ServiceArgs,
    request: &RequestArgs,
    options: &TrendOptions,
) -> anyhow::Result<()> {
    let requests = request.resolve()?;
    let average_years = requests.first().map_or(1, |r| r.average_years);
    let client = WeatherClient::new(&service.api_url, Duration::from_secs(service.timeout_secs))?;

    info!(
        "Querying {} locations from {}",
        requests.len(),
        client.endpoint()
    );
    let mut gate = SubmissionGate::new();
    let handle = gate.submit(async move { client.fetch_all(&requests).await });
    let responses = match outcome(handle).await {
        Some(result) => result?,
        None => anyhow::bail!("Submission was cancelled"),
    };
    let responses: Rc<[ApiResponse]> = Rc::from(responses);

    let mut state = ChartState::new(options.category, average_years);
    let organized = state.dataset(&responses);
    if organized.excluded_points > 0 {
        warn!("{} points had unreadable dates and were left out", organized.excluded_points);
    }
    if options.strict {
        organized.ensure_consistent()?;
    }

    let writer: Box<dyn Write> = match &options.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    let mut surface = ExportSurface::new(writer, options.format);
    let legend = state.render(&responses, &mut surface)?;
    info!("Chart has {} legend entries", legend.len());

    if options.summaries {
        write_summaries(io::stderr().lock(), &state.summaries())?;
    }
    if let Some(path) = &options.output {
        info!("Traces written to {}", path.display());
    }
    Ok(())
}
