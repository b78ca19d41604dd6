//! wx-cli - Command line tool for charting historical weather trends.

use clap::Parser;
use env_logger::Env;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "wx-cli",
    version,
    about = "Historical weather trend toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: wx_cmd::Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match wx_cmd::run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("{:?}", err);
            eprintln!("{}", wx_cmd::user_message(&err));
            ExitCode::FAILURE
        }
    }
}
