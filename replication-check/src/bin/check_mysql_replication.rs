use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use replication_check::adapters::MySqlConnector;
use replication_check::cli::CheckArgs;
use replication_check::logging;
use replication_check::services::StatusCheckService;
use replication_check::Report;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    if std::env::args_os().len() <= 1 {
        CheckArgs::command()
            .write_help(&mut std::io::stderr())
            .context("Failed to print usage")?;
        return Ok(ExitCode::from(1));
    }

    let args = CheckArgs::parse();
    logging::init(args.verbose);

    let report = run(&args).await;

    writeln!(std::io::stdout(), "{}", report.line).context("Failed to write report")?;
    Ok(ExitCode::from(report.exit_code()))
}

async fn run(args: &CheckArgs) -> Report {
    let config = match args.connection_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid connection settings: {}", e);
            return Report::from_error(&e);
        }
    };

    let service = StatusCheckService::new(Arc::new(MySqlConnector::new()), args.thresholds());
    let outcome = service.run(&config).await;
    Report::from(&outcome)
}
