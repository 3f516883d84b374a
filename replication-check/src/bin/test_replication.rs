use anyhow::{Context, Result};
use clap::Parser;
use replication_check::adapters::MySqlConnector;
use replication_check::cli::ProbeArgs;
use replication_check::domain::Severity;
use replication_check::logging;
use replication_check::services::ReplicationProbe;
use replication_check::{CheckResult, Report};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = ProbeArgs::parse();
    logging::init(args.verbose);

    let report = match run(&args).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Invalid probe settings: {}", e);
            Report {
                line: format!("An error occurred: {}", e),
                severity: Severity::Error,
            }
        }
    };

    writeln!(std::io::stdout(), "{}", report.line).context("Failed to write report")?;
    Ok(ExitCode::from(report.exit_code()))
}

async fn run(args: &ProbeArgs) -> CheckResult<Report> {
    let primary = args.primary_config()?;
    let replica = args.replica_config()?;
    let probe = ReplicationProbe::new(Arc::new(MySqlConnector::new()), args.probe_settings()?);

    let result = probe.run_probe(&primary, &replica).await;
    if !result.cleanup_errors.is_empty() {
        tracing::warn!(
            "Marker {} cleanup failed on {} node(s)",
            result.marker.token,
            result.cleanup_errors.len()
        );
    }
    Ok(Report::from(&result))
}
