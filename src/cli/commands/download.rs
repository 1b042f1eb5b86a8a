//! Download command implementation for MIDAS downloader CLI
//!
//! Wires the CLI arguments into a transport, repository, and retriever,
//! runs one batch, and reports the outcome.

use crate::app::models::{RetrievalReport, StationStatus};
use crate::app::services::repository::Repository;
use crate::app::services::retriever::Retriever;
use crate::app::transport::DapTransport;
use crate::cli::args::DownloadArgs;
use crate::Result;
use colored::Colorize;
use indicatif::HumanDuration;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Download command runner
///
/// 1. Set up logging from the verbosity flags
/// 2. Validate arguments and build the batch request
/// 3. Run the capability-gated retrieval batch
/// 4. Print a summary of files obtained and stations skipped
pub async fn run_download(
    args: DownloadArgs,
    cancel: CancellationToken,
) -> Result<RetrievalReport> {
    let start_time = Instant::now();

    setup_logging(&args)?;

    info!("Starting MIDAS Open hourly downloader");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let config = args.to_config();
    let request = args.to_request();

    info!(
        "Downloading {} station(s) in {} for years {}-{} (qc version {})",
        request.station_ids.len(),
        request.historic_county,
        request.start_year,
        request.end_year,
        request.qc_version
    );

    let transport = DapTransport::new(config);
    let repository = Repository::new(Box::new(transport));
    let mut retriever = Retriever::new(repository);

    let report = retriever
        .download_hourly_files(&request, &cancel, args.show_progress())
        .await?;

    print_summary(&args, &report, start_time.elapsed());

    Ok(report)
}

/// Set up structured logging for the download command
fn setup_logging(args: &DownloadArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("midas_downloader={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Print a human-readable summary of the batch outcome
fn print_summary(args: &DownloadArgs, report: &RetrievalReport, elapsed: std::time::Duration) {
    if args.quiet {
        return;
    }

    println!(
        "{} Downloaded {} file(s) in {}",
        "✓".green().bold(),
        report.file_count(),
        HumanDuration(elapsed)
    );

    for station in &report.stations {
        match &station.status {
            StationStatus::Skipped(reason) => {
                println!(
                    "  {} {}: {}",
                    "skipped".yellow(),
                    station.station_id,
                    reason
                );
            }
            StationStatus::Downloaded { failed_years, .. } if *failed_years > 0 => {
                println!(
                    "  {} {}: {} year(s) failed to download",
                    "partial".red(),
                    station.station_id,
                    failed_years
                );
            }
            StationStatus::Downloaded { .. } => {}
        }
    }
}
