//! Command implementations for MIDAS downloader CLI
//!
//! This module contains the command execution logic, logging setup, and
//! summary reporting for the CLI interface.

pub mod download;

use crate::app::models::RetrievalReport;
use crate::cli::args::{Args, Commands};
use crate::Result;
use tokio_util::sync::CancellationToken;

/// Main command runner for MIDAS downloader
///
/// Dispatches to the appropriate subcommand handler based on CLI args.
pub async fn run(args: Args, cancel: CancellationToken) -> Result<RetrievalReport> {
    match args.get_command() {
        Commands::Download(download_args) => download::run_download(download_args, cancel).await,
    }
}
