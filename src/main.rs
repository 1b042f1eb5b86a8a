use clap::Parser;
use midas_downloader::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic with signal handling
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        // On Ctrl+C, request cancellation and let the batch finish its
        // current operation so the transport session is released cleanly
        let signal_token = cancellation_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nReceived CTRL+C, finishing current operation...");
                signal_token.cancel();
            }
        });

        commands::run(args, cancellation_token).await
    });

    match result {
        Ok(_report) => {
            // Success - the summary has already been printed by the command
            process::exit(0);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("MIDAS Downloader - UK Met Office Hourly Weather Observations");
    println!("============================================================");
    println!();
    println!("Download per-station, per-year hourly weather observation files from");
    println!("the MIDAS Open dataset on the CEDA archive. Requested years are checked");
    println!("against each station's capability manifest before downloading.");
    println!();
    println!("USAGE:");
    println!("    midas-downloader <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    download    Download hourly files for a set of stations (main command)");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Download 2022 for two Staffordshire stations:");
    println!("    midas-downloader download staffordshire 00622_keele,00623_oaken 2022 2022");
    println!();
    println!("    # Download a range of years into a specific directory:");
    println!("    midas-downloader download devon 01330_clawton 2015 2020 --output ./data");
    println!();
    println!("For detailed help on any command, use:");
    println!("    midas-downloader <COMMAND> --help");
}
