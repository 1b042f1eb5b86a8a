//! Command-line argument definitions for MIDAS downloader
//!
//! This module defines the complete CLI interface using clap derive API.

use crate::app::models::DownloadRequest;
use crate::config::DownloadConfig;
use crate::constants::{DEFAULT_DATASET_VERSION, DEFAULT_PACING_SECS, DEFAULT_QC_VERSION};
use crate::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// CLI arguments for the MIDAS hourly weather downloader
///
/// Downloads UK Met Office MIDAS Open hourly weather observation files
/// from the CEDA archive, validating requested years against each
/// station's capability manifest before any download is attempted.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "midas-downloader",
    version,
    about = "Download UK Met Office MIDAS Open hourly weather observations from CEDA",
    long_about = "Downloads per-station, per-year hourly weather observation files from the \
                  MIDAS Open dataset on the CEDA archive. Requested year ranges are checked \
                  against each station's capability manifest; stations whose declared coverage \
                  does not admit the request are skipped rather than failing the batch."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the MIDAS downloader
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Download hourly observation files for a set of stations
    Download(DownloadArgs),
}

/// Arguments for the download command
#[derive(Debug, Clone, Parser)]
pub struct DownloadArgs {
    /// Historic county the stations belong to (e.g. "staffordshire")
    #[arg(value_name = "COUNTY")]
    pub historic_county: String,

    /// Comma-separated station identifiers (e.g. "00622_keele,00623_oaken")
    #[arg(value_name = "STATIONS")]
    pub station_ids: StationList,

    /// First year to download, inclusive
    #[arg(value_name = "START_YEAR")]
    pub start_year: i32,

    /// Last year to download, inclusive
    #[arg(value_name = "END_YEAR")]
    pub end_year: i32,

    /// Quality control version of the files to download
    #[arg(
        long = "qc-version",
        value_name = "VERSION",
        default_value = DEFAULT_QC_VERSION,
        help = "Quality control version to download"
    )]
    pub qc_version: String,

    /// Directory downloaded files are written to
    ///
    /// Created if it does not exist. Defaults to the current directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output directory for downloaded files"
    )]
    pub output_path: Option<PathBuf>,

    /// Dataset version directory on the archive
    #[arg(
        long = "dataset-version",
        value_name = "VERSION",
        default_value = DEFAULT_DATASET_VERSION,
        help = "Dataset version to download from"
    )]
    pub dataset_version: String,

    /// File holding a CEDA access token
    ///
    /// If not specified, ~/.config/midas-downloader/token is used when it
    /// exists. Without a token, requests are sent unauthenticated.
    #[arg(
        long = "token-file",
        value_name = "FILE",
        help = "File holding a CEDA access token"
    )]
    pub token_file: Option<PathBuf>,

    /// Delay between consecutive downloads, in seconds
    #[arg(
        long = "pacing",
        value_name = "SECS",
        default_value_t = DEFAULT_PACING_SECS,
        help = "Delay between consecutive downloads in seconds"
    )]
    pub pacing_secs: u64,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Wrapper for parsing comma-separated station identifier lists
#[derive(Debug, Clone)]
pub struct StationList {
    pub stations: Vec<String>,
}

impl FromStr for StationList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let stations: Vec<String> = s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if stations.is_empty() {
            return Err(Error::configuration(
                "Station list cannot be empty".to_string(),
            ));
        }

        Ok(StationList { stations })
    }
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .expect("Command should be present when get_command() is called")
    }
}

impl DownloadArgs {
    /// Validate the download command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.start_year > self.end_year {
            return Err(Error::configuration(format!(
                "Start year {} cannot be after end year {}",
                self.start_year, self.end_year
            )));
        }

        if !(1000..=9999).contains(&self.start_year) || !(1000..=9999).contains(&self.end_year) {
            return Err(Error::configuration(
                "Years must be four-digit calendar years".to_string(),
            ));
        }

        if let Some(token_file) = &self.token_file {
            if !token_file.exists() {
                return Err(Error::configuration(format!(
                    "Token file does not exist: {}",
                    token_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Build the batch request described by these arguments
    pub fn to_request(&self) -> DownloadRequest {
        DownloadRequest::new(
            self.historic_county.clone(),
            self.station_ids.stations.clone(),
            self.start_year,
            self.end_year,
            self.qc_version.clone(),
        )
    }

    /// Build the download configuration described by these arguments
    pub fn to_config(&self) -> DownloadConfig {
        let mut config = DownloadConfig::default()
            .with_dataset_version(self.dataset_version.clone())
            .with_pacing(Duration::from_secs(self.pacing_secs));

        if let Some(output_path) = &self.output_path {
            config = config.with_output_dir(output_path.clone());
        }

        match &self.token_file {
            Some(token_file) => config = config.with_token_file(token_file.clone()),
            None => {
                if let Some(token_file) = DownloadConfig::default_token_file() {
                    config = config.with_token_file(token_file);
                }
            }
        }

        config
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn download_args() -> DownloadArgs {
        DownloadArgs {
            historic_county: "staffordshire".to_string(),
            station_ids: StationList {
                stations: vec!["00622_keele".to_string(), "00623_oaken".to_string()],
            },
            start_year: 2021,
            end_year: 2022,
            qc_version: "1".to_string(),
            output_path: None,
            dataset_version: DEFAULT_DATASET_VERSION.to_string(),
            token_file: None,
            pacing_secs: DEFAULT_PACING_SECS,
            verbose: 0,
            quiet: false,
        }
    }

    #[test]
    fn test_station_list_parsing() {
        let result = StationList::from_str("00622_keele").unwrap();
        assert_eq!(result.stations, vec!["00622_keele"]);

        let result = StationList::from_str("00622_keele,00623_oaken").unwrap();
        assert_eq!(result.stations, vec!["00622_keele", "00623_oaken"]);

        let result = StationList::from_str(" 00622_keele , 00623_oaken ").unwrap();
        assert_eq!(result.stations, vec!["00622_keele", "00623_oaken"]);

        assert!(StationList::from_str("").is_err());
        assert!(StationList::from_str(",,,").is_err());
    }

    #[test]
    fn test_download_args_validation() {
        assert!(download_args().validate().is_ok());

        let mut invalid = download_args();
        invalid.start_year = 2023;
        invalid.end_year = 2019;
        assert!(invalid.validate().is_err());

        let mut invalid = download_args();
        invalid.start_year = 22;
        assert!(invalid.validate().is_err());

        let mut invalid = download_args();
        invalid.token_file = Some(PathBuf::from("/nonexistent/token"));
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_to_request() {
        let request = download_args().to_request();
        assert_eq!(request.historic_county, "staffordshire");
        assert_eq!(request.station_ids.len(), 2);
        assert_eq!(request.years().collect::<Vec<_>>(), vec![2021, 2022]);
        assert_eq!(request.qc_version, "1");
    }

    #[test]
    fn test_log_level() {
        let mut args = download_args();
        assert_eq!(args.get_log_level(), "warn");

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");

        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_command_line_parsing() {
        let args = Args::parse_from([
            "midas-downloader",
            "download",
            "staffordshire",
            "00622_keele,00623_oaken",
            "2022",
            "2022",
        ]);

        match args.get_command() {
            Commands::Download(download) => {
                assert_eq!(download.historic_county, "staffordshire");
                assert_eq!(download.station_ids.stations.len(), 2);
                assert_eq!(download.start_year, 2022);
                assert_eq!(download.end_year, 2022);
                assert_eq!(download.qc_version, "1");
            }
        }
    }
}
