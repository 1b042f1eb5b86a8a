//! Batch retrieval orchestration
//!
//! Drives one batch of per-station, per-year downloads: validates each
//! station's requested year range against its capability manifest, then
//! walks the admitted years in order, pacing between transfers and
//! isolating per-year failures from the rest of the batch.

use crate::app::models::{
    DownloadRequest, RetrievalReport, SkipReason, StationReport, StationStatus,
};
use crate::app::services::repository::Repository;
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Orchestrates capability-gated batch downloads through a [`Repository`]
pub struct Retriever {
    repository: Repository,
}

impl Retriever {
    /// Create a retriever over the given repository
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Check whether a station's declared coverage admits the requested range
    ///
    /// Fetches the station's capability manifest and compares the request
    /// against the coverage envelope. Returns `None` when the station is
    /// admitted, or the reason it must be skipped. A station whose manifest
    /// cannot be fetched is treated the same as one whose coverage excludes
    /// the request: skipped, never fatal.
    pub async fn validate_year_range(
        &self,
        county: &str,
        station_id: &str,
        start_year: i32,
        end_year: i32,
    ) -> Option<SkipReason> {
        let Some(capabilities) = self.repository.station_capabilities(county, station_id).await
        else {
            return Some(SkipReason::CapabilitiesUnavailable);
        };

        info!("Getting years from station id {}", station_id);
        let coverage = capabilities.coverage_range();
        let Some((first_year, last_year)) = coverage.bounds() else {
            error!("Can not parse station years for station {}", station_id);
            return Some(SkipReason::NoUsableYears);
        };

        if !coverage.contains(start_year, end_year) {
            warn!(
                "Requested years {}-{} are not within the available range {} for station {}",
                start_year, end_year, coverage, station_id
            );
            return Some(SkipReason::OutsideCoverage {
                available: (first_year, last_year),
            });
        }

        None
    }

    /// Run one batch of hourly file downloads
    ///
    /// Stations are processed strictly in input order. The session is
    /// established once before the first station and released exactly once
    /// at the end, on every exit path including session-setup failure and
    /// cancellation. Per-station and per-year failures are recorded in the
    /// report and never abort the batch; only session setup errors
    /// propagate. The pacing delay runs after every per-year attempt,
    /// success or failure, including the last.
    pub async fn download_hourly_files(
        &mut self,
        request: &DownloadRequest,
        cancel: &CancellationToken,
        show_progress: bool,
    ) -> Result<RetrievalReport> {
        let mut report = RetrievalReport::default();

        if let Err(e) = self.repository.initialize().await {
            self.repository.cleanup().await;
            return Err(e);
        }

        let progress = if show_progress {
            let total = (request.station_ids.len() * request.year_count()) as u64;
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        'stations: for station_id in &request.station_ids {
            if cancel.is_cancelled() {
                warn!("Cancellation requested, stopping before station {}", station_id);
                break 'stations;
            }

            if let Some(pb) = &progress {
                pb.set_message(format!("station {}", station_id));
            }

            if let Some(reason) = self
                .validate_year_range(
                    &request.historic_county,
                    station_id,
                    request.start_year,
                    request.end_year,
                )
                .await
            {
                warn!("Skipping station {}: {}", station_id, reason);
                if let Some(pb) = &progress {
                    pb.inc(request.year_count() as u64);
                }
                report.stations.push(StationReport {
                    station_id: station_id.clone(),
                    status: StationStatus::Skipped(reason),
                });
                continue;
            }

            let mut files = 0;
            let mut failed_years = 0;

            for year in request.years() {
                if cancel.is_cancelled() {
                    warn!(
                        "Cancellation requested, stopping station {} before year {}",
                        station_id, year
                    );
                    report.stations.push(StationReport {
                        station_id: station_id.clone(),
                        status: StationStatus::Downloaded {
                            files,
                            failed_years,
                        },
                    });
                    break 'stations;
                }

                match self
                    .repository
                    .download_hourly_file(
                        &request.historic_county,
                        station_id,
                        year,
                        &request.qc_version,
                    )
                    .await
                {
                    Ok(local_path) => {
                        report.files.push(local_path);
                        files += 1;
                    }
                    Err(e) => {
                        error!(
                            "Error downloading year {} for station {}: {}",
                            year, station_id, e
                        );
                        failed_years += 1;
                    }
                }

                if let Some(pb) = &progress {
                    pb.inc(1);
                }

                // Throttle after every attempt, including the final one
                self.repository.pace().await;
            }

            report.stations.push(StationReport {
                station_id: station_id.clone(),
                status: StationStatus::Downloaded {
                    files,
                    failed_years,
                },
            });
        }

        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }

        self.repository.cleanup().await;
        info!("Downloaded {} files.", report.files.len());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::transport::testing::{MockTransport, count_calls, write_capability_fixture};
    use tempfile::TempDir;

    fn request(stations: &[&str], start_year: i32, end_year: i32) -> DownloadRequest {
        DownloadRequest::new(
            "staffordshire",
            stations.iter().map(|s| s.to_string()).collect(),
            start_year,
            end_year,
            "1",
        )
    }

    fn retriever_with_fixture(dir: &TempDir) -> (Retriever, std::sync::Arc<std::sync::Mutex<Vec<String>>>) {
        let fixture = write_capability_fixture(dir.path());
        let (transport, calls) = MockTransport::new(Some(fixture));
        (Retriever::new(Repository::new(Box::new(transport))), calls)
    }

    #[tokio::test]
    async fn test_validate_year_range_within_coverage() {
        let dir = TempDir::new().unwrap();
        let (retriever, _calls) = retriever_with_fixture(&dir);

        let outcome = retriever
            .validate_year_range("staffordshire", "00622_keele", 2021, 2022)
            .await;
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_validate_year_range_outside_coverage() {
        let dir = TempDir::new().unwrap();
        let (retriever, _calls) = retriever_with_fixture(&dir);

        let outcome = retriever
            .validate_year_range("staffordshire", "00622_keele", 2019, 2023)
            .await;
        assert_eq!(
            outcome,
            Some(SkipReason::OutsideCoverage {
                available: (1972, 2022)
            })
        );
    }

    #[tokio::test]
    async fn test_validate_year_range_missing_capabilities() {
        let (mut transport, _calls) = MockTransport::new(None);
        transport.failing.push("_capability.csv".to_string());
        let retriever = Retriever::new(Repository::new(Box::new(transport)));

        let outcome = retriever
            .validate_year_range("staffordshire", "00622_keele", 2021, 2022)
            .await;
        assert_eq!(outcome, Some(SkipReason::CapabilitiesUnavailable));
    }

    #[tokio::test]
    async fn test_batch_downloads_each_station_and_year() {
        let dir = TempDir::new().unwrap();
        let (mut retriever, calls) = retriever_with_fixture(&dir);

        let report = retriever
            .download_hourly_files(
                &request(&["00622_keele", "00623_oaken"], 2022, 2022),
                &CancellationToken::new(),
                false,
            )
            .await
            .unwrap();

        assert_eq!(report.file_count(), 2);
        assert_eq!(count_calls(&calls, "initialize"), 1);
        assert_eq!(count_calls(&calls, "release"), 1);
        assert_eq!(count_calls(&calls, "pace"), 2);

        // Two capability fetches plus two hourly fetches
        assert_eq!(count_calls(&calls, "download:"), 4);

        // Station input order, then ascending year
        assert!(report.files[0].to_string_lossy().contains("00622_keele"));
        assert!(report.files[1].to_string_lossy().contains("00623_oaken"));
    }

    #[tokio::test]
    async fn test_batch_outside_coverage_downloads_nothing() {
        let dir = TempDir::new().unwrap();
        let (mut retriever, calls) = retriever_with_fixture(&dir);

        let report = retriever
            .download_hourly_files(
                &request(&["00622_keele", "00623_oaken"], 2019, 2023),
                &CancellationToken::new(),
                false,
            )
            .await
            .unwrap();

        assert_eq!(report.file_count(), 0);
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(count_calls(&calls, "initialize"), 1);
        assert_eq!(count_calls(&calls, "release"), 1);
        assert_eq!(count_calls(&calls, "pace"), 0);

        // Only the two capability fetches, no hourly downloads
        assert_eq!(count_calls(&calls, "download:"), 2);
    }

    #[tokio::test]
    async fn test_failed_year_does_not_abort_station_or_batch() {
        let dir = TempDir::new().unwrap();
        let fixture = write_capability_fixture(dir.path());
        let (mut transport, calls) = MockTransport::new(Some(fixture));
        transport.failing.push("00622_keele_qcv-1_2021".to_string());
        let mut retriever = Retriever::new(Repository::new(Box::new(transport)));

        let report = retriever
            .download_hourly_files(
                &request(&["00622_keele", "00623_oaken"], 2021, 2022),
                &CancellationToken::new(),
                false,
            )
            .await
            .unwrap();

        // Three of the four years succeed; the failed year is simply absent
        assert_eq!(report.file_count(), 3);
        assert_eq!(report.failed_year_count(), 1);
        assert_eq!(
            report.stations[0].status,
            StationStatus::Downloaded {
                files: 1,
                failed_years: 1
            }
        );

        // Pacing runs after failed attempts too
        assert_eq!(count_calls(&calls, "pace"), 4);
        assert_eq!(count_calls(&calls, "release"), 1);
    }

    #[tokio::test]
    async fn test_skipped_station_does_not_stop_later_stations() {
        let dir = TempDir::new().unwrap();
        let fixture = write_capability_fixture(dir.path());
        let (mut transport, _calls) = MockTransport::new(Some(fixture));
        transport
            .failing
            .push("00622_keele_capability".to_string());
        let mut retriever = Retriever::new(Repository::new(Box::new(transport)));

        let report = retriever
            .download_hourly_files(
                &request(&["00622_keele", "00623_oaken"], 2022, 2022),
                &CancellationToken::new(),
                false,
            )
            .await
            .unwrap();

        assert_eq!(report.file_count(), 1);
        assert_eq!(
            report.stations[0].status,
            StationStatus::Skipped(SkipReason::CapabilitiesUnavailable)
        );
        assert!(report.files[0].to_string_lossy().contains("00623_oaken"));
    }

    #[tokio::test]
    async fn test_session_setup_failure_aborts_after_cleanup() {
        let (mut transport, calls) = MockTransport::new(None);
        transport.fail_init = true;
        let mut retriever = Retriever::new(Repository::new(Box::new(transport)));

        let result = retriever
            .download_hourly_files(
                &request(&["00622_keele"], 2022, 2022),
                &CancellationToken::new(),
                false,
            )
            .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().is_session_error());
        assert_eq!(count_calls(&calls, "release"), 1);
        assert_eq!(count_calls(&calls, "download:"), 0);
    }

    #[tokio::test]
    async fn test_cancellation_releases_session() {
        let dir = TempDir::new().unwrap();
        let (mut retriever, calls) = retriever_with_fixture(&dir);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = retriever
            .download_hourly_files(&request(&["00622_keele"], 2022, 2022), &cancel, false)
            .await
            .unwrap();

        assert_eq!(report.file_count(), 0);
        assert_eq!(count_calls(&calls, "initialize"), 1);
        assert_eq!(count_calls(&calls, "release"), 1);
    }

    #[tokio::test]
    async fn test_rerun_yields_identical_results() {
        let dir = TempDir::new().unwrap();
        let batch = request(&["00622_keele", "00623_oaken"], 2021, 2022);

        let (mut first, _calls) = retriever_with_fixture(&dir);
        let (mut second, _calls) = retriever_with_fixture(&dir);

        let report_a = first
            .download_hourly_files(&batch, &CancellationToken::new(), false)
            .await
            .unwrap();
        let report_b = second
            .download_hourly_files(&batch, &CancellationToken::new(), false)
            .await
            .unwrap();

        assert_eq!(report_a.files, report_b.files);
    }
}
