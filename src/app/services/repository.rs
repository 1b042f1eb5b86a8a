//! Capability cache accessor
//!
//! Binds one station's capability manifest fetch + parse behind a simple
//! query surface and proxies session lifecycle and per-file downloads to
//! the transport, isolating transport failures from the orchestrator.

use crate::app::models::StationCapabilities;
use crate::app::services::capability_parser;
use crate::app::transport::Transport;
use crate::Result;
use std::path::PathBuf;
use tracing::{error, info};

/// Query surface over a transport for capability manifests and hourly files
pub struct Repository {
    transport: Box<dyn Transport>,
}

impl Repository {
    /// Create a repository over the given transport backend
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Establish the transport session. Must run before any fetch.
    pub async fn initialize(&mut self) -> Result<()> {
        self.transport.initialize_session().await
    }

    /// Release the transport session. Idempotent, never fails.
    pub async fn cleanup(&mut self) {
        self.transport.release_session().await;
    }

    /// Block for the pacing interval between transfers
    pub async fn pace(&self) {
        self.transport.pace().await;
    }

    /// Fetch and parse a station's capability manifest
    ///
    /// A manifest that cannot be downloaded or interpreted is a
    /// recoverable, expected outcome (the station may simply be absent
    /// from this dataset version): the failure is logged and `None` is
    /// returned.
    pub async fn station_capabilities(
        &self,
        county: &str,
        station_id: &str,
    ) -> Option<StationCapabilities> {
        let resource = self.transport.capabilities_path(county, station_id);
        info!("Downloading station capabilities file: {}", resource);

        let local_path = match self.transport.download(&resource).await {
            Ok(path) => path,
            Err(e) => {
                error!(
                    "Error downloading station capabilities file: {}. Error: {}",
                    resource, e
                );
                return None;
            }
        };
        info!(
            "Downloaded station capabilities file: {}",
            local_path.display()
        );

        match capability_parser::parse_station_capabilities(&local_path) {
            Ok(capabilities) => Some(capabilities),
            Err(e) => {
                error!(
                    "Error parsing station capabilities file: {}. Error: {}",
                    local_path.display(),
                    e
                );
                None
            }
        }
    }

    /// Download one year of hourly observations for a station
    ///
    /// Unlike the manifest fetch, a failure here propagates: the caller
    /// has already validated coverage and decides how to treat it.
    pub async fn download_hourly_file(
        &self,
        county: &str,
        station_id: &str,
        year: i32,
        qc_version: &str,
    ) -> Result<PathBuf> {
        let resource = self
            .transport
            .hourly_path(county, station_id, qc_version, year);
        info!("Downloading file: {}", resource);

        let local_path = self.transport.download(&resource).await?;
        info!("Downloaded file: {}", local_path.display());
        Ok(local_path)
    }
}
