//! Transport backends for the CEDA archive
//!
//! A transport owns the session with the data provider: credential setup,
//! resource path resolution, raw byte transfer, and the pacing delay
//! between successive transfers. The downloader core is polymorphic over
//! this interface; backends substitute at construction time behind
//! `Box<dyn Transport>`.

use crate::constants::{DEFAULT_PACING_SECS, capability_file_name, hourly_file_name};
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub mod http;

pub use http::DapTransport;

/// Session, path resolution, and transfer capability of a data provider
#[async_trait]
pub trait Transport: Send {
    /// Establish the session used by subsequent transfers
    ///
    /// Fails with an authentication error when credential material cannot
    /// be loaded, or a connection error when the session cannot be built.
    async fn initialize_session(&mut self) -> Result<()>;

    /// Tear down the session. Idempotent, never fails.
    async fn release_session(&mut self);

    /// Base path every resource path is resolved against
    fn base_path(&self) -> &str;

    /// Dataset version directory component (e.g. "202308")
    fn dataset_version(&self) -> &str;

    /// Delay enforced between consecutive transfers
    fn pacing(&self) -> Duration {
        Duration::from_secs(DEFAULT_PACING_SECS)
    }

    /// Block until the pacing interval has elapsed
    ///
    /// Runs between every pair of consecutive transfers to respect the
    /// provider's rate limits.
    async fn pace(&self) {
        debug!("Pacing for {:?}", self.pacing());
        tokio::time::sleep(self.pacing()).await;
    }

    /// Resource path of a station's capability manifest
    fn capabilities_path(&self, county: &str, station_id: &str) -> String {
        let dv = self.dataset_version();
        format!(
            "{}/dataset-version-{}/{}/{}/{}",
            self.base_path(),
            dv,
            county,
            station_id,
            capability_file_name(county, station_id, dv)
        )
    }

    /// Resource path of one year of hourly observations for a station
    fn hourly_path(&self, county: &str, station_id: &str, qc_version: &str, year: i32) -> String {
        let dv = self.dataset_version();
        format!(
            "{}/dataset-version-{}/{}/{}/qc-version-{}/{}",
            self.base_path(),
            dv,
            county,
            station_id,
            qc_version,
            hourly_file_name(county, station_id, qc_version, year, dv)
        )
    }

    /// Transfer a resource to local storage, returning the local path
    async fn download(&self, resource: &str) -> Result<PathBuf>;
}
