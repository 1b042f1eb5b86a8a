//! Configuration for download sessions.
//!
//! Provides the configuration structure shared by the transport layer and
//! the CLI: remote endpoint, dataset version, output location, credential
//! material, and the pacing interval between transfers.

use crate::constants::{DAP_BASE_URL, DEFAULT_DATASET_VERSION, DEFAULT_PACING_SECS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a download session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Base URL of the dataset on the remote archive
    pub base_url: String,

    /// Dataset version directory component (e.g. "202308")
    pub dataset_version: String,

    /// Directory downloaded files are written to
    pub output_dir: PathBuf,

    /// Optional file holding a CEDA access token, read at session setup
    pub token_file: Option<PathBuf>,

    /// Delay enforced between consecutive remote transfers
    pub pacing: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_url: DAP_BASE_URL.to_string(),
            dataset_version: DEFAULT_DATASET_VERSION.to_string(),
            output_dir: PathBuf::from("."),
            token_file: None,
            pacing: Duration::from_secs(DEFAULT_PACING_SECS),
        }
    }
}

impl DownloadConfig {
    /// Set the base URL of the remote archive
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the dataset version directory component
    pub fn with_dataset_version(mut self, dataset_version: impl Into<String>) -> Self {
        self.dataset_version = dataset_version.into();
        self
    }

    /// Set the directory downloaded files are written to
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Set the file holding the CEDA access token
    pub fn with_token_file(mut self, token_file: impl Into<PathBuf>) -> Self {
        self.token_file = Some(token_file.into());
        self
    }

    /// Set the pacing interval between transfers
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Default token file location (`~/.config/midas-downloader/token`),
    /// used only when it exists on disk
    pub fn default_token_file() -> Option<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("midas-downloader").join("token"))
            .filter(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloadConfig::default();
        assert_eq!(config.base_url, DAP_BASE_URL);
        assert_eq!(config.dataset_version, "202308");
        assert_eq!(config.pacing, Duration::from_secs(3));
        assert!(config.token_file.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let config = DownloadConfig::default()
            .with_base_url("https://example.org/midas")
            .with_dataset_version("202407")
            .with_output_dir("/tmp/midas")
            .with_pacing(Duration::from_millis(10));

        assert_eq!(config.base_url, "https://example.org/midas");
        assert_eq!(config.dataset_version, "202407");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/midas"));
        assert_eq!(config.pacing, Duration::from_millis(10));
    }
}
