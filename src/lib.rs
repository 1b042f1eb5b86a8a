//! MIDAS Downloader Library
//!
//! A Rust library for downloading UK Met Office MIDAS Open hourly weather
//! observation files from the CEDA archive.
//!
//! This library provides tools for:
//! - Fetching and parsing per-station capability manifests (BADC-CSV)
//! - Validating requested year ranges against each station's declared coverage
//! - Driving paced, fault-tolerant per-year downloads across multiple stations
//! - Swappable transport backends behind a single session/download interface
//! - Comprehensive error handling and recovery

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod transport;
    pub mod services {
        pub mod badc_csv;
        pub mod capability_parser;
        pub mod repository;
        pub mod retriever;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CoverageRange, DownloadRequest, RetrievalReport, StationCapabilities};
pub use app::services::repository::Repository;
pub use app::services::retriever::Retriever;
pub use app::transport::Transport;
pub use config::DownloadConfig;

/// Result type alias for the MIDAS downloader
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for MIDAS download operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Credential material could not be loaded during session setup
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Session could not be established or is not available
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// A resource transfer failed (auth, network, not-found, local write)
    #[error("Download error for '{resource}': {message}")]
    Download { resource: String, message: String },

    /// A downloaded manifest could not be interpreted
    #[error("Manifest error in file '{file}': {message}")]
    Manifest { file: String, message: String },

    /// A capability entry carries a non-numeric year field
    #[error("Malformed coverage for entry '{key}': {field} = '{value}' is not a year")]
    MalformedCoverage {
        key: String,
        field: String,
        value: String,
    },

    /// CSV parsing error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a connection error with an optional transport-level cause
    pub fn connection(message: impl Into<String>, source: Option<reqwest::Error>) -> Self {
        Self::Connection {
            message: message.into(),
            source,
        }
    }

    /// Create a download error for a specific resource
    pub fn download(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create a manifest error
    pub fn manifest(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Manifest {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a malformed coverage error
    pub fn malformed_coverage(
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::MalformedCoverage {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error is fatal to a whole batch (session setup failures)
    pub fn is_session_error(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Connection { .. })
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}
