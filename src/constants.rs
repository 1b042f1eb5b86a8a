//! Application constants for MIDAS downloader
//!
//! This module contains the dataset identifiers, remote path templates,
//! and default values used throughout the MIDAS downloader application.

// =============================================================================
// Dataset Names and Remote Layout
// =============================================================================

/// Dataset served by this downloader
pub const DATASET_NAME: &str = "uk-hourly-weather-obs";

/// File basename prefix shared by every resource in the dataset
pub const FILE_BASENAME: &str = "midas-open_uk-hourly-weather-obs";

/// Default DAP endpoint for the dataset on the CEDA archive
pub const DAP_BASE_URL: &str =
    "https://dap.ceda.ac.uk/badc/ukmo-midas-open/data/uk-hourly-weather-obs";

/// Dataset version published by the Met Office (directory component)
pub const DEFAULT_DATASET_VERSION: &str = "202308";

/// Quality control version requested when none is specified
pub const DEFAULT_QC_VERSION: &str = "1";

/// Delay enforced between consecutive remote transfers, in seconds
pub const DEFAULT_PACING_SECS: u64 = 3;

// =============================================================================
// BADC-CSV Format Constants
// =============================================================================

/// BADC-CSV data section marker
pub const BADC_DATA_SECTION_MARKER: &str = "data";

/// BADC-CSV end section marker
pub const BADC_END_SECTION_MARKER: &str = "end data";

/// Column names in capability manifest data sections
pub mod columns {
    pub const ID: &str = "id";
    pub const ID_TYPE: &str = "id_type";
    pub const MET_DOMAIN_NAME: &str = "met_domain_name";
    pub const FIRST_YEAR: &str = "first_year";
    pub const LAST_YEAR: &str = "last_year";
}

/// All fields a capability row must expose to be usable
pub const CAPABILITY_FIELDS: &[&str] = &[
    columns::ID,
    columns::ID_TYPE,
    columns::MET_DOMAIN_NAME,
    columns::FIRST_YEAR,
    columns::LAST_YEAR,
];

// =============================================================================
// Helper Functions
// =============================================================================

/// File name of a station's capability manifest
pub fn capability_file_name(county: &str, station_id: &str, dataset_version: &str) -> String {
    format!("{FILE_BASENAME}_dv-{dataset_version}_{county}_{station_id}_capability.csv")
}

/// File name of one year of hourly observations for a station
pub fn hourly_file_name(
    county: &str,
    station_id: &str,
    qc_version: &str,
    year: i32,
    dataset_version: &str,
) -> String {
    format!(
        "{FILE_BASENAME}_dv-{dataset_version}_{county}_{station_id}_qcv-{qc_version}_{year}.csv"
    )
}
