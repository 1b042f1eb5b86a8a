//! Data models for MIDAS download operations
//!
//! This module contains the core data structures for representing station
//! capability manifests, coverage envelopes, and the outcome of a batch
//! retrieval, following the UK Met Office MIDAS Open dataset layout.

use crate::constants::columns;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use tracing::warn;

// =============================================================================
// Station Capability Structures
// =============================================================================

/// One row of a station capability manifest
///
/// Each row describes the first and last year of data recorded for one
/// identifier within one observation domain. Year fields are kept as text
/// at ingestion; they are parsed to integers only when coverage is queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationCapability {
    /// Identifier associated with a particular report type for this station
    pub id: String,

    /// Identifier type (e.g. "DCNN")
    pub id_type: String,

    /// Observation domain name (e.g. "AWSHRLY")
    pub met_domain_name: String,

    /// First year of data for this identifier, as recorded in the manifest
    pub first_year: String,

    /// Last year of data for this identifier, as recorded in the manifest
    pub last_year: String,
}

impl StationCapability {
    /// Composite key identifying this entry within one manifest
    pub fn composite_key(&self) -> String {
        format!("{}_{}_{}", self.id, self.id_type, self.met_domain_name)
    }

    /// Parse the year bounds of this entry
    ///
    /// Year fields arrive as text and are only interpreted here, at the
    /// point of use. A present-but-non-numeric year is surfaced as
    /// [`Error::MalformedCoverage`].
    pub fn year_range(&self) -> Result<(i32, i32)> {
        let first: i32 = self.first_year.trim().parse().map_err(|_| {
            Error::malformed_coverage(self.composite_key(), columns::FIRST_YEAR, &self.first_year)
        })?;
        let last: i32 = self.last_year.trim().parse().map_err(|_| {
            Error::malformed_coverage(self.composite_key(), columns::LAST_YEAR, &self.last_year)
        })?;
        Ok((first, last))
    }
}

/// The full parsed capability manifest for one station
///
/// Entries are keyed by the composite of (id, id_type, met_domain_name).
/// Inserting an entry under an existing key overwrites it: manifests list
/// one row per identifier period and a repeated key means the later row
/// supersedes the earlier one.
#[derive(Debug, Clone, Default)]
pub struct StationCapabilities {
    entries: HashMap<String, StationCapability>,
}

impl StationCapabilities {
    /// Create an empty capability mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a capability entry, overwriting any entry with the same key
    pub fn insert(&mut self, capability: StationCapability) {
        self.entries.insert(capability.composite_key(), capability);
    }

    /// Look up an entry by its composite key
    pub fn get(&self, key: &str) -> Option<&StationCapability> {
        self.entries.get(key)
    }

    /// Number of distinct capability entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest contained no usable rows
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the capability entries (arbitrary order)
    pub fn iter(&self) -> impl Iterator<Item = &StationCapability> {
        self.entries.values()
    }

    /// Aggregate the coverage envelope across all entries
    ///
    /// Returns the minimum first year and maximum last year declared by any
    /// entry. Entries whose year fields do not parse are logged and skipped;
    /// they contribute nothing to the envelope. An empty mapping, or one
    /// with no numeric year pairs, yields [`CoverageRange::NONE`].
    pub fn coverage_range(&self) -> CoverageRange {
        let mut bounds: Option<(i32, i32)> = None;

        for capability in self.entries.values() {
            match capability.year_range() {
                Ok((first, last)) => {
                    bounds = Some(match bounds {
                        Some((min_first, max_last)) => (min_first.min(first), max_last.max(last)),
                        None => (first, last),
                    });
                }
                Err(e) => {
                    warn!("Skipping capability entry with unusable years: {}", e);
                }
            }
        }

        match bounds {
            Some((first, last)) => CoverageRange::new(first, last),
            None => CoverageRange::NONE,
        }
    }
}

/// Coverage envelope derived from a station's capability manifest
///
/// The union of declared first/last years across all manifest entries.
/// This is an envelope, not a guarantee that every year inside it has
/// data. A station with no usable entries has [`CoverageRange::NONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageRange {
    bounds: Option<(i32, i32)>,
}

impl CoverageRange {
    /// Sentinel for a station with no declared coverage
    pub const NONE: CoverageRange = CoverageRange { bounds: None };

    /// Create a coverage envelope from aggregated year bounds
    pub fn new(first_year: i32, last_year: i32) -> Self {
        Self {
            bounds: Some((first_year, last_year)),
        }
    }

    /// The (first_year, last_year) bounds, if any coverage is declared
    pub fn bounds(&self) -> Option<(i32, i32)> {
        self.bounds
    }

    /// Whether the station declares no usable coverage
    pub fn is_none(&self) -> bool {
        self.bounds.is_none()
    }

    /// Whether the requested year range is fully contained in the envelope
    ///
    /// Always false when no coverage is declared.
    pub fn contains(&self, start_year: i32, end_year: i32) -> bool {
        match self.bounds {
            Some((first, last)) => start_year >= first && end_year <= last,
            None => false,
        }
    }
}

impl fmt::Display for CoverageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds {
            Some((first, last)) => write!(f, "{}-{}", first, last),
            None => write!(f, "no coverage"),
        }
    }
}

// =============================================================================
// Batch Request and Result Structures
// =============================================================================

/// One batch of per-station, per-year downloads
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Historic county the stations belong to (directory component)
    pub historic_county: String,

    /// Stations to download, processed strictly in this order
    pub station_ids: Vec<String>,

    /// First requested year, inclusive
    pub start_year: i32,

    /// Last requested year, inclusive
    pub end_year: i32,

    /// Quality control version label (e.g. "1")
    pub qc_version: String,
}

impl DownloadRequest {
    /// Create a new batch request
    pub fn new(
        historic_county: impl Into<String>,
        station_ids: Vec<String>,
        start_year: i32,
        end_year: i32,
        qc_version: impl Into<String>,
    ) -> Self {
        Self {
            historic_county: historic_county.into(),
            station_ids,
            start_year,
            end_year,
            qc_version: qc_version.into(),
        }
    }

    /// The requested years in ascending order, inclusive of both bounds
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }

    /// Number of years requested per station
    pub fn year_count(&self) -> usize {
        if self.end_year < self.start_year {
            0
        } else {
            (self.end_year - self.start_year + 1) as usize
        }
    }
}

/// Why a station was excluded from downloading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The capability manifest could not be fetched or interpreted
    CapabilitiesUnavailable,

    /// The manifest contained no entries with usable year bounds
    NoUsableYears,

    /// The requested range is not fully contained in the declared coverage
    OutsideCoverage { available: (i32, i32) },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::CapabilitiesUnavailable => {
                write!(f, "station capabilities are unavailable")
            }
            SkipReason::NoUsableYears => write!(f, "no usable years in station capabilities"),
            SkipReason::OutsideCoverage {
                available: (first, last),
            } => write!(
                f,
                "requested years are not within the available range {}-{}",
                first, last
            ),
        }
    }
}

/// Outcome of processing one station in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationStatus {
    /// The station passed validation and its years were attempted
    Downloaded { files: usize, failed_years: usize },

    /// The station was excluded before any download was attempted
    Skipped(SkipReason),
}

/// Per-station record in a batch report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationReport {
    pub station_id: String,
    pub status: StationStatus,
}

/// Result of one batch retrieval
///
/// `files` holds the successfully obtained local paths in download order:
/// station input order, then ascending year. A year that failed is simply
/// absent. `stations` records the per-station outcome, making the skip
/// policy inspectable.
#[derive(Debug, Clone, Default)]
pub struct RetrievalReport {
    pub files: Vec<PathBuf>,
    pub stations: Vec<StationReport>,
}

impl RetrievalReport {
    /// Number of files successfully downloaded
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of stations skipped before any download
    pub fn skipped_count(&self) -> usize {
        self.stations
            .iter()
            .filter(|s| matches!(s.status, StationStatus::Skipped(_)))
            .count()
    }

    /// Number of per-year download failures across the batch
    pub fn failed_year_count(&self) -> usize {
        self.stations
            .iter()
            .map(|s| match s.status {
                StationStatus::Downloaded { failed_years, .. } => failed_years,
                StationStatus::Skipped(_) => 0,
            })
            .sum()
    }
}
