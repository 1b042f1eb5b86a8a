//! Capability manifest parsing
//!
//! Turns the data rows of a station capability manifest into a
//! [`StationCapabilities`] mapping keyed by (id, id_type, met_domain_name).
//! Rows are ingested as text; year bounds are interpreted later, when the
//! coverage envelope is queried.

use crate::app::models::{StationCapabilities, StationCapability};
use crate::app::services::badc_csv;
use crate::constants::columns;
use crate::Result;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Parse a station capability manifest file
///
/// Reads the BADC-CSV data section and builds the capability mapping.
/// Errors only when the file itself cannot be read or decoded; an empty
/// data section yields an empty mapping.
pub fn parse_station_capabilities(path: &Path) -> Result<StationCapabilities> {
    let rows = badc_csv::parse_rows(path)?;
    let capabilities = capabilities_from_rows(&rows);
    debug!(
        "Parsed {} capability entries from {}",
        capabilities.len(),
        path.display()
    );
    Ok(capabilities)
}

/// Build the capability mapping from field-named manifest rows
///
/// Each row must expose `id`, `id_type`, `met_domain_name`, `first_year`
/// and `last_year`. Rows missing any of those fields are dropped with a
/// warning. Duplicate composite keys overwrite: the last row wins.
pub fn capabilities_from_rows(rows: &[HashMap<String, String>]) -> StationCapabilities {
    let mut capabilities = StationCapabilities::new();

    for row in rows {
        match capability_from_row(row) {
            Some(capability) => capabilities.insert(capability),
            None => {
                warn!("Dropping capability row with missing fields: {:?}", row);
            }
        }
    }

    capabilities
}

fn capability_from_row(row: &HashMap<String, String>) -> Option<StationCapability> {
    Some(StationCapability {
        id: row.get(columns::ID)?.clone(),
        id_type: row.get(columns::ID_TYPE)?.clone(),
        met_domain_name: row.get(columns::MET_DOMAIN_NAME)?.clone(),
        first_year: row.get(columns::FIRST_YEAR)?.clone(),
        last_year: row.get(columns::LAST_YEAR)?.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::CoverageRange;
    use std::fs;
    use tempfile::TempDir;

    fn row(id: &str, domain: &str, first: &str, last: &str) -> HashMap<String, String> {
        HashMap::from([
            ("id".to_string(), id.to_string()),
            ("id_type".to_string(), "DCNN".to_string()),
            ("met_domain_name".to_string(), domain.to_string()),
            ("first_year".to_string(), first.to_string()),
            ("last_year".to_string(), last.to_string()),
        ])
    }

    #[test]
    fn test_unique_rows_yield_one_entry_each() {
        let rows = vec![
            row("4617", "DLY3208", "1972", "2006"),
            row("4617", "AWSHRLY", "2006", "2022"),
        ];

        let capabilities = capabilities_from_rows(&rows);
        assert_eq!(capabilities.len(), 2);

        let entry = capabilities.get("4617_DCNN_DLY3208").unwrap();
        assert_eq!(entry.first_year, "1972");
        assert_eq!(entry.last_year, "2006");
    }

    #[test]
    fn test_duplicate_keys_last_row_wins() {
        let rows = vec![
            row("4617", "DLY3208", "1972", "2006"),
            row("4617", "DLY3208", "1990", "2010"),
        ];

        let capabilities = capabilities_from_rows(&rows);
        assert_eq!(capabilities.len(), 1);
        assert_eq!(
            capabilities.get("4617_DCNN_DLY3208").unwrap().first_year,
            "1990"
        );
    }

    #[test]
    fn test_empty_rows_yield_empty_mapping() {
        let capabilities = capabilities_from_rows(&[]);
        assert!(capabilities.is_empty());
        assert_eq!(capabilities.coverage_range(), CoverageRange::NONE);
    }

    #[test]
    fn test_rows_missing_fields_are_dropped() {
        let mut partial = row("4617", "DLY3208", "1972", "2006");
        partial.remove("last_year");

        let rows = vec![partial, row("4617", "AWSHRLY", "2006", "2022")];
        let capabilities = capabilities_from_rows(&rows);

        assert_eq!(capabilities.len(), 1);
        assert!(capabilities.get("4617_DCNN_AWSHRLY").is_some());
    }

    #[test]
    fn test_parse_station_capabilities_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("capability.csv");
        fs::write(
            &path,
            "Conventions,G,BADC-CSV,1\n\
             observation_station,G,keele\n\
             data\n\
             id,id_type,met_domain_name,first_year,last_year\n\
             4617,DCNN,DLY3208,1972,2006\n\
             4617,DCNN,AWSHRLY,2006,2022\n\
             end data\n",
        )
        .unwrap();

        let capabilities = parse_station_capabilities(&path).unwrap();
        assert_eq!(capabilities.len(), 2);
        assert_eq!(capabilities.coverage_range(), CoverageRange::new(1972, 2022));
    }

    #[test]
    fn test_parse_station_capabilities_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        let capabilities = parse_station_capabilities(&path).unwrap();
        assert!(capabilities.is_empty());
    }
}
