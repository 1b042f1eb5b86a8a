//! BADC-CSV data section reader
//!
//! MIDAS Open files use the BADC-CSV convention: a header section of
//! metadata records, a `data` marker, a row of column names, the data
//! rows, and an `end data` marker. This module reads the data section of
//! such a file into field-named records, leaving interpretation of the
//! fields to the caller.

use crate::constants::{BADC_DATA_SECTION_MARKER, BADC_END_SECTION_MARKER};
use crate::{Error, Result};
use csv::StringRecord;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Read the data section of a BADC-CSV file into field-named records
///
/// Returns one map per data row, keyed by the column names that follow the
/// `data` marker. Rows shorter than the header contribute only the fields
/// they carry. A file with no data section (including an empty file)
/// yields an empty sequence.
pub fn parse_rows(path: &Path) -> Result<Vec<HashMap<String, String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|e| {
            Error::csv_parsing(
                path.to_string_lossy().to_string(),
                "Failed to open BADC-CSV file".to_string(),
                Some(e),
            )
        })?;

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    let mut in_data_section = false;
    let mut headers: Option<StringRecord> = None;

    while reader.read_record(&mut record).map_err(|e| {
        Error::csv_parsing(
            path.to_string_lossy().to_string(),
            "Failed to read CSV record".to_string(),
            Some(e),
        )
    })? {
        if !in_data_section {
            if record
                .get(0)
                .is_some_and(|val| val.trim() == BADC_DATA_SECTION_MARKER)
            {
                in_data_section = true;
            }
            // Header section records are not data rows
            continue;
        }

        // First record after the data marker names the columns
        if headers.is_none() {
            headers = Some(record.clone());
            continue;
        }

        if record
            .get(0)
            .is_some_and(|val| val.trim() == BADC_END_SECTION_MARKER)
        {
            break;
        }

        if let Some(ref header_record) = headers {
            let mut fields = HashMap::new();
            for (i, value) in record.iter().enumerate() {
                if let Some(header) = header_record.get(i) {
                    fields.insert(header.trim().to_string(), value.trim().to_string());
                }
            }
            rows.push(fields);
        }
    }

    debug!("Read {} data rows from {}", rows.len(), path.display());
    Ok(rows)
}
