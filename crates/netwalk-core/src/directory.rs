//! External phone-directory import (CUCM-style CSV export)
//!
//! The export carries `Description,Device Name,Directory Number 1`
//! columns. Entries are keyed by uppercased device name so they can be
//! joined against discovered phone hostnames.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::endpoint::Phone;

/// One phone-directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub description: String,
    pub directory_number: String,
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Retryable input error: the front-end re-prompts for a path
    #[error("no phone report found at {path}")]
    NotFound { path: PathBuf },
    #[error("phone report is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("failed to read phone report: {0}")]
    Parse(#[from] csv::Error),
}

const DESCRIPTION_COLUMN: &str = "Description";
const DEVICE_NAME_COLUMN: &str = "Device Name";
const DIRECTORY_NUMBER_COLUMN: &str = "Directory Number 1";

/// Read a phone-directory export, keyed by uppercased device name.
pub fn import_directory(path: &Path) -> Result<HashMap<String, DirectoryEntry>, DirectoryError> {
    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(error) => {
            if let csv::ErrorKind::Io(io) = error.kind() {
                if io.kind() == std::io::ErrorKind::NotFound {
                    return Err(DirectoryError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
            }
            return Err(DirectoryError::Parse(error));
        }
    };

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(DirectoryError::MissingColumn(name))
    };
    let description_idx = column(DESCRIPTION_COLUMN)?;
    let device_name_idx = column(DEVICE_NAME_COLUMN)?;
    let directory_number_idx = column(DIRECTORY_NUMBER_COLUMN)?;

    let mut entries = HashMap::new();
    for record in reader.records() {
        let record = record?;
        let device_name = record.get(device_name_idx).unwrap_or("");
        if device_name.is_empty() {
            continue;
        }
        entries.insert(
            device_name.to_uppercase(),
            DirectoryEntry {
                description: record.get(description_idx).unwrap_or("").to_string(),
                directory_number: record.get(directory_number_idx).unwrap_or("").to_string(),
            },
        );
    }

    debug!(entries = entries.len(), path = %path.display(), "phone directory imported");
    Ok(entries)
}

/// Join discovered phones with directory entries by uppercased
/// hostname. Phones without a matching entry are left untouched.
pub fn merge_directory(phones: &mut [Phone], directory: &HashMap<String, DirectoryEntry>) {
    let mut matched = 0usize;
    for phone in phones.iter_mut() {
        if let Some(entry) = directory.get(&phone.hostname.to_uppercase()) {
            phone.directory = Some(entry.clone());
            matched += 1;
        }
    }
    debug!(matched, total = phones.len(), "phone directory merged");
}
