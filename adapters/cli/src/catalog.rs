#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt, fs, path::Path};

use gem_hunter_system_bonus_spawning::CatalogEntry;

/// Loads a bonus-shape catalog from a JSON file.
pub(crate) fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let contents = fs::read_to_string(path).map_err(CatalogError::Unreadable)?;
    parse_catalog(&contents)
}

/// Parses a bonus-shape catalog from its JSON representation.
pub(crate) fn parse_catalog(contents: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    let entries: Vec<CatalogEntry> =
        serde_json::from_str(contents).map_err(CatalogError::Invalid)?;
    if entries.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(entries)
}

/// Errors that can occur while loading a bonus-shape catalog file.
#[derive(Debug)]
pub(crate) enum CatalogError {
    /// The catalog file could not be read.
    Unreadable(std::io::Error),
    /// The catalog contents could not be parsed.
    Invalid(serde_json::Error),
    /// The catalog parsed successfully but contains no entries.
    Empty,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(error) => write!(f, "could not read catalog file: {error}"),
            Self::Invalid(error) => write!(f, "could not parse catalog contents: {error}"),
            Self::Empty => write!(f, "catalog contains no entries"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreadable(error) => Some(error),
            Self::Invalid(error) => Some(error),
            Self::Empty => None,
        }
    }
}
