//! Whole-file load and save of the composition library. The document is a
//! pretty-printed JSON array of composition objects; both operations read or
//! write it in one shot, and a load that cannot produce a usable library
//! falls back to an empty one instead of failing the program.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::library::Library;
use crate::models::Composition;

/// Failure classes a load attempt can hit once the file exists. Kept as a
/// typed enum so the startup report can quote the underlying cause.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read the compositions file: {0}")]
    Read(#[source] io::Error),
    #[error("compositions file is not a valid composition list: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Outcome of a load attempt, surfaced in the status footer at startup.
/// None of the variants is fatal.
#[derive(Debug)]
pub enum LoadReport {
    /// The file existed and parsed; carries the number of entries read.
    Loaded(usize),
    /// No file on disk yet; the session starts with an empty library.
    Missing,
    /// The file existed but was unreadable or malformed; its content was
    /// discarded and the session starts empty.
    Discarded(String),
}

/// Read the library from `path`. A missing file and a broken file both
/// produce an empty library; the report tells the caller which case it was.
pub fn load(path: &Path) -> (Library, LoadReport) {
    if !path.exists() {
        return (Library::new(), LoadReport::Missing);
    }

    match read_library(path) {
        Ok(library) => {
            let count = library.len();
            (library, LoadReport::Loaded(count))
        }
        Err(err) => (Library::new(), LoadReport::Discarded(err.to_string())),
    }
}

fn read_library(path: &Path) -> Result<Library, StoreError> {
    let contents = fs::read_to_string(path).map_err(StoreError::Read)?;
    let compositions: Vec<Composition> =
        serde_json::from_str(&contents).map_err(StoreError::Parse)?;
    Ok(Library::from_compositions(compositions))
}

/// Serialize the full library to `path`, creating the data directory on
/// demand. The write is a direct whole-file rewrite; errors propagate to the
/// caller, which only saves on the exit path.
pub fn save(path: &Path, library: &Library) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let document = serde_json::to_string_pretty(library.compositions())
        .context("failed to serialize the composition library")?;
    fs::write(path, document).context("failed to write the compositions file")?;
    Ok(())
}
