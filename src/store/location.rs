use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".composition-manager";
/// JSON file name stored inside the application data directory.
const DATA_FILE_NAME: &str = "compositions.json";

/// Resolve the absolute path to the compositions file inside the user's
/// home. The location is fixed: no command-line flags or environment
/// variables are consulted.
pub fn data_file_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DATA_FILE_NAME))
}
