//! Persistence module split across logical submodules.

mod file;
mod location;

pub use file::{load, save, LoadReport, StoreError};
pub use location::data_file_path;
