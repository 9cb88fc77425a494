//! Core library surface for the composition manager TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces: the domain model, the in-memory collection, the JSON store, and
//! the interactive front-end.

pub mod library;
pub mod models;
pub mod store;
pub mod ui;

/// The in-memory collection and its sort keys.
pub use library::{Library, SortKey};

/// The primary domain type other layers manipulate.
pub use models::Composition;

/// Convenience re-exports for the persistence layer, typically used by
/// `main.rs` to locate, load, and save the compositions file.
pub use store::{data_file_path, load, save, LoadReport};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
