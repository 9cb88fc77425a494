//! Binary entry point that glues the JSON-backed composition library to the
//! TUI: resolve the data file, load whatever is on disk (tolerating a missing
//! or broken file), drive the event loop until the user exits, then write the
//! whole collection back out.
use composition_manager::{data_file_path, load, run_app, save, App};

/// Load the library, launch the event loop, and persist on the way out.
///
/// Load problems are absorbed into the startup status message, so the only
/// errors that bubble out of `main` are terminal setup failures and a save
/// failure on the exit path.
fn main() -> anyhow::Result<()> {
    let data_path = data_file_path()?;
    let (library, load_report) = load(&data_path);

    let mut app = App::new(library, &load_report);
    run_app(&mut app)?;

    save(&data_path, app.library())
}
