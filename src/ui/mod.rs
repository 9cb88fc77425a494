//! Ratatui front-end for the composition manager. The menu, the modal add
//! and remove flows, and the detail view all live here; the submodules keep
//! widget state (`forms`), the event/draw loop (`terminal`), and layout
//! helpers (`helpers`) apart from the application state machine (`app`).

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
