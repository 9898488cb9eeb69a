//! Command-line adapter over the note workspace.
mod app;
mod main;

pub use app::*;
pub use main::*;
