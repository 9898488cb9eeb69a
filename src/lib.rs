//! Local note-taking library
//!
//! This library provides a note collection with bounded per-note version
//! history, keyed-record persistence, and incremental word completion built
//! from everything the user has typed.

mod cli;
mod config;
mod debounce;
mod errors;
mod helper;
mod note;
mod session;
mod storage;
mod store;
mod suggest;
mod suggestion_state;
mod time_serde;
mod types;
mod workspace;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use debounce::*;
pub use errors::*;
pub use helper::*;
pub use note::*;
pub use session::*;
pub use storage::*;
pub use store::*;
pub use suggest::*;
pub use suggestion_state::*;
pub use types::*;
pub use workspace::*;
