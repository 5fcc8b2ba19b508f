//! App layer - owns the form and response state
//!
//! The App actor turns UI events into form edits and relay commands, and
//! decides which relay outcome reaches the screen.

pub mod actor;
pub mod commands;
pub mod state;

pub use actor::AppActor;
pub use state::{AppState, PendingSend, SaveDraft};
