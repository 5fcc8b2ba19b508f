//! Messages exchanged between the UI, App and Network layers.
//!
//! Dispatches and saves carry a request id so the App layer can match
//! outcomes to the send that produced them.

pub mod network;
pub mod render;
pub mod ui_events;

pub use network::{NetworkCommand, NetworkResponse};
pub use render::RenderState;
pub use ui_events::{InputMode, KvColumn, Panel, SaveField, UiEvent};
