//! # Probe TUI
//!
//! A terminal request composer that sends every request through a
//! ProbeFlex-style relay and inspects the result.
//!
//! ## Features
//! - HTTP methods: GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS
//! - Query params, headers and form bodies as editable key/value rows
//! - Auth: Basic, Bearer, API key (header or query)
//! - Body modes: none, JSON, form, raw
//! - Request history and saving to relay collections
//! - JSON syntax highlighting with status-colored responses
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod compose;
pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod storage;
pub mod ui;
pub mod view;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use compose::{compose, Composition, RequestForm};
pub use config::Config;
pub use error::{ComposeError, ConfigError, DispatchError};
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{HttpMethod, RequestDescriptor, RequestOptions, ResponseRecord};
pub use network::{NetworkActor, RelayClient};
pub use view::{classify, ResponseView};
