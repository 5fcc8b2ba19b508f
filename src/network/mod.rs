//! Network layer - relay calls
//!
//! The Network actor receives dispatch/save commands and sends back outcomes.

pub mod actor;
pub mod client;

pub use actor::NetworkActor;
pub use client::RelayClient;
