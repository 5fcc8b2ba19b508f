//! Request composition - turns editable form state into a `RequestDescriptor`
//!
//! Every function here takes its inputs explicitly and performs no I/O, so
//! the whole layer is testable without a terminal or a relay.

pub mod auth;
pub mod body;
pub mod composer;
pub mod form;
pub mod key_value;

pub use auth::{ApiKeyLocation, AuthField, AuthMode, AuthModel, AuthSnapshot};
pub use body::{BodyMode, BodyModel};
pub use composer::{compose, normalize_url, Composition};
pub use form::{RequestForm, SavePlan};
pub use key_value::{KeyValue, KeyValueSet, Mapping, RowId};
