//! Network messages - communication between App and Network layers

use crate::error::DispatchError;
use crate::models::{RequestDescriptor, ResponseRecord, SaveRequest, SavedRef};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Send a composed request through the relay
    Dispatch {
        id: u64,
        descriptor: RequestDescriptor,
    },
    /// Save a request into a collection
    Save {
        id: u64,
        collection_id: u64,
        payload: SaveRequest,
    },
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// The relay answered with a result payload
    Completed {
        id: u64,
        record: ResponseRecord,
    },
    /// The relay could not be reached or failed itself
    Failed {
        id: u64,
        error: DispatchError,
    },
    /// A save went through
    Saved {
        id: u64,
        saved: SavedRef,
    },
    /// A save was rejected
    SaveFailed {
        id: u64,
        error: DispatchError,
    },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Completed { id, .. } => *id,
            NetworkResponse::Failed { id, .. } => *id,
            NetworkResponse::Saved { id, .. } => *id,
            NetworkResponse::SaveFailed { id, .. } => *id,
        }
    }
}
