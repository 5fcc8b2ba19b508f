//! Network actor - runs relay calls in the Tokio runtime

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::RelayClient;

/// Network actor that turns commands into relay calls.
///
/// Every dispatch gets its own task; a second send does not wait for,
/// queue behind, or cancel the first.
pub struct NetworkActor {
    client: RelayClient,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(client: RelayClient, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            client,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Dispatch { id, descriptor }) => {
                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();

                            self.active_requests.spawn(async move {
                                let response = match client.send(&descriptor).await {
                                    Ok(record) => {
                                        tracing::info!(id, status = ?record.status_code, "Relay call completed");
                                        NetworkResponse::Completed { id, record }
                                    }
                                    Err(error) => {
                                        tracing::warn!(id, %error, "Relay call failed");
                                        NetworkResponse::Failed { id, error }
                                    }
                                };
                                let _ = response_tx.send(response);
                            });
                        }

                        Some(NetworkCommand::Save { id, collection_id, payload }) => {
                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();

                            self.active_requests.spawn(async move {
                                let response = match client.save(collection_id, &payload).await {
                                    Ok(saved) => NetworkResponse::Saved { id, saved },
                                    Err(error) => {
                                        tracing::warn!(id, collection_id, %error, "Save failed");
                                        NetworkResponse::SaveFailed { id, error }
                                    }
                                };
                                let _ = response_tx.send(response);
                            });
                        }

                        Some(NetworkCommand::Shutdown) | None => {
                            self.active_requests.abort_all();
                            break;
                        }
                    }
                }

                // Reap finished tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }
}
