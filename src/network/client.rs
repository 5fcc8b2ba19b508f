//! Relay client - posts descriptors to the relay and classifies what comes back

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::constants::{CSRF_HEADER, RELAY_SEND_PATH};
use crate::error::DispatchError;
use crate::models::{RequestDescriptor, ResponseRecord, SaveRequest, SavedRef};

/// Talks to the relay's two endpoints. Cheap to clone.
#[derive(Clone, Debug)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl RelayClient {
    pub fn new(config: &Config) -> Self {
        RelayClient {
            http: create_client(config.timeout_ms),
            base_url: config.relay_url.trim_end_matches('/').to_string(),
            csrf_token: config
                .csrf_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request through the relay. One attempt, no retry.
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<ResponseRecord, DispatchError> {
        tracing::info!(
            method = descriptor.method().as_str(),
            url = descriptor.url(),
            "Dispatching through relay"
        );
        self.post_json(RELAY_SEND_PATH, descriptor).await
    }

    /// Save a request into a collection
    pub async fn save(&self, collection_id: u64, payload: &SaveRequest) -> Result<SavedRef, DispatchError> {
        let path = format!("/collections/{}/requests/new/", collection_id);
        tracing::info!(collection_id, name = %payload.name, "Saving request");
        self.post_json(&path, payload).await
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, DispatchError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        // no token, no call
        let token = self
            .csrf_token
            .as_deref()
            .ok_or(DispatchError::MissingCsrfToken)?;

        let url = format!("{}{}", self.base_url, path);
        let result = self
            .http
            .post(&url)
            .header(CSRF_HEADER, token)
            .json(body)
            .send()
            .await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => return Err(DispatchError::Network(describe_transport_error(&e))),
        };

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), %url, "Relay returned an error status");
            return Err(DispatchError::Relay {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| DispatchError::Network(format!("Error reading body: {}", e)))?;
        serde_json::from_str(&text).map_err(|e| DispatchError::MalformedResponse(e.to_string()))
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timed out".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        format!("Request failed: {}", e)
    }
}

/// Create an HTTP client with the configured timeout
pub fn create_client(timeout_ms: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::RequestForm;

    #[tokio::test]
    async fn test_missing_token_fails_before_any_io() {
        // Port 9 (discard) is never contacted: the precondition fails first.
        let config = Config {
            relay_url: "http://127.0.0.1:9".into(),
            csrf_token: Some("   ".into()),
            ..Config::default()
        };
        let client = RelayClient::new(&config);
        let descriptor = RequestForm::default().compose().unwrap().descriptor;

        let err = client.send(&descriptor).await.unwrap_err();
        assert_eq!(err, DispatchError::MissingCsrfToken);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = Config {
            relay_url: "http://relay.local/".into(),
            ..Config::default()
        };
        assert_eq!(RelayClient::new(&config).base_url(), "http://relay.local");
    }
}
