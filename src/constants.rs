//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default URL for new requests
pub const DEFAULT_HTTP_URL: &str = "https://httpbin.org/get";

/// Relay used when neither the config file nor the environment names one
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8000";

/// Relay endpoint that performs the outbound call
pub const RELAY_SEND_PATH: &str = "/api/send/";

/// Header carrying the hosting page's CSRF token
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Default per-request timeout forwarded to the relay
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Config directory under the home directory
pub const CONFIG_DIR_NAME: &str = ".probe";

/// Config file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Log file written next to the working directory
pub const LOG_FILE_NAME: &str = "probe.log";

/// Application name
pub const APP_NAME: &str = "Probe TUI";
