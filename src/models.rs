use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::compose::auth::AuthSnapshot;
use crate::compose::form::RequestForm;
use crate::compose::key_value::Mapping;
use crate::constants::DEFAULT_TIMEOUT_MS;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    pub fn parse(s: &str) -> Option<HttpMethod> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "PATCH" => Some(HttpMethod::PATCH),
            "DELETE" => Some(HttpMethod::DELETE),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    pub fn next(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::POST,
            HttpMethod::POST => HttpMethod::PUT,
            HttpMethod::PUT => HttpMethod::PATCH,
            HttpMethod::PATCH => HttpMethod::DELETE,
            HttpMethod::DELETE => HttpMethod::HEAD,
            HttpMethod::HEAD => HttpMethod::OPTIONS,
            HttpMethod::OPTIONS => HttpMethod::GET,
        }
    }

    /// Methods whose query params are written into the URL
    pub fn is_paramless(&self) -> bool {
        matches!(
            self,
            HttpMethod::GET | HttpMethod::HEAD | HttpMethod::DELETE | HttpMethod::OPTIONS
        )
    }
}

/// Transport options forwarded to the relay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestOptions {
    pub timeout_ms: u64,
    pub follow_redirects: bool,
    pub verify_ssl: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            follow_redirects: true,
            verify_ssl: true,
        }
    }
}

/// Canonical, transport-ready request. Built fresh for every send and never
/// modified afterwards, so it only exposes getters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    method: HttpMethod,
    url: String,
    params: Mapping,
    headers: Mapping,
    body: Value,
    auth: AuthSnapshot,
    timeout: u64,
    follow_redirects: bool,
    verify_ssl: bool,
}

impl RequestDescriptor {
    pub(crate) fn new(
        method: HttpMethod,
        url: String,
        params: Mapping,
        headers: Mapping,
        body: Value,
        auth: AuthSnapshot,
        options: RequestOptions,
    ) -> Self {
        RequestDescriptor {
            method,
            url,
            params,
            headers,
            body,
            auth,
            timeout: options.timeout_ms,
            follow_redirects: options.follow_redirects,
            verify_ssl: options.verify_ssl,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &Mapping {
        &self.params
    }

    pub fn headers(&self) -> &Mapping {
        &self.headers
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn auth(&self) -> &AuthSnapshot {
        &self.auth
    }

    pub fn options(&self) -> RequestOptions {
        RequestOptions {
            timeout_ms: self.timeout,
            follow_redirects: self.follow_redirects,
            verify_ssl: self.verify_ssl,
        }
    }

    /// The persisted shape used when a request is stored and edited later
    pub fn to_saved(&self) -> SavedRequest {
        SavedRequest {
            method: Some(self.method.as_str().to_string()),
            url: Some(self.url.clone()),
            timeout: Some(self.timeout),
            follow_redirects: Some(self.follow_redirects),
            verify_ssl: Some(self.verify_ssl),
            auth: Some(self.auth.clone()),
            body: Some(self.body.clone()),
            headers: Some(mapping_to_json(&self.headers)),
            params: Some(mapping_to_json(&self.params)),
        }
    }
}

/// A stored request as it comes back for editing. Every field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedRequest {
    pub method: Option<String>,
    pub url: Option<String>,
    pub timeout: Option<u64>,
    pub follow_redirects: Option<bool>,
    pub verify_ssl: Option<bool>,
    pub auth: Option<AuthSnapshot>,
    pub body: Option<Value>,
    pub headers: Option<Map<String, Value>>,
    pub params: Option<Map<String, Value>>,
}

pub fn mapping_to_json(mapping: &Mapping) -> Map<String, Value> {
    mapping
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// Stored mappings may hold numbers or booleans (`{"page": 1}`); they become text.
pub fn mapping_from_json(map: &Map<String, Value>) -> Mapping {
    map.iter()
        .map(|(k, v)| {
            let text = match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k.clone(), text)
        })
        .collect()
}

/// Payload for saving a request into a collection
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SaveRequest {
    pub name: String,
    pub description: String,
    pub url: String,
    pub method: HttpMethod,
    pub headers: Mapping,
    pub params: Mapping,
    pub body: Value,
    pub auth: AuthSnapshot,
}

/// What the persistence sink returns after a save
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SavedRef {
    #[serde(default)]
    pub id: Option<i64>,
}

/// Response as reported by the relay.
///
/// The payload is loosely typed, so numeric fields of the wrong type read as
/// absent rather than failing the whole record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub status_code: Option<i64>,
    #[serde(rename = "time", default, deserialize_with = "lenient_f64")]
    pub elapsed_ms: Option<f64>,
    #[serde(default)]
    pub headers: Value,
    #[serde(default)]
    pub body: Value,
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_i64()))
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

/// History entry. Keeps the form as typed next to what was actually sent.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub form: RequestForm,
    pub request: RequestDescriptor,
    pub status_code: Option<i64>,
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
