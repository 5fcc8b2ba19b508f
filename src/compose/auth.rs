//! Authentication configuration and its header/param projection

use serde::{Deserialize, Serialize};

use crate::compose::key_value::Mapping;

/// Which auth variant is active
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    None,
    Basic,
    Bearer,
    #[serde(rename = "apikey")]
    ApiKey,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::None => "None",
            AuthMode::Basic => "Basic",
            AuthMode::Bearer => "Bearer",
            AuthMode::ApiKey => "API Key",
        }
    }

    pub fn next(&self) -> AuthMode {
        match self {
            AuthMode::None => AuthMode::Basic,
            AuthMode::Basic => AuthMode::Bearer,
            AuthMode::Bearer => AuthMode::ApiKey,
            AuthMode::ApiKey => AuthMode::None,
        }
    }
}

/// Where an API key is sent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

impl ApiKeyLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Query => "query",
        }
    }

    pub fn toggle(&self) -> ApiKeyLocation {
        match self {
            ApiKeyLocation::Header => ApiKeyLocation::Query,
            ApiKeyLocation::Query => ApiKeyLocation::Header,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApiKeyAuth {
    pub key: String,
    pub value: String,
    pub location: ApiKeyLocation,
}

/// Editable text fields of the auth section
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Password,
    Token,
    KeyName,
    KeyValue,
}

/// Auth state as sent to the relay and persisted with saved requests.
///
/// Only the active variant is represented. Deserialization accepts partial
/// or untyped objects and treats them as `None`.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", from = "RawAuth")]
pub enum AuthSnapshot {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer {
        token: String,
    },
    #[serde(rename = "apikey")]
    ApiKey {
        key: String,
        value: String,
        location: ApiKeyLocation,
    },
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawAuth {
    #[serde(rename = "type")]
    kind: Option<String>,
    username: Option<String>,
    password: Option<String>,
    token: Option<String>,
    key: Option<String>,
    value: Option<String>,
    location: Option<String>,
}

impl From<RawAuth> for AuthSnapshot {
    fn from(raw: RawAuth) -> Self {
        match raw.kind.as_deref() {
            Some("basic") => AuthSnapshot::Basic {
                username: raw.username.unwrap_or_default(),
                password: raw.password.unwrap_or_default(),
            },
            Some("bearer") => AuthSnapshot::Bearer {
                token: raw.token.unwrap_or_default(),
            },
            Some("apikey") => AuthSnapshot::ApiKey {
                key: raw.key.unwrap_or_default(),
                value: raw.value.unwrap_or_default(),
                location: match raw.location.as_deref() {
                    Some("query") => ApiKeyLocation::Query,
                    _ => ApiKeyLocation::Header,
                },
            },
            _ => AuthSnapshot::None,
        }
    }
}

/// Mutually-exclusive auth configuration.
///
/// Every variant keeps its own fields, so switching away and back restores
/// what the user typed. Only the active mode contributes to a request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthModel {
    mode: AuthMode,
    pub basic: BasicCredentials,
    pub bearer_token: String,
    pub api_key: ApiKeyAuth,
}

impl AuthModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
    }

    /// Headers contributed by the active variant.
    ///
    /// Basic auth contributes nothing here; the relay encodes it from the
    /// credentials carried in the snapshot.
    pub fn project_headers(&self) -> Mapping {
        let mut headers = Mapping::new();
        match self.mode {
            AuthMode::Bearer if !self.bearer_token.is_empty() => {
                headers.insert(
                    "Authorization".to_string(),
                    format!("Bearer {}", self.bearer_token),
                );
            }
            AuthMode::ApiKey if self.api_key.location == ApiKeyLocation::Header => {
                if let Some((key, value)) = self.api_key_pair() {
                    headers.insert(key, value);
                }
            }
            _ => {}
        }
        headers
    }

    /// Query params contributed by the active variant (API key in query only)
    pub fn project_params(&self) -> Mapping {
        let mut params = Mapping::new();
        if self.mode == AuthMode::ApiKey && self.api_key.location == ApiKeyLocation::Query {
            if let Some((key, value)) = self.api_key_pair() {
                params.insert(key, value);
            }
        }
        params
    }

    fn api_key_pair(&self) -> Option<(String, String)> {
        if self.api_key.key.is_empty() || self.api_key.value.is_empty() {
            return None;
        }
        Some((self.api_key.key.clone(), self.api_key.value.clone()))
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        match self.mode {
            AuthMode::None => AuthSnapshot::None,
            AuthMode::Basic => AuthSnapshot::Basic {
                username: self.basic.username.clone(),
                password: self.basic.password.clone(),
            },
            AuthMode::Bearer => AuthSnapshot::Bearer {
                token: self.bearer_token.clone(),
            },
            AuthMode::ApiKey => AuthSnapshot::ApiKey {
                key: self.api_key.key.clone(),
                value: self.api_key.value.clone(),
                location: self.api_key.location,
            },
        }
    }

    pub fn from_snapshot(snapshot: &AuthSnapshot) -> Self {
        let mut model = Self::new();
        match snapshot {
            AuthSnapshot::None => {}
            AuthSnapshot::Basic { username, password } => {
                model.mode = AuthMode::Basic;
                model.basic = BasicCredentials {
                    username: username.clone(),
                    password: password.clone(),
                };
            }
            AuthSnapshot::Bearer { token } => {
                model.mode = AuthMode::Bearer;
                model.bearer_token = token.clone();
            }
            AuthSnapshot::ApiKey { key, value, location } => {
                model.mode = AuthMode::ApiKey;
                model.api_key = ApiKeyAuth {
                    key: key.clone(),
                    value: value.clone(),
                    location: *location,
                };
            }
        }
        model
    }

    /// Text fields editable for the active mode, in tab order
    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::None => &[],
            AuthMode::Basic => &[AuthField::Username, AuthField::Password],
            AuthMode::Bearer => &[AuthField::Token],
            AuthMode::ApiKey => &[AuthField::KeyName, AuthField::KeyValue],
        }
    }

    pub fn field(&self, field: AuthField) -> &str {
        match field {
            AuthField::Username => &self.basic.username,
            AuthField::Password => &self.basic.password,
            AuthField::Token => &self.bearer_token,
            AuthField::KeyName => &self.api_key.key,
            AuthField::KeyValue => &self.api_key.value,
        }
    }

    pub fn field_mut(&mut self, field: AuthField) -> &mut String {
        match field {
            AuthField::Username => &mut self.basic.username,
            AuthField::Password => &mut self.basic.password,
            AuthField::Token => &mut self.bearer_token,
            AuthField::KeyName => &mut self.api_key.key,
            AuthField::KeyValue => &mut self.api_key.value,
        }
    }
}
