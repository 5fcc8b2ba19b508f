//! The full editable request: every input the user can touch, as plain data

use url::form_urlencoded;

use crate::compose::auth::{AuthModel, AuthSnapshot};
use crate::compose::body::{empty_object, BodyModel};
use crate::compose::composer::{compose, Composition};
use crate::compose::key_value::{KeyValueSet, Mapping};
use crate::constants::DEFAULT_HTTP_URL;
use crate::error::ComposeError;
use crate::models::{mapping_from_json, HttpMethod, RequestOptions, SaveRequest, SavedRequest};

/// Form state owned by the app layer and read by the composer on send
#[derive(Clone, Debug, PartialEq)]
pub struct RequestForm {
    pub method: HttpMethod,
    pub url: String,
    pub params: KeyValueSet,
    pub headers: KeyValueSet,
    pub auth: AuthModel,
    pub body: BodyModel,
    pub options: RequestOptions,
}

impl Default for RequestForm {
    fn default() -> Self {
        let mut headers = KeyValueSet::new();
        headers.push("Accept", "application/json");
        RequestForm {
            method: HttpMethod::GET,
            url: String::from(DEFAULT_HTTP_URL),
            params: KeyValueSet::new(),
            headers,
            auth: AuthModel::new(),
            body: BodyModel::new(),
            options: RequestOptions::default(),
        }
    }
}

/// A validated save, ready to post to a collection
#[derive(Clone, Debug, PartialEq)]
pub struct SavePlan {
    pub collection_id: u64,
    pub payload: SaveRequest,
    pub diagnostics: Vec<ComposeError>,
}

impl RequestForm {
    pub fn compose(&self) -> Result<Composition, ComposeError> {
        compose(
            &self.url,
            self.method,
            &self.params,
            &self.headers,
            &self.body,
            &self.auth,
            self.options,
        )
    }

    /// Rebuild the form from a stored request.
    ///
    /// Stored requests hold merged values, so the compose merge is undone:
    /// entries the auth model projects are dropped from the rows, and a
    /// paramless method's rewritten query is stripped from the URL.
    pub fn from_saved(saved: &SavedRequest) -> Self {
        let defaults = RequestOptions::default();
        let method = saved
            .method
            .as_deref()
            .and_then(HttpMethod::parse)
            .unwrap_or_default();
        let auth = AuthModel::from_snapshot(saved.auth.as_ref().unwrap_or(&AuthSnapshot::None));

        let mut params = saved.params.as_ref().map(mapping_from_json).unwrap_or_default();
        let mut headers = saved.headers.as_ref().map(mapping_from_json).unwrap_or_default();

        let url = saved.url.clone().unwrap_or_default();
        let url = if method.is_paramless() {
            strip_rewritten_query(&url, &params)
        } else {
            url
        };
        remove_derived(&mut headers, &auth.project_headers());
        remove_derived(&mut params, &auth.project_params());

        RequestForm {
            method,
            url,
            params: KeyValueSet::from_mapping(&params),
            headers: KeyValueSet::from_mapping(&headers),
            auth,
            body: saved
                .body
                .as_ref()
                .map(BodyModel::from_value)
                .unwrap_or_default(),
            options: RequestOptions {
                timeout_ms: saved.timeout.unwrap_or(defaults.timeout_ms),
                follow_redirects: saved.follow_redirects.unwrap_or(defaults.follow_redirects),
                verify_ssl: saved.verify_ssl.unwrap_or(defaults.verify_ssl),
            },
        }
    }

    /// Validate and build the save payload.
    ///
    /// Checks run in the order the user sees them: name, collection, URL.
    /// The URL is stored as typed.
    pub fn save_payload(
        &self,
        name: &str,
        description: &str,
        collection_id: Option<u64>,
    ) -> Result<SavePlan, ComposeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ComposeError::Validation(
                "Please enter a name for this request".to_string(),
            ));
        }
        let collection_id = collection_id.ok_or_else(|| {
            ComposeError::Validation("Please select a collection".to_string())
        })?;
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ComposeError::Validation("Please enter a URL".to_string()));
        }

        let mut diagnostics = Vec::new();
        let body = self.body.serialize().unwrap_or_else(|err| {
            diagnostics.push(err);
            empty_object()
        });

        let mut headers = self.headers.project();
        headers.extend(self.auth.project_headers());

        Ok(SavePlan {
            collection_id,
            payload: SaveRequest {
                name: name.to_string(),
                description: description.trim().to_string(),
                url: url.to_string(),
                method: self.method,
                headers,
                params: self.params.project(),
                body,
                auth: self.auth.snapshot(),
            },
            diagnostics,
        })
    }
}

/// Drop entries the auth model adds back on the next compose
fn remove_derived(mapping: &mut Mapping, derived: &Mapping) {
    for (key, value) in derived {
        if mapping.get(key) == Some(value) {
            mapping.remove(key);
        }
    }
}

/// Remove a query that carries exactly `params`
fn strip_rewritten_query(url: &str, params: &Mapping) -> String {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    let Some((base, query)) = rest.split_once('?') else {
        return url.to_string();
    };

    let parsed: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let carried = parsed.len() == params.len()
        && parsed.iter().all(|(k, v)| params.get(k) == Some(v));
    if !carried {
        return url.to_string();
    }

    match fragment {
        Some(fragment) => format!("{}#{}", base, fragment),
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::auth::{ApiKeyLocation, AuthMode};
    use crate::compose::body::BodyMode;
    use serde_json::json;

    fn populated_form() -> RequestForm {
        let mut form = RequestForm {
            method: HttpMethod::PUT,
            url: "https://api.example.com/users/7".into(),
            ..RequestForm::default()
        };
        form.params.push("notify", "yes");
        form.headers.push("X-Request-Id", "abc");
        form.auth.set_mode(AuthMode::Basic);
        form.auth.basic.username = "ada".into();
        form.auth.basic.password = "lovelace".into();
        form.body.set_mode(BodyMode::Json);
        form.body.json_text = r#"{"name": "Ada", "tags": ["math"]}"#.into();
        form.options.verify_ssl = false;
        form
    }

    #[test]
    fn test_round_trip_through_saved_shape() {
        let form = populated_form();
        let descriptor = form.compose().unwrap().descriptor;

        let saved: SavedRequest =
            serde_json::from_value(serde_json::to_value(descriptor.to_saved()).unwrap()).unwrap();
        let restored = RequestForm::from_saved(&saved);

        assert_eq!(restored.method, form.method);
        assert_eq!(restored.url, form.url);
        assert_eq!(restored.headers.project(), form.headers.project());
        assert_eq!(restored.params.project(), form.params.project());
        assert_eq!(restored.auth.snapshot(), form.auth.snapshot());
        assert_eq!(restored.body.serialize().unwrap(), form.body.serialize().unwrap());
        assert_eq!(restored.options, form.options);

        assert_eq!(restored.compose().unwrap().descriptor, descriptor);
    }

    #[test]
    fn test_query_api_key_is_not_restored_as_user_param() {
        let mut form = RequestForm::default();
        form.params.push("q", "a b");
        form.auth.set_mode(AuthMode::ApiKey);
        form.auth.api_key.key = "key".into();
        form.auth.api_key.value = "v".into();
        form.auth.api_key.location = ApiKeyLocation::Query;

        let descriptor = form.compose().unwrap().descriptor;
        assert_eq!(descriptor.url(), "https://httpbin.org/get?key=v&q=a%20b");

        let restored = RequestForm::from_saved(&descriptor.to_saved());
        assert_eq!(restored.url, form.url);
        assert_eq!(restored.params.project(), form.params.project());
        assert_eq!(restored.headers.project(), form.headers.project());
        assert_eq!(restored.compose().unwrap().descriptor, descriptor);
    }

    #[test]
    fn test_bearer_header_is_not_restored_as_user_header() {
        let mut form = RequestForm {
            method: HttpMethod::GET,
            url: "https://example.com/items".into(),
            headers: KeyValueSet::new(),
            ..RequestForm::default()
        };
        form.params.push("q", "a b");
        form.auth.set_mode(AuthMode::Bearer);
        form.auth.bearer_token = "xyz".into();

        let descriptor = form.compose().unwrap().descriptor;
        let mut restored = RequestForm::from_saved(&descriptor.to_saved());
        assert_eq!(restored.url, "https://example.com/items");
        assert!(restored.headers.project().is_empty());
        assert_eq!(restored.params.project(), form.params.project());
        assert_eq!(restored.compose().unwrap().descriptor, descriptor);

        // switching auth off must not leave the old token behind
        restored.auth.set_mode(AuthMode::None);
        let resent = restored.compose().unwrap().descriptor;
        assert!(!resent.headers().contains_key("Authorization"));
    }

    #[test]
    fn test_hand_edited_query_is_kept() {
        let saved = SavedRequest {
            method: Some("GET".into()),
            url: Some("https://example.com/items?page=1".into()),
            ..SavedRequest::default()
        };
        let restored = RequestForm::from_saved(&saved);
        assert_eq!(restored.url, "https://example.com/items?page=1");
    }

    #[test]
    fn test_user_header_differing_from_auth_survives() {
        let mut form = RequestForm::default();
        form.headers.push("X-Api-Key", "mine");
        form.auth.set_mode(AuthMode::ApiKey);
        form.auth.api_key.key = "X-Api-Key".into();
        form.auth.api_key.value = "theirs".into();

        let descriptor = form.compose().unwrap().descriptor;
        let restored = RequestForm::from_saved(&descriptor.to_saved());
        // the auth value won the merge, so only the auth model carries it now
        assert!(!restored.headers.project().contains_key("X-Api-Key"));
        assert_eq!(restored.auth.api_key.value, "theirs");
    }

    #[test]
    fn test_from_saved_defaults() {
        let form = RequestForm::from_saved(&SavedRequest::default());
        assert_eq!(form.method, HttpMethod::GET);
        assert!(form.url.is_empty());
        assert_eq!(form.auth.mode(), AuthMode::None);
        assert_eq!(form.body.mode(), BodyMode::None);
        assert_eq!(form.options, RequestOptions::default());
    }

    #[test]
    fn test_save_validation_order() {
        let mut form = RequestForm {
            url: String::new(),
            ..RequestForm::default()
        };

        let err = form.save_payload(" ", "", None).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a name for this request");

        let err = form.save_payload("List users", "", None).unwrap_err();
        assert_eq!(err.to_string(), "Please select a collection");

        let err = form.save_payload("List users", "", Some(3)).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a URL");

        form.url = "example.com/users".into();
        let plan = form.save_payload("List users", " all ", Some(3)).unwrap();
        assert_eq!(plan.collection_id, 3);
        assert_eq!(plan.payload.url, "example.com/users");
        assert_eq!(plan.payload.description, "all");
        assert_eq!(plan.payload.body, json!({}));
    }

    #[test]
    fn test_save_with_bad_json_keeps_going() {
        let mut form = populated_form();
        form.body.json_text = "{oops".into();
        let plan = form.save_payload("Update", "", Some(1)).unwrap();
        assert_eq!(plan.payload.body, json!({}));
        assert_eq!(plan.diagnostics.len(), 1);
    }
}
