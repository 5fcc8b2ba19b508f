//! Merge form parts into one `RequestDescriptor`

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::{Position, Url};

use crate::compose::auth::AuthModel;
use crate::compose::body::{empty_object, BodyModel};
use crate::compose::key_value::{KeyValueSet, Mapping};
use crate::error::ComposeError;
use crate::models::{HttpMethod, RequestDescriptor, RequestOptions};

/// Characters left unescaped in query components, matching `encodeURIComponent`
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A composed request plus the field-local problems that were papered over
#[derive(Clone, Debug, PartialEq)]
pub struct Composition {
    pub descriptor: RequestDescriptor,
    pub diagnostics: Vec<ComposeError>,
}

/// Parse user input into an absolute http(s) URL, defaulting the scheme to https.
pub fn normalize_url(input: &str) -> Result<Url, ComposeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ComposeError::Validation("Please enter a URL".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| ComposeError::MalformedUrl {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ComposeError::MalformedUrl {
            input: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Encode a mapping as a query string, `encodeURIComponent` style
pub(crate) fn encode_query(params: &Mapping) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_COMPONENT),
                utf8_percent_encode(value, QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Replace the whole query string with `params`; no params means no query.
fn rewrite_query(url: &mut Url, params: &Mapping) {
    if params.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&encode_query(params)));
    }
}

/// Render the URL with the query exactly as it was typed
fn with_typed_query(url: &Url, input: &str) -> String {
    let before_fragment = input.split('#').next().unwrap_or(input);
    match before_fragment.split_once('?') {
        Some((_, typed)) if url.query() != Some(typed) => {
            let mut spliced = url[..Position::AfterPath].to_string();
            spliced.push('?');
            spliced.push_str(typed);
            if let Some(fragment) = url.fragment() {
                spliced.push('#');
                spliced.push_str(fragment);
            }
            spliced
        }
        _ => url.to_string(),
    }
}

/// Build a descriptor from independent pieces of form state.
///
/// Auth-derived headers and params overwrite user entries with the same name.
/// A malformed JSON body degrades to `{}` and is reported in `diagnostics`;
/// a missing or malformed URL fails the whole call.
pub fn compose(
    url_input: &str,
    method: HttpMethod,
    params: &KeyValueSet,
    headers: &KeyValueSet,
    body: &BodyModel,
    auth: &AuthModel,
    options: RequestOptions,
) -> Result<Composition, ComposeError> {
    let mut url = normalize_url(url_input)?;

    let mut merged_headers = headers.project();
    merged_headers.extend(auth.project_headers());

    let mut merged_params = params.project();
    merged_params.extend(auth.project_params());

    let url = if method.is_paramless() {
        rewrite_query(&mut url, &merged_params);
        url.to_string()
    } else {
        with_typed_query(&url, url_input.trim())
    };

    let mut diagnostics = Vec::new();
    let body = match body.serialize() {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "Body replaced with empty object");
            diagnostics.push(err);
            empty_object()
        }
    };

    let descriptor = RequestDescriptor::new(
        method,
        url,
        merged_params,
        merged_headers,
        body,
        auth.snapshot(),
        options,
    );
    tracing::debug!(method = method.as_str(), url = descriptor.url(), "Composed request");

    Ok(Composition {
        descriptor,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::auth::{ApiKeyLocation, AuthMode};
    use crate::compose::body::BodyMode;
    use serde_json::json;

    fn compose_simple(
        url: &str,
        method: HttpMethod,
        params: &KeyValueSet,
        headers: &KeyValueSet,
        auth: &AuthModel,
    ) -> Composition {
        compose(
            url,
            method,
            params,
            headers,
            &BodyModel::new(),
            auth,
            RequestOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_get_with_params_and_missing_scheme() {
        let mut params = KeyValueSet::new();
        params.push("q", "a b");

        let composed = compose_simple(
            "example.com/items",
            HttpMethod::GET,
            &params,
            &KeyValueSet::new(),
            &AuthModel::new(),
        );
        assert_eq!(composed.descriptor.url(), "https://example.com/items?q=a%20b");
        assert_eq!(composed.descriptor.body(), &json!({}));
        assert!(composed.diagnostics.is_empty());
    }

    #[test]
    fn test_bearer_overrides_user_authorization_header() {
        let mut headers = KeyValueSet::new();
        headers.push("Authorization", "Basic foo");
        headers.push("Accept", "application/json");

        let mut auth = AuthModel::new();
        auth.set_mode(AuthMode::Bearer);
        auth.bearer_token = "xyz".into();

        let composed = compose_simple(
            "https://api.example.com",
            HttpMethod::POST,
            &KeyValueSet::new(),
            &headers,
            &auth,
        );
        let merged = composed.descriptor.headers();
        assert_eq!(merged["Authorization"], "Bearer xyz");
        assert_eq!(merged["Accept"], "application/json");
    }

    #[test]
    fn test_paramless_methods_replace_existing_query() {
        let mut params = KeyValueSet::new();
        params.push("page", "2");

        for method in [HttpMethod::GET, HttpMethod::HEAD, HttpMethod::DELETE, HttpMethod::OPTIONS] {
            let composed = compose_simple(
                "https://example.com/list?page=1&stale=yes",
                method,
                &params,
                &KeyValueSet::new(),
                &AuthModel::new(),
            );
            assert_eq!(composed.descriptor.url(), "https://example.com/list?page=2");
        }

        let cleared = compose_simple(
            "https://example.com/list?stale=yes",
            HttpMethod::GET,
            &KeyValueSet::new(),
            &KeyValueSet::new(),
            &AuthModel::new(),
        );
        assert_eq!(cleared.descriptor.url(), "https://example.com/list");
    }

    #[test]
    fn test_body_methods_leave_query_untouched() {
        let mut params = KeyValueSet::new();
        params.push("page", "2");

        for method in [HttpMethod::POST, HttpMethod::PUT, HttpMethod::PATCH] {
            let composed = compose_simple(
                "https://example.com/list?page=1",
                method,
                &params,
                &KeyValueSet::new(),
                &AuthModel::new(),
            );
            assert_eq!(composed.descriptor.url(), "https://example.com/list?page=1");
            // still carried for the relay and for saving
            assert_eq!(composed.descriptor.params()["page"], "2");
        }
    }

    #[test]
    fn test_body_methods_keep_typed_query_verbatim() {
        let composed = compose_simple(
            r##"example.com/x?q=a b&t="y"#frag"##,
            HttpMethod::POST,
            &KeyValueSet::new(),
            &KeyValueSet::new(),
            &AuthModel::new(),
        );
        assert_eq!(composed.descriptor.url(), r##"https://example.com/x?q=a b&t="y"#frag"##);

        let untouched = compose_simple(
            "https://example.com/x",
            HttpMethod::PUT,
            &KeyValueSet::new(),
            &KeyValueSet::new(),
            &AuthModel::new(),
        );
        assert_eq!(untouched.descriptor.url(), "https://example.com/x");
    }

    #[test]
    fn test_query_api_key_overrides_user_param() {
        let mut params = KeyValueSet::new();
        params.push("api_key", "stale");
        params.push("q", "rust");

        let mut auth = AuthModel::new();
        auth.set_mode(AuthMode::ApiKey);
        auth.api_key.key = "api_key".into();
        auth.api_key.value = "fresh".into();
        auth.api_key.location = ApiKeyLocation::Query;

        let composed = compose_simple(
            "https://example.com/search",
            HttpMethod::GET,
            &params,
            &KeyValueSet::new(),
            &auth,
        );
        assert_eq!(
            composed.descriptor.url(),
            "https://example.com/search?api_key=fresh&q=rust"
        );
        assert!(composed.descriptor.headers().is_empty());
    }

    #[test]
    fn test_malformed_body_is_a_diagnostic_not_a_failure() {
        let mut body = BodyModel::new();
        body.set_mode(BodyMode::Json);
        body.json_text = "{".into();

        let composed = compose(
            "https://example.com",
            HttpMethod::POST,
            &KeyValueSet::new(),
            &KeyValueSet::new(),
            &body,
            &AuthModel::new(),
            RequestOptions::default(),
        )
        .unwrap();
        assert_eq!(composed.descriptor.body(), &json!({}));
        assert!(matches!(
            composed.diagnostics.as_slice(),
            [ComposeError::MalformedBody(_)]
        ));
    }

    #[test]
    fn test_url_errors() {
        assert!(matches!(
            normalize_url("   "),
            Err(ComposeError::Validation(_))
        ));
        assert!(matches!(
            normalize_url("http://exa mple.com"),
            Err(ComposeError::MalformedUrl { .. })
        ));
        assert!(matches!(
            normalize_url("ftp://example.com"),
            Err(ComposeError::MalformedUrl { .. })
        ));
        assert_eq!(
            normalize_url("localhost:8000/health").unwrap().as_str(),
            "https://localhost:8000/health"
        );
        assert_eq!(
            normalize_url("http://example.com").unwrap().as_str(),
            "http://example.com/"
        );
    }
}
