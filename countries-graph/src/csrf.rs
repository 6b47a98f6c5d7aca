//! Cross Site Request Forgery (CSRF) prevention.
use std::sync::Arc;

use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use http::header;
use http::HeaderMap;
use http::StatusCode;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

/// CSRF protection configuration.
///
/// See <https://owasp.org/www-community/attacks/csrf> for an explanation on CSRF attacks.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
#[serde(default)]
pub struct CsrfConfig {
    /// CSRF prevention is enabled by default.
    ///
    /// Setting `unsafe_disabled: true` *disables* CSRF protection.
    pub unsafe_disabled: bool,
    /// Override the headers to check for by setting
    /// required_headers.
    /// Note that if you set required_headers here,
    /// you may also want to have a look at your `CORS` configuration,
    /// and make sure you either:
    /// - did not set any `allow_headers` list (so it defaults to mirroring the request)
    /// - added your required headers to the allow_headers list
    pub required_headers: Vec<String>,
}

fn default_required_headers() -> Vec<String> {
    vec![
        "x-apollo-operation-name".to_string(),
        "apollo-require-preflight".to_string(),
    ]
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            unsafe_disabled: false,
            required_headers: default_required_headers(),
        }
    }
}

static NON_PREFLIGHTED_CONTENT_TYPES: &[&str] = &[
    "application/x-www-form-urlencoded",
    "multipart/form-data",
    "text/plain",
];

/// Makes sure any GraphQL request received would have been preflighted if it
/// was sent by a browser.
///
/// A browser only sends a "simple" request without a CORS preflight. So we
/// only execute operations that either carry a content-type a browser would
/// have preflighted, or one of the required headers, which only script code
/// can add. Everything else is answered with a 400 before any resolver runs.
#[derive(Debug, Clone)]
pub(crate) struct Csrf {
    required_headers: Arc<Vec<String>>,
}

impl Csrf {
    /// `None` when prevention is disabled.
    pub(crate) fn new(config: &CsrfConfig) -> Option<Self> {
        (!config.unsafe_disabled).then(|| Self {
            required_headers: Arc::new(config.required_headers.clone()),
        })
    }

    pub(crate) fn is_preflighted(&self, headers: &HeaderMap) -> bool {
        content_type_requires_preflight(headers)
            || recommended_header_is_provided(headers, &self.required_headers)
    }

    /// Runs before an operation is parsed. `Err` holds the response to send back.
    pub(crate) fn check(&self, headers: &HeaderMap) -> Result<(), Response> {
        if self.is_preflighted(headers) {
            tracing::trace!("request is preflighted");
            Ok(())
        } else {
            tracing::trace!("request is not preflighted");
            Err(self.rejection())
        }
    }

    fn rejection(&self) -> Response {
        let message = format!(
            "This operation has been blocked as a potential Cross-Site Request Forgery (CSRF). \
            Please either specify a 'content-type' header (with a mime-type that is not one of {}) \
            or provide one of the following headers: {}",
            NON_PREFLIGHTED_CONTENT_TYPES.join(", "),
            self.required_headers.join(", ")
        );
        let body = json!({
            "errors": [{
                "message": message,
                "extensions": { "code": "CSRF_ERROR" }
            }]
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

// A content-type that is absent, or one of the three a simple request may
// carry, does not trigger a preflight.
// https://fetch.spec.whatwg.org/#cors-safelisted-request-header
fn content_type_requires_preflight(headers: &HeaderMap) -> bool {
    let joined_content_type_header_value = if let Ok(combined_headers) = headers
        .get_all(header::CONTENT_TYPE)
        .iter()
        .map(|header_value| {
            header_value
                .to_str()
                .map(|as_str| as_str.trim().replace('\u{0009}', "\u{0020}")) // replace tab with space
        })
        .collect::<Result<Vec<_>, _>>()
    {
        // https://fetch.spec.whatwg.org/#concept-header-list-combine
        combined_headers.join("\u{002C}\u{0020}") // ', '
    } else {
        // We couldn't parse a header value, let's err on the side of caution here
        return false;
    };

    if let Ok(mime_type) = joined_content_type_header_value.parse::<mime::Mime>() {
        !NON_PREFLIGHTED_CONTENT_TYPES.contains(&mime_type.essence_str())
    } else {
        // Unparsable, including absent: not enough to be sure a preflight happened.
        false
    }
}

// Browsers never add these headers on their own, so a non-empty one means
// script code set it, which forces a preflight.
fn recommended_header_is_provided(headers: &HeaderMap, required_headers: &[String]) -> bool {
    required_headers.iter().any(|header| {
        headers
            .get_all(header)
            .iter()
            .any(|value| !value.is_empty())
    })
}
