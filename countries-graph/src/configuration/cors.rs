//! Cross Origin Resource Sharing (CORS configuration)
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use tower_http::cors;
use tower_http::cors::CorsLayer;

use super::ConfigurationError;

/// Cross origin request configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Cors {
    /// Set to true to allow any origin.
    /// Defaults to true, the dataset is public.
    #[serde(default = "default_allow_any_origin")]
    pub allow_any_origin: bool,

    /// The origin(s) to allow requests from.
    /// Only used when `allow_any_origin` is false.
    #[serde(default)]
    pub origins: Vec<String>,

    /// Allowed request methods. Defaults to GET, POST, OPTIONS.
    #[serde(default = "default_cors_methods")]
    pub methods: Vec<String>,

    /// The headers to allow.
    /// If this is empty, the headers listed in the request's
    /// `Access-Control-Request-Headers` are mirrored back.
    #[serde(default)]
    pub allow_headers: Vec<String>,
}

fn default_allow_any_origin() -> bool {
    true
}

fn default_cors_methods() -> Vec<String> {
    vec!["GET".into(), "POST".into(), "OPTIONS".into()]
}

impl Default for Cors {
    fn default() -> Self {
        Self {
            allow_any_origin: default_allow_any_origin(),
            origins: Default::default(),
            methods: default_cors_methods(),
            allow_headers: Default::default(),
        }
    }
}

impl Cors {
    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(origin) = self
            .origins
            .iter()
            .find(|origin| origin.parse::<http::HeaderValue>().is_err())
        {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid 'cors.origins'",
                error: format!("origin '{origin}' is not valid"),
            });
        }
        if let Some(header) = self
            .allow_headers
            .iter()
            .find(|header| header.parse::<http::HeaderName>().is_err())
        {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid 'cors.allow_headers'",
                error: format!("header name '{header}' is not valid"),
            });
        }
        if let Some(method) = self
            .methods
            .iter()
            .find(|method| method.parse::<http::Method>().is_err())
        {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid 'cors.methods'",
                error: format!("method '{method}' is not valid"),
            });
        }
        Ok(())
    }

    pub(crate) fn into_layer(self) -> CorsLayer {
        let allow_headers = if self.allow_headers.is_empty() {
            cors::AllowHeaders::mirror_request()
        } else {
            cors::AllowHeaders::list(self.allow_headers.iter().filter_map(|header| {
                header
                    .parse()
                    .map_err(|_| tracing::error!("header name '{header}' is not valid"))
                    .ok()
            }))
        };
        let cors = CorsLayer::new()
            .allow_headers(allow_headers)
            .allow_methods(cors::AllowMethods::list(self.methods.iter().filter_map(
                |method| {
                    method
                        .parse()
                        .map_err(|_| tracing::error!("method '{method}' is not valid"))
                        .ok()
                },
            )));

        if self.allow_any_origin {
            cors.allow_origin(cors::Any)
        } else {
            cors.allow_origin(cors::AllowOrigin::list(
                self.origins.into_iter().filter_map(|origin| {
                    origin
                        .parse()
                        .map_err(|_| tracing::error!("origin '{origin}' is not valid"))
                        .ok()
                }),
            ))
        }
    }
}
