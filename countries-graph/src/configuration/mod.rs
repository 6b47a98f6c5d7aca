//! Logic for loading configuration in to an object model
mod cors;
mod server;

use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use displaydoc::Display;
use schemars::gen::SchemaSettings;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub use self::cors::Cors;
pub use self::server::Server;
pub use crate::csrf::CsrfConfig;

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not read configuration file {path}: {error}
    ReadFile {
        path: PathBuf,
        error: std::io::Error,
    },
    /// could not deserialize configuration: {0}
    DeserializeConfigError(#[from] serde_yaml::Error),
    /// {message}: {error}
    InvalidConfiguration {
        message: &'static str,
        error: String,
    },
}

/// The configuration for the countries server.
///
/// Can be created through `serde::Deserialize` from various formats,
/// or inline in Rust code with the builder.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// Configuration options pertaining to the http server component.
    pub server: Server,

    /// Cross-site request forgery prevention.
    pub csrf: CsrfConfig,

    /// Cross origin request headers.
    pub cors: Cors,

    /// Query execution limits.
    pub limits: Limits,

    /// Path to a dataset file to serve instead of the bundled one.
    #[schemars(with = "Option<String>")]
    pub dataset: Option<PathBuf>,
}

#[buildstructor::buildstructor]
impl Configuration {
    #[builder]
    pub fn new(
        server: Option<Server>,
        csrf: Option<CsrfConfig>,
        cors: Option<Cors>,
        limits: Option<Limits>,
        dataset: Option<PathBuf>,
    ) -> Self {
        Self {
            server: server.unwrap_or_default(),
            csrf: csrf.unwrap_or_default(),
            cors: cors.unwrap_or_default(),
            limits: limits.unwrap_or_default(),
            dataset,
        }
    }

    /// Read and validate a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let yaml = std::fs::read_to_string(path).map_err(|error| ConfigurationError::ReadFile {
            path: path.to_path_buf(),
            error,
        })?;
        let mut configuration: Configuration = yaml.parse()?;
        // A relative dataset path is relative to the configuration file.
        if let (Some(dataset), Some(parent)) = (configuration.dataset.as_mut(), path.parent()) {
            if dataset.is_relative() {
                *dataset = parent.join(&*dataset);
            }
        }
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (message, path) in [
            ("invalid 'server.graphql_path'", &self.server.graphql_path),
            ("invalid 'server.health_check_path'", &self.server.health_check_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigurationError::InvalidConfiguration {
                    message,
                    error: format!("'{path}' must start with '/'"),
                });
            }
        }
        if self.server.health_check_path == self.server.graphql_path {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid 'server.health_check_path'",
                error: format!(
                    "'{}' is already used by the GraphQL endpoint",
                    self.server.health_check_path
                ),
            });
        }
        self.cors.validate()?;
        Ok(())
    }
}

/// Parse configuration from a string in YAML syntax
impl FromStr for Configuration {
    type Err = serde_yaml::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_yaml::from_str(s)
    }
}

/// Query execution limits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Limits {
    /// Maximum selection depth of an operation. Unlimited if not set.
    pub max_depth: Option<usize>,

    /// Maximum complexity of an operation, counting one per field. Unlimited if not set.
    pub max_complexity: Option<usize>,
}

/// Generate a JSON schema for the configuration.
pub fn generate_config_schema() -> RootSchema {
    let settings = SchemaSettings::draft07().with(|s| {
        s.option_nullable = true;
        s.option_add_null_type = false;
        s.inline_subschemas = true;
    });
    let gen = settings.into_generator();
    gen.into_root_schema_for::<Configuration>()
}
