//! Main entry point for CLI command to start server.
use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::configuration::generate_config_schema;
use crate::configuration::Configuration;
use crate::dataset::Dataset;
use crate::error::DatasetError;
use crate::http_server::CountriesServer;

/// Options for the countries server
#[derive(Parser, Debug)]
#[command(
    name = "countries",
    about = "GraphQL API for countries, continents and languages",
    disable_version_flag = true
)]
pub(crate) struct Opt {
    /// Log level (off|error|warn|info|debug|trace).
    #[arg(long = "log", default_value = "info", env = "COUNTRIES_LOG")]
    log_level: String,

    /// Configuration file location.
    #[arg(short, long = "config", env = "COUNTRIES_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    /// Dataset file to serve instead of the bundled one.
    #[arg(long = "dataset", env = "COUNTRIES_DATASET_PATH")]
    dataset_path: Option<PathBuf>,

    /// Address to listen on, overrides `server.listen`.
    #[arg(long, env = "COUNTRIES_LISTEN")]
    listen: Option<SocketAddr>,

    /// Prints the configuration schema.
    #[arg(long)]
    schema: bool,

    /// Prints the GraphQL schema.
    #[arg(long)]
    sdl: bool,

    /// Display version and exit.
    #[arg(long, short = 'V')]
    version: bool,
}

/// This is the main countries server entrypoint.
pub fn main() -> Result<()> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(nb) = std::env::var("COUNTRIES_NUM_CORES")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
    {
        builder.worker_threads(nb);
    }
    let runtime = builder.build()?;
    runtime.block_on(Opt::parse().run())
}

impl Opt {
    async fn run(self) -> Result<()> {
        if self.version {
            println!("{}", std::env!("CARGO_PKG_VERSION"));
            return Ok(());
        }

        if self.schema {
            let schema = generate_config_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
            return Ok(());
        }

        if self.sdl {
            println!("{}", crate::schema::sdl());
            return Ok(());
        }

        init_subscriber(&self.log_level)?;
        tracing::info!("countries v{}", std::env!("CARGO_PKG_VERSION"));

        let configuration = self.configuration()?;
        let dataset = load_dataset(&configuration)?;
        dataset.report_dangling_references();

        CountriesServer::builder()
            .configuration(Arc::new(configuration))
            .dataset(Arc::new(dataset))
            .build()
            .serve()
            .await?;
        Ok(())
    }

    /// The configuration file, if any, with command line overrides applied.
    fn configuration(&self) -> Result<Configuration> {
        let mut configuration = match &self.config_path {
            Some(path) => Configuration::from_file(path)
                .with_context(|| format!("could not load {}", path.display()))?,
            None => Configuration::default(),
        };
        if let Some(listen) = self.listen {
            configuration.server.listen = listen;
        }
        if let Some(dataset) = &self.dataset_path {
            configuration.dataset = Some(dataset.clone());
        }
        configuration.validate()?;
        Ok(configuration)
    }
}

fn init_subscriber(log_level: &str) -> Result<()> {
    let builder = tracing_subscriber::fmt::fmt().with_env_filter(
        EnvFilter::try_new(log_level).context("could not parse log configuration")?,
    );

    let result = if std::io::stdout().is_terminal() {
        builder.try_init()
    } else {
        builder.json().try_init()
    };
    result.map_err(|e| anyhow!("could not set the global subscriber: {e}"))
}

fn load_dataset(configuration: &Configuration) -> Result<Dataset, DatasetError> {
    match &configuration.dataset {
        Some(path) => Dataset::from_file(path),
        None => Ok(Dataset::builtin()),
    }
}
