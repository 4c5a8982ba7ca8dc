//! ElasticGaze CLI - Elasticsearch cluster inspection
//!
//! Resolves a connection profile, runs one operation and prints its result
//! as pretty JSON on stdout. Logs go to stderr.

mod args;

use args::{Cli, Command, IndicesCommand};
use clap::Parser;
use elasticgaze_core::{ClusterService, CreateIndexRequest, GazeConfig};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info_span};
use tracing_subscriber::EnvFilter;
use anyhow::{Context, Result};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn load_config(cli: &Cli) -> Result<GazeConfig> {
    let config = match &cli.config {
        Some(path) => GazeConfig::load_from(path)
            .await
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GazeConfig::load().await.context("loading config")?,
    };
    Ok(config)
}

/// Install the stderr logger; RUST_LOG wins over the configured level
fn init_logging(config: &GazeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{}", output);
    Ok(())
}

/// Run the selected command; `Ok(false)` when the cluster reported a failure
async fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli).await?;
    init_logging(&config);

    if let Command::Profiles = cli.command {
        let profiles: Vec<_> = config
            .profiles
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "host": p.host,
                    "port": p.port,
                    "tls": p.tls,
                    "auth_method": p.auth_method,
                    "default": config.default_profile.as_deref() == Some(p.name.as_str()),
                })
            })
            .collect();
        print_json(&profiles)?;
        return Ok(true);
    }

    let profile = cli.resolve_profile(&config)?;
    debug!(profile = %profile.label(), "Using connection profile");

    let service = ClusterService::from_settings(&config.http)
        .context("building HTTP client")?
        .with_span(info_span!("elasticgaze", profile = %profile.label()));

    let success = match &cli.command {
        Command::Profiles => true,
        Command::Check => {
            let check = service.check_connection(&profile).await;
            print_json(&check)?;
            check.success
        }
        Command::Health => {
            let health = service
                .cluster_health(&profile)
                .await
                .context("fetching cluster health")?;
            print_json(&health)?;
            true
        }
        Command::Dashboard => {
            let response = service.dashboard_response(&profile).await;
            print_json(&response)?;
            response.success
        }
        Command::Nodes => {
            let response = service.nodes(&profile).await;
            print_json(&response)?;
            response.success
        }
        Command::Indices(IndicesCommand::List) => {
            let response = service.list_indices(&profile).await;
            print_json(&response)?;
            response.success
        }
        Command::Indices(IndicesCommand::Create { name, shards, replicas }) => {
            let request = CreateIndexRequest::new(name.clone(), *shards, *replicas);
            let response = service.create_index(&profile, &request).await;
            print_json(&response)?;
            response.success
        }
        Command::Indices(IndicesCommand::Delete { name }) => {
            let response = service.delete_index(&profile, name).await;
            print_json(&response)?;
            response.success
        }
    };

    Ok(success)
}
