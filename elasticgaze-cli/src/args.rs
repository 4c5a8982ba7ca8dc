//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use elasticgaze_core::profile::DEFAULT_PORT;
use elasticgaze_core::{ConnectionProfile, GazeConfig};
use std::path::PathBuf;
use anyhow::{anyhow, Result};

/// ElasticGaze - inspect and administer Elasticsearch clusters
#[derive(Parser, Debug)]
#[command(name = "elasticgaze")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and administer Elasticsearch clusters")]
#[command(long_about = r#"
ElasticGaze reads an Elasticsearch cluster's REST API and prints a
normalized JSON view of it.

Connection settings come from a named profile in the config file or from
the ad-hoc --host flags.

Examples:
  elasticgaze --host localhost nodes                     # Node telemetry
  elasticgaze --profile prod dashboard                   # Cluster overview
  elasticgaze --host es.local --auth basic --username elastic check
  elasticgaze --profile prod indices create logs-2 --shards 3
"#)]
pub struct Cli {
    /// Config file (defaults to $ELASTICGAZE_CONFIG or the OS config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Named profile from the config file
    #[arg(short, long, global = true, value_name = "NAME", conflicts_with = "host")]
    pub profile: Option<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Ad-hoc connection settings, used instead of a profile when --host is set
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Cluster host name or address
    #[arg(long, global = true)]
    pub host: Option<String>,

    #[arg(long, global = true, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Use https
    #[arg(long, global = true)]
    pub tls: bool,

    /// Authentication method: none, basic or apikey
    #[arg(long, global = true, default_value = "none")]
    pub auth: String,

    #[arg(long, global = true, env = "ELASTICGAZE_USERNAME")]
    pub username: Option<String>,

    #[arg(long, global = true, env = "ELASTICGAZE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, global = true, env = "ELASTICGAZE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List configured profiles (secrets omitted)
    Profiles,

    /// Test the connection and report cluster name and version
    Check,

    /// Show cluster health
    Health,

    /// Show the cluster dashboard
    Dashboard,

    /// Show per-node telemetry
    Nodes,

    /// Manage indices
    #[command(subcommand)]
    Indices(IndicesCommand),
}

#[derive(Subcommand, Debug)]
pub enum IndicesCommand {
    /// List indices
    List,

    /// Create an index
    Create {
        name: String,
        #[arg(long, default_value_t = 1)]
        shards: i32,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        replicas: i32,
    },

    /// Delete an index
    Delete { name: String },
}

impl Cli {
    /// Profile from the ad-hoc flags when --host is set, else from the config file
    pub fn resolve_profile(&self, config: &GazeConfig) -> Result<ConnectionProfile> {
        if let Some(host) = &self.connection.host {
            let args = &self.connection;
            return Ok(ConnectionProfile {
                auth_method: args.auth.clone(),
                username: args.username.clone(),
                password: args.password.clone(),
                api_key: args.api_key.clone(),
                ..ConnectionProfile::new(host.clone(), args.port).with_tls(args.tls)
            });
        }

        match config.profile(self.profile.as_deref()) {
            Some(profile) => Ok(profile.clone()),
            None => match &self.profile {
                Some(name) => Err(anyhow!("profile '{}' not found in config", name)),
                None => Err(anyhow!("no connection profile configured; pass --host or add a [[profiles]] entry")),
            },
        }
    }
}
