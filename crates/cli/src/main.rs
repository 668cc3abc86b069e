//! AIOps Simulator CLI
//!
//! A command-line client for the telemetry simulator: fetch metric
//! snapshots, simulate incidents and sample application logs.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{incidents, logs, metrics, system};

/// AIOps Simulator CLI
#[derive(Parser)]
#[command(name = "simctl")]
#[command(author, version, about = "CLI for the AIOps Telemetry Simulator", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via SIMCTL_API_URL env var)
    #[arg(long, env = "SIMCTL_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Metric snapshots
    #[command(subcommand)]
    Metrics(MetricsCommands),

    /// Simulated incidents
    #[command(subcommand)]
    Incidents(IncidentsCommands),

    /// Sample application logs
    #[command(subcommand)]
    Logs(LogsCommands),

    /// Simulated cluster information
    #[command(subcommand)]
    System(SystemCommands),

    /// Show service health
    Health,

    /// Show or update CLI configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum MetricsCommands {
    /// Generate a fresh snapshot
    Current,

    /// Show recorded snapshots
    History {
        /// Number of snapshots to return (server caps at 100)
        #[arg(long, short, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum IncidentsCommands {
    /// Simulate a new incident
    Simulate,

    /// List recorded incidents
    List {
        /// Number of incidents to return (server caps at 50)
        #[arg(long, short, default_value_t = 10)]
        limit: i64,
    },

    /// Show suggested actions for an incident type
    Actions {
        /// Incident type, e.g. high_cpu or memory_leak
        incident_type: String,
    },
}

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Generate sample log entries
    Sample {
        /// Number of entries (server caps at 20)
        #[arg(long, short, default_value_t = 5)]
        count: i64,
    },
}

#[derive(Subcommand)]
pub enum SystemCommands {
    /// Show environment, services and nodes
    Info,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write settings to the config file
    Set {
        /// API endpoint URL to store
        #[arg(long)]
        api_url: Option<String>,

        /// Default output format to store
        #[arg(long)]
        default_format: Option<output::OutputFormat>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = config::Config::load()?;
    let api_url = file_config.resolve_api_url(cli.api_url.as_deref());
    let format = file_config.resolve_format(cli.format)?;

    match cli.command {
        // Config commands do not talk to the API
        Commands::Config(ConfigCommands::Show) => {
            system::show_config(&file_config, &api_url, format)
        }
        Commands::Config(ConfigCommands::Set {
            api_url,
            default_format,
        }) => system::set_config(file_config, api_url, default_format),
        command => {
            let client = client::ApiClient::new(&api_url)?;
            run(&client, command, format).await
        }
    }
}

async fn run(client: &client::ApiClient, command: Commands, format: output::OutputFormat) -> Result<()> {
    match command {
        Commands::Metrics(metrics_cmd) => match metrics_cmd {
            MetricsCommands::Current => metrics::show_current(client, format).await,
            MetricsCommands::History { limit } => metrics::show_history(client, limit, format).await,
        },
        Commands::Incidents(incidents_cmd) => match incidents_cmd {
            IncidentsCommands::Simulate => incidents::simulate(client, format).await,
            IncidentsCommands::List { limit } => incidents::list(client, limit, format).await,
            IncidentsCommands::Actions { incident_type } => {
                incidents::actions(client, &incident_type, format).await
            }
        },
        Commands::Logs(LogsCommands::Sample { count }) => logs::sample(client, count, format).await,
        Commands::System(SystemCommands::Info) => system::show_info(client, format).await,
        Commands::Health => system::show_health(client, format).await,
        Commands::Config(_) => anyhow::bail!("config commands run without an API client"),
    }
}
