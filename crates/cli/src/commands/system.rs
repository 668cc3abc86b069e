//! System information, health and CLI configuration commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, HealthStatus, SystemInfo};
use crate::config::Config;
use crate::output::{
    color_status, format_timestamp, print_heading, print_json, print_success, print_table,
    OutputFormat,
};

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Service")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Version")]
    version: String,
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Node")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Zone")]
    zone: String,
}

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// Show the simulated cluster topology
pub async fn show_info(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let info: SystemInfo = client.get("system/info").await?;

    match format {
        OutputFormat::Json => print_json(&info)?,
        OutputFormat::Table => {
            print_heading("System Info");
            println!("Environment:            {}", info.environment.cyan());
            println!("Cluster:                {}", info.cluster);
            println!("Namespace:              {}", info.namespace);
            println!();

            let services: Vec<ServiceRow> = info
                .services
                .iter()
                .map(|s| ServiceRow {
                    name: s.name.clone(),
                    status: color_status(&s.status),
                    version: s.version.clone(),
                })
                .collect();
            print_table(&services);

            let nodes: Vec<NodeRow> = info
                .nodes
                .iter()
                .map(|n| NodeRow {
                    name: n.name.clone(),
                    role: n.role.clone(),
                    zone: n.zone.clone(),
                })
                .collect();
            print_table(&nodes);
        }
    }

    Ok(())
}

/// Show service health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: HealthStatus = client.get("health").await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            print_heading("Service Health");
            println!("Service:                {}", health.service);
            println!("Status:                 {}", color_status(&health.status));
            println!("Uptime:                 {}s", health.uptime_seconds);
            println!("Checked:                {}", format_timestamp(&health.timestamp));
            println!();

            let mut rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, c)| ComponentRow {
                    name: name.clone(),
                    status: color_status(&c.status),
                    message: c.message.clone().unwrap_or_default(),
                })
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            print_table(&rows);
        }
    }

    Ok(())
}

/// Show the effective CLI configuration
pub fn show_config(config: &Config, api_url: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config)?,
        OutputFormat::Table => {
            let path = Config::config_path()?;
            println!("Config file:            {}", path.display());
            println!("API URL:                {}", api_url.cyan());
            println!(
                "Default format:         {}",
                config.default_format.as_deref().unwrap_or("table")
            );
        }
    }

    Ok(())
}

/// Persist API URL and default format to the config file
pub fn set_config(mut config: Config, api_url: Option<String>, format: Option<OutputFormat>) -> Result<()> {
    if let Some(url) = api_url {
        url::Url::parse(&url)?;
        config.api_url = Some(url);
    }
    if let Some(format) = format {
        let name = match format {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        };
        config.default_format = Some(name.to_string());
    }

    config.save()?;
    print_success(&format!(
        "Configuration written to {}",
        Config::config_path()?.display()
    ));

    Ok(())
}
