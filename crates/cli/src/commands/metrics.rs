//! Metric snapshot commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, MetricSnapshot, MetricsHistory};
use crate::output::{
    color_percent, color_status, format_percent, format_timestamp, print_heading, print_info,
    print_json, print_table, print_warning, OutputFormat,
};

/// Row for the per-service table
#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Latency")]
    latency: String,
    #[tabled(rename = "RPS")]
    request_rate: u32,
    #[tabled(rename = "Errors")]
    error_rate: String,
    #[tabled(rename = "Pods")]
    pods: u32,
}

/// Row for the history table
#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Avg CPU")]
    cpu: String,
    #[tabled(rename = "Avg Memory")]
    memory: String,
    #[tabled(rename = "Avg Latency")]
    latency: String,
    #[tabled(rename = "Total RPS")]
    total_rps: u32,
    #[tabled(rename = "Status")]
    status: String,
}

/// Generate and show a fresh snapshot
pub async fn show_current(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let snapshot: MetricSnapshot = client.get("metrics/current").await?;

    match format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Table => {
            print_heading("Current Metrics");
            println!("Timestamp:              {}", format_timestamp(&snapshot.timestamp));
            println!(
                "Overall status:         {}",
                color_status(&snapshot.overall_status)
            );
            println!();

            let rows: Vec<ServiceRow> = snapshot
                .services
                .iter()
                .map(|(name, m)| ServiceRow {
                    service: name.clone(),
                    cpu: color_percent(m.cpu_usage_percent),
                    memory: color_percent(m.memory_usage_percent),
                    latency: format!("{:.2}ms", m.latency_ms),
                    request_rate: m.request_rate,
                    error_rate: format_percent(m.error_rate_percent),
                    pods: m.pod_count,
                })
                .collect();
            print_table(&rows);

            let system = &snapshot.system_wide;
            println!();
            println!("{}", "System Wide".bold());
            println!("{}", "-".repeat(50));
            println!("Avg CPU:                {}", format_percent(system.avg_cpu_percent));
            println!("Avg memory:             {}", format_percent(system.avg_memory_percent));
            println!("Avg latency:            {:.2}ms", system.avg_latency_ms);
            println!("Total RPS:              {}", system.total_rps);
            println!("Active connections:     {}", system.active_connections);
            println!();

            let anomaly = &snapshot.anomaly_detection;
            match (&anomaly.suspected_service, anomaly.has_anomaly) {
                (Some(service), true) => print_warning(&format!(
                    "Anomaly detected (score {:.2}), suspected service: {}",
                    anomaly.anomaly_score,
                    service.cyan()
                )),
                _ => print_info(&format!(
                    "No anomaly detected (score {:.2})",
                    anomaly.anomaly_score
                )),
            }
        }
    }

    Ok(())
}

/// Show recorded snapshots, oldest first
pub async fn show_history(client: &ApiClient, limit: i64, format: OutputFormat) -> Result<()> {
    let history: MetricsHistory = client
        .get_with_query("metrics/history", &[("limit", limit)])
        .await?;

    match format {
        OutputFormat::Json => print_json(&history)?,
        OutputFormat::Table => {
            print_heading("Metrics History");
            println!("Showing {} of up to {} snapshots", history.count, history.limit);
            println!();

            let rows: Vec<HistoryRow> = history
                .data
                .iter()
                .map(|record| {
                    let system = &record.metrics.system_wide;
                    HistoryRow {
                        timestamp: format_timestamp(&record.timestamp),
                        cpu: format_percent(system.avg_cpu_percent),
                        memory: format_percent(system.avg_memory_percent),
                        latency: format!("{:.2}ms", system.avg_latency_ms),
                        total_rps: system.total_rps,
                        status: color_status(&record.metrics.overall_status),
                    }
                })
                .collect();
            print_table(&rows);
        }
    }

    Ok(())
}
