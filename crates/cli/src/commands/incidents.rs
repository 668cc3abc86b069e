//! Incident commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, IncidentList, SimulatedIncident, SuggestedActions};
use crate::output::{
    color_severity, color_status, format_timestamp, print_heading, print_json, print_success,
    print_table, OutputFormat,
};

/// Row for incidents table
#[derive(Tabled)]
struct IncidentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    incident_type: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detected")]
    detected: String,
}

fn print_actions(actions: &[String]) {
    println!("{}", "Suggested Actions".bold());
    println!("{}", "-".repeat(50));
    for (i, action) in actions.iter().enumerate() {
        println!("  {}. {}", i + 1, action);
    }
}

/// Simulate one incident
pub async fn simulate(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: SimulatedIncident = client.post("incidents/simulate").await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let incident = &result.incident;
            print_success(&result.message);
            println!();

            print_heading(&incident.title);
            println!("ID:                     {}", incident.incident_id.cyan());
            println!("Type:                   {}", incident.incident_type);
            println!("Service:                {}", incident.affected_service);
            println!(
                "Severity:               {} ({})",
                color_severity(&incident.severity),
                incident.priority
            );
            println!("Assigned team:          {}", incident.assigned_team);
            println!("Status:                 {}", color_status(&incident.status));
            println!(
                "Started:                {}",
                format_timestamp(&incident.incident_start_time)
            );
            println!(
                "Detected:               {}",
                format_timestamp(&incident.detection_time)
            );
            println!();
            println!("{}", incident.description);
            for indicator in &incident.indicators {
                println!("  - {}", indicator);
            }
            println!();

            print_actions(&result.suggested_actions);
        }
    }

    Ok(())
}

/// List recorded incidents, oldest first
pub async fn list(client: &ApiClient, limit: i64, format: OutputFormat) -> Result<()> {
    let result: IncidentList = client
        .get_with_query("incidents", &[("limit", limit)])
        .await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let rows: Vec<IncidentRow> = result
                .data
                .iter()
                .map(|record| {
                    let i = &record.incident;
                    IncidentRow {
                        id: i.incident_id.clone(),
                        incident_type: i.incident_type.clone(),
                        service: i.affected_service.clone(),
                        severity: color_severity(&i.severity),
                        priority: i.priority.clone(),
                        team: i.assigned_team.clone(),
                        status: color_status(&i.status),
                        detected: format_timestamp(&i.detection_time),
                    }
                })
                .collect();
            print_table(&rows);

            let summary = &result.summary;
            println!();
            println!(
                "Total: {}  High severity: {}  Resolved: {}",
                summary.total_incidents,
                summary.high_severity.to_string().red(),
                summary.resolved.to_string().green()
            );
        }
    }

    Ok(())
}

/// Show remediation hints for an incident type
pub async fn actions(client: &ApiClient, incident_type: &str, format: OutputFormat) -> Result<()> {
    let path = format!("incidents/actions/{}", incident_type);
    let result: SuggestedActions = client.get(&path).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            println!("Incident type:          {}", result.incident_type.cyan());
            println!();
            print_actions(&result.suggested_actions);
        }
    }

    Ok(())
}
