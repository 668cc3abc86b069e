//! Log sampling command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, LogSample};
use crate::output::{color_level, format_timestamp, print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Trace")]
    trace_id: String,
    #[tabled(rename = "Host")]
    host: String,
}

pub async fn sample(client: &ApiClient, count: i64, format: OutputFormat) -> Result<()> {
    let result: LogSample = client
        .get_with_query("logs/sample", &[("count", count)])
        .await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let rows: Vec<LogRow> = result
                .logs
                .iter()
                .map(|entry| LogRow {
                    timestamp: format_timestamp(&entry.timestamp),
                    level: color_level(&entry.level),
                    service: entry.service.clone(),
                    message: entry.message.clone(),
                    trace_id: entry.trace_id.clone(),
                    host: entry.host.clone(),
                })
                .collect();
            print_table(&rows);
        }
    }

    Ok(())
}
