//! Service health command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, HealthStatus};
use crate::output::{color_status, format_timestamp, print_json, print_rows, OutputFormat};

/// Row for component health table
#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// Show API health and component status
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: HealthStatus = client.get("api/health", &[]).await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            println!("Service:   {}", health.service);
            println!("Status:    {}", color_status(&health.status));
            println!("Checked:   {}", format_timestamp(&health.timestamp));
            println!();

            let rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, component)| ComponentRow {
                    name: name.clone(),
                    status: color_status(component["status"].as_str().unwrap_or("unknown")),
                    message: component["message"].as_str().unwrap_or("").to_string(),
                })
                .collect();
            print_rows(rows, "No components reported");
        }
    }

    Ok(())
}
