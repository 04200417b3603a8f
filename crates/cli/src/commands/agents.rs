//! Agent factory commands

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tabled::Tabled;

use crate::client::{query_params, Ack, Agent, AgentRequest, ApiClient, Envelope};
use crate::output::{
    color_percent, color_status, format_timestamp, print_info, print_json, print_rows,
    print_success, truncate_id, OutputFormat,
};

/// Row for agents table
#[derive(Tabled)]
struct AgentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    agent_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Success")]
    success_rate: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

/// Filters for `agents list`
#[derive(Debug, Default)]
pub struct AgentFilters {
    pub agent_type: Option<String>,
    pub status: Option<String>,
    pub include_stats: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Parse a `--config` argument into a JSON object
pub fn parse_config(raw: Option<&str>) -> Result<Option<Map<String, Value>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(raw).context("Config must be valid JSON")? {
        Value::Object(map) => Ok(Some(map)),
        _ => anyhow::bail!("Config must be a JSON object"),
    }
}

/// List agents
pub async fn list_agents(client: &ApiClient, filters: AgentFilters, format: OutputFormat) -> Result<()> {
    let query = query_params(&[
        ("type", filters.agent_type),
        ("status", filters.status),
        ("include_stats", filters.include_stats.then(|| "true".to_string())),
        ("limit", filters.limit.map(|l| l.to_string())),
        ("offset", filters.offset.map(|o| o.to_string())),
    ]);
    let result: Envelope<Vec<Agent>> = client.get("api/agent-factory", &query).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let rows: Vec<AgentRow> = result
                .data
                .iter()
                .map(|a| AgentRow {
                    id: truncate_id(&a.id),
                    name: a.name.clone(),
                    agent_type: a.agent_type.clone(),
                    status: color_status(&a.status),
                    success_rate: a
                        .stats
                        .as_ref()
                        .map(|s| color_percent(s.success_rate))
                        .unwrap_or_else(|| "-".to_string()),
                    uptime: a
                        .stats
                        .as_ref()
                        .map(|s| format!("{:.1}%", s.uptime_percentage))
                        .unwrap_or_else(|| "-".to_string()),
                    created_at: format_timestamp(&a.created_at),
                })
                .collect();
            print_rows(rows, "No agents found");

            if let Some(summary) = &result.summary {
                print_info(&format!(
                    "{} agents: {} active, {} inactive, {} in error",
                    summary["total_agents"],
                    summary["active_agents"],
                    summary["inactive_agents"],
                    summary["error_agents"]
                ));
            }
        }
    }

    Ok(())
}

/// Create an agent
pub async fn create_agent(
    client: &ApiClient,
    request: AgentRequest,
    format: OutputFormat,
) -> Result<()> {
    let result: Envelope<Agent> = client.post("api/agent-factory", &request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            print_success(&format!("Agent '{}' created", result.data.name));
            println!("ID:          {}", result.data.id);
            println!("Type:        {}", result.data.agent_type);
            println!("Status:      {}", color_status(&result.data.status));
            println!("Description: {}", result.data.description);
        }
    }

    Ok(())
}

/// Update an agent
pub async fn update_agent(
    client: &ApiClient,
    request: AgentRequest,
    format: OutputFormat,
) -> Result<()> {
    let result: Envelope<Agent> = client.put("api/agent-factory", &request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            print_success(&format!("Agent {} updated", result.data.id));
            println!("Name:   {}", result.data.name);
            println!("Status: {}", color_status(&result.data.status));
        }
    }

    Ok(())
}

/// Soft-delete an agent
pub async fn delete_agent(client: &ApiClient, id: &str, format: OutputFormat) -> Result<()> {
    let request = AgentRequest {
        id: Some(id.to_string()),
        ..Default::default()
    };
    let result: Ack = client.delete("api/agent-factory", &request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => print_success(&format!("Agent {} deleted", id)),
    }

    Ok(())
}
