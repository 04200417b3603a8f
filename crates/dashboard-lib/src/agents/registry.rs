//! Agent lifecycle: creation, listing, updates and soft deletion

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::stats::AgentStatsCalculator;
use crate::context::ServiceContext;
use crate::error::{DashboardError, Result};
use crate::models::{format_timestamp, new_id, AgentStats, AgentTaskCounters};
use crate::pagination::Page;
use crate::store::{
    collections, from_document, to_document, Document, Filter, FindOptions, SortOrder,
};

/// Kinds of agent the factory can create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Sentiment,
    Recommendation,
    Performance,
    Custom,
}

impl AgentType {
    pub const ALL: [AgentType; 4] = [
        AgentType::Sentiment,
        AgentType::Recommendation,
        AgentType::Performance,
        AgentType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Sentiment => "sentiment",
            AgentType::Recommendation => "recommendation",
            AgentType::Performance => "performance",
            AgentType::Custom => "custom",
        }
    }

    /// Configuration every new agent of this type starts from
    pub fn default_config(&self) -> Map<String, Value> {
        let config = match self {
            AgentType::Sentiment => json!({
                "max_concurrent_tasks": 5,
                "timeout_ms": 30000,
                "confidence_threshold": 0.6,
                "language": "en"
            }),
            AgentType::Recommendation => json!({
                "max_concurrent_tasks": 10,
                "timeout_ms": 45000,
                "max_recommendations": 20,
                "categories": ["technology", "fashion", "food", "entertainment"]
            }),
            AgentType::Performance => json!({
                "max_concurrent_tasks": 15,
                "timeout_ms": 15000,
                "alert_thresholds": {
                    "response_time": 3000,
                    "cpu_usage": 90,
                    "memory_usage": 95
                },
                "aggregation_interval": 300000
            }),
            AgentType::Custom => json!({
                "max_concurrent_tasks": 5,
                "timeout_ms": 30000
            }),
        };

        match config {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = DashboardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AgentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                DashboardError::validation(
                    "Invalid agent type. Must be one of: sentiment, recommendation, performance, custom",
                )
            })
    }
}

/// Agent lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Created,
    Active,
    Inactive,
    Error,
    Maintenance,
    /// Only reachable through soft deletion
    Deleted,
}

impl AgentStatus {
    /// Statuses a caller may set directly
    pub const ASSIGNABLE: [AgentStatus; 5] = [
        AgentStatus::Created,
        AgentStatus::Active,
        AgentStatus::Inactive,
        AgentStatus::Error,
        AgentStatus::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Created => "created",
            AgentStatus::Active => "active",
            AgentStatus::Inactive => "inactive",
            AgentStatus::Error => "error",
            AgentStatus::Maintenance => "maintenance",
            AgentStatus::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = DashboardError;

    /// Parses assignable statuses only; `deleted` is rejected
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AgentStatus::ASSIGNABLE
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                DashboardError::validation(
                    "Invalid status. Must be one of: created, active, inactive, error, maintenance",
                )
            })
    }
}

/// A persisted agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    pub description: String,
    pub config: Map<String, Value>,
    pub status: AgentStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Request to create an agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAgent {
    pub name: String,
    #[serde(rename = "type")]
    pub agent_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: Option<Map<String, Value>>,
}

/// Partial update of an agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentUpdate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub config: Option<Map<String, Value>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Filters for agent listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentQuery {
    #[serde(rename = "type")]
    pub agent_type: Option<String>,
    pub status: Option<String>,
}

impl AgentQuery {
    fn filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(agent_type) = &self.agent_type {
            filter = filter.eq("type", agent_type.as_str());
        }
        if let Some(status) = &self.status {
            filter = filter.eq("status", status.as_str());
        }
        filter
    }
}

/// Counts over a page of agents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub total_agents: usize,
    pub active_agents: usize,
    pub inactive_agents: usize,
    pub error_agents: usize,
    pub types: BTreeMap<String, usize>,
}

impl AgentSummary {
    /// Summarise agent documents; agents without a type count as `unknown`
    pub fn from_documents(agents: &[Document]) -> Self {
        let status_count = |wanted: &str| {
            agents
                .iter()
                .filter(|a| a.get("status").and_then(Value::as_str) == Some(wanted))
                .count()
        };

        let mut types = BTreeMap::new();
        for agent in agents {
            let agent_type = agent
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            *types.entry(agent_type.to_string()).or_insert(0) += 1;
        }

        Self {
            total_agents: agents.len(),
            active_agents: status_count("active"),
            inactive_agents: status_count("inactive"),
            error_agents: status_count("error"),
            types,
        }
    }
}

/// Creates, lists, updates and retires agents
#[derive(Clone)]
pub struct AgentRegistry {
    ctx: ServiceContext,
}

impl AgentRegistry {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an agent and its zeroed task counters
    ///
    /// Failing to write the counters is logged; the agent is still created.
    pub async fn create(&self, request: NewAgent) -> Result<Agent> {
        if request.name.trim().is_empty() {
            return Err(DashboardError::validation("name and type are required"));
        }
        let agent_type: AgentType = request.agent_type.parse()?;

        let now = Utc::now();
        let timestamp = format_timestamp(now);

        let mut config = agent_type.default_config();
        if let Some(overrides) = request.config {
            config.extend(overrides);
        }

        let agent = Agent {
            id: new_id(),
            name: request.name,
            agent_type,
            description: request
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("{} agent created via API", agent_type)),
            config,
            status: AgentStatus::Created,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        };

        self.ctx
            .store
            .insert_one(collections::AGENTS, to_document(&agent)?)
            .await?;

        let counters = AgentTaskCounters::initial(&agent.id, now);
        let initialised = match to_document(&counters) {
            Ok(document) => {
                self.ctx
                    .store
                    .insert_one(collections::AGENT_TASKS, document)
                    .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = initialised {
            self.ctx.metrics.inc_store_errors();
            self.ctx
                .logger
                .log_counters_init_failed(&agent.id, &e.to_string());
        }

        self.ctx.metrics.inc_agents_created(agent_type.as_str());
        self.ctx
            .logger
            .log_agent_created(&agent.id, &agent.name, agent_type.as_str());

        Ok(agent)
    }

    /// List agents newest first, optionally attaching stats to each
    ///
    /// With `include_stats`, agents whose stats cannot be produced get
    /// `"stats": null` instead of failing the listing.
    pub async fn list(
        &self,
        query: &AgentQuery,
        page: Page,
        include_stats: bool,
    ) -> Result<Vec<Document>> {
        let options = FindOptions::new()
            .sort_by("created_at", SortOrder::Descending)
            .skip(page.offset)
            .limit(page.limit);
        let mut agents = self
            .ctx
            .store
            .find(collections::AGENTS, &query.filter(), &options)
            .await?;

        if include_stats {
            for agent in &mut agents {
                let agent_id = agent
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let stats = match self.stats_for(&agent_id).await {
                    Ok(stats) => serde_json::to_value(stats)?,
                    Err(e) => {
                        self.ctx
                            .logger
                            .log_stats_unavailable(&agent_id, &e.to_string());
                        Value::Null
                    }
                };
                agent.insert("stats".to_string(), stats);
            }
        }

        Ok(agents)
    }

    /// Stats for one agent, or `NotFound` when it has no counters record
    pub async fn stats_for(&self, agent_id: &str) -> Result<AgentStats> {
        let document = self
            .ctx
            .store
            .find_one(collections::AGENT_TASKS, &Filter::new().eq("agent_id", agent_id))
            .await?
            .ok_or_else(|| {
                DashboardError::not_found(format!("no task counters for agent '{}'", agent_id))
            })?;

        let counters: AgentTaskCounters = from_document(document)?;
        Ok(AgentStatsCalculator::compute_stats(&counters, Utc::now()))
    }

    /// Apply a partial update
    pub async fn update(&self, update: AgentUpdate) -> Result<Document> {
        if update.id.trim().is_empty() {
            return Err(DashboardError::validation("Agent ID is required"));
        }

        let mut patch = Document::new();
        patch.insert(
            "updated_at".to_string(),
            Value::String(format_timestamp(Utc::now())),
        );
        if let Some(name) = update.name.filter(|n| !n.is_empty()) {
            patch.insert("name".to_string(), Value::String(name));
        }
        if let Some(status) = update.status.filter(|s| !s.is_empty()) {
            let status: AgentStatus = status.parse()?;
            patch.insert("status".to_string(), Value::String(status.to_string()));
        }
        if let Some(config) = update.config {
            patch.insert("config".to_string(), Value::Object(config));
        }
        if let Some(description) = update.description.filter(|d| !d.is_empty()) {
            patch.insert("description".to_string(), Value::String(description));
        }

        self.ctx
            .store
            .update_one(
                collections::AGENTS,
                &Filter::new().eq("id", update.id.as_str()),
                patch,
            )
            .await?
            .ok_or_else(|| DashboardError::not_found("Agent not found"))
    }

    /// Soft delete: the agent is kept with status `deleted`
    pub async fn delete(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(DashboardError::validation("Agent ID is required"));
        }

        let mut patch = Document::new();
        patch.insert(
            "status".to_string(),
            Value::String(AgentStatus::Deleted.to_string()),
        );
        patch.insert(
            "updated_at".to_string(),
            Value::String(format_timestamp(Utc::now())),
        );

        self.ctx
            .store
            .update_one(collections::AGENTS, &Filter::new().eq("id", id), patch)
            .await?
            .map(|_| ())
            .ok_or_else(|| DashboardError::not_found("Agent not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{doc, DocumentStore};

    fn registry() -> (AgentRegistry, ServiceContext) {
        let ctx = ServiceContext::in_memory("test");
        (AgentRegistry::new(ctx.clone()), ctx)
    }

    fn new_agent(name: &str, agent_type: &str) -> NewAgent {
        NewAgent {
            name: name.to_string(),
            agent_type: agent_type.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults_and_initialises_counters() {
        let (registry, ctx) = registry();

        let mut overrides = Map::new();
        overrides.insert("timeout_ms".to_string(), json!(1000));
        let agent = registry
            .create(NewAgent {
                config: Some(overrides),
                ..new_agent("mood-bot", "sentiment")
            })
            .await
            .unwrap();

        assert_eq!(agent.status, AgentStatus::Created);
        assert_eq!(agent.description, "sentiment agent created via API");
        assert_eq!(agent.config["timeout_ms"], json!(1000));
        assert_eq!(agent.config["language"], json!("en"));
        assert_eq!(agent.created_at, agent.updated_at);

        let counters = ctx
            .store
            .find_one(
                collections::AGENT_TASKS,
                &Filter::new().eq("agent_id", agent.id.as_str()),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(counters["tasks_completed"], json!(0));
        assert_eq!(counters["tasks_failed"], json!(0));

        let stats = registry.stats_for(&agent.id).await.unwrap();
        assert_eq!(stats.success_rate, 0.0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_requests() {
        let (registry, _ctx) = registry();

        let err = registry.create(new_agent("x", "quantum")).await.unwrap_err();
        assert!(err.to_string().contains("Invalid agent type"));

        let err = registry.create(new_agent("", "custom")).await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_with_filters_and_stats() {
        let (registry, ctx) = registry();
        let first = registry.create(new_agent("a", "sentiment")).await.unwrap();
        registry.create(new_agent("b", "performance")).await.unwrap();

        // An agent with no counters record
        ctx.store
            .insert_one(
                collections::AGENTS,
                doc(json!({ "id": "orphan", "name": "orphan", "type": "sentiment", "status": "active", "created_at": "2000-01-01T00:00:00+00:00" })),
            )
            .await
            .unwrap();

        let query = AgentQuery {
            agent_type: Some("sentiment".to_string()),
            status: None,
        };
        let agents = registry.list(&query, Page::new(50, 0), true).await.unwrap();

        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0]["id"], json!(first.id));
        assert!(agents[0]["stats"].is_object());
        assert_eq!(agents[1]["id"], json!("orphan"));
        assert!(agents[1]["stats"].is_null());
    }

    #[tokio::test]
    async fn test_list_without_stats_has_no_stats_key() {
        let (registry, _ctx) = registry();
        registry.create(new_agent("a", "custom")).await.unwrap();

        let agents = registry
            .list(&AgentQuery::default(), Page::new(50, 0), false)
            .await
            .unwrap();
        assert!(!agents[0].contains_key("stats"));
    }

    #[tokio::test]
    async fn test_stats_for_unknown_agent_is_not_found() {
        let (registry, _ctx) = registry();
        let err = registry.stats_for("ghost").await.unwrap_err();
        assert!(matches!(err, DashboardError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_and_soft_delete() {
        let (registry, _ctx) = registry();
        let agent = registry.create(new_agent("a", "custom")).await.unwrap();

        let updated = registry
            .update(AgentUpdate {
                id: agent.id.clone(),
                status: Some("active".to_string()),
                name: Some("renamed".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated["status"], json!("active"));
        assert_eq!(updated["name"], json!("renamed"));

        let err = registry
            .update(AgentUpdate {
                id: agent.id.clone(),
                status: Some("deleted".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid status"));

        registry.delete(&agent.id).await.unwrap();
        let agents = registry
            .list(
                &AgentQuery {
                    agent_type: None,
                    status: Some("deleted".to_string()),
                },
                Page::new(10, 0),
                false,
            )
            .await
            .unwrap();
        assert_eq!(agents.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_agent() {
        let (registry, _ctx) = registry();

        let err = registry
            .update(AgentUpdate {
                id: "ghost".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::NotFound(_)));

        let err = registry.delete("ghost").await.unwrap_err();
        assert!(matches!(err, DashboardError::NotFound(_)));

        let err = registry.delete("").await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
    }

    #[test]
    fn test_summary() {
        let agents = vec![
            doc(json!({ "type": "sentiment", "status": "active" })),
            doc(json!({ "type": "sentiment", "status": "inactive" })),
            doc(json!({ "type": "performance", "status": "error" })),
            doc(json!({ "status": "active" })),
        ];

        let summary = AgentSummary::from_documents(&agents);
        assert_eq!(summary.total_agents, 4);
        assert_eq!(summary.active_agents, 2);
        assert_eq!(summary.inactive_agents, 1);
        assert_eq!(summary.error_agents, 1);
        assert_eq!(summary.types["sentiment"], 2);
        assert_eq!(summary.types["unknown"], 1);

        assert_eq!(AgentSummary::from_documents(&[]), AgentSummary::default());
    }

    #[test]
    fn test_default_configs() {
        let config = AgentType::Performance.default_config();
        assert_eq!(config["alert_thresholds"]["cpu_usage"], json!(90));
        assert_eq!(config["aggregation_interval"], json!(300000));
        assert_eq!(
            AgentType::Recommendation.default_config()["max_recommendations"],
            json!(20)
        );
    }
}
