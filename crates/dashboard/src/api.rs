//! HTTP API for the dashboard, health checks and Prometheus metrics

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use dashboard_lib::{
    agents::{AgentQuery, AgentRegistry, AgentSummary, AgentUpdate, NewAgent},
    health::{ComponentStatus, HealthRegistry},
    metadata::metadata_from_json,
    models::now_timestamp,
    monitor::{aggregate, summarize, Aggregation, MetricIngestor, MetricQuery},
    pagination::Page,
    recommendations::{RecommendationRequest, Recommender},
    sentiment::SentimentAnalyzer,
    store::{to_document, Document},
    ServiceContext,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::config::DashboardConfig;
use crate::error::ApiError;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Listing limits: (default, max)
const METRICS_LIMITS: (usize, usize) = (100, 1000);
const AGENT_LIMITS: (usize, usize) = (50, 100);
const SENTIMENT_LIMITS: (usize, usize) = (50, 100);
const RECOMMENDATION_LIMITS: (usize, usize) = (20, 100);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub context: ServiceContext,
    pub health_registry: HealthRegistry,
    pub ingestor: MetricIngestor,
    pub agents: AgentRegistry,
    pub sentiment: SentimentAnalyzer,
    pub recommender: Recommender,
}

impl AppState {
    pub fn new(
        service_name: impl Into<String>,
        context: ServiceContext,
        health_registry: HealthRegistry,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            ingestor: MetricIngestor::new(context.clone()).with_health(health_registry.clone()),
            agents: AgentRegistry::new(context.clone()),
            sentiment: SentimentAnalyzer::new(context.clone()),
            recommender: Recommender::new(context.clone()),
            context,
            health_registry,
        }
    }
}

fn page(limit: Option<usize>, offset: Option<usize>, bounds: (usize, usize)) -> ApiResult<Page> {
    Ok(Page::from_query(limit, offset, bounds.0, bounds.1)?)
}

/// Health check response - returns 200 if healthy, 503 if degraded/unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            e.to_string().into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Service identity plus a fresh store check
async fn api_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    state
        .health_registry
        .check_store(state.context.store.as_ref())
        .await;
    let health = state.health_registry.health().await;

    Json(json!({
        "status": health.status,
        "service": state.service_name,
        "timestamp": now_timestamp(),
        "components": health.components,
    }))
}

#[derive(Debug, Deserialize)]
struct MetricsParams {
    service: Option<String>,
    metric_type: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
    aggregation: Option<String>,
}

async fn list_metrics(
    State(state): State<Arc<AppState>>,
    params: Result<Query<MetricsParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let page = page(params.limit, params.offset, METRICS_LIMITS)?;
    let aggregation: Aggregation = match params.aggregation.as_deref() {
        Some(raw) => raw.parse()?,
        None => Aggregation::Raw,
    };

    let query = MetricQuery {
        service: params.service,
        metric_type: params.metric_type,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let records = query.fetch(state.context.store.as_ref(), page).await?;

    let data: Vec<Document> = match aggregation {
        Aggregation::Raw => records,
        bucketed => aggregate(&records, bucketed)
            .iter()
            .map(to_document)
            .collect::<dashboard_lib::Result<_>>()?,
    };
    let summary = summarize(&data);

    Ok(Json(json!({
        "status": "success",
        "data": data,
        "summary": summary,
        "pagination": page.meta(data.len()),
        "filters_applied": {
            "service": query.service,
            "metric_type": query.metric_type,
            "start_date": query.start_date,
            "end_date": query.end_date,
            "aggregation": aggregation,
        },
    })))
}

#[derive(Debug, Deserialize)]
struct RecordMetricRequest {
    service: String,
    metric_type: String,
    value: f64,
    #[serde(default)]
    metadata: Option<Value>,
}

async fn record_metric(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RecordMetricRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let metadata = metadata_from_json(request.metadata)?;

    let observation = state
        .ingestor
        .ingest(&request.service, &request.metric_type, request.value, metadata)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Performance metric recorded successfully",
        "data": observation,
    })))
}

#[derive(Debug, Deserialize)]
struct AgentParams {
    #[serde(rename = "type")]
    agent_type: Option<String>,
    status: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
    #[serde(default)]
    include_stats: bool,
}

async fn list_agents(
    State(state): State<Arc<AppState>>,
    params: Result<Query<AgentParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let page = page(params.limit, params.offset, AGENT_LIMITS)?;
    let query = AgentQuery {
        agent_type: params.agent_type,
        status: params.status,
    };

    let agents = state
        .agents
        .list(&query, page, params.include_stats)
        .await?;
    let summary = AgentSummary::from_documents(&agents);

    Ok(Json(json!({
        "status": "success",
        "data": agents,
        "summary": summary,
        "pagination": page.meta(agents.len()),
    })))
}

async fn create_agent(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewAgent>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let agent = state.agents.create(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Agent created successfully",
            "data": agent,
        })),
    ))
}

async fn update_agent(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentUpdate>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(update) = payload?;
    let agent = state.agents.update(update).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Agent updated successfully",
        "data": agent,
    })))
}

#[derive(Debug, Deserialize)]
struct DeleteAgentRequest {
    #[serde(default)]
    id: String,
}

async fn delete_agent(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeleteAgentRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    state.agents.delete(&request.id).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Agent deleted successfully",
    })))
}

#[derive(Debug, Deserialize)]
struct SentimentParams {
    limit: Option<usize>,
    offset: Option<usize>,
    text_filter: Option<String>,
}

async fn list_sentiment(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SentimentParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let page = page(params.limit, params.offset, SENTIMENT_LIMITS)?;
    let analyses = state
        .sentiment
        .list(params.text_filter.as_deref(), page)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": analyses,
        "pagination": page.meta(analyses.len()),
    })))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    text: String,
}

async fn analyze_sentiment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let analysis = state.sentiment.analyze(&request.text).await?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "id": analysis.id,
            "text": analysis.text,
            "sentiment": analysis.sentiment,
            "score": analysis.score,
            "confidence": analysis.confidence,
            "keywords": analysis.keywords,
            "analysis_time": analysis.created_at,
        },
    })))
}

#[derive(Debug, Deserialize)]
struct RecommendationParams {
    category: Option<String>,
    user_id: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

async fn list_recommendations(
    State(state): State<Arc<AppState>>,
    params: Result<Query<RecommendationParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let page = page(params.limit, params.offset, RECOMMENDATION_LIMITS)?;
    let recommendations = state
        .recommender
        .list(params.category.as_deref(), params.user_id.as_deref(), page)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "data": recommendations,
        "pagination": page.meta(recommendations.len()),
    })))
}

async fn generate_recommendations(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let generated = state.recommender.generate(request).await?;

    Ok(Json(json!({
        "status": "success",
        "message": format!("Generated {} recommendations", generated.total_generated),
        "data": generated,
    })))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>, config: &DashboardConfig) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/health", get(api_health))
        .route(
            "/api/performance-monitor",
            get(list_metrics).post(record_metric),
        )
        .route(
            "/api/agent-factory",
            get(list_agents)
                .post(create_agent)
                .put(update_agent)
                .delete(delete_agent),
        )
        .route(
            "/api/sentiment-agent",
            get(list_sentiment).post(analyze_sentiment),
        )
        .route(
            "/api/recommendation-agent",
            get(list_recommendations).post(generate_recommendations),
        )
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the API server
pub async fn serve(config: DashboardConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state, &config);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
