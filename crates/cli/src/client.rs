//! API client for communicating with the dashboard API

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// API client for the dashboard API
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path).context("Invalid path")?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await.context("Failed to send request")?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => anyhow::bail!("API error ({}, {}): {}", status, err.error_code, err.message),
                Err(_) => anyhow::bail!("API error ({}): {}", status, body),
            }
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a GET request with query parameters
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path, query)?;
        Self::send(self.client.get(url)).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path, &[])?;
        Self::send(self.client.post(url).json(body)).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path, &[])?;
        Self::send(self.client.put(url).json(body)).await
    }

    /// Make a DELETE request with JSON body
    pub async fn delete<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path, &[])?;
        Self::send(self.client.delete(url).json(body)).await
    }
}

/// Collect the query parameters that were actually given
pub fn query_params<'a>(params: &[(&'a str, Option<String>)]) -> Vec<(&'a str, String)> {
    params
        .iter()
        .filter_map(|(k, v)| v.clone().map(|v| (*k, v)))
        .collect()
}

// API response types

/// Standard success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Envelope for endpoints that only acknowledge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub timestamp: String,
    #[serde(default)]
    pub components: Map<String, Value>,
}

/// A metric row; aggregated rows carry `count` and no `id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub metric_type: Option<String>,
    pub value: f64,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetricRequest {
    pub service: String,
    pub metric_type: String,
    pub value: f64,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStats {
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub success_rate: f64,
    pub average_response_time: f64,
    #[serde(default)]
    pub last_activity: Option<String>,
    pub uptime_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub agent_type: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<AgentStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub sentiment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub id: String,
    pub text: String,
    pub sentiment: String,
    pub score: f64,
    pub confidence: f64,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default, alias = "analysis_time")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub rating: f64,
    #[serde(default)]
    pub price: Option<f64>,
    pub recommendation_score: u32,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub price: Option<f64>,
    pub rating: f64,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub user_id: String,
    pub category: String,
    pub preferences: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedRecommendations {
    pub user_id: String,
    pub category: String,
    pub recommendations: Vec<CatalogItem>,
    pub total_generated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub error_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_get_sends_query_and_parses_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/sentiment-agent")
            .match_query(Matcher::UrlEncoded("text_filter".into(), "great day".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"success","data":[{"id":"s1","text":"a great day","sentiment":"positive","score":0.333,"confidence":33.3,"keywords":[{"word":"great","sentiment":"positive"}],"created_at":"2024-01-01T00:00:00.000000+00:00"}],"pagination":{"limit":50,"offset":0,"count":1}}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let result: Envelope<Vec<SentimentRecord>> = client
            .get(
                "api/sentiment-agent",
                &query_params(&[
                    ("text_filter", Some("great day".to_string())),
                    ("limit", None),
                ]),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].keywords[0].word, "great");
        assert_eq!(result.pagination.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_error_body_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/api/agent-factory")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"error","message":"not found: Agent not found","error_code":"NOT_FOUND"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let request = AgentRequest {
            id: Some("ghost".to_string()),
            ..Default::default()
        };
        let err = client
            .put::<Envelope<Agent>, _>("api/agent-factory", &request)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("NOT_FOUND"));
        assert!(message.contains("Agent not found"));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/performance-monitor")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "service": "api",
                "metric_type": "cpu_usage",
                "value": 75.0
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success","message":"Performance metric recorded successfully","data":{"id":"m1","service":"api","metric_type":"cpu_usage","value":75.0,"timestamp":"2024-01-01T00:00:00.000000+00:00","metadata":{"source":"api"}}}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let request = RecordMetricRequest {
            service: "api".to_string(),
            metric_type: "cpu_usage".to_string(),
            value: 75.0,
            metadata: Map::new(),
        };
        let result: Envelope<MetricRecord> = client
            .post("api/performance-monitor", &request)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.data.id.as_deref(), Some("m1"));
    }

    #[test]
    fn test_query_params_skips_missing() {
        let params = query_params(&[("a", Some("1".to_string())), ("b", None)]);
        assert_eq!(params, vec![("a", "1".to_string())]);
    }
}
