//! Recommendation agent commands

use anyhow::Result;
use serde_json::{json, Map};
use tabled::Tabled;

use crate::client::{
    query_params, ApiClient, Envelope, GenerateRequest, GeneratedRecommendations,
    RecommendationRecord,
};
use crate::output::{
    format_price, format_timestamp, print_json, print_rows, print_success, OutputFormat,
};

/// Row for stored recommendations table
#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Item")]
    item_id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

/// Row for freshly generated items
#[derive(Tabled)]
struct GeneratedRow {
    #[tabled(rename = "Item")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Score")]
    score: String,
}

/// List stored recommendations
pub async fn list_recommendations(
    client: &ApiClient,
    category: Option<String>,
    user_id: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let query = query_params(&[
        ("category", category),
        ("user_id", user_id),
        ("limit", limit.map(|l| l.to_string())),
        ("offset", offset.map(|o| o.to_string())),
    ]);
    let result: Envelope<Vec<RecommendationRecord>> =
        client.get("api/recommendation-agent", &query).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let rows: Vec<RecommendationRow> = result
                .data
                .iter()
                .map(|r| RecommendationRow {
                    item_id: r.item_id.clone(),
                    title: r.title.clone(),
                    category: r.category.clone(),
                    rating: format!("{:.1}", r.rating),
                    price: format_price(r.price),
                    score: r.recommendation_score.to_string(),
                    created_at: format_timestamp(&r.created_at),
                })
                .collect();
            print_rows(rows, "No recommendations found");
        }
    }

    Ok(())
}

/// Generate recommendations for a user
pub async fn generate(
    client: &ApiClient,
    user_id: String,
    category: String,
    max_price: Option<f64>,
    min_rating: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let mut preferences = Map::new();
    if let Some(max_price) = max_price {
        preferences.insert("max_price".to_string(), json!(max_price));
    }
    if let Some(min_rating) = min_rating {
        preferences.insert("min_rating".to_string(), json!(min_rating));
    }

    let request = GenerateRequest {
        user_id,
        category,
        preferences,
    };
    let result: Envelope<GeneratedRecommendations> =
        client.post("api/recommendation-agent", &request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            print_success(&format!(
                "Generated {} recommendations for {} in {}",
                result.data.total_generated, result.data.user_id, result.data.category
            ));
            let rows: Vec<GeneratedRow> = result
                .data
                .recommendations
                .iter()
                .map(|item| GeneratedRow {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    rating: format!("{:.1}", item.rating),
                    price: format_price(item.price),
                    score: item.score.to_string(),
                })
                .collect();
            print_rows(rows, "No catalog items matched");
        }
    }

    Ok(())
}
