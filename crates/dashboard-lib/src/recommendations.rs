//! Catalog-backed product recommendations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::ServiceContext;
use crate::error::{DashboardError, Result};
use crate::models::{new_id, now_timestamp};
use crate::pagination::Page;
use crate::store::{collections, to_document, Document, Filter, FindOptions, SortOrder};

/// An item the recommender can suggest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub id: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub price: Option<f64>,
    pub rating: f64,
    pub category: &'static str,
    pub score: u32,
    pub features: &'static [&'static str],
}

const TECHNOLOGY: &[CatalogItem] = &[
    CatalogItem {
        id: "tech_001",
        name: "iPhone 15 Pro Max",
        title: "Latest iPhone with Advanced Camera",
        description: "Experience the most advanced iPhone with pro camera system and A17 Pro chip",
        price: Some(1199.0),
        rating: 4.8,
        category: "smartphone",
        score: 95,
        features: &["A17 Pro Chip", "48MP Camera", "Titanium Design"],
    },
    CatalogItem {
        id: "tech_002",
        name: "MacBook Air M3",
        title: "Ultra-thin Laptop with M3 Chip",
        description: "Incredibly thin and powerful laptop for professionals and students",
        price: Some(1299.0),
        rating: 4.7,
        category: "laptop",
        score: 92,
        features: &["M3 Chip", "18hr Battery", "Liquid Retina Display"],
    },
    CatalogItem {
        id: "tech_003",
        name: "iPad Pro 12.9\"",
        title: "Professional Tablet for Creative Work",
        description: "The ultimate iPad for creative professionals and power users",
        price: Some(1099.0),
        rating: 4.6,
        category: "tablet",
        score: 89,
        features: &["M2 Chip", "Liquid Retina XDR", "Apple Pencil Support"],
    },
];

const FASHION: &[CatalogItem] = &[
    CatalogItem {
        id: "fashion_001",
        name: "Nike Air Jordan 1",
        title: "Classic Basketball Shoes",
        description: "Iconic basketball shoes with timeless style and comfort",
        price: Some(170.0),
        rating: 4.5,
        category: "shoes",
        score: 88,
        features: &["Leather Upper", "Air Sole Unit", "Classic Design"],
    },
    CatalogItem {
        id: "fashion_002",
        name: "Levi's 501 Original",
        title: "Classic Straight Leg Jeans",
        description: "The original straight leg jeans that started it all",
        price: Some(98.0),
        rating: 4.4,
        category: "jeans",
        score: 85,
        features: &["100% Cotton", "Button Fly", "Classic Fit"],
    },
    CatalogItem {
        id: "fashion_003",
        name: "Ray-Ban Aviator",
        title: "Classic Aviator Sunglasses",
        description: "Iconic sunglasses worn by pilots and style icons",
        price: Some(154.0),
        rating: 4.6,
        category: "accessories",
        score: 90,
        features: &["UV Protection", "Metal Frame", "Classic Design"],
    },
];

const FOOD: &[CatalogItem] = &[
    CatalogItem {
        id: "food_001",
        name: "Margherita Pizza",
        title: "Classic Italian Pizza",
        description: "Traditional pizza with fresh mozzarella, tomato sauce, and basil",
        price: Some(16.0),
        rating: 4.5,
        category: "italian",
        score: 87,
        features: &["Fresh Mozzarella", "San Marzano Tomatoes", "Fresh Basil"],
    },
    CatalogItem {
        id: "food_002",
        name: "Salmon Sushi Set",
        title: "Premium Sushi Selection",
        description: "Fresh salmon sushi and sashimi with wasabi and pickled ginger",
        price: Some(32.0),
        rating: 4.8,
        category: "japanese",
        score: 93,
        features: &["Fresh Salmon", "Sushi Rice", "Traditional Preparation"],
    },
    CatalogItem {
        id: "food_003",
        name: "Wagyu Burger",
        title: "Premium Beef Burger",
        description: "Gourmet burger made with premium wagyu beef and artisanal bun",
        price: Some(28.0),
        rating: 4.7,
        category: "american",
        score: 91,
        features: &["Wagyu Beef", "Artisanal Bun", "Gourmet Toppings"],
    },
];

const ENTERTAINMENT: &[CatalogItem] = &[
    CatalogItem {
        id: "ent_001",
        name: "Netflix Premium",
        title: "Unlimited Streaming Service",
        description: "Access to thousands of movies, TV shows, and documentaries",
        price: Some(15.99),
        rating: 4.3,
        category: "streaming",
        score: 85,
        features: &["4K Streaming", "Multiple Devices", "Original Content"],
    },
    CatalogItem {
        id: "ent_002",
        name: "Spotify Premium",
        title: "Music Streaming Service",
        description: "Ad-free music streaming with offline downloads",
        price: Some(9.99),
        rating: 4.5,
        category: "music",
        score: 88,
        features: &["Ad-Free", "Offline Mode", "70M+ Songs"],
    },
];

/// Catalog entries for a category; unknown categories have none
pub fn catalog(category: &str) -> &'static [CatalogItem] {
    match category {
        "technology" => TECHNOLOGY,
        "fashion" => FASHION,
        "food" => FOOD,
        "entertainment" => ENTERTAINMENT,
        _ => &[],
    }
}

/// Bounds applied to catalog items
///
/// A missing or zero bound is not applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Preferences {
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
}

impl Preferences {
    /// Read known bounds from a free-form preferences object
    pub fn from_map(preferences: &Map<String, Value>) -> Self {
        let bound = |key: &str| {
            preferences
                .get(key)
                .and_then(Value::as_f64)
                .filter(|v| *v != 0.0)
        };
        Self {
            max_price: bound("max_price"),
            min_rating: bound("min_rating"),
        }
    }

    /// Items without a price always pass the price bound
    fn admits(&self, item: &CatalogItem) -> bool {
        let price_ok = match (self.max_price, item.price) {
            (Some(max), Some(price)) => price <= max,
            _ => true,
        };
        let rating_ok = self.min_rating.map_or(true, |min| item.rating >= min);
        price_ok && rating_ok
    }
}

/// Catalog items for a category that satisfy the preferences, best score first
pub fn select(category: &str, preferences: &Preferences) -> Vec<CatalogItem> {
    let mut items: Vec<CatalogItem> = catalog(category)
        .iter()
        .filter(|item| preferences.admits(item))
        .cloned()
        .collect();
    items.sort_by(|a, b| b.score.cmp(&a.score));
    items
}

/// Request to generate recommendations for a user
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecommendationRequest {
    pub user_id: String,
    pub category: String,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

/// A stored recommendation for one user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecommendation {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub rating: f64,
    pub price: Option<f64>,
    pub recommendation_score: u32,
    pub metadata: CatalogItem,
    pub created_at: String,
}

/// Outcome of a generation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedRecommendations {
    pub user_id: String,
    pub category: String,
    pub recommendations: Vec<CatalogItem>,
    pub total_generated: usize,
}

/// Generates recommendations from the catalog and keeps them per user
#[derive(Clone)]
pub struct Recommender {
    ctx: ServiceContext,
}

impl Recommender {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Select catalog items and store one recommendation per item
    pub async fn generate(&self, request: RecommendationRequest) -> Result<GeneratedRecommendations> {
        if request.user_id.trim().is_empty() || request.category.trim().is_empty() {
            return Err(DashboardError::validation("user_id and category are required"));
        }

        let items = select(&request.category, &Preferences::from_map(&request.preferences));

        let created_at = now_timestamp();
        let documents = items
            .iter()
            .map(|item| {
                to_document(&UserRecommendation {
                    id: new_id(),
                    user_id: request.user_id.clone(),
                    item_id: item.id.to_string(),
                    category: request.category.clone(),
                    title: item.title.to_string(),
                    description: item.description.to_string(),
                    rating: item.rating,
                    price: item.price,
                    recommendation_score: item.score,
                    metadata: item.clone(),
                    created_at: created_at.clone(),
                })
            })
            .collect::<Result<Vec<Document>>>()?;

        if !documents.is_empty() {
            if let Err(e) = self
                .ctx
                .store
                .insert_many(collections::USER_RECOMMENDATIONS, documents)
                .await
            {
                self.ctx.metrics.inc_store_errors();
                return Err(e);
            }
        }

        self.ctx
            .metrics
            .add_recommendations_generated(items.len() as u64);

        Ok(GeneratedRecommendations {
            total_generated: items.len(),
            user_id: request.user_id,
            category: request.category,
            recommendations: items,
        })
    }

    /// Stored recommendations, highest rated first
    pub async fn list(
        &self,
        category: Option<&str>,
        user_id: Option<&str>,
        page: Page,
    ) -> Result<Vec<Document>> {
        let mut filter = Filter::new();
        if let Some(category) = category {
            filter = filter.eq("category", category);
        }
        if let Some(user_id) = user_id {
            filter = filter.eq("user_id", user_id);
        }

        let options = FindOptions::new()
            .sort_by("rating", SortOrder::Descending)
            .sort_by("created_at", SortOrder::Descending)
            .skip(page.offset)
            .limit(page.limit);
        self.ctx
            .store
            .find(collections::USER_RECOMMENDATIONS, &filter, &options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prefs(value: Value) -> Preferences {
        match value {
            Value::Object(map) => Preferences::from_map(&map),
            _ => Preferences::default(),
        }
    }

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(catalog("technology").len(), 3);
        assert_eq!(catalog("fashion").len(), 3);
        assert_eq!(catalog("food").len(), 3);
        assert_eq!(catalog("entertainment").len(), 2);
        assert!(catalog("gardening").is_empty());
    }

    #[test]
    fn test_select_sorted_by_score() {
        let items = select("fashion", &Preferences::default());
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["fashion_003", "fashion_001", "fashion_002"]);
    }

    #[test]
    fn test_select_applies_bounds() {
        let items = select("technology", &prefs(json!({ "max_price": 1200 })));
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["tech_001", "tech_003"]);

        let items = select("food", &prefs(json!({ "min_rating": 4.7 })));
        assert_eq!(items.len(), 2);

        // zero bounds are ignored
        let items = select("food", &prefs(json!({ "max_price": 0, "min_rating": 0 })));
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_generate_stores_one_document_per_item() {
        let recommender = Recommender::new(ServiceContext::in_memory("test"));

        let generated = recommender
            .generate(RecommendationRequest {
                user_id: "u1".to_string(),
                category: "entertainment".to_string(),
                preferences: Map::new(),
            })
            .await
            .unwrap();
        assert_eq!(generated.total_generated, 2);
        assert_eq!(generated.recommendations[0].id, "ent_002");

        let stored = recommender
            .list(None, Some("u1"), Page::new(20, 0))
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        // Spotify is rated 4.5, Netflix 4.3
        assert_eq!(stored[0]["item_id"], json!("ent_002"));
        assert_eq!(stored[0]["recommendation_score"], json!(88));
        assert_eq!(stored[0]["metadata"]["name"], json!("Spotify Premium"));
    }

    #[tokio::test]
    async fn test_generate_unknown_category_is_empty() {
        let recommender = Recommender::new(ServiceContext::in_memory("test"));
        let generated = recommender
            .generate(RecommendationRequest {
                user_id: "u1".to_string(),
                category: "gardening".to_string(),
                preferences: Map::new(),
            })
            .await
            .unwrap();
        assert_eq!(generated.total_generated, 0);
        assert!(recommender
            .list(Some("gardening"), None, Page::new(20, 0))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_generate_requires_user_and_category() {
        let recommender = Recommender::new(ServiceContext::in_memory("test"));
        let err = recommender
            .generate(RecommendationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
    }
}
