//! Filtered, paginated reads of recorded metrics

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pagination::Page;
use crate::store::{collections, Document, DocumentStore, Filter, FindOptions, SortOrder};

/// Filters applied to a metric listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricQuery {
    pub service: Option<String>,
    pub metric_type: Option<String>,
    /// Inclusive lower bound on `timestamp`
    pub start_date: Option<String>,
    /// Inclusive upper bound on `timestamp`
    pub end_date: Option<String>,
}

impl MetricQuery {
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(service) = &self.service {
            filter = filter.eq("service", service.as_str());
        }
        if let Some(metric_type) = &self.metric_type {
            filter = filter.eq("metric_type", metric_type.as_str());
        }
        if let Some(start) = &self.start_date {
            filter = filter.gte("timestamp", start.as_str());
        }
        if let Some(end) = &self.end_date {
            filter = filter.lte("timestamp", end.as_str());
        }
        filter
    }

    /// Fetch one page of matching metrics, newest first
    pub async fn fetch(&self, store: &dyn DocumentStore, page: Page) -> Result<Vec<Document>> {
        let options = FindOptions::new()
            .sort_by("timestamp", SortOrder::Descending)
            .skip(page.offset)
            .limit(page.limit);
        store
            .find(collections::PERFORMANCE_METRICS, &self.filter(), &options)
            .await
    }
}
