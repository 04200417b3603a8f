//! Lexicon-based sentiment scoring
//!
//! Texts are tokenised on whitespace, stripped of non-alphanumeric
//! characters and matched against fixed word lists. The net score is
//! normalised by the token count.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::context::ServiceContext;
use crate::error::{DashboardError, Result};
use crate::models::{new_id, now_timestamp, round_to};
use crate::pagination::Page;
use crate::store::{collections, to_document, Document, Filter, FindOptions, SortOrder};

/// Longest text accepted for analysis, in characters
pub const MAX_TEXT_CHARS: usize = 5000;

/// Most keywords reported per analysis
const MAX_KEYWORDS: usize = 10;

/// Normalised score beyond which a text is positive or negative
const POLARITY_THRESHOLD: f64 = 0.1;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "fantastic", "wonderful", "happy", "joy",
    "love", "best", "perfect", "outstanding", "brilliant", "superb", "marvelous", "incredible",
    "terrific", "fabulous", "impressive",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "worst", "terrible", "awful", "horrible", "disgusting", "hate", "sad", "angry",
    "frustrated", "disappointed", "poor", "pathetic", "useless", "worthless", "disaster",
    "nightmare", "ridiculous", "annoying",
];

const NEUTRAL_WORDS: &[&str] = &[
    "okay", "fine", "normal", "average", "standard", "typical", "regular", "moderate",
    "acceptable", "adequate",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexicon word found in the text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub sentiment: Sentiment,
}

/// Result of scoring one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub sentiment: Sentiment,
    pub score: f64,
    pub confidence: f64,
    pub keywords: Vec<Keyword>,
}

/// A persisted analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub id: String,
    pub text: String,
    pub sentiment: Sentiment,
    pub score: f64,
    pub confidence: f64,
    pub keywords: Vec<Keyword>,
    pub created_at: String,
}

fn classify_word(word: &str) -> Option<Sentiment> {
    if POSITIVE_WORDS.contains(&word) {
        Some(Sentiment::Positive)
    } else if NEGATIVE_WORDS.contains(&word) {
        Some(Sentiment::Negative)
    } else if NEUTRAL_WORDS.contains(&word) {
        Some(Sentiment::Neutral)
    } else {
        None
    }
}

/// Confidence in `[60, 80)` for neutral texts, stable for a given text
fn neutral_confidence(text: &str) -> f64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    60.0 + (u64::from_be_bytes(prefix) % 20) as f64
}

/// Score a text against the lexicon
pub fn score_text(text: &str) -> SentimentScore {
    let mut net = 0i64;
    let mut total_words = 0usize;
    let mut keywords = Vec::new();

    for token in text.to_lowercase().split_whitespace() {
        total_words += 1;
        let word: String = token.chars().filter(|c| c.is_alphanumeric()).collect();

        if let Some(sentiment) = classify_word(&word) {
            match sentiment {
                Sentiment::Positive => net += 1,
                Sentiment::Negative => net -= 1,
                Sentiment::Neutral => {}
            }
            keywords.push(Keyword { word, sentiment });
        }
    }

    let normalized = if total_words > 0 {
        net as f64 / total_words as f64
    } else {
        0.0
    };

    let (sentiment, confidence) = if normalized > POLARITY_THRESHOLD {
        (Sentiment::Positive, (normalized * 100.0).min(95.0))
    } else if normalized < -POLARITY_THRESHOLD {
        (Sentiment::Negative, (normalized.abs() * 100.0).min(95.0))
    } else {
        (Sentiment::Neutral, neutral_confidence(text))
    };

    keywords.truncate(MAX_KEYWORDS);

    SentimentScore {
        sentiment,
        score: round_to(normalized, 3),
        confidence: round_to(confidence, 1),
        keywords,
    }
}

/// Scores texts and keeps the analyses
#[derive(Clone)]
pub struct SentimentAnalyzer {
    ctx: ServiceContext,
}

impl SentimentAnalyzer {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Score and persist one text
    pub async fn analyze(&self, text: &str) -> Result<SentimentAnalysis> {
        let length = text.chars().count();
        if text.trim().is_empty() || length > MAX_TEXT_CHARS {
            return Err(DashboardError::validation(format!(
                "text must be between 1 and {} characters",
                MAX_TEXT_CHARS
            )));
        }

        let scored = score_text(text);
        let analysis = SentimentAnalysis {
            id: new_id(),
            text: text.to_string(),
            sentiment: scored.sentiment,
            score: scored.score,
            confidence: scored.confidence,
            keywords: scored.keywords,
            created_at: now_timestamp(),
        };

        if let Err(e) = self
            .ctx
            .store
            .insert_one(collections::SENTIMENT_ANALYSES, to_document(&analysis)?)
            .await
        {
            self.ctx.metrics.inc_store_errors();
            return Err(e);
        }

        self.ctx
            .metrics
            .inc_sentiment_analyses(analysis.sentiment.as_str());
        Ok(analysis)
    }

    /// Past analyses, newest first, optionally matching a case-insensitive substring
    pub async fn list(&self, text_filter: Option<&str>, page: Page) -> Result<Vec<Document>> {
        let mut filter = Filter::new();
        if let Some(needle) = text_filter.filter(|n| !n.is_empty()) {
            filter = filter.contains("text", needle);
        }

        let options = FindOptions::new()
            .sort_by("created_at", SortOrder::Descending)
            .skip(page.offset)
            .limit(page.limit);
        self.ctx
            .store
            .find(collections::SENTIMENT_ANALYSES, &filter, &options)
            .await
    }
}
