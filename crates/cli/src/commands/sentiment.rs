//! Sentiment agent commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{query_params, AnalyzeRequest, ApiClient, Envelope, SentimentRecord};
use crate::output::{
    color_percent, color_sentiment, format_timestamp, print_json, print_rows, truncate_text,
    OutputFormat,
};

/// Row for analyses table
#[derive(Tabled)]
struct AnalysisRow {
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "Sentiment")]
    sentiment: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Analyzed")]
    created_at: String,
}

impl From<&SentimentRecord> for AnalysisRow {
    fn from(record: &SentimentRecord) -> Self {
        Self {
            text: truncate_text(&record.text, 40),
            sentiment: color_sentiment(&record.sentiment),
            score: format!("{:.3}", record.score),
            confidence: color_percent(record.confidence),
            created_at: record
                .created_at
                .as_deref()
                .map(format_timestamp)
                .unwrap_or_default(),
        }
    }
}

/// List past analyses
pub async fn list_analyses(
    client: &ApiClient,
    text_filter: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let query = query_params(&[
        ("text_filter", text_filter),
        ("limit", limit.map(|l| l.to_string())),
        ("offset", offset.map(|o| o.to_string())),
    ]);
    let result: Envelope<Vec<SentimentRecord>> = client.get("api/sentiment-agent", &query).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let rows: Vec<AnalysisRow> = result.data.iter().map(AnalysisRow::from).collect();
            print_rows(rows, "No analyses found");
        }
    }

    Ok(())
}

/// Analyze one text
pub async fn analyze(client: &ApiClient, text: String, format: OutputFormat) -> Result<()> {
    let result: Envelope<SentimentRecord> = client
        .post("api/sentiment-agent", &AnalyzeRequest { text })
        .await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let analysis = &result.data;
            println!("Sentiment:  {}", color_sentiment(&analysis.sentiment));
            println!("Score:      {:.3}", analysis.score);
            println!("Confidence: {}", color_percent(analysis.confidence));
            if !analysis.keywords.is_empty() {
                let keywords: Vec<String> = analysis
                    .keywords
                    .iter()
                    .map(|k| format!("{} ({})", k.word, k.sentiment))
                    .collect();
                println!("Keywords:   {}", keywords.join(", "));
            }
        }
    }

    Ok(())
}
