//! FMAA dashboard CLI
//!
//! A command-line client for the dashboard API: record and browse
//! performance metrics, manage agents, run sentiment analysis and
//! generate recommendations.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{agents, health, metrics, recommendations, sentiment};

use crate::client::AgentRequest;
use crate::output::OutputFormat;

/// FMAA dashboard CLI
#[derive(Parser)]
#[command(name = "fmaa")]
#[command(author, version, about = "CLI for the FMAA dashboard API", long_about = None)]
pub struct Cli {
    /// API endpoint URL (falls back to the config file, then http://localhost:8001)
    #[arg(long, env = "FMAA_API_URL")]
    pub api_url: Option<String>,

    /// Output format (falls back to the config file, then table)
    #[arg(long, short)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show API health
    Health,

    /// Performance metrics
    #[command(subcommand)]
    Metrics(MetricsCommands),

    /// Agent factory
    #[command(subcommand)]
    Agents(AgentsCommands),

    /// Sentiment agent
    #[command(subcommand)]
    Sentiment(SentimentCommands),

    /// Recommendation agent
    #[command(subcommand)]
    Recommendations(RecommendationsCommands),
}

#[derive(Subcommand)]
pub enum MetricsCommands {
    /// List recorded metrics, newest first
    List {
        /// Filter by service
        #[arg(long, short)]
        service: Option<String>,

        /// Filter by metric type (e.g. cpu_usage, response_time)
        #[arg(long, short)]
        metric_type: Option<String>,

        /// Earliest timestamp (RFC 3339)
        #[arg(long)]
        start_date: Option<String>,

        /// Latest timestamp (RFC 3339)
        #[arg(long)]
        end_date: Option<String>,

        /// Aggregation (raw, hourly, daily)
        #[arg(long)]
        aggregation: Option<String>,

        /// Maximum rows to return
        #[arg(long)]
        limit: Option<usize>,

        /// Rows to skip
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Record a metric observation
    Record {
        /// Service name
        service: String,

        /// Metric type
        metric_type: String,

        /// Observed value
        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// Metadata entry as key=value (repeatable)
        #[arg(long = "meta")]
        meta: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum AgentsCommands {
    /// List agents
    List {
        /// Filter by type (sentiment, recommendation, performance, custom)
        #[arg(long = "type", short = 't')]
        agent_type: Option<String>,

        /// Filter by status
        #[arg(long)]
        status: Option<String>,

        /// Include task statistics
        #[arg(long)]
        stats: bool,

        /// Maximum rows to return
        #[arg(long)]
        limit: Option<usize>,

        /// Rows to skip
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Create an agent
    Create {
        /// Agent name
        name: String,

        /// Agent type (sentiment, recommendation, performance, custom)
        #[arg(long = "type", short = 't')]
        agent_type: String,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Config overrides as a JSON object
        #[arg(long)]
        config: Option<String>,
    },

    /// Update an agent
    Update {
        /// Agent ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New status (created, active, inactive, error, maintenance)
        #[arg(long)]
        status: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Replacement config as a JSON object
        #[arg(long)]
        config: Option<String>,
    },

    /// Delete an agent (it is kept with status "deleted")
    Delete {
        /// Agent ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SentimentCommands {
    /// List past analyses
    List {
        /// Only analyses whose text contains this, ignoring case
        #[arg(long)]
        text_filter: Option<String>,

        /// Maximum rows to return
        #[arg(long)]
        limit: Option<usize>,

        /// Rows to skip
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Analyze a text
    Analyze {
        /// Text to analyze
        text: String,
    },
}

#[derive(Subcommand)]
pub enum RecommendationsCommands {
    /// List stored recommendations
    List {
        /// Filter by category
        #[arg(long, short)]
        category: Option<String>,

        /// Filter by user
        #[arg(long, short)]
        user_id: Option<String>,

        /// Maximum rows to return
        #[arg(long)]
        limit: Option<usize>,

        /// Rows to skip
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Generate recommendations for a user
    Generate {
        /// User ID
        user_id: String,

        /// Category (technology, fashion, food, entertainment)
        category: String,

        /// Only items at or below this price
        #[arg(long)]
        max_price: Option<f64>,

        /// Only items rated at least this
        #[arg(long)]
        min_rating: Option<f64>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let file_config = config::Config::load()?;
    let api_url = file_config.resolve_api_url(cli.api_url);
    let format = cli
        .format
        .or_else(|| {
            file_config
                .default_format
                .as_deref()
                .and_then(OutputFormat::from_name)
        })
        .unwrap_or_default();

    if cli.verbose {
        output::print_info(&format!("Using API at {}", api_url));
    }

    // Initialize client
    let client = client::ApiClient::new(&api_url)?;

    // Execute command
    match cli.command {
        Commands::Health => health::show_health(&client, format).await?,
        Commands::Metrics(cmd) => match cmd {
            MetricsCommands::List {
                service,
                metric_type,
                start_date,
                end_date,
                aggregation,
                limit,
                offset,
            } => {
                let filters = metrics::MetricFilters {
                    service,
                    metric_type,
                    start_date,
                    end_date,
                    aggregation,
                    limit,
                    offset,
                };
                metrics::list_metrics(&client, filters, format).await?;
            }
            MetricsCommands::Record {
                service,
                metric_type,
                value,
                meta,
            } => {
                metrics::record_metric(&client, service, metric_type, value, &meta, format).await?;
            }
        },
        Commands::Agents(cmd) => match cmd {
            AgentsCommands::List {
                agent_type,
                status,
                stats,
                limit,
                offset,
            } => {
                let filters = agents::AgentFilters {
                    agent_type,
                    status,
                    include_stats: stats,
                    limit,
                    offset,
                };
                agents::list_agents(&client, filters, format).await?;
            }
            AgentsCommands::Create {
                name,
                agent_type,
                description,
                config,
            } => {
                let request = AgentRequest {
                    name: Some(name),
                    agent_type: Some(agent_type),
                    description,
                    config: agents::parse_config(config.as_deref())?,
                    ..Default::default()
                };
                agents::create_agent(&client, request, format).await?;
            }
            AgentsCommands::Update {
                id,
                name,
                status,
                description,
                config,
            } => {
                let request = AgentRequest {
                    id: Some(id),
                    name,
                    status,
                    description,
                    config: agents::parse_config(config.as_deref())?,
                    ..Default::default()
                };
                agents::update_agent(&client, request, format).await?;
            }
            AgentsCommands::Delete { id } => {
                agents::delete_agent(&client, &id, format).await?;
            }
        },
        Commands::Sentiment(cmd) => match cmd {
            SentimentCommands::List {
                text_filter,
                limit,
                offset,
            } => {
                sentiment::list_analyses(&client, text_filter, limit, offset, format).await?;
            }
            SentimentCommands::Analyze { text } => {
                sentiment::analyze(&client, text, format).await?;
            }
        },
        Commands::Recommendations(cmd) => match cmd {
            RecommendationsCommands::List {
                category,
                user_id,
                limit,
                offset,
            } => {
                recommendations::list_recommendations(
                    &client, category, user_id, limit, offset, format,
                )
                .await?;
            }
            RecommendationsCommands::Generate {
                user_id,
                category,
                max_price,
                min_rating,
            } => {
                recommendations::generate(&client, user_id, category, max_price, min_rating, format)
                    .await?;
            }
        },
    }

    Ok(())
}
