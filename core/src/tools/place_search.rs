use crate::tools::{extract_string_arg, http_client, lookup_record};
use crate::traits::{Tool, ToolResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const API_KEY_ENV: &str = "TAVILY_API_KEY";

const SOURCE: &str = "tavily";
const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceCategory {
    Attractions,
    Restaurants,
    Activities,
    Transportation,
    Hotels,
}

impl PlaceCategory {
    pub const ALL: [PlaceCategory; 5] = [
        Self::Attractions,
        Self::Restaurants,
        Self::Activities,
        Self::Transportation,
        Self::Hotels,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attractions => "attractions",
            Self::Restaurants => "restaurants",
            Self::Activities => "activities",
            Self::Transportation => "transportation",
            Self::Hotels => "hotels",
        }
    }

    fn tool_name(&self) -> &'static str {
        match self {
            Self::Attractions => "search_attractions",
            Self::Restaurants => "search_restaurants",
            Self::Activities => "search_activities",
            Self::Transportation => "search_transportation",
            Self::Hotels => "search_hotels",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Attractions => "Search the top attractions in and around a place",
            Self::Restaurants => "Search the top restaurants and eateries in and around a place",
            Self::Activities => "Search popular activities in and around a place",
            Self::Transportation => "Search the modes of transportation available in a place",
            Self::Hotels => "Search hotels in a place",
        }
    }

    pub fn search_query(&self, place: &str) -> String {
        match self {
            Self::Attractions => format!("top attractive places in and around {}", place),
            Self::Restaurants => format!(
                "what are the top 10 restaurants and eateries in and around {}.",
                place
            ),
            Self::Activities => format!("activities in and around {}", place),
            Self::Transportation => format!(
                "What are the different modes of transportations available in {}",
                place
            ),
            Self::Hotels => format!("hotels in {}", place),
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    topic: &'a str,
    include_answer: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<Value>,
}

/// Tavily web search client shared by every place-search tool.
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn into_tools(self) -> Vec<Box<dyn Tool>> {
        let search = Arc::new(self);
        PlaceCategory::ALL
            .into_iter()
            .map(|category| {
                Box::new(PlaceSearchTool {
                    category,
                    search: search.clone(),
                }) as Box<dyn Tool>
            })
            .collect()
    }

    /// Returns the synthesized answer when Tavily provides one, otherwise the
    /// raw result list.
    pub async fn search(&self, query: &str) -> Result<Value> {
        info!(query, "Running Tavily search");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&SearchRequest {
                query,
                topic: "general",
                include_answer: "advanced",
            })
            .send()
            .await
            .context("Tavily request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Tavily API error {}: {}", status, error_text);
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Malformed Tavily response")?;

        match body.answer {
            Some(answer) if !answer.trim().is_empty() => Ok(Value::String(answer)),
            _ => Ok(Value::Array(body.results)),
        }
    }
}

pub struct PlaceSearchTool {
    category: PlaceCategory,
    search: Arc<TavilySearch>,
}

#[async_trait]
impl Tool for PlaceSearchTool {
    fn name(&self) -> &str {
        self.category.tool_name()
    }

    fn description(&self) -> &str {
        self.category.description()
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "place": {
                    "type": "string",
                    "description": "City or region to search in"
                }
            },
            "required": ["place"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let place = extract_string_arg(&args, "place")?;
        let category = self.category.as_str();

        match self.search.search(&self.category.search_query(&place)).await {
            Ok(results) => Ok(ToolResult::success(lookup_record(
                SOURCE, category, &place, results, None,
            ))),
            Err(e) => {
                let error = format!("{:#}", e);
                warn!(place = %place, category, error = %error, "Place search failed");
                Ok(ToolResult::failure(
                    lookup_record(SOURCE, category, &place, Value::Null, Some(&error)),
                    error,
                ))
            }
        }
    }
}
