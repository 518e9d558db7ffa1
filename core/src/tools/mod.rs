use crate::agent::ToolRegistry;
use crate::config::Config;
use crate::traits::Tool;
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::warn;

pub mod currency;
pub mod expense;
pub mod place_search;
pub mod weather;

pub use currency::{ConvertCurrencyTool, CurrencyService};
pub use expense::{DailyBudgetTool, HotelCostTool, TotalExpenseTool};
pub use place_search::{PlaceCategory, PlaceSearchTool, TavilySearch};
pub use weather::{CurrentWeatherTool, WeatherForecastTool, WeatherService};

pub fn extract_string_arg(args: &Value, key: &str) -> Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' parameter", key))
        .map(|s| s.to_string())
}

pub fn extract_f64_arg(args: &Value, key: &str) -> Result<f64> {
    args.get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| anyhow::anyhow!("Missing numeric '{}' parameter", key))
}

pub fn extract_i64_arg(args: &Value, key: &str) -> Result<i64> {
    let value = args
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' parameter", key))?;

    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .ok_or_else(|| anyhow::anyhow!("Parameter '{}' must be a whole number", key))
}

pub fn extract_f64_list_arg(args: &Value, key: &str) -> Result<Vec<f64>> {
    args.get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' list parameter", key))?
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| anyhow::anyhow!("Every entry of '{}' must be a number", key))
        })
        .collect()
}

/// The record shape shared by the lookup tools. On failure `results` is an
/// empty list and `error` says what went wrong.
pub fn lookup_record(
    source: &str,
    category: &str,
    place: &str,
    results: Value,
    error: Option<&str>,
) -> Value {
    let results = match results {
        Value::Null => json!([]),
        Value::String(s) if s.trim().is_empty() => json!([]),
        other => other,
    };

    json!({
        "source": source,
        "category": category,
        "place": place,
        "error": error,
        "results": results,
    })
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .context("Failed to build HTTP client for tool adapters")
}

fn env_key(var_name: &str) -> Option<String> {
    std::env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Credentials for the external lookup services.
#[derive(Debug, Clone, Default)]
pub struct ToolKeys {
    pub weather: Option<String>,
    pub search: Option<String>,
    pub currency: Option<String>,
}

impl ToolKeys {
    pub fn from_env() -> Self {
        Self {
            weather: env_key(weather::API_KEY_ENV),
            search: env_key(place_search::API_KEY_ENV),
            currency: env_key(currency::API_KEY_ENV),
        }
    }
}

/// Constructs every adapter, reading provider credentials from the
/// environment once.
pub fn build_tools(config: &Config) -> Result<Vec<Box<dyn Tool>>> {
    build_tools_with(ToolKeys::from_env(), config)
}

pub fn build_tools_with(keys: ToolKeys, config: &Config) -> Result<Vec<Box<dyn Tool>>> {
    let timeout = Duration::from_secs(config.tools.timeout_secs);

    let weather_key = keys
        .weather
        .with_context(|| format!("{} is not set", weather::API_KEY_ENV))?;
    let weather = WeatherService::new(weather_key, timeout)?
        .with_forecast_count(config.tools.forecast_count);

    let search_key = keys
        .search
        .with_context(|| format!("{} is not set", place_search::API_KEY_ENV))?;
    let search = TavilySearch::new(search_key, timeout)?;

    let currency_key = keys.currency;
    if currency_key.is_none() {
        if config.tools.require_currency_key {
            anyhow::bail!(
                "{} is not set and tools.require_currency_key is enabled",
                currency::API_KEY_ENV
            );
        }
        warn!(
            "{} not set; convert_currency will report itself unavailable",
            currency::API_KEY_ENV
        );
    }
    let currency = CurrencyService::new(currency_key, timeout)?;

    let mut tools = weather.into_tools();
    tools.extend(search.into_tools());
    tools.extend(expense::tools());
    tools.extend(currency.into_tools());
    Ok(tools)
}

pub fn build_registry(config: &Config) -> Result<ToolRegistry> {
    let registry = ToolRegistry::from_tools(build_tools(config)?)?;
    tracing::info!(tools = ?registry.names(), "Tool registry ready");
    Ok(registry)
}
