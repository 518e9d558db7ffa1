use crate::tools::{extract_string_arg, http_client, lookup_record};
use crate::traits::{Tool, ToolResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

const SOURCE: &str = "openweathermap";
const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_FORECAST_COUNT: u32 = 10;

#[derive(Debug, Deserialize)]
struct WeatherReport {
    main: Reading,
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    dt_txt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Reading {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<WeatherReport>,
}

impl WeatherReport {
    fn description(&self) -> &str {
        self.weather
            .first()
            .map(|c| c.description.as_str())
            .unwrap_or("N/A")
    }

    fn date(&self) -> &str {
        self.dt_txt
            .as_deref()
            .and_then(|t| t.split(' ').next())
            .unwrap_or("")
    }
}

/// OpenWeatherMap client shared by the current-weather and forecast tools.
pub struct WeatherService {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    forecast_count: u32,
}

impl WeatherService {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            forecast_count: DEFAULT_FORECAST_COUNT,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_forecast_count(mut self, count: u32) -> Self {
        self.forecast_count = count;
        self
    }

    pub fn into_tools(self) -> Vec<Box<dyn Tool>> {
        let service = Arc::new(self);
        vec![
            Box::new(CurrentWeatherTool {
                service: service.clone(),
            }),
            Box::new(WeatherForecastTool { service }),
        ]
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
        extra: &[(&str, String)],
    ) -> Result<T> {
        let mut query = vec![
            ("q", city.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ];
        query.extend(extra.iter().map(|(k, v)| (*k, v.clone())));

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(&query)
            .send()
            .await
            // the key travels in the query string
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("OpenWeatherMap request for {} failed", city))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenWeatherMap API error {}: {}", status, error_text);
        }

        response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Malformed OpenWeatherMap response")
    }

    pub async fn current_summary(&self, city: &str) -> Result<String> {
        info!(city, "Fetching current weather");
        let report: WeatherReport = self.fetch("weather", city, &[]).await?;
        Ok(format!(
            "Current weather in {}: {}°C, {}",
            city,
            report.main.temp,
            report.description()
        ))
    }

    pub async fn forecast_summary(&self, city: &str) -> Result<String> {
        info!(city, "Fetching weather forecast");
        let forecast: ForecastResponse = self
            .fetch("forecast", city, &[("cnt", self.forecast_count.to_string())])
            .await?;

        let mut summary = format!("Weather forecast for {}:", city);
        for item in &forecast.list {
            let _ = write!(
                summary,
                "\n{}: {}°C, {}",
                item.date(),
                item.main.temp,
                item.description()
            );
        }
        Ok(summary)
    }
}

fn city_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "city": {
                "type": "string",
                "description": "Name of the city"
            }
        },
        "required": ["city"]
    })
}

fn into_result(category: &str, city: &str, outcome: Result<String>) -> ToolResult {
    match outcome {
        Ok(summary) => ToolResult::success(summary),
        Err(e) => {
            let error = format!("{:#}", e);
            warn!(city, category, error = %error, "Weather lookup failed");
            ToolResult::failure(
                lookup_record(SOURCE, category, city, serde_json::Value::Null, Some(&error)),
                error,
            )
        }
    }
}

pub struct CurrentWeatherTool {
    service: Arc<WeatherService>,
}

#[async_trait]
impl Tool for CurrentWeatherTool {
    fn name(&self) -> &str {
        "get_current_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather (temperature and conditions) for a city"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        city_schema()
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let city = extract_string_arg(&args, "city")?;
        let outcome = self.service.current_summary(&city).await;
        Ok(into_result("current_weather", &city, outcome))
    }
}

pub struct WeatherForecastTool {
    service: Arc<WeatherService>,
}

#[async_trait]
impl Tool for WeatherForecastTool {
    fn name(&self) -> &str {
        "get_weather_forecast"
    }

    fn description(&self) -> &str {
        "Get the multi-day weather forecast for a city"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        city_schema()
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let city = extract_string_arg(&args, "city")?;
        let outcome = self.service.forecast_summary(&city).await;
        Ok(into_result("forecast", &city, outcome))
    }
}
