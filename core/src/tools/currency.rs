use crate::tools::{extract_f64_arg, extract_string_arg, http_client};
use crate::traits::{Tool, ToolResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const API_KEY_ENV: &str = "EXCHANGE_RATE_API_KEY";

const DEFAULT_BASE_URL: &str = "https://v6.exchangerate-api.com/v6";

#[derive(Debug, Deserialize)]
struct LatestRates {
    #[serde(default)]
    conversion_rates: Option<HashMap<String, f64>>,
}

/// ExchangeRate-API client. Without a key the service stays registered but
/// every conversion fails with an explanation instead of calling out.
pub struct CurrencyService {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl CurrencyService {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn into_tools(self) -> Vec<Box<dyn Tool>> {
        vec![Box::new(ConvertCurrencyTool {
            service: Arc::new(self),
        })]
    }

    pub async fn rate(&self, from_currency: &str, to_currency: &str) -> Result<f64> {
        let Some(api_key) = &self.api_key else {
            anyhow::bail!(
                "Currency conversion is unavailable: {} is not configured",
                API_KEY_ENV
            );
        };

        let from = from_currency.trim().to_uppercase();
        let to = to_currency.trim().to_uppercase();

        let response = self
            .client
            .get(format!("{}/{}/latest/{}", self.base_url, api_key, from))
            .send()
            .await
            // the key is a path segment
            .map_err(reqwest::Error::without_url)
            .context("ExchangeRate-API request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("ExchangeRate-API error {}: {}", status, error_text);
        }

        let latest: LatestRates = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Malformed ExchangeRate-API response")?;

        let rates = latest
            .conversion_rates
            .filter(|r| !r.is_empty())
            .ok_or_else(|| anyhow::anyhow!("No conversion rates found in API response"))?;

        rates
            .get(&to)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("{} not found in exchange rates", to))
    }

    pub async fn convert(
        &self,
        amount: f64,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<f64> {
        info!(amount, from_currency, to_currency, "Converting currency");
        Ok(amount * self.rate(from_currency, to_currency).await?)
    }
}

pub struct ConvertCurrencyTool {
    service: Arc<CurrencyService>,
}

#[async_trait]
impl Tool for ConvertCurrencyTool {
    fn name(&self) -> &str {
        "convert_currency"
    }

    fn description(&self) -> &str {
        "Convert an amount of money from one currency to another using live exchange rates"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "number",
                    "description": "The amount of money to convert"
                },
                "from_currency": {
                    "type": "string",
                    "description": "Source currency code, e.g. USD"
                },
                "to_currency": {
                    "type": "string",
                    "description": "Target currency code, e.g. EUR"
                }
            },
            "required": ["amount", "from_currency", "to_currency"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let amount = extract_f64_arg(&args, "amount")?;
        let from = extract_string_arg(&args, "from_currency")?;
        let to = extract_string_arg(&args, "to_currency")?;

        match self.service.convert(amount, &from, &to).await {
            Ok(converted) => Ok(ToolResult::success(converted)),
            Err(e) => {
                let error = format!("{:#}", e);
                warn!(error = %error, "Currency conversion failed");
                Ok(ToolResult::error(error))
            }
        }
    }
}
