use crate::tools::{extract_f64_arg, extract_f64_list_arg, extract_i64_arg};
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

pub fn total(costs: &[f64]) -> f64 {
    costs.iter().sum()
}

pub fn daily_budget(total: f64, days: i64) -> anyhow::Result<f64> {
    if days <= 0 {
        anyhow::bail!("Number of days must be greater than zero.");
    }
    Ok(total / days as f64)
}

pub fn tools() -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(HotelCostTool),
        Box::new(TotalExpenseTool),
        Box::new(DailyBudgetTool),
    ]
}

pub struct HotelCostTool;

#[async_trait]
impl Tool for HotelCostTool {
    fn name(&self) -> &str {
        "estimate_total_hotel_cost"
    }

    fn description(&self) -> &str {
        "Calculate the total hotel cost from the price per night and the number of nights"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "price_per_night": {
                    "type": "number",
                    "description": "Cost of the hotel per night"
                },
                "total_days": {
                    "type": "number",
                    "description": "Number of nights"
                }
            },
            "required": ["price_per_night", "total_days"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let price = extract_f64_arg(&args, "price_per_night")?;
        let nights = extract_f64_arg(&args, "total_days")?;
        info!(price, nights, "Calculating hotel cost");
        Ok(ToolResult::success(multiply(price, nights)))
    }
}

pub struct TotalExpenseTool;

#[async_trait]
impl Tool for TotalExpenseTool {
    fn name(&self) -> &str {
        "calculate_total_expense"
    }

    fn description(&self) -> &str {
        "Calculate the total expense of the trip by summing individual costs"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "costs": {
                    "type": "array",
                    "items": { "type": "number" },
                    "description": "Individual expenses to add up"
                }
            },
            "required": ["costs"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let costs = extract_f64_list_arg(&args, "costs")?;
        info!(?costs, "Calculating total expense");
        Ok(ToolResult::success(total(&costs)))
    }
}

pub struct DailyBudgetTool;

#[async_trait]
impl Tool for DailyBudgetTool {
    fn name(&self) -> &str {
        "calculate_daily_expense_budget"
    }

    fn description(&self) -> &str {
        "Calculate the daily expense budget by dividing the total cost by the number of days"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "total_cost": {
                    "type": "number",
                    "description": "Total expense of the trip"
                },
                "days": {
                    "type": "integer",
                    "description": "Number of days"
                }
            },
            "required": ["total_cost", "days"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let total_cost = extract_f64_arg(&args, "total_cost")?;
        let days = extract_i64_arg(&args, "days")?;
        info!(total_cost, days, "Calculating daily budget");

        match daily_budget(total_cost, days) {
            Ok(budget) => Ok(ToolResult::success(budget)),
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        assert_eq!(multiply(150.0, 4.0), 600.0);
        assert_eq!(total(&[600.0, 200.0, 80.0]), 880.0);
        assert_eq!(total(&[]), 0.0);
        assert_eq!(daily_budget(880.0, 4).unwrap(), 220.0);
    }

    #[test]
    fn daily_budget_rejects_non_positive_days() {
        assert!(daily_budget(880.0, 0).is_err());
        assert!(daily_budget(880.0, -2).is_err());
    }

    #[test]
    fn total_is_repeatable() {
        let costs = [12.5, 99.99, 0.01, 310.0];
        assert_eq!(total(&costs), total(&costs));
    }

    #[tokio::test]
    async fn zero_days_tool_returns_error_not_number() {
        let result = DailyBudgetTool
            .execute(json!({"total_cost": 880.0, "days": 0}))
            .await
            .unwrap();

        assert!(result.is_error());
        assert!(!result.output.is_number());
        assert_eq!(
            result.error.as_deref(),
            Some("Number of days must be greater than zero.")
        );
    }

    #[tokio::test]
    async fn tools_accept_integer_arguments() {
        let result = HotelCostTool
            .execute(json!({"price_per_night": 150, "total_days": 4}))
            .await
            .unwrap();
        assert_eq!(result.output, json!(600.0));
    }
}
