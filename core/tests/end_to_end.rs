mod common;

use axum::routing::{get, post};
use axum::{Json, Router};
use common::{ScriptedProvider, spawn_server};
use guidely_core::agent::{AgentLoop, ContextBuilder, ToolRegistry};
use guidely_core::error::QueryError;
use guidely_core::planner::{QueryResponse, TravelPlanner};
use guidely_core::tools::{TavilySearch, WeatherService, expense};
use guidely_core::traits::{ChatMessage, ChatResponse, Role, Tool, ToolCall};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

const ITINERARY: &str = "# Paris in 3 days\n\n## Plan A: Classic Paris\n- Day 1: Louvre\n\n## Weather\nMild, around 18°C.";

async fn travel_tools(weather: Router, search: Router) -> Vec<Box<dyn Tool>> {
    let weather_url = spawn_server(weather).await;
    let search_url = spawn_server(search).await;

    let mut tools = WeatherService::new("weather-key", Duration::from_millis(300))
        .unwrap()
        .with_base_url(weather_url)
        .with_forecast_count(3)
        .into_tools();
    tools.extend(
        TavilySearch::new("search-key", Duration::from_millis(300))
            .unwrap()
            .with_base_url(search_url)
            .into_tools(),
    );
    tools.extend(expense::tools());
    tools
}

fn planner(provider: Arc<ScriptedProvider>, tools: Vec<Box<dyn Tool>>) -> TravelPlanner {
    let registry = ToolRegistry::from_tools(tools).unwrap();
    TravelPlanner::new(AgentLoop::new(
        provider,
        ContextBuilder::new(),
        Arc::new(registry),
        "test-model",
    ))
}

fn call(id: &str, name: &str, args: Value) -> ToolCall {
    ToolCall::new(id, name, args)
}

fn tool_messages(history: &[ChatMessage]) -> Vec<(String, Value)> {
    history
        .iter()
        .filter(|m| m.role == Role::Tool)
        .map(|m| {
            (
                m.tool_call_id.clone().unwrap_or_default(),
                serde_json::from_str(&m.content).unwrap(),
            )
        })
        .collect()
}

fn search_router() -> Router {
    Router::new().route(
        "/search",
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "answer": format!("results for {}", body["query"].as_str().unwrap_or_default()),
                "results": []
            }))
        }),
    )
}

fn forecast_router() -> Router {
    Router::new().route(
        "/forecast",
        get(|| async {
            Json(json!({
                "list": [
                    { "dt_txt": "2026-05-01 12:00:00", "main": { "temp": 18.0 }, "weather": [{ "description": "few clouds" }] }
                ]
            }))
        }),
    )
}

#[tokio::test]
async fn paris_trip_uses_search_and_weather_then_answers() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ChatResponse::with_tool_calls(vec![
            call("call_search", "search_attractions", json!({"place": "Paris"})),
            call("call_weather", "get_weather_forecast", json!({"city": "Paris"})),
        ]),
        ChatResponse::text(ITINERARY),
    ]));
    let tools = travel_tools(forecast_router(), search_router()).await;
    let planner = planner(provider.clone(), tools);

    let response = planner.respond("Plan a 3-day trip to Paris").await;
    assert_eq!(
        response,
        QueryResponse::Answer {
            answer: ITINERARY.to_string()
        }
    );
    assert_eq!(provider.calls(), 2);

    let results = tool_messages(&provider.seen_messages(1));
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].0, "call_search");
    assert_eq!(results[0].1["success"], true);
    assert_eq!(
        results[0].1["output"],
        json!({
            "source": "tavily",
            "category": "attractions",
            "place": "Paris",
            "error": null,
            "results": "results for top attractive places in and around Paris"
        })
    );

    assert_eq!(results[1].0, "call_weather");
    assert_eq!(
        results[1].1["output"],
        json!("Weather forecast for Paris:\n2026-05-01: 18°C, few clouds")
    );
}

#[tokio::test]
async fn empty_query_is_rejected_without_reasoning() {
    let provider = Arc::new(ScriptedProvider::new(vec![ChatResponse::text("unused")]));
    let planner = planner(provider.clone(), expense::tools());

    assert!(matches!(
        planner.submit_query("").await,
        Err(QueryError::EmptyQuery)
    ));
    assert_eq!(
        serde_json::to_value(planner.respond("").await).unwrap(),
        json!({"error": "Query cannot be empty."})
    );
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn weather_timeout_is_folded_into_conversation() {
    let slow_weather = Router::new().route(
        "/weather",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({}))
        }),
    );
    let provider = Arc::new(ScriptedProvider::new(vec![
        ChatResponse::with_tool_calls(vec![call(
            "call_weather",
            "get_current_weather",
            json!({"city": "Paris"}),
        )]),
        ChatResponse::text("# Paris\nWeather data is unavailable right now."),
    ]));
    let tools = travel_tools(slow_weather, search_router()).await;
    let planner = planner(provider.clone(), tools);

    let answer = planner.submit_query("Paris this weekend").await.unwrap();
    assert_eq!(answer, "# Paris\nWeather data is unavailable right now.");

    let results = tool_messages(&provider.seen_messages(1));
    assert_eq!(results.len(), 1);
    let (id, result) = &results[0];
    assert_eq!(id, "call_weather");
    assert_eq!(result["success"], false);
    assert_eq!(result["output"]["results"], json!([]));
    assert!(!result["output"]["error"].as_str().unwrap().is_empty());
    assert!(!result.to_string().contains("weather-key"));
}

#[tokio::test]
async fn budget_arithmetic_flows_through_the_loop() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ChatResponse::with_tool_calls(vec![call(
            "c1",
            "estimate_total_hotel_cost",
            json!({"price_per_night": 150, "total_days": 4}),
        )]),
        ChatResponse::with_tool_calls(vec![call(
            "c2",
            "calculate_total_expense",
            json!({"costs": [600.0, 200.0, 80.0]}),
        )]),
        ChatResponse::with_tool_calls(vec![call(
            "c3",
            "calculate_daily_expense_budget",
            json!({"total_cost": 880.0, "days": 4}),
        )]),
        ChatResponse::text("Budget: 220 per day"),
    ]));
    let planner = planner(provider.clone(), expense::tools());

    let answer = planner.submit_query("Budget for 4 nights at 150").await.unwrap();
    assert_eq!(answer, "Budget: 220 per day");
    assert_eq!(provider.calls(), 4);

    let outputs: Vec<Value> = tool_messages(&provider.seen_messages(3))
        .into_iter()
        .map(|(_, result)| result["output"].clone())
        .collect();
    assert_eq!(outputs, vec![json!(600.0), json!(880.0), json!(220.0)]);
}

#[tokio::test]
async fn zero_day_budget_is_an_error_result() {
    let registry = ToolRegistry::from_tools(expense::tools()).unwrap();

    let result = registry
        .execute(
            "calculate_daily_expense_budget",
            json!({"total_cost": 880.0, "days": 0}),
        )
        .await;
    assert!(result.is_error());
    assert_eq!(result.output["results"], json!([]));
}
