//!  Travel Buddy Tools
//!
//!  Copyright (C) 2026  Travel Buddy Contributors
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! SERP and currency tools against mocked SerpApi / CurrencyFreaks upstreams.
//!
//! Every tool returns a JSON document: the reshaped upstream payload on
//! success, `{"error": "..."}` and nothing else on failure.

use anyhow::{Context, Result};
use chrono::Duration;
use httpmock::prelude::*;
use serde_json::{Value, json};
use std::path::PathBuf;
use travel_buddy_tools::config::{CurrencyConfig, SerpConfig};
use travel_buddy_tools::{
    CurrencyInput, EventsInput, HotelDetailInput, HotelsInput, PlacesInput, SerpTools,
};

const SERP_KEY: &str = "serp-test-key";
const CURRENCY_KEY: &str = "cf-test-key";

fn load_schema_from_file(name: &str) -> Result<Value> {
    let schema_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("schemas")
        .join(name);
    let content = std::fs::read_to_string(&schema_path)
        .context(format!("Failed to read schema file: {:?}", schema_path))?;
    serde_json::from_str(&content)
        .context(format!("Failed to parse schema file: {:?}", schema_path))
}

fn validate_json_schema(instance: &Value, schema_name: &str) -> Result<()> {
    let schema = load_schema_from_file(schema_name)?;
    let validator = jsonschema::Validator::new(&schema)
        .context(format!("Failed to create validator for {}", schema_name))?;

    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| format!("{}: {}", schema_name, e))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        anyhow::bail!(
            "Schema validation failed for {}:\n{}",
            schema_name,
            errors.join("\n")
        )
    }
}

fn tools_for(server: &MockServer) -> SerpTools {
    SerpTools::new(
        SerpConfig::new(SERP_KEY)
            .with_endpoint(server.url("/search.json"))
            .with_timeout_secs(5),
        CurrencyConfig::new(CURRENCY_KEY)
            .with_endpoint(server.url("/v2.0/rates/latest"))
            .with_timeout_secs(5),
    )
    .unwrap()
}

fn stay() -> (String, String) {
    let check_in = chrono::Local::now().date_naive() + Duration::days(30);
    let check_out = check_in + Duration::days(4);
    (
        check_in.format("%Y-%m-%d").to_string(),
        check_out.format("%Y-%m-%d").to_string(),
    )
}

fn hotels_input(extra: Value) -> HotelsInput {
    let (check_in, check_out) = stay();
    let mut args = json!({
        "query": "Bali Resorts",
        "check_in_date": check_in,
        "check_out_date": check_out,
    });
    if let (Some(a), Some(e)) = (args.as_object_mut(), extra.as_object()) {
        a.extend(e.clone());
    }
    serde_json::from_value(args).unwrap()
}

fn assert_error_only(value: &Value) -> &str {
    validate_json_schema(value, "error-envelope.json").unwrap();
    value["error"].as_str().unwrap()
}

#[tokio::test]
async fn test_search_hotels_success() {
    let server = MockServer::start_async().await;
    let (check_in, _) = stay();
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("engine", "google_hotels")
                .query_param("q", "Bali Resorts")
                .query_param("check_in_date", check_in.as_str())
                .query_param("adults", "2")
                .query_param("children", "2")
                .query_param("children_ages", "5,9")
                .query_param("hotel_class", "4,5")
                .query_param("sort_by", "3")
                .query_param("free_cancellation", "true")
                .query_param("api_key", SERP_KEY);
            then.status(200).json_body(json!({
                "search_metadata": {"status": "Success"},
                "search_parameters": {"engine": "google_hotels"},
                "properties": [
                    {"name": "Ubud Hanging Gardens", "type": "hotel", "property_token": "tok-1",
                     "rate_per_night": {"lowest": "$420", "extracted_lowest": 420}},
                    {"name": "Seminyak Villa", "type": "vacation rental", "property_token": "tok-2"}
                ],
                "serpapi_pagination": {"next_page_token": "CBI="}
            }));
        })
        .await;

    let out = tools_for(&server)
        .search_hotels(hotels_input(json!({
            "children_ages": [5, 9],
            "hotel_class": ["FOUR_STAR", "five_star"],
            "sort_by": "lowest_price",
            "free_cancellation": true
        })))
        .await;

    upstream.assert_async().await;
    assert!(out.get("error").is_none(), "{}", out);
    validate_json_schema(&out, "hotels-response.json").unwrap();
    assert_eq!(out["properties"].as_array().unwrap().len(), 2);
    assert_eq!(out["serpapi_pagination"]["next_page_token"], "CBI=");
}

#[tokio::test]
async fn test_search_hotels_upstream_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search.json");
            then.status(401)
                .json_body(json!({"error": "Invalid API key. Your API key should be here: https://serpapi.com/manage-api-key"}));
        })
        .await;

    let out = tools_for(&server).search_hotels(hotels_input(json!({}))).await;
    let message = assert_error_only(&out);
    assert!(message.starts_with("API request failed: HTTP 401"), "{}", message);
    assert!(message.contains("Invalid API key"), "{}", message);
}

#[tokio::test]
async fn test_search_hotels_rejects_mismatched_children() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({"search_metadata": {"status": "Success"}}));
        })
        .await;
    let tools = tools_for(&server);

    let out = tools
        .search_hotels(hotels_input(json!({"children": 2, "children_ages": [7]})))
        .await;
    assert_eq!(
        assert_error_only(&out),
        "Number of children_ages must match the number of children"
    );

    let out = tools
        .search_hotels(hotels_input(json!({"rating": "FIVE_PLUS"})))
        .await;
    assert!(assert_error_only(&out).starts_with("Invalid rating: FIVE_PLUS. Valid options:"));

    let out = tools
        .search_hotels(hotels_input(json!({"check_in_date": "tomorrow"})))
        .await;
    assert_eq!(
        assert_error_only(&out),
        "Invalid check-in date format: Must be YYYY-MM-DD."
    );

    assert_eq!(upstream.hits_async().await, 0);
}

#[tokio::test]
async fn test_find_hotel_detail_passes_document_through() {
    let server = MockServer::start_async().await;
    let (check_in, check_out) = stay();
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("property_token", "tok-1")
                .query_param("check_out_date", check_out.as_str());
            then.status(200).json_body(json!({
                "search_metadata": {"status": "Success"},
                "name": "Ubud Hanging Gardens",
                "prices": [{"source": "Booking.com", "rate_per_night": {"lowest": "$430"}}]
            }));
        })
        .await;

    let input: HotelDetailInput = serde_json::from_value(json!({
        "query": "Ubud Hanging Gardens",
        "property_token": "tok-1",
        "check_in_date": check_in,
        "check_out_date": check_out
    }))
    .unwrap();
    let out = tools_for(&server).find_hotel_detail(input).await;

    upstream.assert_async().await;
    assert!(out.get("error").is_none(), "{}", out);
    assert_eq!(out["name"], "Ubud Hanging Gardens");
    assert_eq!(out["prices"][0]["source"], "Booking.com");
}

#[tokio::test]
async fn test_search_events() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("engine", "google_events")
                .query_param("q", "Events in Austin, TX")
                .query_param("htichips", "date:today,event_type:Virtual-Event");
            then.status(200).json_body(json!({
                "search_metadata": {"status": "Success", "id": "abc"},
                "search_parameters": {"q": "Events in Austin, TX"},
                "events_results": [{"title": "Austin City Limits"}],
                "inline_images": []
            }));
        })
        .await;

    let input: EventsInput = serde_json::from_value(json!({
        "query": "Events in Austin, TX",
        "filters": ["date:today", "event_type:Virtual-Event"]
    }))
    .unwrap();
    let out = tools_for(&server).search_events(input).await;

    upstream.assert_async().await;
    assert_eq!(out["events_results"][0]["title"], "Austin City Limits");
    assert_eq!(out["search_metadata"]["id"], "abc");
    assert!(out.get("inline_images").is_none());
}

#[tokio::test]
async fn test_search_events_failed_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search.json");
            then.status(200).json_body(json!({
                "search_metadata": {"status": "Error"},
                "error": "Google hasn't returned any results for this query."
            }));
        })
        .await;

    let input: EventsInput = serde_json::from_value(json!({"query": "Events in Nowhere"})).unwrap();
    let out = tools_for(&server).search_events(input).await;
    assert_eq!(
        assert_error_only(&out),
        "API request failed: Google hasn't returned any results for this query."
    );
}

#[tokio::test]
async fn test_search_places() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("engine", "google")
                .query_param("q", "top sights in Paris");
            then.status(200).json_body(json!({
                "search_metadata": {"status": "Success"},
                "search_parameters": {"q": "top sights in Paris"},
                "top_sights": {"sights": [{"title": "Eiffel Tower"}]}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("q", "quiet corner");
            then.status(200).json_body(json!({
                "search_metadata": {"status": "Success"},
                "organic_results": []
            }));
        })
        .await;
    let tools = tools_for(&server);

    let input: PlacesInput = serde_json::from_value(json!({"query": "top sights in Paris"})).unwrap();
    let out = tools.search_places(input).await;
    assert_eq!(out["top_sights"]["sights"][0]["title"], "Eiffel Tower");

    let input: PlacesInput = serde_json::from_value(json!({"query": "quiet corner"})).unwrap();
    let out = tools.search_places(input).await;
    assert_eq!(assert_error_only(&out), "No top sights found");
}

#[tokio::test]
async fn test_currency_rates() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2.0/rates/latest")
                .query_param("apikey", CURRENCY_KEY)
                .query_param("base", "USD");
            then.status(200).json_body(json!({
                "date": "2026-10-18 00:00:00+00",
                "base": "USD",
                "rates": {"EUR": "0.9214", "JPY": 149.5, "CAD": "1.37"}
            }));
        })
        .await;

    let out = tools_for(&server)
        .get_latest_currency_rates(CurrencyInput { base: " usd".to_string() })
        .await;

    upstream.assert_async().await;
    validate_json_schema(&out, "currency-rates.json").unwrap();
    assert_eq!(out["base"], "USD");
    assert_eq!(out["rates"]["EUR"], "0.9214");
    assert_eq!(out["rates"]["JPY"], "149.5");
}

#[tokio::test]
async fn test_currency_rates_failures() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).query_param("base", "EUR");
            then.status(200)
                .json_body(json!({"date": "2026-10-18 00:00:00+00", "base": "EUR"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).query_param("base", "GBP");
            then.status(500).body("upstream exploded");
        })
        .await;
    let tools = tools_for(&server);

    let out = tools
        .get_latest_currency_rates(CurrencyInput { base: "EUR".to_string() })
        .await;
    assert!(assert_error_only(&out).contains("missing field `rates`"));

    let out = tools
        .get_latest_currency_rates(CurrencyInput { base: "GBP".to_string() })
        .await;
    assert_eq!(
        assert_error_only(&out),
        "API request failed: HTTP 500: upstream exploded"
    );

    let out = tools
        .get_latest_currency_rates(CurrencyInput { base: "  ".to_string() })
        .await;
    assert!(assert_error_only(&out).starts_with("Invalid base currency"));
}

#[tokio::test]
async fn test_current_date_shape() {
    let server = MockServer::start_async().await;
    let out = tools_for(&server).current_date();
    validate_json_schema(&out, "current-date.json").unwrap();

    let today = chrono::Local::now().date_naive();
    let reported = chrono::NaiveDate::parse_from_str(out["date"].as_str().unwrap(), "%Y-%m-%d").unwrap();
    assert!((reported - today).num_days().abs() <= 1);
}

#[tokio::test]
async fn test_connection_refused_keeps_keys_out_of_errors() {
    let tools = SerpTools::new(
        SerpConfig::new(SERP_KEY)
            .with_endpoint("http://127.0.0.1:1/search.json")
            .with_timeout_secs(5),
        CurrencyConfig::new(CURRENCY_KEY)
            .with_endpoint("http://127.0.0.1:1/v2.0/rates/latest")
            .with_timeout_secs(5),
    )
    .unwrap();

    let input: PlacesInput = serde_json::from_value(json!({"query": "top sights in Paris"})).unwrap();
    let out = tools.search_places(input).await;
    let message = assert_error_only(&out);
    assert!(message.starts_with("API request failed"), "{}", message);
    assert!(!message.contains(SERP_KEY), "{}", message);

    let out = tools
        .get_latest_currency_rates(CurrencyInput { base: "USD".to_string() })
        .await;
    let message = assert_error_only(&out);
    assert!(message.starts_with("API request failed"), "{}", message);
    assert!(!message.contains(CURRENCY_KEY), "{}", message);
    assert!(!out.to_string().contains("test-key"));
}
