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

//! # SERP MCP Server
//!
//! Hotels, events, places, currency rates and the current date as MCP tools.
//! Supports stdio and HTTP transports via subcommand.

use anyhow::{Context, Error, Result};
use clap::Parser;
use rmcp::handler::server::{ServerHandler, tool::ToolRouter, wrapper::Parameters};
use rmcp::tool;
use rmcp::tool_router;
use serde_json::Value;
use std::sync::Arc;
use travel_buddy_tools::config::{
    CURRENCYFREAKS_ENDPOINT, CURRENCYFREAKS_TIMEOUT_SECS, CurrencyConfig, SERPAPI_ENDPOINT,
    SERPAPI_TIMEOUT_SECS, SerpConfig,
};
use travel_buddy_tools::mcp_transport::{
    Transport, call_routed_tool, init_tracing, serve, server_info,
};
use travel_buddy_tools::{
    CurrencyInput, EventsInput, HotelDetailInput, HotelsInput, PlacesInput, SerpTools,
};

#[derive(Parser, Debug)]
#[command(name = "travel-serp-mcp")]
#[command(
    author,
    version,
    about = "MCP server for hotels, events, places and currency rates"
)]
struct Args {
    /// SerpApi key
    #[arg(long, env = "SERPAPI_KEY", hide_env_values = true)]
    serpapi_key: String,

    /// CurrencyFreaks key
    #[arg(long, env = "CURRENCYFREAKS_API_KEY", hide_env_values = true)]
    currencyfreaks_key: String,

    #[arg(long, env = "SERPAPI_ENDPOINT", default_value = SERPAPI_ENDPOINT)]
    serpapi_endpoint: String,

    #[arg(long, env = "CURRENCYFREAKS_ENDPOINT", default_value = CURRENCYFREAKS_ENDPOINT)]
    currencyfreaks_endpoint: String,

    #[arg(long, env = "SERPAPI_TIMEOUT_SECS", default_value_t = SERPAPI_TIMEOUT_SECS)]
    serpapi_timeout_secs: u64,

    #[arg(long, env = "CURRENCYFREAKS_TIMEOUT_SECS", default_value_t = CURRENCYFREAKS_TIMEOUT_SECS)]
    currencyfreaks_timeout_secs: u64,

    #[command(subcommand)]
    command: Transport,
}

fn to_text(value: Value) -> Result<String, String> {
    serde_json::to_string(&value).map_err(|e| e.to_string())
}

#[derive(Clone)]
pub struct SerpServer {
    tools: Arc<SerpTools>,
    tool_router: ToolRouter<Self>,
}

impl SerpServer {
    pub fn new(tools: Arc<SerpTools>) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl SerpServer {
    #[tool(
        name = "search_hotels",
        description = "Search hotels and vacation rentals via SerpApi Google Hotels. Parameters: query, check_in_date and check_out_date (YYYY-MM-DD), adults (default 2), children, children_ages (1-17, one per child), currency, gl, hl, sort_by (relevance/lowest_price/highest_rating/most_reviewed), min_price, max_price, rating (3.5+/4.0+/4.5+), hotel_class (2-5 star), property_types, amenities, free_cancellation, special_offers, eco_certified, vacation_rentals, bedrooms, bathrooms, next_page_token. Returns {properties, serpapi_pagination} or {error}."
    )]
    async fn search_hotels(&self, params: Parameters<HotelsInput>) -> Result<String, String> {
        to_text(self.tools.search_hotels(params.0).await)
    }

    #[tool(
        name = "find_hotel_detail",
        description = "Full detail for one property via SerpApi Google Hotels. Parameters: query, property_token (from search_hotels), check_in_date and check_out_date (YYYY-MM-DD), adults, children, children_ages, currency, gl, hl. Returns the property document or {error}."
    )]
    async fn find_hotel_detail(
        &self,
        params: Parameters<HotelDetailInput>,
    ) -> Result<String, String> {
        to_text(self.tools.find_hotel_detail(params.0).await)
    }

    #[tool(
        name = "search_events",
        description = "Search events via SerpApi Google Events. The query should name the place, e.g. \"Events in Austin, TX\". Parameters: query, location, gl, hl, start (offset, multiples of 10), filters (date:today, date:tomorrow, date:week, date:weekend, date:next_week, date:month, date:next_month, event_type:Virtual-Event). Returns {search_metadata, search_parameters, events_results} or {error}."
    )]
    async fn search_events(&self, params: Parameters<EventsInput>) -> Result<String, String> {
        to_text(self.tools.search_events(params.0).await)
    }

    #[tool(
        name = "search_places",
        description = "Search top sights and places (attractions, restaurants) via SerpApi Google search. Parameters: query, gl, hl. Returns {search_metadata, search_parameters, top_sights} or {error}."
    )]
    async fn search_places(&self, params: Parameters<PlacesInput>) -> Result<String, String> {
        to_text(self.tools.search_places(params.0).await)
    }

    #[tool(
        name = "get_latest_currency_rates",
        description = "Latest exchange rates from CurrencyFreaks. Parameters: base (currency code, e.g. \"USD\"). Returns {date, base, rates} or {error}."
    )]
    async fn get_latest_currency_rates(
        &self,
        params: Parameters<CurrencyInput>,
    ) -> Result<String, String> {
        to_text(self.tools.get_latest_currency_rates(params.0).await)
    }

    #[tool(
        name = "current_date",
        description = "Current local date, time and timezone. Call before time-sensitive searches. Returns {date, time, timezone}."
    )]
    async fn current_date(&self) -> Result<String, String> {
        to_text(self.tools.current_date())
    }
}

impl ServerHandler for SerpServer {
    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl Future<Output = Result<rmcp::model::ListToolsResult, rmcp::ErrorData>> + Send + '_
    {
        Box::pin(async move {
            let tools = self.tool_router.list_all();
            tracing::debug!("Returning {} tools", tools.len());
            Ok(rmcp::model::ListToolsResult::with_all_items(tools))
        })
    }

    fn call_tool(
        &self,
        request: rmcp::model::CallToolRequestParam,
        context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl Future<Output = Result<rmcp::model::CallToolResult, rmcp::ErrorData>> + Send + '_
    {
        call_routed_tool(self.tool_router.clone(), self.clone(), request, context)
    }

    fn get_info(&self) -> rmcp::model::ServerInfo {
        server_info()
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let args = Args::parse();
    tracing::debug!(
        "SerpApi endpoint {}, CurrencyFreaks endpoint {}",
        args.serpapi_endpoint,
        args.currencyfreaks_endpoint
    );

    let serp = SerpConfig::new(args.serpapi_key)
        .with_endpoint(args.serpapi_endpoint)
        .with_timeout_secs(args.serpapi_timeout_secs);
    let currency = CurrencyConfig::new(args.currencyfreaks_key)
        .with_endpoint(args.currencyfreaks_endpoint)
        .with_timeout_secs(args.currencyfreaks_timeout_secs);
    let tools = Arc::new(SerpTools::new(serp, currency).context("Failed to create API clients")?);

    serve(SerpServer::new(tools), args.command).await
}
