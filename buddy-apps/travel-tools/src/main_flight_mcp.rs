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

//! # Flight MCP Server
//!
//! Exposes `scrape_flights_tool` over stdio or HTTP.

use anyhow::{Context, Error, Result};
use clap::Parser;
use rmcp::handler::server::{ServerHandler, tool::ToolRouter, wrapper::Parameters};
use rmcp::tool;
use rmcp::tool_router;
use std::sync::Arc;
use travel_buddy_tools::config::{KAYAK_BASE_URL, KAYAK_TIMEOUT_SECS, KayakConfig};
use travel_buddy_tools::mcp_transport::{
    Transport, call_routed_tool, init_tracing, serve, server_info,
};
use travel_buddy_tools::{FlightTools, FlightsInput};

#[derive(Parser, Debug)]
#[command(name = "travel-flight-mcp")]
#[command(author, version, about = "MCP server for Kayak flight search")]
struct Args {
    #[arg(long, env = "KAYAK_BASE_URL", default_value = KAYAK_BASE_URL)]
    kayak_base_url: String,

    #[arg(long, env = "KAYAK_TIMEOUT_SECS", default_value_t = KAYAK_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Transport,
}

#[derive(Clone)]
pub struct FlightServer {
    tools: Arc<FlightTools>,
    tool_router: ToolRouter<Self>,
}

impl FlightServer {
    pub fn new(tools: Arc<FlightTools>) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl FlightServer {
    #[tool(
        name = "scrape_flights_tool",
        description = "Search Kayak flights and return a text summary, one flight per block separated by \"---\". Only a departure_date means one-way; departure_date and return_date mean round-trip. Parameters: departure_airport and arrival_airport (3-letter IATA), departure_date and return_date (YYYY-MM-DD), adults (default 2), students (default 0), children (list of \"11\" age 2-11, \"1S\" infant with seat, \"1L\" infant on lap), plane_type (economy/premium/business/first), sort_option (bestflight_a, price_a, price_b, duration_a, duration_b, depart_a, depart_b, arrive_a, arrive_b, departReturn_a, departReturn_b, arriveReturn_a, arriveReturn_b; default price_a), carry_on_free (min free carry-on bags, default 1), checked_bags_free, stops (max stops, 0 for direct), max_price (default 6000), alliance (VALUE_ALLIANCE/ONE_WORLD/SKY_TEAM/STAR_ALLIANCE), include_airlines and exclude_airlines (2-letter IATA codes), wifi_only, start_index (0-based, inclusive, default 0), end_index (inclusive, >= start_index, default 15)."
    )]
    async fn scrape_flights_tool(
        &self,
        params: Parameters<FlightsInput>,
    ) -> Result<String, String> {
        Ok(self.tools.scrape_flights(params.0).await)
    }
}

impl ServerHandler for FlightServer {
    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl Future<Output = Result<rmcp::model::ListToolsResult, rmcp::ErrorData>> + Send + '_
    {
        Box::pin(async move {
            Ok(rmcp::model::ListToolsResult::with_all_items(
                self.tool_router.list_all(),
            ))
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
    tracing::debug!("Parsed args: {:?}", args);

    let config = KayakConfig::default()
        .with_base_url(args.kayak_base_url)
        .with_timeout_secs(args.timeout_secs);
    let tools = Arc::new(FlightTools::new(config).context("Failed to create flights client")?);

    serve(FlightServer::new(tools), args.command).await
}
