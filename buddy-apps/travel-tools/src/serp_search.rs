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

//! # SerpApi Search Client
//!
//! Effectful (network) operations against the SerpApi `search.json` endpoint.

use crate::api_client::{JsonApiClient, redacted_url};
use crate::config::SerpConfig;
use crate::serp_query_builder::{
    EventSearchParams, HotelDetailParams, HotelSearchParams, PlaceSearchParams,
};
use crate::serp_results::{EventsResult, HotelListResult, PlacesResult, hotel_detail_from_response};
use anyhow::{Context, Result};
use serde_json::Value;

#[derive(Clone)]
pub struct SerpApiClient {
    http: JsonApiClient,
    config: SerpConfig,
}

impl SerpApiClient {
    pub fn new(config: SerpConfig) -> Result<Self> {
        let http = JsonApiClient::new(config.timeout_secs).context("Failed to create SerpApi client")?;
        Ok(Self { http, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Request URL with the API key masked, for dry runs and logs.
    pub fn describe_request(&self, query: &[(&'static str, String)]) -> String {
        redacted_url(&self.config.endpoint, query)
    }

    async fn fetch(&self, query: Vec<(&'static str, String)>) -> Result<Value> {
        Ok(self.http.get_json(&self.config.endpoint, &query).await?)
    }

    pub async fn search_hotels(&self, params: &HotelSearchParams) -> Result<HotelListResult> {
        params.validate()?;
        let doc = self.fetch(params.to_query(&self.config.api_key)).await?;
        let result = HotelListResult::from_response(doc)?;
        tracing::info!(
            "search_hotels '{}': {} properties",
            params.query,
            result.properties.len()
        );
        Ok(result)
    }

    pub async fn find_hotel_detail(&self, params: &HotelDetailParams) -> Result<Value> {
        params.validate()?;
        let doc = self.fetch(params.to_query(&self.config.api_key)).await?;
        Ok(hotel_detail_from_response(doc)?)
    }

    pub async fn search_events(&self, params: &EventSearchParams) -> Result<EventsResult> {
        params.validate()?;
        let doc = self.fetch(params.to_query(&self.config.api_key)).await?;
        let result = EventsResult::from_response(doc)?;
        tracing::info!(
            "search_events '{}': {} events",
            params.query,
            result.events_results.len()
        );
        Ok(result)
    }

    pub async fn search_places(&self, params: &PlaceSearchParams) -> Result<PlacesResult> {
        params.validate()?;
        let doc = self.fetch(params.to_query(&self.config.api_key)).await?;
        Ok(PlacesResult::from_response(doc)?)
    }
}
