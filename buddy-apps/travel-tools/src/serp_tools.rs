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

//! Tool surface of the SERP service: raw tool inputs in, JSON documents out.
//!
//! Inputs are kept loose (strings for enum names, signed integers for counts)
//! so that bad values are reported inside the `{"error": ...}` envelope
//! rather than rejected by the protocol layer.

use crate::config::{CurrencyConfig, SerpConfig};
use crate::currency_rates::CurrencyClient;
use crate::dates::{current_date, parse_travel_date};
use crate::envelope::respond;
use crate::serp_query_builder::{
    EventSearchParams, HotelDetailParams, HotelSearchParams, PlaceSearchParams, SerpCode,
    parse_names,
};
use crate::serp_query_builder::{Rating, SortBy};
use crate::serp_search::SerpApiClient;
use anyhow::{Result, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_adults() -> i64 {
    2
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_gl() -> String {
    "us".to_string()
}

fn default_hl() -> String {
    "en".to_string()
}

fn count(value: i64, field: &str) -> Result<u32> {
    ensure!(value >= 0, "{} cannot be negative.", field);
    u32::try_from(value).map_err(|_| anyhow::anyhow!("{} is too large.", field))
}

fn opt_count(value: Option<i64>, field: &str) -> Result<Option<u32>> {
    value.map(|v| count(v, field)).transpose()
}

fn ages(values: Option<Vec<i64>>) -> Result<Option<Vec<u32>>> {
    values
        .map(|v| v.into_iter().map(|a| count(a, "children_ages")).collect())
        .transpose()
}

fn stay_dates(check_in: &str, check_out: &str, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    Ok((
        parse_travel_date(check_in, "check-in", today)?,
        parse_travel_date(check_out, "check-out", today)?,
    ))
}

/// Hotel and vacation-rental search (SerpApi `google_hotels`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct HotelsInput {
    /// Location or hotel query, e.g. "Bali Resorts"
    pub query: String,
    /// YYYY-MM-DD
    pub check_in_date: String,
    /// YYYY-MM-DD
    pub check_out_date: String,
    #[serde(default = "default_adults")]
    pub adults: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Country code, e.g. "us"
    #[serde(default = "default_gl")]
    pub gl: String,
    /// Language code, e.g. "en"
    #[serde(default = "default_hl")]
    pub hl: String,
    /// LOWEST_PRICE, HIGHEST_RATING or MOST_REVIEWED
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    /// e.g. RESORTS, BOUTIQUE_HOTELS, HOSTELS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_types: Option<Vec<String>>,
    /// e.g. FREE_WIFI, POOL, SPA, PET_FRIENDLY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    /// THREE_POINT_FIVE_PLUS, FOUR_PLUS or FOUR_POINT_FIVE_PLUS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    /// TWO_STAR to FIVE_STAR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_class: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_cancellation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_offers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eco_certified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacation_rentals: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<i64>,
    /// One age (1-17) per child
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_ages: Option<Vec<i64>>,
    /// `serpapi_pagination.next_page_token` from a previous call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl HotelsInput {
    pub fn into_params(self, today: NaiveDate) -> Result<HotelSearchParams> {
        let (check_in, check_out) = stay_dates(&self.check_in_date, &self.check_out_date, today)?;
        let mut params = HotelSearchParams::new(self.query, check_in, check_out);
        params.adults = count(self.adults, "adults")?;
        params.currency = self.currency;
        params.gl = self.gl;
        params.hl = self.hl;
        params.sort_by = self.sort_by.as_deref().map(SortBy::parse).transpose()?;
        params.min_price = self.min_price;
        params.max_price = self.max_price;
        params.property_types = parse_names(&self.property_types.unwrap_or_default())?;
        params.amenities = parse_names(&self.amenities.unwrap_or_default())?;
        params.rating = self.rating.as_deref().map(Rating::parse).transpose()?;
        params.hotel_class = parse_names(&self.hotel_class.unwrap_or_default())?;
        params.free_cancellation = self.free_cancellation;
        params.special_offers = self.special_offers;
        params.eco_certified = self.eco_certified;
        params.vacation_rentals = self.vacation_rentals;
        params.bedrooms = opt_count(self.bedrooms, "bedrooms")?;
        params.bathrooms = opt_count(self.bathrooms, "bathrooms")?;
        params.children = opt_count(self.children, "children")?;
        params.children_ages = ages(self.children_ages)?;
        params.next_page_token = self.next_page_token;
        params.validate()?;
        Ok(params)
    }
}

/// Full details for one property (SerpApi `google_hotels` with a property token).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct HotelDetailInput {
    pub query: String,
    /// `property_token` from search_hotels
    pub property_token: String,
    pub check_in_date: String,
    pub check_out_date: String,
    #[serde(default = "default_adults")]
    pub adults: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_gl")]
    pub gl: String,
    #[serde(default = "default_hl")]
    pub hl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_ages: Option<Vec<i64>>,
}

impl HotelDetailInput {
    pub fn into_params(self, today: NaiveDate) -> Result<HotelDetailParams> {
        let (check_in, check_out) = stay_dates(&self.check_in_date, &self.check_out_date, today)?;
        let mut params = HotelDetailParams::new(self.query, self.property_token, check_in, check_out);
        params.adults = count(self.adults, "adults")?;
        params.currency = self.currency;
        params.gl = self.gl;
        params.hl = self.hl;
        params.children = opt_count(self.children, "children")?;
        params.children_ages = ages(self.children_ages)?;
        params.validate()?;
        Ok(params)
    }
}

/// Event search (SerpApi `google_events`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct EventsInput {
    /// Should name the place, e.g. "Events in Austin, TX"
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hl: Option<String>,
    /// Result offset, multiples of 10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// e.g. "date:today", "date:weekend", "event_type:Virtual-Event"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<String>>,
}

impl EventsInput {
    pub fn into_params(self) -> Result<EventSearchParams> {
        let params = EventSearchParams {
            query: self.query,
            location: self.location,
            gl: self.gl,
            hl: self.hl,
            start: opt_count(self.start, "start")?,
            filters: self.filters.unwrap_or_default(),
        };
        params.validate()?;
        Ok(params)
    }
}

/// Top sights and places (SerpApi `google`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct PlacesInput {
    /// e.g. "top sights in Paris"
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hl: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct CurrencyInput {
    /// Base currency code, e.g. "USD"
    pub base: String,
}

#[derive(Clone)]
pub struct SerpTools {
    serp: SerpApiClient,
    currency: CurrencyClient,
}

impl SerpTools {
    pub fn new(serp: SerpConfig, currency: CurrencyConfig) -> Result<Self> {
        Ok(Self {
            serp: SerpApiClient::new(serp)?,
            currency: CurrencyClient::new(currency)?,
        })
    }

    fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    pub async fn search_hotels(&self, input: HotelsInput) -> Value {
        let outcome = async {
            let params = input.into_params(Self::today())?;
            self.serp.search_hotels(&params).await
        };
        respond(outcome.await)
    }

    pub async fn find_hotel_detail(&self, input: HotelDetailInput) -> Value {
        let outcome = async {
            let params = input.into_params(Self::today())?;
            self.serp.find_hotel_detail(&params).await
        };
        respond(outcome.await)
    }

    pub async fn search_events(&self, input: EventsInput) -> Value {
        let outcome = async {
            let params = input.into_params()?;
            self.serp.search_events(&params).await
        };
        respond(outcome.await)
    }

    pub async fn search_places(&self, input: PlacesInput) -> Value {
        let params = PlaceSearchParams {
            query: input.query,
            gl: input.gl,
            hl: input.hl,
        };
        respond(self.serp.search_places(&params).await)
    }

    pub async fn get_latest_currency_rates(&self, input: CurrencyInput) -> Value {
        respond(self.currency.latest_rates(&input.base).await)
    }

    pub fn current_date(&self) -> Value {
        respond(Ok(current_date()))
    }
}
