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

//! # SerpApi Results
//!
//! Side-effect free reshaping of SerpApi JSON documents into tool outputs.

use crate::api_client::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fails unless `search_metadata.status` is `Success`.
pub(crate) fn check_search_status(doc: &Value) -> Result<(), ApiError> {
    let status = doc
        .pointer("/search_metadata/status")
        .and_then(Value::as_str);
    if status == Some("Success") {
        return Ok(());
    }
    let message = doc
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("Unknown error");
    Err(ApiError::Upstream(message.to_string()))
}

fn take_field(doc: &mut Value, key: &str) -> Option<Value> {
    doc.as_object_mut().and_then(|o| o.remove(key))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelListResult {
    pub properties: Vec<Value>,
    pub serpapi_pagination: Value,
}

impl HotelListResult {
    pub fn from_response(mut doc: Value) -> Result<Self, ApiError> {
        check_search_status(&doc)?;
        let properties = match take_field(&mut doc, "properties") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let serpapi_pagination = take_field(&mut doc, "serpapi_pagination")
            .unwrap_or_else(|| Value::Object(Map::new()));
        Ok(Self {
            properties,
            serpapi_pagination,
        })
    }

    pub fn next_page_token(&self) -> Option<&str> {
        self.serpapi_pagination
            .get("next_page_token")
            .and_then(Value::as_str)
    }

    pub fn summaries(&self) -> Vec<PropertySummary> {
        self.properties
            .iter()
            .filter_map(|p| serde_json::from_value(p.clone()).ok())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatePerNight {
    pub lowest: Option<String>,
    pub extracted_lowest: Option<f64>,
}

/// The handful of property fields worth rendering in a table.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertySummary {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub rate_per_night: Option<RatePerNight>,
    #[serde(default)]
    pub extracted_hotel_class: Option<u32>,
    #[serde(default)]
    pub overall_rating: Option<f64>,
    #[serde(default)]
    pub reviews: Option<u64>,
    #[serde(default)]
    pub property_token: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl PropertySummary {
    pub fn lowest_rate(&self) -> Option<&str> {
        self.rate_per_night.as_ref().and_then(|r| r.lowest.as_deref())
    }
}

/// Property details are passed through whole once the status check passes.
pub(crate) fn hotel_detail_from_response(doc: Value) -> Result<Value, ApiError> {
    check_search_status(&doc)?;
    Ok(doc)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResult {
    pub search_metadata: Value,
    pub search_parameters: Value,
    pub events_results: Vec<Value>,
}

impl EventsResult {
    pub fn from_response(mut doc: Value) -> Result<Self, ApiError> {
        check_search_status(&doc)?;
        let events_results = match take_field(&mut doc, "events_results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        Ok(Self {
            search_metadata: take_field(&mut doc, "search_metadata").unwrap_or_default(),
            search_parameters: take_field(&mut doc, "search_parameters").unwrap_or_default(),
            events_results,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesResult {
    pub search_metadata: Value,
    pub search_parameters: Value,
    pub top_sights: Value,
}

impl PlacesResult {
    pub fn from_response(mut doc: Value) -> Result<Self, ApiError> {
        check_search_status(&doc)?;
        let top_sights = take_field(&mut doc, "top_sights")
            .ok_or_else(|| ApiError::NoResults("No top sights found".to_string()))?;
        Ok(Self {
            search_metadata: take_field(&mut doc, "search_metadata").unwrap_or_default(),
            search_parameters: take_field(&mut doc, "search_parameters").unwrap_or_default(),
            top_sights,
        })
    }
}
