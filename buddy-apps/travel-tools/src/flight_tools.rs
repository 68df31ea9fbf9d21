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

//! Tool surface of the flight service.

use crate::config::KayakConfig;
use crate::dates::parse_travel_date;
use crate::flights_report::format_flight_summary;
use crate::kayak_query_builder::{
    Alliance, CabinClass, ChildType, FlightFilters, FlightPassengers, FlightSearchParams,
    SortOption,
};
use crate::kayak_search::KayakFlightsClient;
use anyhow::{Context, Result, bail, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn default_adults() -> i64 {
    2
}

fn default_plane_type() -> String {
    "economy".to_string()
}

fn default_sort_option() -> String {
    "price_a".to_string()
}

fn default_carry_on_free() -> Option<i64> {
    Some(1)
}

fn default_max_price() -> Option<i64> {
    Some(6000)
}

fn default_end_index() -> i64 {
    15
}

/// Kayak flight search with client-side sort, filter and paging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct FlightsInput {
    /// 3-letter IATA code, e.g. "YYZ"
    pub departure_airport: String,
    /// 3-letter IATA code, e.g. "HKG"
    pub arrival_airport: String,
    /// YYYY-MM-DD
    pub departure_date: String,
    /// YYYY-MM-DD; omit for one-way
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(default = "default_adults")]
    pub adults: i64,
    #[serde(default)]
    pub students: i64,
    /// One entry per child: "11" (2-11 years), "1S" (infant in seat), "1L" (infant on lap)
    #[serde(default)]
    pub children: Vec<String>,
    /// economy, premium, business or first
    #[serde(default = "default_plane_type")]
    pub plane_type: String,
    /// bestflight_a, price_a/b, duration_a/b, depart_a/b, arrive_a/b, departReturn_a/b, arriveReturn_a/b
    #[serde(default = "default_sort_option")]
    pub sort_option: String,
    /// Minimum free carry-on bags
    #[serde(default = "default_carry_on_free")]
    pub carry_on_free: Option<i64>,
    /// Minimum free checked bags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_bags_free: Option<i64>,
    /// Maximum number of stops
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stops: Option<i64>,
    #[serde(default = "default_max_price")]
    pub max_price: Option<i64>,
    /// VALUE_ALLIANCE, ONE_WORLD, SKY_TEAM or STAR_ALLIANCE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alliance: Option<String>,
    /// 2-character airline codes to keep, e.g. ["AC", "CX"]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_airlines: Option<Vec<String>>,
    /// 2-character airline codes to drop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_airlines: Option<Vec<String>>,
    #[serde(default)]
    pub wifi_only: bool,
    #[serde(default)]
    pub start_index: i64,
    /// Inclusive
    #[serde(default = "default_end_index")]
    pub end_index: i64,
}

fn non_negative(value: Option<i64>, field: &str) -> Result<Option<u32>> {
    match value {
        Some(v) => {
            ensure!(v >= 0, "{} cannot be negative.", field);
            let v = u32::try_from(v).with_context(|| format!("{} is too large.", field))?;
            Ok(Some(v))
        }
        None => Ok(None),
    }
}

fn airline_set(codes: Option<Vec<String>>) -> BTreeSet<String> {
    codes
        .unwrap_or_default()
        .into_iter()
        .map(|c| c.trim().to_uppercase())
        .collect()
}

impl FlightsInput {
    /// Dates first, then passengers and option names, then the numeric
    /// filters and window. Airport codes are checked by the builder.
    pub fn into_params(self, today: NaiveDate) -> Result<FlightSearchParams> {
        let departure_date = parse_travel_date(&self.departure_date, "departure", today)?;
        let return_date = self
            .return_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(|d| parse_travel_date(d, "return", today))
            .transpose()?;

        ensure!(
            self.adults >= 0 && self.students >= 0,
            "Adults and students cannot be negative."
        );
        let adults = u32::try_from(self.adults).context("adults is too large.")?;
        let students = u32::try_from(self.students).context("students is too large.")?;
        let children = self
            .children
            .iter()
            .map(|c| ChildType::from_str_name(c))
            .collect::<Option<Vec<_>>>();
        let total = u32::try_from(self.children.len())
            .ok()
            .and_then(|n| n.checked_add(adults))
            .and_then(|n| n.checked_add(students))
            .context("Too many passengers.")?;
        ensure!(total > 0, "At least one passenger is required.");
        let Some(children) = children else {
            bail!("Invalid child type. Must be '11', '1S', or '1L'.");
        };
        let passengers = FlightPassengers {
            adults,
            students,
            children,
        };

        let Some(cabin_class) = CabinClass::from_str_name(&self.plane_type) else {
            bail!("Invalid plane_type. Must be one of: economy, premium, business, first.");
        };
        let Some(sort_option) = SortOption::from_str_name(&self.sort_option) else {
            bail!(
                "Invalid sort_option. Must be one of: {}.",
                SortOption::valid_names()
            );
        };
        let alliance = match self.alliance.as_deref().filter(|a| !a.trim().is_empty()) {
            Some(a) => match Alliance::from_str_name(a) {
                Some(alliance) => Some(alliance),
                None => bail!(
                    "Invalid alliance. Must be one of: VALUE_ALLIANCE, ONE_WORLD, SKY_TEAM, STAR_ALLIANCE."
                ),
            },
            None => None,
        };

        let filters = FlightFilters {
            carry_on_free: non_negative(self.carry_on_free, "carry_on_free")?,
            checked_bags_free: non_negative(self.checked_bags_free, "checked_bags_free")?,
            stops: non_negative(self.stops, "stops")?,
            max_price: match self.max_price {
                Some(p) => {
                    ensure!(p > 0, "max_price must be positive.");
                    Some(u32::try_from(p).context("max_price is too large.")?)
                }
                None => None,
            },
            alliance,
            include_airlines: airline_set(self.include_airlines),
            exclude_airlines: airline_set(self.exclude_airlines),
            wifi_only: self.wifi_only,
        };

        ensure!(
            self.start_index >= 0,
            "start_index must be a non-negative integer."
        );
        ensure!(
            self.end_index >= self.start_index,
            "end_index must be an integer greater than or equal to start_index."
        );

        let mut builder =
            FlightSearchParams::builder(self.departure_airport, self.arrival_airport, departure_date)
                .passengers(passengers)
                .cabin_class(cabin_class)
                .sort_option(sort_option)
                .filters(filters)
                .range(self.start_index as usize, self.end_index as usize);
        if let Some(ret) = return_date {
            builder = builder.return_date(ret);
        }
        builder.build()
    }
}

#[derive(Clone)]
pub struct FlightTools {
    client: KayakFlightsClient,
}

impl FlightTools {
    pub fn new(config: KayakConfig) -> Result<Self> {
        Ok(Self {
            client: KayakFlightsClient::new(config)?,
        })
    }

    pub async fn scrape_flights(&self, input: FlightsInput) -> String {
        let today = chrono::Local::now().date_naive();
        let params = match input.into_params(today) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!("Rejected flight search: {}", e);
                return e.to_string();
            }
        };

        match self.client.search_flights(&params).await {
            Ok(result) => format_flight_summary(&result),
            Err(e) => {
                tracing::error!("Flight search failed: {:#}", e);
                format!("Error fetching flight data: {:#}\nTotal results: 0", e)
            }
        }
    }
}
