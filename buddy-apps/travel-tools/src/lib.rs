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

// Library for travel-buddy-tools
// MCP tool servers for SerpApi search, currency rates and Kayak flights

pub mod config;
mod api_client;
mod currency_rates;
mod dates;
mod envelope;
mod flight_tools;
mod flights_ranking;
mod flights_report;
mod kayak_query_builder;
mod kayak_results_parser;
mod kayak_search;
mod serp_query_builder;
mod serp_results;
mod serp_search;
mod serp_tools;

#[cfg(feature = "mcp")]
pub mod mcp_transport;

pub use api_client::{ApiError, JsonApiClient, build_query_url, redacted_url};

pub use currency_rates::{CurrencyClient, CurrencyRates};

pub use dates::{CurrentDate, current_date, describe_instant, parse_travel_date};

pub use envelope::respond;

// Re-export kayak_query_builder
pub use kayak_query_builder::{
    Alliance, CabinClass, ChildType, FlightFilters, FlightPassengers, FlightSearchParams,
    FlightSearchParamsBuilder, SortOption,
};

// Re-export kayak_results_parser
pub use kayak_results_parser::{
    AirportInfo, Baggage, FlightDetails, FlightLeg, FlightOffer, ParsedFlightsPage, StopDetail,
    parse_duration_minutes,
};

pub use kayak_search::{FlightSearchResult, KayakFlightsClient};

pub use flights_ranking::{apply_filters, paginate, sort_offers};

pub use flights_report::format_flight_summary;

// Re-export serp_query_builder
pub use serp_query_builder::{
    Amenity, EventSearchParams, HotelClass, HotelDetailParams, HotelSearchParams,
    PlaceSearchParams, PropertyType, Rating, SortBy,
};

pub use serp_results::{EventsResult, HotelListResult, PlacesResult, PropertySummary};

pub use serp_search::SerpApiClient;

pub use serp_tools::{
    CurrencyInput, EventsInput, HotelDetailInput, HotelsInput, PlacesInput, SerpTools,
};

pub use flight_tools::{FlightTools, FlightsInput};
