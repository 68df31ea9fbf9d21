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

//! Plain-text rendering of a flight search for tool callers.

use crate::kayak_results_parser::{AirportInfo, FlightLeg, FlightOffer};
use crate::kayak_search::FlightSearchResult;
use std::fmt::Write;

const NA: &str = "N/A";

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NA)
}

fn airport(info: Option<&AirportInfo>) -> (String, String) {
    match info {
        Some(a) => (a.code.clone(), or_na(a.name.as_deref()).to_string()),
        None => (NA.to_string(), NA.to_string()),
    }
}

fn write_leg(out: &mut String, title: &str, leg: &FlightLeg) {
    let (dep_code, dep_name) = airport(leg.departure_airport.as_ref());
    let (arr_code, arr_name) = airport(leg.arrival_airport.as_ref());
    let airlines = if leg.airlines.is_empty() {
        NA.to_string()
    } else {
        leg.airlines.join(", ")
    };

    writeln!(out, "{}:", title).ok();
    writeln!(
        out,
        "  Departure: {} from {} ({})",
        or_na(leg.departure_time.as_deref()),
        dep_code,
        dep_name
    )
    .ok();
    writeln!(
        out,
        "  Arrival: {}{} at {} ({})",
        or_na(leg.arrival_time.as_deref()),
        if leg.next_day_arrival { " (+1 day)" } else { "" },
        arr_code,
        arr_name
    )
    .ok();
    writeln!(out, "  Duration: {}", or_na(leg.duration.as_deref())).ok();
    writeln!(out, "  Airlines: {}", airlines).ok();
    writeln!(out, "  Stops: {}", leg.stops).ok();
    for (i, stop) in leg.stop_details.iter().enumerate() {
        writeln!(
            out,
            "    Stop {}: {} ({}), Layover: {}",
            i + 1,
            stop.airport_code,
            or_na(stop.airport_name.as_deref()),
            or_na(stop.layover_duration.as_deref())
        )
        .ok();
    }
}

fn format_offer(offer: &FlightOffer, show_return: bool) -> String {
    let details = &offer.details;
    let fare_types = if details.fare_types.is_empty() {
        NA.to_string()
    } else {
        details.fare_types.join(", ")
    };

    let mut out = String::new();
    writeln!(out, "Flight:").ok();
    writeln!(out, "Price: {}", or_na(details.price.as_deref())).ok();
    writeln!(out, "Fare Types: {}", fare_types).ok();
    writeln!(out, "Available Booking Sites: {}", details.available_sites).ok();
    writeln!(
        out,
        "Baggage: {} carry-on, {} checked",
        details.baggage.carry_on.unwrap_or(0),
        details.baggage.checked_bags.unwrap_or(0)
    )
    .ok();
    write_leg(&mut out, "Outbound", &offer.outbound);
    if show_return {
        if let Some(leg) = offer.return_leg.as_ref().filter(|l| l.has_times()) {
            write_leg(&mut out, "Return", leg);
        }
    }
    write!(out, "Booking Link: {}", details.booking_link).ok();
    out
}

/// Flights separated by `---`, followed by the note and total.
pub fn format_flight_summary(result: &FlightSearchResult) -> String {
    if result.total_results == 0 {
        return format!(
            "No flights found: {}\nTotal results: {}",
            result.message.as_deref().unwrap_or("No flights available"),
            result.total_results
        );
    }
    if result.flights.is_empty() {
        return format!(
            "No valid flights found in the requested range.\nTotal results: {}",
            result.total_results
        );
    }

    let show_return = result.search_params.return_date.is_some();
    let mut out = result
        .flights
        .iter()
        .map(|o| format_offer(o, show_return))
        .collect::<Vec<_>>()
        .join("\n---\n");
    if let Some(message) = &result.message {
        out.push_str(&format!("\nNote: {}", message));
    }
    out.push_str(&format!("\nTotal results available: {}", result.total_results));
    out
}
