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

//! Client-side filtering, ordering and windowing of scraped flight offers.
//!
//! Kayak already applies the `fs` filters and `sort` order server-side; this
//! pass re-applies what the scraped rows can express so the returned page is
//! consistent even when the page ignores a parameter.

use crate::kayak_query_builder::{FlightFilters, SortOption};
use crate::kayak_results_parser::{FlightLeg, FlightOffer};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*([ap])?").unwrap());

const MINUTES_PER_DAY: u64 = 24 * 60;

/// Minutes since midnight for `10:05 pm`, `6:40 am` or `22:05`.
fn minutes_of_day(s: &str) -> Option<u64> {
    let caps = CLOCK_RE.captures(s)?;
    let hour: u64 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u64 = caps.get(2)?.as_str().parse().ok()?;
    let hour = match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(ref p) if p == "p" => hour % 12 + 12,
        Some(_) => hour % 12,
        None => hour,
    };
    (hour < 24 && minute < 60).then_some(hour * 60 + minute)
}

fn departure_key(leg: &FlightLeg) -> Option<u64> {
    leg.departure_time.as_deref().and_then(minutes_of_day)
}

fn arrival_key(leg: &FlightLeg) -> Option<u64> {
    let minutes = leg.arrival_time.as_deref().and_then(minutes_of_day)?;
    Some(if leg.next_day_arrival {
        minutes + MINUTES_PER_DAY
    } else {
        minutes
    })
}

fn sort_key(offer: &FlightOffer, option: SortOption) -> Option<u64> {
    use SortOption::*;
    match option {
        BestFlight => None,
        PriceAsc | PriceDesc => offer.details.price_amount(),
        DurationAsc | DurationDesc => offer
            .legs()
            .map(|l| l.duration_minutes().map(u64::from))
            .sum::<Option<u64>>(),
        DepartAsc | DepartDesc => departure_key(&offer.outbound),
        ArriveAsc | ArriveDesc => arrival_key(&offer.outbound),
        DepartReturnAsc | DepartReturnDesc => offer.return_leg.as_ref().and_then(departure_key),
        ArriveReturnAsc | ArriveReturnDesc => offer.return_leg.as_ref().and_then(arrival_key),
    }
}

/// Stable sort; rows lacking the key go last in either direction.
/// `bestflight_a` keeps the page order.
pub fn sort_offers(offers: &mut [FlightOffer], option: SortOption) {
    if option == SortOption::BestFlight {
        return;
    }
    let descending = option.is_descending();
    offers.sort_by(|a, b| match (sort_key(a, option), sort_key(b, option)) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Drops rows that contradict the requested filters. Rows missing the
/// relevant datum are kept. Airline, alliance and wifi filters are left to
/// the upstream page: cards only carry carrier display names.
pub fn apply_filters(offers: Vec<FlightOffer>, filters: &FlightFilters) -> Vec<FlightOffer> {
    let before = offers.len();
    let kept: Vec<FlightOffer> = offers
        .into_iter()
        .filter(|o| filters.stops.is_none_or(|max| o.max_stops() <= max))
        .filter(|o| {
            match (filters.max_price, o.details.price_amount()) {
                (Some(max), Some(price)) => price <= u64::from(max),
                _ => true,
            }
        })
        .filter(|o| match (filters.carry_on_free, o.details.baggage.carry_on) {
            (Some(min), Some(have)) => have >= min,
            _ => true,
        })
        .filter(|o| match (filters.checked_bags_free, o.details.baggage.checked_bags) {
            (Some(min), Some(have)) => have >= min,
            _ => true,
        })
        .collect();
    if kept.len() != before {
        tracing::debug!("Client-side filters dropped {} rows", before - kept.len());
    }
    kept
}

/// Inclusive `start..=end` window.
pub fn paginate(offers: Vec<FlightOffer>, start: usize, end: usize) -> Vec<FlightOffer> {
    if end < start {
        return Vec::new();
    }
    offers
        .into_iter()
        .skip(start)
        .take(end - start + 1)
        .collect()
}
