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

//! # Kayak Query Builder
//!
//! Side-effect free validation and search-URL building for Kayak fare pages.
//!
//! URL shape:
//! `{base}/flights/{DEP}-{ARR}/{depart}[/{return}]/{passengers}/{cabin}?sort={opt}[&fs={filters}]`

use anyhow::{Result, bail, ensure};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static AIRPORT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());
static AIRLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{2}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CabinClass {
    #[default]
    Economy,
    Premium,
    Business,
    First,
}

impl CabinClass {
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "economy" | "e" => Some(CabinClass::Economy),
            "premium" | "premium_economy" | "pe" => Some(CabinClass::Premium),
            "business" | "b" => Some(CabinClass::Business),
            "first" | "f" => Some(CabinClass::First),
            _ => None,
        }
    }

    pub fn as_str_name(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::Premium => "premium",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    BestFlight,
    #[default]
    PriceAsc,
    PriceDesc,
    DurationAsc,
    DurationDesc,
    DepartAsc,
    DepartDesc,
    ArriveAsc,
    ArriveDesc,
    DepartReturnAsc,
    DepartReturnDesc,
    ArriveReturnAsc,
    ArriveReturnDesc,
}

impl SortOption {
    pub const ALL: [SortOption; 13] = [
        SortOption::BestFlight,
        SortOption::PriceAsc,
        SortOption::PriceDesc,
        SortOption::DurationAsc,
        SortOption::DurationDesc,
        SortOption::DepartAsc,
        SortOption::DepartDesc,
        SortOption::ArriveAsc,
        SortOption::ArriveDesc,
        SortOption::DepartReturnAsc,
        SortOption::DepartReturnDesc,
        SortOption::ArriveReturnAsc,
        SortOption::ArriveReturnDesc,
    ];

    pub fn from_str_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str_name() == s.trim())
    }

    pub fn as_str_name(&self) -> &'static str {
        match self {
            SortOption::BestFlight => "bestflight_a",
            SortOption::PriceAsc => "price_a",
            SortOption::PriceDesc => "price_b",
            SortOption::DurationAsc => "duration_a",
            SortOption::DurationDesc => "duration_b",
            SortOption::DepartAsc => "depart_a",
            SortOption::DepartDesc => "depart_b",
            SortOption::ArriveAsc => "arrive_a",
            SortOption::ArriveDesc => "arrive_b",
            SortOption::DepartReturnAsc => "departReturn_a",
            SortOption::DepartReturnDesc => "departReturn_b",
            SortOption::ArriveReturnAsc => "arriveReturn_a",
            SortOption::ArriveReturnDesc => "arriveReturn_b",
        }
    }

    pub fn is_descending(&self) -> bool {
        self.as_str_name().ends_with("_b")
    }

    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|o| o.as_str_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alliance {
    ValueAlliance,
    OneWorld,
    SkyTeam,
    StarAlliance,
}

impl Alliance {
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "VALUE_ALLIANCE" => Some(Alliance::ValueAlliance),
            "ONE_WORLD" | "ONEWORLD" => Some(Alliance::OneWorld),
            "SKY_TEAM" | "SKYTEAM" => Some(Alliance::SkyTeam),
            "STAR_ALLIANCE" => Some(Alliance::StarAlliance),
            _ => None,
        }
    }

    pub fn as_str_name(&self) -> &'static str {
        match self {
            Alliance::ValueAlliance => "VALUE_ALLIANCE",
            Alliance::OneWorld => "ONE_WORLD",
            Alliance::SkyTeam => "SKY_TEAM",
            Alliance::StarAlliance => "STAR_ALLIANCE",
        }
    }
}

/// Kayak child fare categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildType {
    /// 2 to 11 years
    Child,
    /// Under 2, own seat
    InfantInSeat,
    /// Under 2, on lap
    InfantOnLap,
}

impl ChildType {
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim() {
            "11" => Some(ChildType::Child),
            "1S" => Some(ChildType::InfantInSeat),
            "1L" => Some(ChildType::InfantOnLap),
            _ => None,
        }
    }

    pub fn as_str_name(&self) -> &'static str {
        match self {
            ChildType::Child => "11",
            ChildType::InfantInSeat => "1S",
            ChildType::InfantOnLap => "1L",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightPassengers {
    pub adults: u32,
    pub students: u32,
    pub children: Vec<ChildType>,
}

impl Default for FlightPassengers {
    fn default() -> Self {
        Self {
            adults: 2,
            students: 0,
            children: Vec::new(),
        }
    }
}

impl FlightPassengers {
    pub fn total(&self) -> usize {
        self.adults as usize + self.students as usize + self.children.len()
    }

    /// Path segment(s), e.g. `2adults/children-11-1S`. One token per child.
    pub fn to_url_segment(&self) -> String {
        let mut parts = Vec::new();
        if self.adults > 0 {
            parts.push(format!("{}adults", self.adults));
        }
        if self.students > 0 {
            parts.push(format!("{}students", self.students));
        }
        if !self.children.is_empty() {
            let kinds: Vec<&str> = self.children.iter().map(|c| c.as_str_name()).collect();
            parts.push(format!("children-{}", kinds.join("-")));
        }
        parts.join("/")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightFilters {
    pub carry_on_free: Option<u32>,
    pub checked_bags_free: Option<u32>,
    pub stops: Option<u32>,
    pub max_price: Option<u32>,
    pub alliance: Option<Alliance>,
    pub include_airlines: BTreeSet<String>,
    pub exclude_airlines: BTreeSet<String>,
    pub wifi_only: bool,
}

impl FlightFilters {
    /// Kayak `fs` value, `;`-joined. `None` when no filter is set.
    pub fn to_fs_string(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(n) = self.carry_on_free {
            parts.push(format!("cfc={}", n));
        }
        if let Some(n) = self.checked_bags_free {
            parts.push(format!("bfc={}", n));
        }
        if let Some(n) = self.stops {
            parts.push(format!("stops={}", n));
        }
        if let Some(p) = self.max_price {
            parts.push(format!("price=-{}", p));
        }
        if let Some(a) = self.alliance {
            parts.push(format!("alliance={}", a.as_str_name()));
        }
        if !self.include_airlines.is_empty() {
            parts.push(format!("airlines={}", join_set(&self.include_airlines)));
        }
        if !self.exclude_airlines.is_empty() {
            parts.push(format!("airlines=-{}", join_set(&self.exclude_airlines)));
        }
        if self.wifi_only {
            parts.push("wifi=wifi".to_string());
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(";"))
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(p) = self.max_price {
            ensure!(p > 0, "max_price must be positive.");
        }
        for (label, codes) in [
            ("include_airlines", &self.include_airlines),
            ("exclude_airlines", &self.exclude_airlines),
        ] {
            ensure!(
                codes.iter().all(|c| AIRLINE_RE.is_match(c)),
                "Invalid {}: All codes must be 2-character IATA codes.",
                label
            );
        }
        Ok(())
    }
}

fn join_set(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(",")
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightSearchParams {
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: FlightPassengers,
    pub cabin_class: CabinClass,
    pub sort_option: SortOption,
    pub filters: FlightFilters,
    pub start_index: usize,
    /// Inclusive.
    pub end_index: usize,
}

impl FlightSearchParams {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            AIRPORT_RE.is_match(&self.departure_airport),
            "Invalid departure airport code: Must be a 3-letter IATA code."
        );
        ensure!(
            AIRPORT_RE.is_match(&self.arrival_airport),
            "Invalid arrival airport code: Must be a 3-letter IATA code."
        );
        ensure!(
            self.departure_airport != self.arrival_airport,
            "Departure and arrival airports must differ."
        );
        if let Some(ret) = self.return_date {
            ensure!(
                ret >= self.departure_date,
                "Return date cannot be before departure date."
            );
        }
        ensure!(
            self.passengers.total() > 0,
            "At least one passenger is required."
        );
        self.filters.validate()?;
        if self.end_index < self.start_index {
            bail!("end_index must be an integer greater than or equal to start_index.");
        }
        Ok(())
    }

    /// Number of flights the inclusive window can hold.
    pub fn window_len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index) + 1
    }

    pub fn get_search_url(&self, base_url: &str) -> String {
        let mut path = format!(
            "{}/flights/{}-{}/{}",
            base_url.trim_end_matches('/'),
            self.departure_airport,
            self.arrival_airport,
            self.departure_date.format("%Y-%m-%d")
        );
        if let Some(ret) = self.return_date {
            path.push('/');
            path.push_str(&ret.format("%Y-%m-%d").to_string());
        }
        let passengers = self.passengers.to_url_segment();
        if !passengers.is_empty() {
            path.push('/');
            path.push_str(&passengers);
        }
        path.push('/');
        path.push_str(self.cabin_class.as_str_name());

        let mut url = format!("{}?sort={}", path, self.sort_option.as_str_name());
        if let Some(fs) = self.filters.to_fs_string() {
            url.push_str("&fs=");
            url.push_str(&fs);
        }
        url
    }

    pub fn builder(
        departure_airport: impl Into<String>,
        arrival_airport: impl Into<String>,
        departure_date: NaiveDate,
    ) -> FlightSearchParamsBuilder {
        FlightSearchParamsBuilder {
            params: FlightSearchParams {
                departure_airport: departure_airport.into().trim().to_uppercase(),
                arrival_airport: arrival_airport.into().trim().to_uppercase(),
                departure_date,
                return_date: None,
                passengers: FlightPassengers::default(),
                cabin_class: CabinClass::default(),
                sort_option: SortOption::default(),
                filters: FlightFilters::default(),
                start_index: 0,
                end_index: 15,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlightSearchParamsBuilder {
    params: FlightSearchParams,
}

impl FlightSearchParamsBuilder {
    pub fn return_date(mut self, return_date: NaiveDate) -> Self {
        self.params.return_date = Some(return_date);
        self
    }

    pub fn passengers(mut self, passengers: FlightPassengers) -> Self {
        self.params.passengers = passengers;
        self
    }

    pub fn cabin_class(mut self, cabin_class: CabinClass) -> Self {
        self.params.cabin_class = cabin_class;
        self
    }

    pub fn sort_option(mut self, sort_option: SortOption) -> Self {
        self.params.sort_option = sort_option;
        self
    }

    pub fn filters(mut self, filters: FlightFilters) -> Self {
        self.params.filters = filters;
        self
    }

    pub fn range(mut self, start_index: usize, end_index: usize) -> Self {
        self.params.start_index = start_index;
        self.params.end_index = end_index;
        self
    }

    pub fn build(self) -> Result<FlightSearchParams> {
        self.params.validate()?;
        Ok(self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_get_search_url_roundtrip_with_filters() {
        let filters = FlightFilters {
            carry_on_free: Some(1),
            stops: Some(0),
            max_price: Some(6000),
            alliance: Some(Alliance::StarAlliance),
            include_airlines: ["UA", "AC"].iter().map(|s| s.to_string()).collect(),
            wifi_only: true,
            ..Default::default()
        };
        let params = FlightSearchParams::builder("yyz", "HKG", date("2026-07-01"))
            .return_date(date("2026-07-25"))
            .passengers(FlightPassengers {
                adults: 2,
                students: 0,
                children: vec![ChildType::Child, ChildType::InfantOnLap],
            })
            .cabin_class(CabinClass::Business)
            .filters(filters)
            .build()
            .unwrap();

        assert_eq!(
            params.get_search_url("https://www.ca.kayak.com"),
            "https://www.ca.kayak.com/flights/YYZ-HKG/2026-07-01/2026-07-25/2adults/children-11-1L/business\
             ?sort=price_a&fs=cfc=1;stops=0;price=-6000;alliance=STAR_ALLIANCE;airlines=AC,UA;wifi=wifi"
        );
    }

    #[test]
    fn test_get_search_url_one_way_no_filters() {
        let params = FlightSearchParams::builder("JFK", "LHR", date("2026-03-01"))
            .passengers(FlightPassengers {
                adults: 1,
                students: 1,
                children: vec![],
            })
            .sort_option(SortOption::BestFlight)
            .build()
            .unwrap();
        assert_eq!(
            params.get_search_url("http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/flights/JFK-LHR/2026-03-01/1adults/1students/economy?sort=bestflight_a"
        );
    }

    #[test]
    fn test_each_child_gets_a_token() {
        let pax = FlightPassengers {
            adults: 0,
            students: 0,
            children: vec![ChildType::Child; 3],
        };
        assert_eq!(pax.to_url_segment(), "children-11-11-11");
        assert_eq!(pax.total(), 3);
    }

    #[test]
    fn test_exclude_airlines_fs() {
        let filters = FlightFilters {
            exclude_airlines: ["NK".to_string()].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(filters.to_fs_string().as_deref(), Some("airlines=-NK"));
        assert_eq!(FlightFilters::default().to_fs_string(), None);
    }

    #[test]
    fn test_validation_messages() {
        let err = FlightSearchParams::builder("YY1", "HKG", date("2026-07-01"))
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid departure airport code: Must be a 3-letter IATA code."
        );

        let err = FlightSearchParams::builder("YYZ", "HKG", date("2026-07-01"))
            .range(5, 2)
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "end_index must be an integer greater than or equal to start_index."
        );

        let err = FlightSearchParams::builder("YYZ", "HKG", date("2026-07-01"))
            .passengers(FlightPassengers {
                adults: 0,
                students: 0,
                children: vec![],
            })
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "At least one passenger is required.");

        let bad_airline = FlightFilters {
            include_airlines: ["UAL".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let err = FlightSearchParams::builder("YYZ", "HKG", date("2026-07-01"))
            .filters(bad_airline)
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid include_airlines: All codes must be 2-character IATA codes."
        );

        let err = FlightSearchParams::builder("YYZ", "HKG", date("2026-07-10"))
            .return_date(date("2026-07-01"))
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "Return date cannot be before departure date.");
    }

    #[test]
    fn test_sort_option_names() {
        assert_eq!(SortOption::from_str_name("departReturn_b"), Some(SortOption::DepartReturnDesc));
        assert_eq!(SortOption::from_str_name("cheapest"), None);
        assert!(SortOption::PriceDesc.is_descending());
        assert!(!SortOption::BestFlight.is_descending());
        assert_eq!(SortOption::ALL.len(), 13);
    }

    #[test]
    fn test_window_len() {
        let params = FlightSearchParams::builder("YYZ", "HKG", date("2026-07-01"))
            .range(3, 3)
            .build()
            .unwrap();
        assert_eq!(params.window_len(), 1);
    }
}
