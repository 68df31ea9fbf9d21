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

//! # SerpApi Query Builder
//!
//! Side-effect free parameter validation and query-pair encoding for the
//! SerpApi `google_hotels`, `google_events` and `google` engines.

use anyhow::{Result, bail, ensure};
use chrono::NaiveDate;

pub(crate) trait SerpCode: Sized + Copy + 'static {
    const ALL: &'static [Self];
    const KIND: &'static str;

    fn code(&self) -> u32;
    fn as_str_name(&self) -> &'static str;

    /// Accepts `LOWEST_PRICE`, `lowest_price` or `lowest-price`.
    fn from_str_name(s: &str) -> Option<Self> {
        let norm = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::ALL.iter().copied().find(|v| v.as_str_name() == norm)
    }

    fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_str_name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn parse(s: &str) -> Result<Self> {
        match Self::from_str_name(s) {
            Some(v) => Ok(v),
            None => bail!(
                "Invalid {}: {}. Valid options: {}",
                Self::KIND,
                s,
                Self::valid_names()
            ),
        }
    }
}

macro_rules! serp_code_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident = $code:literal => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl SerpCode for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];
            const KIND: &'static str = $kind;

            fn code(&self) -> u32 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            fn as_str_name(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl $name {
            pub fn code(&self) -> u32 {
                SerpCode::code(self)
            }

            pub fn as_str_name(&self) -> &'static str {
                SerpCode::as_str_name(self)
            }

            pub fn from_str_name(s: &str) -> Option<Self> {
                <Self as SerpCode>::from_str_name(s)
            }
        }
    };
}

serp_code_enum! {
    /// Hotel result ordering.
    SortBy, "sort_by" {
        LowestPrice = 3 => "LOWEST_PRICE",
        HighestRating = 8 => "HIGHEST_RATING",
        MostReviewed = 13 => "MOST_REVIEWED",
    }
}

serp_code_enum! {
    /// Minimum guest rating.
    Rating, "rating" {
        ThreePointFivePlus = 7 => "THREE_POINT_FIVE_PLUS",
        FourPlus = 8 => "FOUR_PLUS",
        FourPointFivePlus = 9 => "FOUR_POINT_FIVE_PLUS",
    }
}

serp_code_enum! {
    HotelClass, "hotel_class" {
        TwoStar = 2 => "TWO_STAR",
        ThreeStar = 3 => "THREE_STAR",
        FourStar = 4 => "FOUR_STAR",
        FiveStar = 5 => "FIVE_STAR",
    }
}

serp_code_enum! {
    PropertyType, "property_type" {
        BeachHotels = 12 => "BEACH_HOTELS",
        BoutiqueHotels = 13 => "BOUTIQUE_HOTELS",
        Hostels = 14 => "HOSTELS",
        Inns = 15 => "INNS",
        Motels = 16 => "MOTELS",
        Resorts = 17 => "RESORTS",
        SpaHotels = 18 => "SPA_HOTELS",
        BedAndBreakfasts = 19 => "BED_AND_BREAKFASTS",
        Other = 20 => "OTHER",
        ApartmentHotels = 21 => "APARTMENT_HOTELS",
        Minshuku = 22 => "MINSHUKU",
        JapaneseStyleBusinessHotels = 23 => "JAPANESE_STYLE_BUSINESS_HOTELS",
        Ryokan = 24 => "RYOKAN",
    }
}

serp_code_enum! {
    Amenity, "amenity" {
        FreeParking = 1 => "FREE_PARKING",
        Parking = 3 => "PARKING",
        IndoorPool = 4 => "INDOOR_POOL",
        OutdoorPool = 5 => "OUTDOOR_POOL",
        Pool = 6 => "POOL",
        FitnessCenter = 7 => "FITNESS_CENTER",
        Restaurant = 8 => "RESTAURANT",
        FreeBreakfast = 9 => "FREE_BREAKFAST",
        Spa = 10 => "SPA",
        BeachAccess = 11 => "BEACH_ACCESS",
        ChildFriendly = 12 => "CHILD_FRIENDLY",
        Bar = 15 => "BAR",
        PetFriendly = 19 => "PET_FRIENDLY",
        RoomService = 22 => "ROOM_SERVICE",
        FreeWifi = 35 => "FREE_WIFI",
        AirConditioned = 40 => "AIR_CONDITIONED",
        AllInclusiveAvailable = 52 => "ALL_INCLUSIVE_AVAILABLE",
        WheelchairAccessible = 53 => "WHEELCHAIR_ACCESSIBLE",
        EvCharger = 61 => "EV_CHARGER",
    }
}

pub(crate) fn parse_names<T: SerpCode>(names: &[String]) -> Result<Vec<T>> {
    names.iter().map(|n| T::parse(n)).collect()
}

fn join_codes<T: SerpCode>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.code().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn join_ages(ages: &[u32]) -> String {
    ages.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn validate_children(children: Option<u32>, children_ages: Option<&[u32]>) -> Result<()> {
    if let (Some(n), Some(ages)) = (children, children_ages) {
        ensure!(
            n as usize == ages.len(),
            "Number of children_ages must match the number of children"
        );
    }
    for age in children_ages.unwrap_or_default() {
        ensure!(
            (1..=17).contains(age),
            "Invalid child age {}: must be between 1 and 17",
            age
        );
    }
    Ok(())
}

/// Guests and locale shared by list and detail hotel queries.
#[allow(clippy::too_many_arguments)]
fn push_stay_pairs(
    pairs: &mut Vec<(&'static str, String)>,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    adults: u32,
    currency: &str,
    gl: &str,
    hl: &str,
    children: Option<u32>,
    children_ages: Option<&[u32]>,
) {
    pairs.push(("check_in_date", check_in_date.format("%Y-%m-%d").to_string()));
    pairs.push(("check_out_date", check_out_date.format("%Y-%m-%d").to_string()));
    pairs.push(("adults", adults.to_string()));
    pairs.push(("currency", currency.to_string()));
    pairs.push(("gl", gl.to_string()));
    pairs.push(("hl", hl.to_string()));

    let children = children.or_else(|| children_ages.map(|a| a.len() as u32));
    if let Some(n) = children.filter(|&n| n > 0) {
        pairs.push(("children", n.to_string()));
    }
    if let Some(ages) = children_ages.filter(|a| !a.is_empty()) {
        pairs.push(("children_ages", join_ages(ages)));
    }
}

#[derive(Debug, Clone)]
pub struct HotelSearchParams {
    pub query: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub adults: u32,
    pub currency: String,
    pub gl: String,
    pub hl: String,
    pub sort_by: Option<SortBy>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub property_types: Vec<PropertyType>,
    pub amenities: Vec<Amenity>,
    pub rating: Option<Rating>,
    pub hotel_class: Vec<HotelClass>,
    pub free_cancellation: Option<bool>,
    pub special_offers: Option<bool>,
    pub eco_certified: Option<bool>,
    pub vacation_rentals: Option<bool>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub children: Option<u32>,
    pub children_ages: Option<Vec<u32>>,
    pub next_page_token: Option<String>,
}

impl HotelSearchParams {
    pub fn new(query: impl Into<String>, check_in_date: NaiveDate, check_out_date: NaiveDate) -> Self {
        Self {
            query: query.into(),
            check_in_date,
            check_out_date,
            adults: 2,
            currency: "USD".to_string(),
            gl: "us".to_string(),
            hl: "en".to_string(),
            sort_by: None,
            min_price: None,
            max_price: None,
            property_types: Vec::new(),
            amenities: Vec::new(),
            rating: None,
            hotel_class: Vec::new(),
            free_cancellation: None,
            special_offers: None,
            eco_certified: None,
            vacation_rentals: None,
            bedrooms: None,
            bathrooms: None,
            children: None,
            children_ages: None,
            next_page_token: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.query.trim().is_empty(), "Query parameter 'q' is required");
        ensure!(self.adults > 0, "At least one adult is required");
        ensure!(
            self.check_out_date > self.check_in_date,
            "Check-out date must be after check-in date"
        );
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            ensure!(min <= max, "min_price cannot exceed max_price");
        }
        validate_children(self.children, self.children_ages.as_deref())
    }

    pub fn to_query(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("engine", "google_hotels".to_string()),
            ("q", self.query.clone()),
        ];
        push_stay_pairs(
            &mut pairs,
            self.check_in_date,
            self.check_out_date,
            self.adults,
            &self.currency,
            &self.gl,
            &self.hl,
            self.children,
            self.children_ages.as_deref(),
        );

        if let Some(sort_by) = self.sort_by {
            pairs.push(("sort_by", sort_by.code().to_string()));
        }
        if let Some(p) = self.min_price.filter(|&p| p > 0.0) {
            pairs.push(("min_price", p.to_string()));
        }
        if let Some(p) = self.max_price.filter(|&p| p > 0.0) {
            pairs.push(("max_price", p.to_string()));
        }
        if !self.property_types.is_empty() {
            pairs.push(("property_types", join_codes(&self.property_types)));
        }
        if !self.amenities.is_empty() {
            pairs.push(("amenities", join_codes(&self.amenities)));
        }
        if let Some(rating) = self.rating {
            pairs.push(("rating", rating.code().to_string()));
        }
        if !self.hotel_class.is_empty() {
            pairs.push(("hotel_class", join_codes(&self.hotel_class)));
        }

        let flags = [
            ("free_cancellation", self.free_cancellation),
            ("special_offers", self.special_offers),
            ("eco_certified", self.eco_certified),
            ("vacation_rentals", self.vacation_rentals),
        ];
        for (name, flag) in flags {
            if let Some(flag) = flag {
                pairs.push((name, flag.to_string()));
            }
        }

        if let Some(n) = self.bedrooms.filter(|&n| n > 0) {
            pairs.push(("bedrooms", n.to_string()));
        }
        if let Some(n) = self.bathrooms.filter(|&n| n > 0) {
            pairs.push(("bathrooms", n.to_string()));
        }
        if let Some(token) = self.next_page_token.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("next_page_token", token.to_string()));
        }

        pairs.push(("api_key", api_key.to_string()));
        pairs
    }
}

#[derive(Debug, Clone)]
pub struct HotelDetailParams {
    pub query: String,
    pub property_token: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub adults: u32,
    pub currency: String,
    pub gl: String,
    pub hl: String,
    pub children: Option<u32>,
    pub children_ages: Option<Vec<u32>>,
}

impl HotelDetailParams {
    pub fn new(
        query: impl Into<String>,
        property_token: impl Into<String>,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
    ) -> Self {
        Self {
            query: query.into(),
            property_token: property_token.into(),
            check_in_date,
            check_out_date,
            adults: 2,
            currency: "USD".to_string(),
            gl: "us".to_string(),
            hl: "en".to_string(),
            children: None,
            children_ages: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.query.trim().is_empty(), "Query parameter 'q' is required");
        ensure!(
            !self.property_token.trim().is_empty(),
            "property_token is required"
        );
        ensure!(self.adults > 0, "At least one adult is required");
        ensure!(
            self.check_out_date > self.check_in_date,
            "Check-out date must be after check-in date"
        );
        validate_children(self.children, self.children_ages.as_deref())
    }

    pub fn to_query(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("engine", "google_hotels".to_string()),
            ("q", self.query.clone()),
            ("property_token", self.property_token.clone()),
        ];
        push_stay_pairs(
            &mut pairs,
            self.check_in_date,
            self.check_out_date,
            self.adults,
            &self.currency,
            &self.gl,
            &self.hl,
            self.children,
            self.children_ages.as_deref(),
        );
        pairs.push(("api_key", api_key.to_string()));
        pairs
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventSearchParams {
    pub query: String,
    pub location: Option<String>,
    pub gl: Option<String>,
    pub hl: Option<String>,
    pub start: Option<u32>,
    /// `htichips` values such as `date:today` or `event_type:Virtual-Event`.
    pub filters: Vec<String>,
}

impl EventSearchParams {
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.query.trim().is_empty(), "Query parameter 'q' is required");
        Ok(())
    }

    pub fn to_query(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("engine", "google_events".to_string()),
            ("q", self.query.clone()),
        ];
        let optional = [
            ("location", self.location.as_deref()),
            ("gl", self.gl.as_deref()),
            ("hl", self.hl.as_deref()),
        ];
        for (name, value) in optional {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                pairs.push((name, v.to_string()));
            }
        }
        if let Some(start) = self.start.filter(|&s| s > 0) {
            pairs.push(("start", start.to_string()));
        }
        if !self.filters.is_empty() {
            pairs.push(("htichips", self.filters.join(",")));
        }
        pairs.push(("api_key", api_key.to_string()));
        pairs
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaceSearchParams {
    pub query: String,
    pub gl: Option<String>,
    pub hl: Option<String>,
}

impl PlaceSearchParams {
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.query.trim().is_empty(), "Query parameter 'q' is required");
        Ok(())
    }

    pub fn to_query(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("engine", "google".to_string()), ("q", self.query.clone())];
        if let Some(gl) = self.gl.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("gl", gl.to_string()));
        }
        if let Some(hl) = self.hl.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("hl", hl.to_string()));
        }
        pairs.push(("api_key", api_key.to_string()));
        pairs
    }
}
