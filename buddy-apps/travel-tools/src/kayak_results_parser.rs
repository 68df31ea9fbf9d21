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

//! # Kayak Results Parser
//!
//! Side-effect free HTML parsing for Kayak fare-search result pages.
//! Extracts one [`FlightOffer`] per non-sponsored result card.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportInfo {
    pub code: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopDetail {
    pub airport_code: String,
    pub airport_name: Option<String>,
    pub layover_duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub departure_time: Option<String>,
    pub departure_airport: Option<AirportInfo>,
    pub arrival_time: Option<String>,
    pub arrival_airport: Option<AirportInfo>,
    pub duration: Option<String>,
    pub airlines: Vec<String>,
    pub stops: u32,
    pub stop_details: Vec<StopDetail>,
    pub next_day_arrival: bool,
}

impl FlightLeg {
    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration.as_deref().and_then(parse_duration_minutes)
    }

    pub fn has_times(&self) -> bool {
        self.departure_time.is_some() && self.arrival_time.is_some()
    }
}

/// Free bag allowance; `None` when the card shows no fee box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Baggage {
    pub carry_on: Option<u32>,
    pub checked_bags: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightDetails {
    pub price: Option<String>,
    pub fare_types: Vec<String>,
    pub available_sites: u32,
    pub baggage: Baggage,
    pub booking_link: String,
}

impl FlightDetails {
    /// Whole units of the displayed price, e.g. `C$ 1,234.56` -> 1234.
    pub fn price_amount(&self) -> Option<u64> {
        let digits: String = self
            .price
            .as_deref()?
            .chars()
            .take_while(|c| *c != '.')
            .filter(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOffer {
    pub details: FlightDetails,
    pub outbound: FlightLeg,
    pub return_leg: Option<FlightLeg>,
    pub multiple_airlines: bool,
    pub booking_button_text: Option<String>,
}

impl FlightOffer {
    pub fn legs(&self) -> impl Iterator<Item = &FlightLeg> {
        std::iter::once(&self.outbound).chain(self.return_leg.as_ref())
    }

    pub fn max_stops(&self) -> u32 {
        self.legs().map(|l| l.stops).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedFlightsPage {
    pub offers: Vec<FlightOffer>,
    /// Result cards on the page, sponsored ones included.
    pub result_cards: usize,
    pub skipped_ads: usize,
    pub no_results_banner: bool,
    pub bot_check: bool,
}

struct KayakSelectors {
    result_item: Selector,
    leg_list: Selector,
    ad_badge: Selector,
    price: Selector,
    fare_types: Selector,
    sites_label: Selector,
    booking_link: Selector,
    carry_on: Selector,
    checked_bags: Selector,
    legs: Selector,
    booking_text: Selector,
    times: Selector,
    airports_block: Selector,
    airport_info: Selector,
    span: Selector,
    duration: Selector,
    carrier_logo: Selector,
    stops_text: Selector,
    stop_airport: Selector,
    stop_layover: Selector,
    stop_name: Selector,
    next_day: Selector,
    no_results: Selector,
}

impl KayakSelectors {
    fn new() -> Self {
        Self {
            result_item: Selector::parse(".Fxw9-result-item-container").unwrap(),
            leg_list: Selector::parse(".hJSA-list").unwrap(),
            ad_badge: Selector::parse(".c_3eP-badge-content, .NAnQ-ad-badge").unwrap(),
            price: Selector::parse(".e2GB-price-text").unwrap(),
            fare_types: Selector::parse(".DOum-name").unwrap(),
            sites_label: Selector::parse(".M_JD-num-sites-label").unwrap(),
            booking_link: Selector::parse(r#".nrc6-price-section .M_JD-booking-btn a[role="link"]"#)
                .unwrap(),
            carry_on: Selector::parse(
                r#".ac27-fee-box[aria-label*="carry-on bag"] .ac27-inner:last-child"#,
            )
            .unwrap(),
            checked_bags: Selector::parse(
                r#".ac27-fee-box[aria-label*="checked bag"] .ac27-inner:last-child"#,
            )
            .unwrap(),
            legs: Selector::parse(".hJSA-list > li").unwrap(),
            booking_text: Selector::parse(".dOAU-booking-text").unwrap(),
            times: Selector::parse(".VY2U .vmXl span").unwrap(),
            airports_block: Selector::parse(".EFvI").unwrap(),
            airport_info: Selector::parse(".jLhY-airport-info").unwrap(),
            span: Selector::parse("span").unwrap(),
            duration: Selector::parse(".xdW8 .vmXl").unwrap(),
            carrier_logo: Selector::parse(".c5iUd-leg-carrier img").unwrap(),
            stops_text: Selector::parse(".JWEO-stops-text").unwrap(),
            stop_airport: Selector::parse(".JWEO .c_cgF-mod-variant-full-airport > span").unwrap(),
            stop_layover: Selector::parse(".hEI8").unwrap(),
            stop_name: Selector::parse(".AFFP").unwrap(),
            next_day: Selector::parse(".VY2U-adendum").unwrap(),
            no_results: Selector::parse(r#"div[class*="no-results"]"#).unwrap(),
        }
    }
}

static SELECTORS: Lazy<KayakSelectors> = Lazy::new(KayakSelectors::new);

static DURATION_H_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*h").unwrap());
static DURATION_M_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*m").unwrap());
static LAYOVER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+h \d+m) layover").unwrap());
static AIRPORT_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

/// Markers of the interstitial served to suspected bots.
const BOT_CHECK_MARKERS: [&str; 3] = [
    "px-captcha",
    "confirm that you are a real KAYAK user",
    "/help/bots.html",
];

impl ParsedFlightsPage {
    pub fn from_html(html: &str, base_url: &str) -> Self {
        let sel = &*SELECTORS;
        let document = Html::parse_document(html);

        let mut page = ParsedFlightsPage::default();
        for item in document.select(&sel.result_item) {
            page.result_cards += 1;
            let is_ad = item.select(&sel.leg_list).next().is_none()
                || item.select(&sel.ad_badge).next().is_some();
            if is_ad {
                page.skipped_ads += 1;
                continue;
            }
            match parse_offer(item, base_url) {
                Some(offer) => page.offers.push(offer),
                None => tracing::warn!("Result card without an outbound leg, skipping"),
            }
        }

        if page.offers.is_empty() {
            page.no_results_banner = document.select(&sel.no_results).next().is_some()
                || html.contains("No flights found");
            page.bot_check = BOT_CHECK_MARKERS.iter().any(|m| html.contains(m));
        }
        page
    }

    /// Explanation for an empty page.
    pub fn empty_reason(&self) -> &'static str {
        if self.bot_check {
            "Kayak served a bot check instead of results"
        } else if self.no_results_banner {
            "No flights available for the specified parameters"
        } else {
            "No flight results found for the specified parameters"
        }
    }
}

fn text_of(el: ElementRef) -> String {
    el.text()
        .collect::<String>()
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty())
}

fn leading_number(text: &str) -> Option<u32> {
    text.split_whitespace().next()?.parse().ok()
}

fn parse_offer(item: ElementRef, base_url: &str) -> Option<FlightOffer> {
    let sel = &*SELECTORS;
    let mut legs = item.select(&sel.legs);
    let outbound = parse_leg(legs.next()?);
    let return_leg = legs.next().map(parse_leg);

    let booking_link = item
        .select(&sel.booking_link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| absolute_link(base_url, href))
        .unwrap_or_else(|| base_url.to_string());

    let details = FlightDetails {
        price: first_text(item, &sel.price),
        fare_types: first_text(item, &sel.fare_types)
            .map(|t| t.split(", ").map(str::to_string).collect())
            .unwrap_or_default(),
        available_sites: first_text(item, &sel.sites_label)
            .and_then(|t| leading_number(&t))
            .unwrap_or(0),
        baggage: Baggage {
            carry_on: first_text(item, &sel.carry_on).and_then(|t| t.parse().ok()),
            checked_bags: first_text(item, &sel.checked_bags).and_then(|t| t.parse().ok()),
        },
        booking_link,
    };

    Some(FlightOffer {
        details,
        outbound,
        return_leg,
        multiple_airlines: text_of(item).contains("Multiple Airlines"),
        booking_button_text: first_text(item, &sel.booking_text),
    })
}

fn absolute_link(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    }
}

fn parse_airport(info: ElementRef) -> Option<AirportInfo> {
    let spans: Vec<String> = info.select(&SELECTORS.span).map(text_of).collect();
    let code = spans.first().filter(|c| !c.is_empty())?.clone();
    Some(AirportInfo {
        code,
        name: spans.get(1).filter(|n| !n.is_empty()).cloned(),
    })
}

fn parse_leg(leg: ElementRef) -> FlightLeg {
    let sel = &*SELECTORS;

    let times: Vec<String> = leg.select(&sel.times).map(text_of).collect();
    let departure_time = times.first().filter(|t| !t.is_empty()).cloned();
    let arrival_time = times.get(2).filter(|t| !t.is_empty()).cloned();

    let (departure_airport, arrival_airport) = match leg.select(&sel.airports_block).next() {
        Some(block) => {
            let infos: Vec<ElementRef> = block.select(&sel.airport_info).collect();
            if infos.len() == 2 {
                (parse_airport(infos[0]), parse_airport(infos[1]))
            } else {
                tracing::warn!("Expected 2 airport blocks, found {}", infos.len());
                (None, None)
            }
        }
        None => {
            tracing::warn!("Leg without airport block");
            (None, None)
        }
    };

    let airlines: Vec<String> = leg
        .select(&sel.carrier_logo)
        .filter_map(|img| img.value().attr("alt"))
        .map(|alt| alt.trim().to_string())
        .filter(|alt| !alt.is_empty())
        .collect();

    let stops = match first_text(leg, &sel.stops_text) {
        Some(text) => match leading_number(&text) {
            Some(n) => n,
            None if matches!(text.to_lowercase().as_str(), "direct" | "nonstop") => 0,
            None => {
                tracing::warn!("Unrecognized stops text: {}", text);
                0
            }
        },
        None => 0,
    };

    let endpoints: Vec<&str> = [&departure_airport, &arrival_airport]
        .into_iter()
        .flatten()
        .map(|a| a.code.as_str())
        .collect();
    let stop_details = if stops > 0 {
        parse_stop_details(leg, &endpoints)
    } else {
        Vec::new()
    };
    if stops as usize != stop_details.len() {
        tracing::debug!(
            "Expected {} stops, extracted {} stop details",
            stops,
            stop_details.len()
        );
    }

    FlightLeg {
        departure_time,
        departure_airport,
        arrival_time,
        arrival_airport,
        duration: first_text(leg, &sel.duration),
        airlines,
        stops,
        stop_details,
        next_day_arrival: leg.select(&sel.next_day).next().is_some(),
    }
}

fn parse_stop_details(leg: ElementRef, endpoints: &[&str]) -> Vec<StopDetail> {
    let sel = &*SELECTORS;
    let mut seen = HashSet::new();
    let mut details = Vec::new();

    for stop in leg.select(&sel.stop_airport) {
        let Some(code_el) = stop.select(&sel.span).next() else {
            continue;
        };
        let code: String = text_of(code_el).chars().take(3).collect();
        if !AIRPORT_CODE_RE.is_match(&code) || endpoints.contains(&code.as_str()) {
            continue;
        }
        let Some(layover_el) = stop.select(&sel.stop_layover).next() else {
            continue;
        };
        let layover_text = text_of(layover_el);
        if !seen.insert(code.clone()) {
            continue;
        }
        details.push(StopDetail {
            airport_name: first_text(layover_el, &sel.stop_name),
            layover_duration: LAYOVER_RE
                .captures(&layover_text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string()),
            airport_code: code,
        });
    }
    details
}

/// `22h 05m` -> 1325. `None` when no hour or minute figure is present.
pub fn parse_duration_minutes(s: &str) -> Option<u32> {
    let hours = DURATION_H_RE
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());
    let minutes = DURATION_M_RE
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());
    match (hours, minutes) {
        (None, None) => None,
        (h, m) => Some(h.unwrap_or(0).saturating_mul(60).saturating_add(m.unwrap_or(0))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"
    <html><body>
    <div class="Fxw9-result-item-container">
      <ol class="hJSA-list">
        <li>
          <div class="VY2U"><div class="vmXl"><span>10:05 pm</span><span> – </span><span>6:40 am</span></div>
            <sup class="VY2U-adendum">+2</sup></div>
          <div class="EFvI">
            <div class="jLhY-airport-info"><span>YYZ</span><span>Toronto Pearson</span></div>
            <div class="jLhY-airport-info"><span>HKG</span><span>Hong Kong Intl</span></div>
          </div>
          <div class="xdW8"><div class="vmXl">20h 35m</div></div>
          <div class="c5iUd-leg-carrier"><img alt="Air Canada"><img alt="Cathay Pacific"></div>
          <div class="JWEO">
            <span class="JWEO-stops-text">1 stop</span>
            <div class="c_cgF-mod-variant-full-airport">
              <span><span>YVR</span><span class="hEI8"><span class="AFFP">Vancouver Intl</span> 2h 10m layover</span></span>
              <span><span>YVR</span><span class="hEI8"><span class="AFFP">Vancouver Intl</span> 2h 10m layover</span></span>
            </div>
          </div>
        </li>
      </ol>
      <div class="nrc6-price-section">
        <div class="e2GB-price-text">C$&nbsp;1,234</div>
        <div class="DOum-name">Economy, Basic</div>
        <div class="M_JD-num-sites-label">5 sites</div>
        <div class="M_JD-booking-btn"><a role="link" href="/book/flight?code=abc">View Deal</a></div>
      </div>
      <div class="ac27-fee-box" aria-label="1 carry-on bag"><div class="ac27-inner">icon</div><div class="ac27-inner">1</div></div>
      <div class="ac27-fee-box" aria-label="0 checked bag"><div class="ac27-inner">icon</div><div class="ac27-inner">0</div></div>
    </div>
    <div class="Fxw9-result-item-container"><div class="NAnQ-ad-badge">Ad</div><ol class="hJSA-list"><li></li></ol></div>
    <div class="Fxw9-result-item-container"><div>Sponsored hotel</div></div>
    </body></html>"#;

    #[test]
    fn test_price_amount_drops_cents() {
        let page = ParsedFlightsPage::from_html(CARD, "https://www.ca.kayak.com");
        let mut details = page.offers[0].details.clone();
        details.price = Some("C$ 1,234.56".into());
        assert_eq!(details.price_amount(), Some(1234));
        details.price = Some("$87".into());
        assert_eq!(details.price_amount(), Some(87));
        details.price = None;
        assert_eq!(details.price_amount(), None);
    }

    #[test]
    fn test_parse_card_and_skip_ads() {
        let page = ParsedFlightsPage::from_html(CARD, "https://www.ca.kayak.com");
        assert_eq!(page.result_cards, 3);
        assert_eq!(page.skipped_ads, 2);
        assert_eq!(page.offers.len(), 1);

        let offer = &page.offers[0];
        assert_eq!(offer.details.price.as_deref(), Some("C$ 1,234"));
        assert_eq!(offer.details.price_amount(), Some(1234));
        assert_eq!(offer.details.fare_types, vec!["Economy", "Basic"]);
        assert_eq!(offer.details.available_sites, 5);
        assert_eq!(offer.details.baggage.carry_on, Some(1));
        assert_eq!(offer.details.baggage.checked_bags, Some(0));
        assert_eq!(
            offer.details.booking_link,
            "https://www.ca.kayak.com/book/flight?code=abc"
        );
        assert!(offer.return_leg.is_none());
        assert!(!offer.multiple_airlines);
    }

    #[test]
    fn test_parse_leg_fields() {
        let page = ParsedFlightsPage::from_html(CARD, "https://www.ca.kayak.com");
        let leg = &page.offers[0].outbound;
        assert_eq!(leg.departure_time.as_deref(), Some("10:05 pm"));
        assert_eq!(leg.arrival_time.as_deref(), Some("6:40 am"));
        assert_eq!(leg.departure_airport.as_ref().unwrap().code, "YYZ");
        assert_eq!(
            leg.arrival_airport.as_ref().unwrap().name.as_deref(),
            Some("Hong Kong Intl")
        );
        assert_eq!(leg.duration.as_deref(), Some("20h 35m"));
        assert_eq!(leg.duration_minutes(), Some(1235));
        assert_eq!(leg.airlines, vec!["Air Canada", "Cathay Pacific"]);
        assert_eq!(leg.stops, 1);
        assert!(leg.next_day_arrival);
        assert_eq!(leg.stop_details.len(), 1, "stops deduplicated by code");
        let stop = &leg.stop_details[0];
        assert_eq!(stop.airport_code, "YVR");
        assert_eq!(stop.airport_name.as_deref(), Some("Vancouver Intl"));
        assert_eq!(stop.layover_duration.as_deref(), Some("2h 10m"));
    }

    #[test]
    fn test_empty_page_reasons() {
        let page = ParsedFlightsPage::from_html(
            r#"<html><body><div class="c9Hnu-no-results">No flights found</div></body></html>"#,
            "https://www.ca.kayak.com",
        );
        assert!(page.offers.is_empty());
        assert!(page.no_results_banner);
        assert_eq!(
            page.empty_reason(),
            "No flights available for the specified parameters"
        );

        let page = ParsedFlightsPage::from_html(
            r#"<html><body><div id="px-captcha"></div></body></html>"#,
            "https://www.ca.kayak.com",
        );
        assert!(page.bot_check);
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_duration_minutes("22h 05m"), Some(1325));
        assert_eq!(parse_duration_minutes("7h"), Some(420));
        assert_eq!(parse_duration_minutes("45m"), Some(45));
        assert_eq!(parse_duration_minutes("N/A"), None);
        assert_eq!(parse_duration_minutes("99999999h 30m"), Some(u32::MAX));
    }

    #[test]
    fn test_absolute_link() {
        assert_eq!(absolute_link("http://h/", "/x"), "http://h/x");
        assert_eq!(absolute_link("http://h", "https://other/y"), "https://other/y");
    }
}
