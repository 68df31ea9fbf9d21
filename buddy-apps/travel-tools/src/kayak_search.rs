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

//! # Kayak Flights Search Client
//!
//! Effectful (time, network) operations for Kayak fare-search pages.

use crate::config::KayakConfig;
use crate::flights_ranking::{apply_filters, paginate, sort_offers};
use crate::kayak_query_builder::FlightSearchParams;
use crate::kayak_results_parser::{FlightOffer, ParsedFlightsPage};
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use std::time::Duration;
use wreq::redirect::Policy;
use wreq_util::Emulation;

#[derive(Debug, Clone)]
pub struct FlightSearchResult {
    pub search_params: FlightSearchParams,
    pub search_url: String,
    /// The requested `start_index..=end_index` window.
    pub flights: Vec<FlightOffer>,
    /// Rows left after client-side filtering, before windowing.
    pub total_results: usize,
    pub message: Option<String>,
}

impl FlightSearchResult {
    /// Filters, sorts and windows the scraped page.
    pub fn from_page(
        page: ParsedFlightsPage,
        search_params: FlightSearchParams,
        search_url: String,
    ) -> Self {
        if page.offers.is_empty() {
            return Self {
                search_params,
                search_url,
                flights: Vec::new(),
                total_results: 0,
                message: Some(page.empty_reason().to_string()),
            };
        }

        let mut offers = apply_filters(page.offers, &search_params.filters);
        sort_offers(&mut offers, search_params.sort_option);
        let total_results = offers.len();

        let (start, end) = (search_params.start_index, search_params.end_index);
        let message = if total_results == 0 {
            Some("No flights match the requested filters".to_string())
        } else if total_results < start + search_params.window_len() {
            Some(format!(
                "Requested up to index {}, but only {} results available.",
                end, total_results
            ))
        } else {
            None
        };

        Self {
            flights: paginate(offers, start, end),
            search_params,
            search_url,
            total_results,
            message,
        }
    }
}

#[derive(Clone)]
pub struct KayakFlightsClient {
    client: Arc<wreq::Client>,
    base_url: String,
}

impl KayakFlightsClient {
    pub fn new(config: KayakConfig) -> Result<Self> {
        let client = wreq::Client::builder()
            .emulation(Emulation::Safari18_5)
            .redirect(Policy::default())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_raw(&self, url: &str) -> Result<String> {
        let http_start = std::time::Instant::now();
        tracing::trace!("[fetch_raw] Starting HTTP request to: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Request failed")?;

        let status = response.status();
        tracing::debug!(
            "[fetch_raw] HTTP Status: {} {} after {:?}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
            http_start.elapsed()
        );

        let body = response.text().await.context("Read body")?;
        tracing::debug!("[fetch_raw] Response body: {} KB", body.len() / 1024);

        if !status.is_success() {
            let body_preview = body.chars().take(500).collect::<String>();
            bail!("HTTP error {}: {}", status, body_preview);
        }

        Ok(body)
    }

    pub async fn search_flights(&self, params: &FlightSearchParams) -> Result<FlightSearchResult> {
        let overall_start = std::time::Instant::now();
        params.validate().context("Invalid search parameters")?;

        let url = params.get_search_url(&self.base_url);
        tracing::info!("Search URL: {}", url);

        let html = self.fetch_raw(&url).await?;

        let parse_start = std::time::Instant::now();
        let page = ParsedFlightsPage::from_html(&html, &self.base_url);
        tracing::debug!(
            "Parsed {} offers from {} cards ({} ads) in {:?}",
            page.offers.len(),
            page.result_cards,
            page.skipped_ads,
            parse_start.elapsed()
        );

        if page.bot_check {
            tracing::error!("Bot check page served instead of results");
        } else if page.offers.is_empty() && page.result_cards > 0 {
            tracing::warn!(
                "{} result cards but none parsed. Page layout may have changed.",
                page.result_cards
            );
        } else if page.offers.is_empty() && !page.no_results_banner {
            let preview = html.chars().take(2000).collect::<String>();
            tracing::warn!("No result cards in response. HTML preview:\n{}", preview);
        }

        let result = FlightSearchResult::from_page(page, params.clone(), url);
        tracing::info!(
            "search_flights {}-{}: {} of {} results in {:?}",
            params.departure_airport,
            params.arrival_airport,
            result.flights.len(),
            result.total_results,
            overall_start.elapsed()
        );
        Ok(result)
    }
}
