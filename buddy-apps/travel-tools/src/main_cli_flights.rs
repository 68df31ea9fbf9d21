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

//! CLI for Kayak flight search.
//!
//! # Examples
//!
//! ```bash
//! travel-flights -f YYZ -t HKG -d 2026-07-01 -R 2026-07-20
//! travel-flights -f YYZ -t HKG -d 2026-07-01 --sort duration_a --stops 1 --children 11,1L
//! travel-flights -f YYZ -t HKG -d 2026-07-01 --dry-run
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::cmp::max;
use travel_buddy_tools::config::{KAYAK_BASE_URL, KAYAK_TIMEOUT_SECS, KayakConfig};
use travel_buddy_tools::{
    FlightOffer, FlightSearchResult, FlightsInput, KayakFlightsClient, ParsedFlightsPage,
    format_flight_summary,
};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "travel-flights")]
#[command(author, version, about = "Search flights on Kayak", long_about = None)]
struct CliArgs {
    /// Origin airport code (e.g., YYZ)
    #[arg(short, long)]
    from: String,

    /// Destination airport code (e.g., HKG)
    #[arg(short, long)]
    to: String,

    /// Departure date (YYYY-MM-DD)
    #[arg(short, long)]
    date: String,

    /// Return date for round trips (YYYY-MM-DD)
    #[arg(short = 'R', long)]
    return_date: Option<String>,

    #[arg(short, long, default_value = "2")]
    adults: i64,

    #[arg(long, default_value = "0")]
    students: i64,

    /// Child fares, comma-separated: 11, 1S, 1L
    #[arg(long, value_delimiter = ',')]
    children: Vec<String>,

    /// Cabin class: economy, premium, business, first
    #[arg(short, long, default_value = "economy")]
    cabin: String,

    /// Kayak sort option, e.g. price_a, duration_a, depart_b
    #[arg(short, long, default_value = "price_a")]
    sort: String,

    /// Minimum free carry-on bags
    #[arg(long, default_value = "1")]
    carry_on: i64,

    /// Minimum free checked bags
    #[arg(long)]
    checked_bags: Option<i64>,

    /// Maximum number of stops (0 = nonstop only)
    #[arg(long)]
    stops: Option<i64>,

    #[arg(long, default_value = "6000")]
    max_price: i64,

    /// VALUE_ALLIANCE, ONE_WORLD, SKY_TEAM, STAR_ALLIANCE
    #[arg(long)]
    alliance: Option<String>,

    /// Airlines to keep (comma-separated, e.g., "AC,CX")
    #[arg(long, value_delimiter = ',')]
    include_airlines: Vec<String>,

    /// Airlines to drop (comma-separated)
    #[arg(long, value_delimiter = ',')]
    exclude_airlines: Vec<String>,

    #[arg(long)]
    wifi_only: bool,

    #[arg(long, default_value = "0")]
    start: i64,

    /// Last result index, inclusive
    #[arg(long, default_value = "15")]
    end: i64,

    #[arg(long, env = "KAYAK_BASE_URL", default_value = KAYAK_BASE_URL)]
    base_url: String,

    #[arg(long, env = "KAYAK_TIMEOUT_SECS", default_value_t = KAYAK_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Print the plain-text report instead of the table
    #[arg(long)]
    report: bool,

    /// Show search URL without making request
    #[arg(long)]
    dry_run: bool,

    /// Save raw HTML response to file for debugging
    #[arg(long)]
    save_html: bool,

    /// Verbose output
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

impl CliArgs {
    fn to_input(&self) -> FlightsInput {
        let non_empty = |v: &Vec<String>| (!v.is_empty()).then(|| v.clone());
        FlightsInput {
            departure_airport: self.from.clone(),
            arrival_airport: self.to.clone(),
            departure_date: self.date.clone(),
            return_date: self.return_date.clone(),
            adults: self.adults,
            students: self.students,
            children: self.children.clone(),
            plane_type: self.cabin.clone(),
            sort_option: self.sort.clone(),
            carry_on_free: Some(self.carry_on).filter(|&n| n > 0),
            checked_bags_free: self.checked_bags,
            stops: self.stops,
            max_price: Some(self.max_price),
            alliance: self.alliance.clone(),
            include_airlines: non_empty(&self.include_airlines),
            exclude_airlines: non_empty(&self.exclude_airlines),
            wifi_only: self.wifi_only,
            start_index: self.start,
            end_index: self.end,
        }
    }
}

/// Configure logging based on verbosity level
fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(100)
}

fn dash_bar() -> String {
    "-".repeat(get_terminal_width().min(100))
}

fn fmt_times(offer: &FlightOffer) -> String {
    let leg = &offer.outbound;
    format!(
        "{} → {}{}",
        leg.departure_time.as_deref().unwrap_or("??:??"),
        leg.arrival_time.as_deref().unwrap_or("??:??"),
        if leg.next_day_arrival { " +1" } else { "" }
    )
}

/// "direct", "1 stop: YVR" or "2 stops: YVR, TPE"
fn fmt_stops(offer: &FlightOffer) -> String {
    let leg = &offer.outbound;
    let codes: Vec<&str> = leg
        .stop_details
        .iter()
        .map(|s| s.airport_code.as_str())
        .collect();
    match leg.stops {
        0 => "direct".to_string(),
        1 if codes.is_empty() => "1 stop".to_string(),
        1 => format!("1 stop: {}", codes.join(", ")),
        n if codes.is_empty() => format!("{} stops", n),
        n => format!("{} stops: {}", n, codes.join(", ")),
    }
}

fn fmt_airlines(offer: &FlightOffer) -> String {
    if offer.outbound.airlines.is_empty() {
        "??".to_string()
    } else {
        offer.outbound.airlines.join(", ")
    }
}

/// Terminal-aware column widths: (airline, times, duration, stops)
fn calc_column_widths(offers: &[FlightOffer]) -> (usize, usize, usize, usize) {
    let mut aw = 7;
    let mut tw = 15;
    let mut dw = 8;
    let mut sw = 12;
    for offer in offers {
        aw = max(aw, fmt_airlines(offer).chars().count());
        tw = max(tw, fmt_times(offer).chars().count());
        dw = max(dw, offer.outbound.duration.as_deref().unwrap_or("??").len());
        sw = max(sw, fmt_stops(offer).len());
    }

    let available = get_terminal_width().saturating_sub(25);
    let total = aw + tw + dw + sw;
    if total > available && available > 50 {
        let ratio = available as f64 / total as f64;
        aw = max((aw as f64 * ratio).floor() as usize, 4);
        tw = max((tw as f64 * ratio).floor() as usize, 10);
        dw = max((dw as f64 * ratio).floor() as usize, 5);
        sw = max((sw as f64 * ratio).floor() as usize, 10);
    }
    (aw, tw, dw, sw)
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn render_results(result: &FlightSearchResult) {
    let params = &result.search_params;
    let route = match params.return_date {
        Some(ret) => format!(
            "{} ⇄ {}  {} / {}",
            params.departure_airport, params.arrival_airport, params.departure_date, ret
        ),
        None => format!(
            "{} → {}  {}",
            params.departure_airport, params.arrival_airport, params.departure_date
        ),
    };
    println!("{}", "=".repeat(get_terminal_width().min(100)));
    println!("  🛫  {}", route);
    println!("{}\n", "=".repeat(get_terminal_width().min(100)));
    println!("🔗 Search URL: {}", result.search_url);
    println!(
        "📊 Results {}..={} of {}",
        params.start_index, params.end_index, result.total_results
    );
    if let Some(message) = &result.message {
        println!("ℹ️  {}", message);
    }
    if result.flights.is_empty() {
        return;
    }

    let (aw, tw, dw, sw) = calc_column_widths(&result.flights);
    println!("{}", dash_bar());
    println!(
        "  {:>4}  {:<aw$}  {:<tw$}  {:<dw$}  {:<sw$}   PRICE",
        "#", "AIRLINE", "DEP → ARR", "DURATION", "STOPS"
    );
    println!("{}", dash_bar());
    for (i, offer) in result.flights.iter().enumerate() {
        println!(
            "  {:>4}  {:<aw$}  {:<tw$}  {:<dw$}  {:<sw$}   {}",
            params.start_index + i,
            truncate(&fmt_airlines(offer), aw),
            truncate(&fmt_times(offer), tw),
            offer.outbound.duration.as_deref().unwrap_or("??"),
            truncate(&fmt_stops(offer), sw),
            offer.details.price.as_deref().unwrap_or("N/A"),
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose);

    tracing::info!("Starting travel-flights CLI");
    tracing::debug!("Args: {:?}", args);

    let today = chrono::Local::now().date_naive();
    let params = args
        .to_input()
        .into_params(today)
        .context("Invalid search parameters")?;

    let config = KayakConfig::default()
        .with_base_url(args.base_url.clone())
        .with_timeout_secs(args.timeout_secs);
    let search_url = params.get_search_url(&config.base_url);

    if args.dry_run {
        println!("🔗 Search URL:\n{}", search_url);
        return Ok(());
    }

    let client = KayakFlightsClient::new(config)?;
    let result = if args.save_html {
        let html = client.fetch_raw(&search_url).await.context("Fetch failed")?;
        let filename = format!(
            "debug_{}_{}.html",
            params.departure_airport, params.arrival_airport
        );
        std::fs::write(&filename, &html).context("Failed to write HTML file")?;
        tracing::info!("Saved HTML to {}", filename);

        let page = ParsedFlightsPage::from_html(&html, client.base_url());
        FlightSearchResult::from_page(page, params, search_url)
    } else {
        client
            .search_flights(&params)
            .await
            .context("Search failed")?
    };

    tracing::info!(
        "Search completed: {} of {} flights shown",
        result.flights.len(),
        result.total_results
    );

    if args.report {
        println!("{}", format_flight_summary(&result));
    } else {
        render_results(&result);
    }
    Ok(())
}
