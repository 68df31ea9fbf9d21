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

//! CLI for SerpApi Google Hotels search.
//!
//! Needs `SERPAPI_KEY` in the environment (or `--api-key`).
//!
//! # Examples
//!
//! ## Basic search
//!
//! ```bash
//! travel-hotels -q "Tokyo, Japan" -i 2026-02-15 -o 2026-02-20
//! ```
//!
//! ## Search with filters
//!
//! ```bash
//! # 4-5 star hotels with pool and spa, under 200/night
//! travel-hotels -q "Paris" -i 2026-03-01 -o 2026-03-05 -s FOUR_STAR,FIVE_STAR -m POOL,SPA -p 200
//! ```
//!
//! ## Family with children
//!
//! ```bash
//! travel-hotels -q "New York" -i 2026-06-01 -o 2026-06-07 -a 2 -c 5,10
//! ```
//!
//! ## Dry run (show request URL only, key masked)
//!
//! ```bash
//! travel-hotels -q "Tokyo" -i 2026-02-15 -o 2026-02-20 --dry-run
//! ```
//!
//! # Output
//!
//! A summary of the search parameters followed by matching properties with:
//! - Name, type and hotel class
//! - Lowest rate per night
//! - Guest rating and review count
//! - Amenities
//! - Property token for detail lookups

use anyhow::{Context, Result};
use clap::Parser;
use travel_buddy_tools::config::{SERPAPI_ENDPOINT, SERPAPI_TIMEOUT_SECS, SerpConfig};
use travel_buddy_tools::{HotelsInput, SerpApiClient};

#[derive(Parser, Debug)]
#[command(name = "travel-hotels")]
#[command(version)]
#[command(about = "Search hotels via SerpApi Google Hotels")]
struct Args {
    #[arg(short = 'q', long)]
    query: String,
    #[arg(short = 'i', long)]
    checkin: String,
    #[arg(short = 'o', long)]
    checkout: String,
    #[arg(short = 'a', long, default_value = "2")]
    adults: i64,
    #[arg(
        short = 'c',
        long,
        value_delimiter = ',',
        help = "Children ages (comma-separated, e.g., 5,10)"
    )]
    children: Vec<i64>,
    #[arg(short = 'C', long, default_value = "USD")]
    currency: String,
    #[arg(long, help = "THREE_POINT_FIVE_PLUS, FOUR_PLUS or FOUR_POINT_FIVE_PLUS")]
    rating: Option<String>,
    #[arg(
        short = 's',
        long,
        value_delimiter = ',',
        help = "Hotel classes (comma-separated, e.g., FOUR_STAR,FIVE_STAR)"
    )]
    stars: Vec<String>,
    #[arg(
        short = 'm',
        long,
        value_delimiter = ',',
        help = "Amenities (comma-separated, e.g., SPA,POOL,CHILD_FRIENDLY)"
    )]
    amenities: Vec<String>,
    #[arg(long, help = "Minimum price per night")]
    min_price: Option<f64>,
    #[arg(short = 'p', long, help = "Maximum price per night")]
    max_price: Option<f64>,
    #[arg(short = 'S', long, help = "LOWEST_PRICE, HIGHEST_RATING or MOST_REVIEWED")]
    sort: Option<String>,
    #[arg(long, help = "Free cancellation only")]
    free_cancellation: bool,
    #[arg(long, help = "Search vacation rentals instead of hotels")]
    vacation_rentals: bool,
    #[arg(long, help = "next_page_token from a previous search")]
    page_token: Option<String>,
    #[arg(short = 'n', long, default_value = "10")]
    limit: usize,
    #[arg(long, env = "SERPAPI_KEY", hide_env_values = true)]
    api_key: String,
    #[arg(long, env = "SERPAPI_ENDPOINT", default_value = SERPAPI_ENDPOINT)]
    endpoint: String,
    #[arg(long, env = "SERPAPI_TIMEOUT_SECS", default_value_t = SERPAPI_TIMEOUT_SECS)]
    timeout_secs: u64,
    #[arg(long, help = "Show request URL without making request")]
    dry_run: bool,
}

impl Args {
    fn to_input(&self) -> HotelsInput {
        let non_empty = |v: &Vec<String>| (!v.is_empty()).then(|| v.clone());
        HotelsInput {
            query: self.query.clone(),
            check_in_date: self.checkin.clone(),
            check_out_date: self.checkout.clone(),
            adults: self.adults,
            currency: self.currency.clone(),
            gl: "us".to_string(),
            hl: "en".to_string(),
            sort_by: self.sort.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            property_types: None,
            amenities: non_empty(&self.amenities),
            rating: self.rating.clone(),
            hotel_class: non_empty(&self.stars),
            free_cancellation: self.free_cancellation.then_some(true),
            special_offers: None,
            eco_certified: None,
            vacation_rentals: self.vacation_rentals.then_some(true),
            bedrooms: None,
            bathrooms: None,
            children: None,
            children_ages: (!self.children.is_empty()).then(|| self.children.clone()),
            next_page_token: self.page_token.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let today = chrono::Local::now().date_naive();
    let request = args.to_input().into_params(today)?;

    let config = SerpConfig::new(args.api_key.clone())
        .with_endpoint(args.endpoint.clone())
        .with_timeout_secs(args.timeout_secs);
    let client = SerpApiClient::new(config).context("Failed to create SerpApi client")?;
    let request_url = client.describe_request(&request.to_query(&args.api_key));

    println!("\n🏨 Google Hotels Search");
    println!("=======================");
    println!("Query: {}", request.query);
    println!("Dates: {} to {}", request.check_in_date, request.check_out_date);
    println!(
        "Guests: {} adults, {} children",
        request.adults,
        args.children.len()
    );
    if !args.children.is_empty() {
        println!(
            "Children ages: {}",
            args.children
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    if let Some(r) = &request.rating {
        println!("Min rating: {}", r.as_str_name());
    }
    if !args.stars.is_empty() {
        println!("Classes: {}", args.stars.join(", "));
    }
    if !args.amenities.is_empty() {
        println!("Amenities: {}", args.amenities.join(", "));
    }
    if let Some(sort) = &request.sort_by {
        println!("Sort: {}", sort.as_str_name());
    }
    println!("=======================");

    if args.dry_run {
        println!("\n🔗 Request URL:\n{}", request_url);
        return Ok(());
    }

    println!("\n🔗 Request URL: {}\n", request_url);

    match client.search_hotels(&request).await {
        Ok(results) => {
            let summaries = results.summaries();
            if summaries.is_empty() {
                println!("No hotels found.");
            } else {
                println!("Found {} propert(ies)\n", summaries.len());
                for (i, hotel) in summaries.iter().take(args.limit).enumerate() {
                    println!("{}. {}", i + 1, hotel.name);
                    let mut kind = hotel.kind.clone().unwrap_or_default();
                    if let Some(class) = hotel.extracted_hotel_class {
                        kind = format!("{} {}", kind, "★".repeat(class as usize));
                    }
                    if !kind.trim().is_empty() {
                        println!("   {}", kind.trim());
                    }
                    println!("   Price: {}", hotel.lowest_rate().unwrap_or("N/A"));
                    if let Some(r) = hotel.overall_rating {
                        println!("   Rating: {:.1} ({} reviews)", r, hotel.reviews.unwrap_or(0));
                    }
                    if !hotel.amenities.is_empty() {
                        println!("   Amenities: {}", hotel.amenities.join(", "));
                    }
                    if let Some(token) = &hotel.property_token {
                        println!("   Token: {}", token);
                    }
                    println!();
                }
                if let Some(token) = results.next_page_token() {
                    println!("More results: --page-token {}", token);
                }
            }
        }
        Err(e) => {
            eprintln!("Search failed: {:#}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}
