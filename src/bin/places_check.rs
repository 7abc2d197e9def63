//! Places API connectivity check
//!
//! Usage:
//!   GOOGLE_PLACES_API_KEY=... cargo run --bin places_check
//!
//! Sends one nearby-search request and explains what the API said.

use civic_gateway::config::AppConfig;
use civic_gateway::places::{self, NearbySearch, PlacesClient};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = AppConfig::load()?;
    let api_key = config.places.api_key.as_deref();

    println!("🔑 Testing Google Places API...");
    println!("API Key present: {}", if api_key.is_some() { "YES" } else { "NO" });

    let Some(api_key) = api_key else {
        eprintln!("❌ No API key found!");
        return Ok(ExitCode::FAILURE);
    };

    println!("API Key (first 20 chars): {}...", places::key_preview(api_key));

    let search = NearbySearch::mumbai_hospitals();
    println!(
        "\n📍 Testing location: {} ({}, {})",
        search.location.name, search.location.latitude, search.location.longitude
    );

    let client = PlacesClient::new(api_key)?;

    println!("\n🌐 Making API request...");
    match client.nearby_search(&search).await {
        Ok(outcome) => {
            let (verdict, lines) = places::summary(&outcome);
            lines.iter().for_each(places::Line::print);

            if verdict.is_healthy() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Err(err) => {
            places::failure_report(&err)
                .iter()
                .for_each(places::Line::print);
            Ok(ExitCode::FAILURE)
        }
    }
}
