use anyhow::Result;
use clap::Parser;
use listing_scout::{
    Config, FilterKey, FilterUpdate, HttpListingFetcher, ListingQueryEngine, ViewState,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Search property listings from the command line
#[derive(Debug, Parser)]
#[command(name = "listing-scout", version)]
struct Args {
    /// "sale" or "rent"
    #[arg(long)]
    listing_type: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    min_price: Option<String>,
    #[arg(long)]
    max_price: Option<String>,
    #[arg(long)]
    property_type: Option<String>,
    #[arg(long)]
    bedrooms: Option<String>,
    #[arg(long)]
    bathrooms: Option<String>,
    /// Free-text search over location and name
    #[arg(long, short = 's')]
    search: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Print the raw page as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Flags in the order a user would fill the form; region before city
    fn updates(&self) -> Vec<(FilterKey, &str)> {
        [
            (FilterKey::ListingType, &self.listing_type),
            (FilterKey::Region, &self.region),
            (FilterKey::City, &self.city),
            (FilterKey::MinPrice, &self.min_price),
            (FilterKey::MaxPrice, &self.max_price),
            (FilterKey::PropertyType, &self.property_type),
            (FilterKey::Bedrooms, &self.bedrooms),
            (FilterKey::Bathrooms, &self.bathrooms),
            (FilterKey::SearchQuery, &self.search),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let fetcher = match config.session.clone() {
        Some(session) => HttpListingFetcher::with_session(&config.api_url, config.request_timeout, session)?,
        None => HttpListingFetcher::new(&config.api_url, config.request_timeout)?,
    };
    info!("🏠 Listing Scout - {}", fetcher.base_url());

    let mut engine = ListingQueryEngine::new(
        Arc::new(fetcher),
        config.region_directory()?,
        config.engine_settings(),
    );

    for (key, raw) in args.updates() {
        let update = FilterUpdate::parse(key, raw)?;
        engine.update_filter(update)?;
    }
    let pending = engine.set_page(args.page)?;
    info!(
        "Searching with {} active filters, page {}",
        engine.active_filter_count(),
        engine.page()
    );

    match engine.run(pending).await {
        ViewState::Success {
            properties,
            total,
            total_pages,
            ..
        } => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(properties)?);
                return Ok(());
            }
            info!("\n✅ Page {} of {} ({} properties)\n", args.page, total_pages, total);
            for (i, property) in properties.iter().enumerate() {
                let title = property.title.as_deref().unwrap_or("Untitled listing");
                match property.price {
                    Some(price) => println!("{}. {} ({} ETB)", i + 1, title, price),
                    None => println!("{}. {} (price on request)", i + 1, title),
                }
                if let Some(address) = &property.address {
                    println!("   {}", address);
                }
                if let (Some(beds), Some(baths)) = (property.bedrooms, property.bathrooms) {
                    println!("   {} bed, {} bath", beds, baths);
                }
                println!("   ID: {}", property.id);
                println!();
            }
        }
        ViewState::Empty { hints } => {
            println!("No properties found.");
            for hint in hints {
                println!("  - {}", hint);
            }
        }
        ViewState::Error { message } => {
            anyhow::bail!("{} Try resetting your filters.", message);
        }
        ViewState::Idle | ViewState::Loading { .. } => {
            anyhow::bail!("Listing query did not complete");
        }
    }

    Ok(())
}
