use crate::advisory::AdvisoryThresholds;
use crate::directory::RegionDirectory;
use crate::engine::EngineSettings;
use crate::fetch::Session;
use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runner configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub page_size: u32,
    pub request_timeout: Duration,
    pub room_hint_threshold: u32,
    pub majority_region: String,
    pub strict_price_range: bool,
    pub regions_file: Option<PathBuf>,
    pub session: Option<Session>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let page_size: u32 = lookup("LISTING_PAGE_SIZE")
            .unwrap_or_else(|| "6".to_string())
            .parse()
            .context("LISTING_PAGE_SIZE must be a valid number")?;
        if page_size == 0 {
            bail!("LISTING_PAGE_SIZE must be at least 1");
        }

        let timeout_secs: u64 = lookup("LISTING_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("LISTING_REQUEST_TIMEOUT_SECS must be a valid number")?;
        if timeout_secs == 0 {
            bail!("LISTING_REQUEST_TIMEOUT_SECS must be at least 1");
        }

        let strict_price_range = match lookup("LISTING_STRICT_PRICE_RANGE").as_deref() {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => bail!("LISTING_STRICT_PRICE_RANGE must be true or false, got '{}'", other),
        };

        let session = lookup("LISTING_SESSION_COOKIE")
            .filter(|c| !c.trim().is_empty())
            .map(|cookie| {
                let session = Session::new(cookie);
                match lookup("LISTING_SESSION_USER") {
                    Some(user) => session.with_user(user),
                    None => session,
                }
            });

        Ok(Self {
            api_url: lookup("LISTING_API_URL")
                .unwrap_or_else(|| "http://localhost:5000/api".to_string()),
            page_size,
            request_timeout: Duration::from_secs(timeout_secs),
            room_hint_threshold: lookup("LISTING_ROOM_HINT_THRESHOLD")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("LISTING_ROOM_HINT_THRESHOLD must be a valid number")?,
            majority_region: lookup("LISTING_MAJORITY_REGION")
                .unwrap_or_else(|| "Addis Ababa".to_string()),
            strict_price_range,
            regions_file: lookup("LISTING_REGIONS_FILE").map(PathBuf::from),
            session,
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            page_size: self.page_size,
            request_timeout: self.request_timeout,
            thresholds: AdvisoryThresholds {
                room_count: self.room_hint_threshold,
                majority_region: self.majority_region.clone(),
            },
            strict_price_range: self.strict_price_range,
        }
    }

    /// The configured region file, or the built-in list
    pub fn region_directory(&self) -> Result<RegionDirectory> {
        match &self.regions_file {
            Some(path) => RegionDirectory::from_file(path),
            None => Ok(RegionDirectory::ethiopia()),
        }
    }
}
