//! HTTP source for the covid19india.org feeds.

use reqwest::blocking::{Client, Response};
use tracing::info;

use crate::data::raw::RawSnapshot;
use crate::data::source::SnapshotSource;
use crate::error::AppError;
use crate::io::ingest::{parse_districts_csv, parse_national_json, parse_states_json};

const NATIONAL_URL: &str = "https://api.covid19india.org/data.json";
const STATES_URL: &str = "https://api.covid19india.org/states_daily.json";
const DISTRICTS_URL: &str = "https://api.covid19india.org/csv/latest/districts.csv";

/// Feed endpoints; each can be overridden from the environment (`.env` honoured).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUrls {
    pub national: String,
    pub states: String,
    pub districts: String,
}

impl Default for FeedUrls {
    fn default() -> Self {
        Self {
            national: NATIONAL_URL.to_string(),
            states: STATES_URL.to_string(),
            districts: DISTRICTS_URL.to_string(),
        }
    }
}

impl FeedUrls {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
        Self {
            national: var("LEVITT_NATIONAL_URL", NATIONAL_URL),
            states: var("LEVITT_STATES_URL", STATES_URL),
            districts: var("LEVITT_DISTRICTS_URL", DISTRICTS_URL),
        }
    }
}

pub struct Covid19IndiaClient {
    client: Client,
    urls: FeedUrls,
}

impl Covid19IndiaClient {
    pub fn new(urls: FeedUrls) -> Self {
        Self {
            client: Client::new(),
            urls,
        }
    }

    pub fn from_env() -> Self {
        Self::new(FeedUrls::from_env())
    }

    fn get(&self, url: &str) -> Result<Response, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::new(4, format!("Request to {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Request to {url} failed with status {}.", resp.status()),
            ));
        }
        Ok(resp)
    }
}

impl SnapshotSource for Covid19IndiaClient {
    fn fetch(&self) -> Result<RawSnapshot, AppError> {
        let mut snapshot = RawSnapshot::empty(self.describe());

        snapshot.national = parse_national_json(self.get(&self.urls.national)?)
            .map_err(|e| AppError::new(4, e.message().to_string()))?;
        snapshot.states = parse_states_json(self.get(&self.urls.states)?)
            .map_err(|e| AppError::new(4, e.message().to_string()))?;
        snapshot.districts = parse_districts_csv(self.get(&self.urls.districts)?)
            .map_err(|e| AppError::new(4, e.message().to_string()))?;

        info!(
            national = snapshot.national.len(),
            states = snapshot.states.len(),
            districts = snapshot.districts.len(),
            "fetched covid19india feeds"
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("covid19india ({})", self.urls.national)
    }
}
