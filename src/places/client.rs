use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}")]
    Status { status: StatusCode, body: String },
    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearch {
    pub location: Location,
    /// Metres
    pub radius: u32,
    pub place_type: String,
}

impl NearbySearch {
    /// Fixed search: hospitals within 1 km of central Mumbai.
    pub fn mumbai_hospitals() -> Self {
        Self {
            location: Location {
                latitude: 19.0760,
                longitude: 72.8777,
                name: "Mumbai, India".to_string(),
            },
            radius: 1000,
            place_type: "hospital".to_string(),
        }
    }

    pub fn query(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![
            (
                "location",
                format!("{},{}", self.location.latitude, self.location.longitude),
            ),
            ("radius", self.radius.to_string()),
            ("type", self.place_type.clone()),
            ("key", api_key.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vicinity: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NearbyResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<Place>,
    pub error_message: Option<String>,
}

/// A response that made it back with a success status code.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub http_status: StatusCode,
    pub body: NearbyResponse,
}

pub struct PlacesClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl PlacesClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, PlacesError> {
        Self::with_endpoint(api_key, NEARBY_SEARCH_URL)
    }

    pub fn with_endpoint(api_key: impl Into<String>, endpoint: &str) -> Result<Self, PlacesError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
            api_key: api_key.into(),
        })
    }

    /// One request, no retries.
    pub async fn nearby_search(&self, search: &NearbySearch) -> Result<SearchOutcome, PlacesError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&search.query(&self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlacesError::Status { status, body });
        }

        let body = response.json::<NearbyResponse>().await?;
        tracing::debug!("Nearby search returned {} ({} results)", body.status, body.results.len());

        Ok(SearchOutcome {
            http_status: status,
            body,
        })
    }
}
