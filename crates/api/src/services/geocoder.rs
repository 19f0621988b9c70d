//! Address geocoding.
//!
//! [`MapQuestGeocoder`] resolves free-text addresses through the `MapQuest`
//! geocoding API and uses the first returned location.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::GeocoderConfig;

/// `MapQuest` geocoding endpoint.
const BASE_URL: &str = "https://www.mapquestapi.com/geocoding/v1/address";

/// Errors that can occur when geocoding an address.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The address resolved to nothing.
    #[error("no results for address")]
    NoResults,

    /// Failed to build the request URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// First geocoding match for an address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
}

/// Resolves free-text addresses to structured locations.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    #[serde(default)]
    street: String,
    /// City.
    #[serde(default)]
    admin_area5: String,
    /// State code.
    #[serde(default)]
    admin_area3: String,
    /// Country code.
    #[serde(default)]
    admin_area1: String,
    #[serde(default)]
    postal_code: String,
    lat_lng: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<MapQuestLocation> for GeocodedAddress {
    fn from(location: MapQuestLocation) -> Self {
        let state_zip = [location.admin_area3.as_str(), location.postal_code.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let formatted_address = [
            location.street.as_str(),
            location.admin_area5.as_str(),
            state_zip.as_str(),
            location.admin_area1.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        Self {
            latitude: location.lat_lng.lat,
            longitude: location.lat_lng.lng,
            formatted_address,
            street: location.street,
            city: location.admin_area5,
            state: location.admin_area3,
            zipcode: location.postal_code,
            country: location.admin_area1,
        }
    }
}

/// `MapQuest` geocoding client.
#[derive(Clone)]
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    api_key: SecretString,
}

impl MapQuestGeocoder {
    /// Create a new geocoding client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
        })
    }

    fn request_url(&self, address: &str) -> Result<Url, GeocodeError> {
        let mut url = Url::parse(BASE_URL).map_err(|e| GeocodeError::InvalidRequest(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret())
            .append_pair("location", address)
            .append_pair("maxResults", "1");
        Ok(url)
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError> {
        let url = self.request_url(address)?;

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GeocodeResponse = response.json().await?;
        let location = first_location(body).ok_or(GeocodeError::NoResults)?;

        tracing::debug!(
            address = %address,
            formatted_address = %location.formatted_address,
            "Address geocoded"
        );
        Ok(location)
    }
}

fn first_location(body: GeocodeResponse) -> Option<GeocodedAddress> {
    body.results
        .into_iter()
        .flat_map(|result| result.locations)
        .next()
        .map(GeocodedAddress::from)
}
