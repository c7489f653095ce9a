//! Place name to coordinates.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{ChartError, Coordinates};

/// Used whenever geocoding fails (Mumbai).
pub const FALLBACK_COORDINATES: Coordinates = Coordinates {
    latitude: 19.0760,
    longitude: 72.8777,
};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "astrobot_app";
const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Looks up coordinates for a free-text place.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the place is unknown.
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, ChartError>;

    /// Coordinates for `place`, or [`FALLBACK_COORDINATES`] on any failure.
    async fn resolve_coordinates(&self, place: &str) -> Coordinates {
        match self.geocode(place).await {
            Ok(Some(coordinates)) => coordinates,
            Ok(None) => {
                log::warn!("Geocoding found nothing for '{}'; using fallback", place);
                FALLBACK_COORDINATES
            }
            Err(e) => {
                log::warn!("Geocoding failed for '{}': {}", place, e);
                FALLBACK_COORDINATES
            }
        }
    }
}

/// OpenStreetMap Nominatim search.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new() -> Result<Self, ChartError> {
        Self::with_endpoint(NOMINATIM_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, ChartError> {
        let client = reqwest::Client::builder()
            .timeout(GEOCODE_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

fn parse_place(place: &NominatimPlace) -> Result<Coordinates, ChartError> {
    let latitude = place
        .lat
        .parse::<f64>()
        .map_err(|e| ChartError::Decode(format!("latitude '{}': {}", place.lat, e)))?;
    let longitude = place
        .lon
        .parse::<f64>()
        .map_err(|e| ChartError::Decode(format!("longitude '{}': {}", place.lon, e)))?;
    Ok(Coordinates::new(latitude, longitude))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, ChartError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChartError::Status {
                endpoint: "nominatim/search".to_string(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let places: Vec<NominatimPlace> = response.json().await?;
        places.first().map(parse_place).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeocoder(Result<Option<Coordinates>, ()>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, _place: &str) -> Result<Option<Coordinates>, ChartError> {
            self.0
                .map_err(|_| ChartError::Decode("lookup timed out".to_string()))
        }
    }

    #[tokio::test]
    async fn test_resolve_returns_found_coordinates() {
        let pune = Coordinates::new(18.52, 73.85);
        let geocoder = FixedGeocoder(Ok(Some(pune)));
        assert_eq!(geocoder.resolve_coordinates("Pune").await, pune);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_error_or_miss() {
        for geocoder in [FixedGeocoder(Err(())), FixedGeocoder(Ok(None))] {
            let coordinates = geocoder.resolve_coordinates("Atlantis").await;
            assert_eq!(coordinates, FALLBACK_COORDINATES);
            assert_eq!((coordinates.latitude, coordinates.longitude), (19.0760, 72.8777));
        }
    }

    #[test]
    fn test_parse_place_rejects_garbage() {
        let place = NominatimPlace {
            lat: "north".to_string(),
            lon: "72.1".to_string(),
        };
        assert!(matches!(parse_place(&place), Err(ChartError::Decode(_))));
    }
}
