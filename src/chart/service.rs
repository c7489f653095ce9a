//! Provider-then-mock chart pipeline.

use std::sync::Arc;

use super::geocode::Geocoder;
use super::mock::{mock_chart_data, mock_rendered_chart};
use super::prokerala::{ChartProvider, ProbeReport};
use super::{ChartData, Coordinates, RenderedChart};
use crate::birth::BirthRecord;

/// Geocodes, asks the provider, and substitutes a mock on any failure.
#[derive(Clone)]
pub struct ChartService {
    provider: Arc<dyn ChartProvider>,
    geocoder: Arc<dyn Geocoder>,
}

impl ChartService {
    pub fn new(provider: Arc<dyn ChartProvider>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { provider, geocoder }
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_configured()
    }

    pub async fn resolve_coordinates(&self, place: &str) -> Coordinates {
        self.geocoder.resolve_coordinates(place).await
    }

    /// Structured chart for `record`, never failing.
    pub async fn kundli(&self, record: &BirthRecord) -> (ChartData, Coordinates) {
        let coordinates = self.resolve_coordinates(&record.place).await;
        let chart = match self.provider.fetch_chart(record, coordinates).await {
            Ok(chart) => chart,
            Err(e) => {
                log::warn!("Chart provider unavailable ({}); returning mock chart", e);
                mock_chart_data(record, coordinates)
            }
        };
        (chart, coordinates)
    }

    /// Visual chart for `record`, never failing.
    pub async fn rendered_chart(&self, record: &BirthRecord) -> (RenderedChart, Coordinates) {
        let coordinates = self.resolve_coordinates(&record.place).await;
        let chart = match self.provider.render_chart(record, coordinates).await {
            Ok(chart) => chart,
            Err(e) => {
                log::warn!("Chart rendering unavailable ({}); returning mock chart", e);
                mock_rendered_chart(record)
            }
        };
        (chart, coordinates)
    }

    pub async fn probe(&self) -> ProbeReport {
        self.provider.probe().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::chart::geocode::FALLBACK_COORDINATES;
    use crate::chart::prokerala::{assemble_chart, CredentialPresence};
    use crate::chart::ChartError;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use serde_json::json;

    /// Provider that always fails the way an unreachable API does.
    pub(crate) struct DownProvider;

    #[async_trait]
    impl ChartProvider for DownProvider {
        fn is_configured(&self) -> bool {
            false
        }

        async fn fetch_chart(
            &self,
            _record: &BirthRecord,
            _coordinates: Coordinates,
        ) -> Result<ChartData, ChartError> {
            Err(ChartError::Status {
                endpoint: "planet-position".into(),
                status: 503,
                body: "maintenance".into(),
            })
        }

        async fn render_chart(
            &self,
            _record: &BirthRecord,
            _coordinates: Coordinates,
        ) -> Result<RenderedChart, ChartError> {
            Err(ChartError::MissingCredentials)
        }

        async fn probe(&self) -> ProbeReport {
            ProbeReport::failed(
                "No access token available",
                CredentialPresence {
                    client_id_is_present: false,
                    client_secret_is_present: false,
                },
            )
        }
    }

    /// Provider that returns a fixed real-looking chart.
    pub(crate) struct FixedProvider;

    #[async_trait]
    impl ChartProvider for FixedProvider {
        fn is_configured(&self) -> bool {
            true
        }

        async fn fetch_chart(
            &self,
            record: &BirthRecord,
            coordinates: Coordinates,
        ) -> Result<ChartData, ChartError> {
            Ok(assemble_chart(
                record,
                coordinates,
                vec![json!({"id": 100, "name": "Lagna", "rasi": {"id": 4, "name": "Karka"}})],
                json!({"mangal_dosha": {"has_dosha": false}, "yoga_details": []}),
                Vec::new(),
            ))
        }

        async fn render_chart(
            &self,
            _record: &BirthRecord,
            _coordinates: Coordinates,
        ) -> Result<RenderedChart, ChartError> {
            Ok(RenderedChart::svg("<svg>real</svg>"))
        }

        async fn probe(&self) -> ProbeReport {
            ProbeReport::from_response(
                200,
                "image/svg+xml",
                "<svg/>",
                CredentialPresence {
                    client_id_is_present: true,
                    client_secret_is_present: true,
                },
            )
        }
    }

    /// Geocoder that never finds anything.
    pub(crate) struct NowhereGeocoder;

    #[async_trait]
    impl Geocoder for NowhereGeocoder {
        async fn geocode(&self, _place: &str) -> Result<Option<Coordinates>, ChartError> {
            Err(ChartError::Decode("timed out".into()))
        }
    }

    fn record() -> BirthRecord {
        BirthRecord {
            name: "Asha".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 3, 15).unwrap(),
            time_of_birth: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            place: "Nowhere".to_string(),
            timezone: "Asia/Kolkata".to_string(),
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_yields_mock_with_same_shape() {
        let down = ChartService::new(Arc::new(DownProvider), Arc::new(NowhereGeocoder));
        let up = ChartService::new(Arc::new(FixedProvider), Arc::new(NowhereGeocoder));

        let (mock, coordinates) = down.kundli(&record()).await;
        let (real, _) = up.kundli(&record()).await;
        assert_eq!(coordinates, FALLBACK_COORDINATES);
        assert!(mock.is_mock_data);
        assert!(!real.is_mock_data);

        let mock_json = serde_json::to_value(&mock).unwrap();
        let real_json = serde_json::to_value(&real).unwrap();
        for key in real_json.as_object().unwrap().keys() {
            assert!(mock_json.get(key).is_some(), "mock chart lacks {}", key);
        }
        assert_eq!(mock_json["is_mock_data"], true);
    }

    #[tokio::test]
    async fn test_failed_render_yields_mock_svg() {
        let down = ChartService::new(Arc::new(DownProvider), Arc::new(NowhereGeocoder));
        let (chart, _) = down.rendered_chart(&record()).await;
        assert!(chart.is_mock);
        assert_eq!(chart.format, "svg");

        let up = ChartService::new(Arc::new(FixedProvider), Arc::new(NowhereGeocoder));
        let (chart, _) = up.rendered_chart(&record()).await;
        assert!(!chart.is_mock);
        assert_eq!(chart.svg_content.as_deref(), Some("<svg>real</svg>"));
    }
}
