use crate::domain::model::BoundingBox;
use crate::utils::error::{Result, RoadnetError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = concat!("roadnet-etl/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait BoundaryProvider: Send + Sync {
    async fn region_bounds(&self, region: &str) -> Result<BoundingBox>;
}

/// Geocodes region names against a Nominatim-compatible `/search` endpoint.
pub struct NominatimClient {
    client: Client,
    endpoint: String,
    user_agent: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    /// `[south, north, west, east]` as decimal strings.
    boundingbox: Vec<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn parse_bbox(region: &str, result: &SearchResult) -> Result<BoundingBox> {
        let invalid = |message: String| RoadnetError::GeocodingError {
            region: region.to_string(),
            message,
        };

        let values = result
            .boundingbox
            .iter()
            .map(|v| v.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| invalid(format!("unparsable bounding box: {}", e)))?;

        let [south, north, west, east] = values.as_slice() else {
            return Err(invalid(format!(
                "expected 4 bounding box values, got {}",
                values.len()
            )));
        };

        let bbox = BoundingBox::new(*west, *south, *east, *north);
        if !bbox.is_valid() {
            return Err(invalid(format!("invalid bounding box {}", bbox)));
        }
        Ok(bbox)
    }
}

#[async_trait]
impl BoundaryProvider for NominatimClient {
    async fn region_bounds(&self, region: &str) -> Result<BoundingBox> {
        let url = format!("{}/search", self.endpoint);
        tracing::debug!("Geocoding '{}' via {}", region, url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", region), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Geocoder response status: {}", status);
        if !status.is_success() {
            return Err(RoadnetError::GeocodingError {
                region: region.to_string(),
                message: format!("geocoder returned HTTP {}", status),
            });
        }

        let results: Vec<SearchResult> = response.json().await?;
        let first = results.first().ok_or_else(|| RoadnetError::GeocodingError {
            region: region.to_string(),
            message: "no results".to_string(),
        })?;

        let bbox = Self::parse_bbox(region, first)?;
        tracing::info!(
            "Resolved '{}' ({}) to {}",
            region,
            first.display_name.as_deref().unwrap_or("unnamed"),
            bbox
        );
        Ok(bbox)
    }
}

/// Combined bounding box of every region.
pub async fn retrieve_boundary<B>(provider: &B, regions: &[String]) -> Result<BoundingBox>
where
    B: BoundaryProvider + ?Sized,
{
    let mut combined: Option<BoundingBox> = None;
    for region in regions {
        let bbox = provider.region_bounds(region).await?;
        combined = Some(match combined {
            Some(acc) => acc.union(&bbox),
            None => bbox,
        });
    }

    let combined = combined.ok_or_else(|| RoadnetError::ConfigError {
        message: "at least one region or an explicit bbox is required".to_string(),
    })?;
    tracing::info!("Extraction boundary: {}", combined);
    Ok(combined)
}
