//! External geocoding collaborator.
//!
//! The service receives one batch of normalized institution names per dataset
//! load and returns whatever it can resolve. Partial results are expected;
//! a failed call only means those names stay unresolved for this load.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One resolution returned by the geocoding service. `standard_name` and the
/// coordinates are independent: either, both, or neither may be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodedName {
    pub original_name: String,
    pub standard_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Batch name-resolution collaborator. Must never be called per-record;
/// the context builder sends the full unknown set in one call.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve_batch(&self, names: &[String]) -> Result<Vec<GeocodedName>, AppError>;
}

/// Geocoder used when no endpoint is configured: resolves nothing, so every
/// unknown name lands in the unmapped report instead.
pub struct NoopGeocoder;

#[async_trait]
impl Geocoder for NoopGeocoder {
    async fn resolve_batch(&self, names: &[String]) -> Result<Vec<GeocodedName>, AppError> {
        tracing::warn!(
            count = names.len(),
            "no geocoder configured, leaving names unresolved"
        );
        Ok(Vec::new())
    }
}

/// HTTP implementation posting the batch as JSON to the configured endpoint.
pub struct HttpGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    names: &'a [String],
}

#[derive(Deserialize)]
struct BatchResponse {
    resolutions: Vec<GeocodedName>,
}

impl HttpGeocoder {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn resolve_batch(&self, names: &[String]) -> Result<Vec<GeocodedName>, AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&BatchRequest { names })
            .send()
            .await
            .map_err(|e| AppError::Geocoder(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Geocoder(e.to_string()))?;

        let body: BatchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Geocoder(e.to_string()))?;

        Ok(body.resolutions)
    }
}
