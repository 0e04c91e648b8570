use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Curated institution-to-coordinates mapping, maintained by admins.
/// Read-only to the map pipeline.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct CuratedLocation {
    pub id: Uuid,
    pub standard_name: String,
    /// Alternate spellings that should resolve to this location.
    pub aliases: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request model for adding a curated mapping from the admin curation flow.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCuratedLocation {
    /// The raw college name being curated (stored as an alias).
    pub college_name: String,
    pub standard_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Where a resolved coordinate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    /// Human-verified curated table.
    Curated,
    /// External geocoding service, unreviewed.
    External,
}

/// A coordinate pair with provenance, the output of the point resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub source: LocationSource,
}

/// One alumnus placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResolvedPoint {
    pub alumnus_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub source: LocationSource,
}
