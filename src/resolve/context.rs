//! Resolution context: the per-dataset-load snapshot of every lookup the
//! point resolver needs. Built once per load, never mutated afterwards;
//! a newer load produces a new context with a higher generation.

use std::collections::{HashMap, HashSet};

use crate::models::{Alumnus, CuratedLocation, LocationSource, ResolvedLocation};
use crate::resolve::geocoder::Geocoder;
use crate::utils::{is_non_college, is_valid_coordinate, normalize_institution};

/// Immutable lookup snapshot keyed by normalized institution name.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    generation: u64,
    /// Normalized curated standard name or alias → curated coordinates.
    location_by_name: HashMap<String, ResolvedLocation>,
    /// Normalized unknown raw name → standard name from the geocoder.
    standard_name_by_raw: HashMap<String, String>,
    /// Normalized unknown raw name → coordinates straight from the geocoder.
    direct_coords_by_raw: HashMap<String, ResolvedLocation>,
}

impl ResolutionContext {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn curated(&self, normalized: &str) -> Option<&ResolvedLocation> {
        self.location_by_name.get(normalized)
    }

    pub fn resolved_standard_name(&self, normalized: &str) -> Option<&str> {
        self.standard_name_by_raw.get(normalized).map(String::as_str)
    }

    pub fn direct_coordinates(&self, normalized: &str) -> Option<&ResolvedLocation> {
        self.direct_coords_by_raw.get(normalized)
    }
}

/// Build the resolution context for one dataset load.
///
/// Indexes curated rows (skipping malformed coordinates), collects the
/// deduplicated set of college-looking names not already curated, and makes
/// at most one geocoder call for the whole batch. A geocoder failure is
/// logged and swallowed: the affected names simply stay unresolved and
/// surface later in the unmapped report.
pub async fn build_resolution_context(
    generation: u64,
    curated: &[CuratedLocation],
    alumni: &[Alumnus],
    geocoder: &dyn Geocoder,
) -> ResolutionContext {
    let mut ctx = ResolutionContext {
        generation,
        ..Default::default()
    };

    for entry in curated {
        if !is_valid_coordinate(entry.latitude) || !is_valid_coordinate(entry.longitude) {
            tracing::warn!(
                standard_name = %entry.standard_name,
                "skipping curated location with malformed coordinates"
            );
            continue;
        }

        let location = ResolvedLocation {
            latitude: entry.latitude,
            longitude: entry.longitude,
            source: LocationSource::Curated,
        };

        ctx.location_by_name
            .insert(normalize_institution(&entry.standard_name), location);
        for alias in &entry.aliases {
            ctx.location_by_name
                .insert(normalize_institution(alias), location);
        }
    }

    // Names the curated table doesn't know: candidates for the geocoder.
    let unknown: HashSet<String> = alumni
        .iter()
        .filter_map(|a| a.institution_name.as_deref())
        .filter(|name| !is_non_college(name))
        .map(normalize_institution)
        .filter(|n| !n.is_empty() && !ctx.location_by_name.contains_key(n))
        .collect();

    if unknown.is_empty() {
        return ctx;
    }

    let batch: Vec<String> = unknown.into_iter().collect();
    tracing::info!(count = batch.len(), "geocoding unknown institution names");

    match geocoder.resolve_batch(&batch).await {
        Ok(resolutions) => {
            for r in resolutions {
                let key = normalize_institution(&r.original_name);
                if let Some(standard) = r.standard_name {
                    ctx.standard_name_by_raw.insert(key.clone(), standard);
                }
                if let (Some(lat), Some(lon)) = (r.latitude, r.longitude) {
                    if is_valid_coordinate(lat) && is_valid_coordinate(lon) {
                        ctx.direct_coords_by_raw.insert(
                            key,
                            ResolvedLocation {
                                latitude: lat,
                                longitude: lon,
                                source: LocationSource::External,
                            },
                        );
                    }
                }
            }
        }
        Err(e) => {
            // Soft failure: these names stay unresolved for this load.
            tracing::warn!("geocoder batch failed, names left unresolved: {e}");
        }
    }

    ctx
}
