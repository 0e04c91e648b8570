//! Point resolver: raw institution name + context → coordinates.

use crate::models::{Alumnus, ResolvedLocation, ResolvedPoint};
use crate::resolve::context::ResolutionContext;
use crate::utils::{is_non_college, normalize_institution};

/// Resolve a raw institution name against the context. Pure; tier order is
/// fixed:
///
/// 1. Geocoder's standard name, looked back up in the curated table — a
///    human-verified row for the canonical name beats raw geocoder output.
/// 2. Coordinates returned directly by the geocoder.
/// 3. The raw name itself against the curated table (covers names that were
///    already a curated alias, where no geocoder call was even needed).
pub fn resolve_to_location(raw: &str, ctx: &ResolutionContext) -> Option<ResolvedLocation> {
    let normalized = normalize_institution(raw);
    if normalized.is_empty() {
        return None;
    }

    if let Some(standard) = ctx.resolved_standard_name(&normalized) {
        if let Some(location) = ctx.curated(&normalize_institution(standard)) {
            return Some(*location);
        }
    }

    if let Some(location) = ctx.direct_coordinates(&normalized) {
        return Some(*location);
    }

    if let Some(location) = ctx.curated(&normalized) {
        return Some(*location);
    }

    None
}

/// Map the roster to resolved points. Archived alumni and non-college
/// entries are not mappable and are skipped up front.
pub fn resolve_points(alumni: &[Alumnus], ctx: &ResolutionContext) -> Vec<ResolvedPoint> {
    alumni
        .iter()
        .filter(|a| !a.is_archived)
        .filter_map(|a| {
            let raw = a.institution_name.as_deref()?;
            if is_non_college(raw) {
                return None;
            }
            let location = resolve_to_location(raw, ctx)?;
            Some(ResolvedPoint {
                alumnus_id: a.id,
                latitude: location.latitude,
                longitude: location.longitude,
                source: location.source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CuratedLocation, LocationSource};
    use crate::resolve::context::build_resolution_context;
    use crate::resolve::geocoder::{GeocodedName, Geocoder};
    use crate::error::AppError;
    use async_trait::async_trait;

    struct FixedGeocoder(Vec<GeocodedName>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn resolve_batch(&self, _names: &[String]) -> Result<Vec<GeocodedName>, AppError> {
            Ok(self.0.clone())
        }
    }

    fn curated(standard: &str, aliases: &[&str], lat: f64, lon: f64) -> CuratedLocation {
        CuratedLocation {
            id: uuid::Uuid::new_v4(),
            standard_name: standard.to_string(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            latitude: lat,
            longitude: lon,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn alumnus(name: &str) -> Alumnus {
        Alumnus {
            id: uuid::Uuid::new_v4(),
            first_name: "Test".into(),
            last_name: "Student".into(),
            cohort_year: Some(2021),
            institution_name: Some(name.to_string()),
            is_archived: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn curated_alias_resolves_directly() {
        let table = vec![curated("Example University", &["Ex U"], 10.0, 20.0)];
        let ctx = build_resolution_context(1, &table, &[], &FixedGeocoder(vec![])).await;

        let loc = resolve_to_location("ex u", &ctx).unwrap();
        assert_eq!((loc.latitude, loc.longitude), (10.0, 20.0));
        assert_eq!(loc.source, LocationSource::Curated);
    }

    #[tokio::test]
    async fn curated_via_standard_name_beats_direct_coordinates() {
        let table = vec![curated("Example University", &[], 10.0, 20.0)];
        let geocoder = FixedGeocoder(vec![GeocodedName {
            original_name: "example univ".into(),
            standard_name: Some("Example University".into()),
            latitude: Some(99.0),
            longitude: Some(99.0),
        }]);
        let alumni = vec![alumnus("Example Univ")];
        let ctx = build_resolution_context(1, &table, &alumni, &geocoder).await;

        let loc = resolve_to_location("Example Univ", &ctx).unwrap();
        assert_eq!((loc.latitude, loc.longitude), (10.0, 20.0));
        assert_eq!(loc.source, LocationSource::Curated);
    }

    #[tokio::test]
    async fn direct_coordinates_used_when_no_curated_row_matches() {
        let geocoder = FixedGeocoder(vec![GeocodedName {
            original_name: "unlisted college".into(),
            standard_name: Some("Unlisted College".into()),
            latitude: Some(5.0),
            longitude: Some(6.0),
        }]);
        let alumni = vec![alumnus("Unlisted College")];
        let ctx = build_resolution_context(1, &[], &alumni, &geocoder).await;

        let loc = resolve_to_location("Unlisted College", &ctx).unwrap();
        assert_eq!((loc.latitude, loc.longitude), (5.0, 6.0));
        assert_eq!(loc.source, LocationSource::External);
    }

    #[tokio::test]
    async fn unresolvable_name_returns_none() {
        let ctx = build_resolution_context(1, &[], &[], &FixedGeocoder(vec![])).await;
        assert!(resolve_to_location("Nowhere Tech", &ctx).is_none());
        assert!(resolve_to_location("", &ctx).is_none());
    }

    #[tokio::test]
    async fn resolver_is_pure() {
        let table = vec![curated("Example University", &["Ex U"], 10.0, 20.0)];
        let ctx = build_resolution_context(1, &table, &[], &FixedGeocoder(vec![])).await;

        let first = resolve_to_location("Ex U", &ctx);
        let second = resolve_to_location("Ex U", &ctx);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn resolve_points_skips_archived_and_non_college() {
        let table = vec![curated("Example University", &["Ex U"], 10.0, 20.0)];
        let mut archived = alumnus("Ex U");
        archived.is_archived = true;
        let alumni = vec![archived, alumnus("Works at Acme Corp"), alumnus("Ex U")];
        let ctx = build_resolution_context(1, &table, &alumni, &FixedGeocoder(vec![])).await;

        let points = resolve_points(&alumni, &ctx);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].alumnus_id, alumni[2].id);
    }
}
