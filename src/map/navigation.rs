//! Click-to-zoom planning.
//!
//! Cluster clicks walk a fixed ladder of zoom levels so navigation feels
//! predictable, falling back to the cluster's own expansion zoom near the
//! top. When zooming further cannot visually separate the points, the plan
//! is a list view instead of another zoom step, so coincident points never
//! cause an endless zoom sequence.

/// Discrete zoom levels for click-to-zoom navigation.
pub const ZOOM_LADDER: [f64; 5] = [4.0, 8.0, 12.0, 16.0, 17.0];

/// What a cluster click should do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickPlan {
    /// Animate to the cluster center at this zoom.
    ZoomTo { zoom: f64 },
    /// Show the cluster's members as a list; the map stays put.
    OpenList,
}

/// Plan a cluster click. Pure.
///
/// The target is the smallest ladder rung above the current zoom; at or
/// above the ladder's second-to-last rung (or past its end) the cluster's
/// natural expansion zoom is used instead. The target is capped to one below
/// the map's maximum zoom, and when that cap is hit while already near the
/// top of the ladder the click opens the list view.
pub fn plan_cluster_click(
    current_zoom: f64,
    expansion_zoom: f64,
    max_zoom: f64,
    ladder: &[f64],
) -> ClickPlan {
    let near_top = ladder
        .len()
        .checked_sub(2)
        .map(|i| current_zoom >= ladder[i])
        .unwrap_or(true);

    let next_rung = ladder.iter().copied().find(|rung| *rung > current_zoom);

    let target = match next_rung {
        Some(rung) if !near_top => rung,
        _ => expansion_zoom,
    };

    let capped = target.min(max_zoom - 1.0);

    if capped >= max_zoom - 1.0 && near_top {
        ClickPlan::OpenList
    } else {
        ClickPlan::ZoomTo { zoom: capped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn climbs_the_ladder_from_low_zoom() {
        assert_eq!(
            plan_cluster_click(2.0, 10.0, 18.0, &ZOOM_LADDER),
            ClickPlan::ZoomTo { zoom: 4.0 }
        );
        assert_eq!(
            plan_cluster_click(5.0, 10.0, 18.0, &ZOOM_LADDER),
            ClickPlan::ZoomTo { zoom: 8.0 }
        );
        assert_eq!(
            plan_cluster_click(12.0, 20.0, 18.0, &ZOOM_LADDER),
            ClickPlan::ZoomTo { zoom: 16.0 }
        );
    }

    #[test]
    fn never_targets_above_max_zoom_minus_one() {
        for current in [0.0, 4.0, 9.5, 13.0, 16.0, 17.0] {
            if let ClickPlan::ZoomTo { zoom } =
                plan_cluster_click(current, 22.0, 18.0, &ZOOM_LADDER)
            {
                assert!(zoom <= 17.0, "current {current}: target {zoom}");
            }
        }
    }

    #[test]
    fn opens_list_at_the_top_of_the_ladder() {
        // Second-to-last rung, coincident points: expansion zoom beyond max.
        assert_eq!(
            plan_cluster_click(16.0, 17.0, 18.0, &ZOOM_LADDER),
            ClickPlan::OpenList
        );
        assert_eq!(
            plan_cluster_click(17.0, 17.0, 18.0, &ZOOM_LADDER),
            ClickPlan::OpenList
        );
    }

    #[test]
    fn repeated_clicks_converge_to_the_list_view() {
        let mut zoom = 3.0;
        for _ in 0..10 {
            match plan_cluster_click(zoom, 18.0, 18.0, &ZOOM_LADDER) {
                ClickPlan::ZoomTo { zoom: next } => {
                    assert!(next > zoom, "zoom must increase, {zoom} -> {next}");
                    zoom = next;
                }
                ClickPlan::OpenList => return,
            }
        }
        panic!("clicks never reached the list view");
    }

    #[test]
    fn uses_expansion_zoom_when_it_resolves_below_the_cap() {
        // Near the top of the ladder but the cluster splits much earlier.
        assert_eq!(
            plan_cluster_click(16.0, 10.0, 18.0, &ZOOM_LADDER),
            ClickPlan::ZoomTo { zoom: 10.0 }
        );
    }
}
