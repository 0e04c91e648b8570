//! Application state and dataset-load orchestration.
//!
//! A dataset load produces one immutable snapshot: resolution context,
//! resolved points, cluster index, and the unmapped report. Loads are
//! numbered; installing a snapshot whose generation is older than the one
//! already installed is refused, so a slow in-flight load can never clobber
//! a newer dataset.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use sqlx::{Pool, Postgres};
use tokio::sync::watch;

use crate::cluster::{ClusterConfig, ClusterIndex};
use crate::error::AppError;
use crate::map::TileLayerConfig;
use crate::models::{Alumnus, CuratedLocation, ResolvedPoint, UnmappedGroup};
use crate::resolve::{build_resolution_context, build_unmapped_groups, resolve_points, Geocoder, ResolutionContext};
use crate::store;

/// Server configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tile: TileLayerConfig,
    pub map_max_zoom: f64,
    pub cluster: ClusterConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tile: TileLayerConfig::default(),
            map_max_zoom: 18.0,
            cluster: ClusterConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("TILE_URL") {
            config.tile.url_template = url;
        }
        if let Ok(attribution) = std::env::var("TILE_ATTRIBUTION") {
            config.tile.attribution = attribution;
        }
        if let Ok(max_zoom) = std::env::var("MAP_MAX_ZOOM") {
            if let Ok(v) = max_zoom.parse() {
                config.map_max_zoom = v;
            }
        }
        config
    }
}

/// Everything one dataset load produced. Immutable once installed.
pub struct MapSnapshot {
    pub generation: u64,
    pub context: Arc<ResolutionContext>,
    pub points: Vec<ResolvedPoint>,
    pub index: Arc<ClusterIndex>,
    pub unmapped: Vec<UnmappedGroup>,
}

/// Holder for the current snapshot plus the load-generation counter.
pub struct MapState {
    generation: AtomicU64,
    snapshot: RwLock<Option<Arc<MapSnapshot>>>,
    ready_tx: watch::Sender<bool>,
}

impl Default for MapState {
    fn default() -> Self {
        Self::new()
    }
}

impl MapState {
    pub fn new() -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            generation: AtomicU64::new(0),
            snapshot: RwLock::new(None),
            ready_tx,
        }
    }

    /// Reserve the generation number for a load that is about to start.
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install a finished snapshot unless a newer one is already in place.
    pub fn install(&self, snapshot: MapSnapshot) -> bool {
        let mut slot = self.snapshot.write().expect("snapshot lock poisoned");
        if let Some(current) = slot.as_ref() {
            if current.generation >= snapshot.generation {
                return false;
            }
        }
        *slot = Some(Arc::new(snapshot));
        drop(slot);
        self.ready_tx.send_replace(true);
        true
    }

    /// Current snapshot; `None` until the first load completes, which
    /// callers must treat as a valid transient state.
    pub fn snapshot(&self) -> Option<Arc<MapSnapshot>> {
        self.snapshot.read().expect("snapshot lock poisoned").clone()
    }

    pub fn ready(&self) -> watch::Receiver<bool> {
        self.ready_tx.subscribe()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
    pub geocoder: Arc<dyn Geocoder>,
    pub map: Arc<MapState>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: Pool<Postgres>, geocoder: Arc<dyn Geocoder>, config: AppConfig) -> Self {
        Self {
            pool,
            geocoder,
            map: Arc::new(MapState::new()),
            config: Arc::new(config),
        }
    }
}

/// Run the full pipeline over in-memory records and install the result.
/// Returns the load's generation number.
pub async fn load_from_records(
    state: &AppState,
    curated: &[CuratedLocation],
    alumni: &[Alumnus],
) -> u64 {
    let generation = state.map.next_generation();
    let context =
        build_resolution_context(generation, curated, alumni, state.geocoder.as_ref()).await;
    let points = resolve_points(alumni, &context);
    let index = ClusterIndex::build(&points, state.config.cluster);
    let unmapped = build_unmapped_groups(alumni, &context);

    tracing::info!(
        generation,
        alumni = alumni.len(),
        mapped = points.len(),
        unmapped_groups = unmapped.len(),
        "dataset load complete"
    );

    let installed = state.map.install(MapSnapshot {
        generation,
        context: Arc::new(context),
        points,
        index: Arc::new(index),
        unmapped,
    });
    if !installed {
        tracing::info!(generation, "discarding superseded dataset load");
    }
    generation
}

/// Fetch the roster and curated table and rebuild the whole map dataset.
pub async fn reload_dataset(state: &AppState) -> Result<u64, AppError> {
    let curated = store::list_curated_locations(&state.pool).await?;
    let alumni = store::list_alumni(&state.pool).await?;
    Ok(load_from_records(state, &curated, &alumni).await)
}
