//! Viewport renderer and cluster-navigation state machine.
//!
//! [`MapController`] owns an attached [`MapView`] plus the current cluster
//! index, keeps the draw list up to date on debounced viewport changes, and
//! drives cluster clicks through the Idle → Animating / ListView states.
//!
//! Lifecycle is explicit and two-phase: the owning container calls
//! [`MapController::attach`] exactly once when the map widget exists, and
//! [`MapController::detach`] on teardown, which also aborts any pending
//! debounced redraw so no callback fires into a dead view.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::cluster::{ClusterIndex, ClusterNode};
use crate::map::navigation::{plan_cluster_click, ClickPlan, ZOOM_LADDER};
use crate::map::viewport::MapView;
use crate::models::ResolvedPoint;

/// Rapid pans and zooms within this window coalesce into one recompute.
pub const REDRAW_DEBOUNCE: Duration = Duration::from_millis(150);

/// Fixed click-to-zoom animation length.
pub const FLY_DURATION: Duration = Duration::from_millis(400);

/// Navigation state. `ListView` carries the members shown in the modal.
#[derive(Debug, Clone, PartialEq)]
pub enum NavState {
    Idle,
    Animating,
    ListView(Vec<ResolvedPoint>),
}

#[derive(Debug, thiserror::Error)]
#[error("map view is already attached")]
pub struct AlreadyAttached;

struct Inner {
    map: RwLock<Option<Arc<dyn MapView>>>,
    index: RwLock<Option<Arc<ClusterIndex>>>,
    draw_list: RwLock<Vec<ClusterNode>>,
    nav: Mutex<NavState>,
    pending_redraw: Mutex<Option<AbortHandle>>,
    animation: Mutex<Option<AbortHandle>>,
    ready_tx: watch::Sender<bool>,
    debounce: Duration,
}

#[derive(Clone)]
pub struct MapController {
    inner: Arc<Inner>,
}

impl Default for MapController {
    fn default() -> Self {
        Self::new()
    }
}

impl MapController {
    pub fn new() -> Self {
        Self::with_debounce(REDRAW_DEBOUNCE)
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                map: RwLock::new(None),
                index: RwLock::new(None),
                draw_list: RwLock::new(Vec::new()),
                nav: Mutex::new(NavState::Idle),
                pending_redraw: Mutex::new(None),
                animation: Mutex::new(None),
                ready_tx,
                debounce,
            }),
        }
    }

    /// First lifecycle phase: bind the map widget. Exactly once.
    pub fn attach(&self, map: Arc<dyn MapView>) -> Result<(), AlreadyAttached> {
        {
            let mut slot = self.inner.map.write().expect("map lock poisoned");
            if slot.is_some() {
                return Err(AlreadyAttached);
            }
            *slot = Some(map);
        }
        self.inner.update_ready();
        self.redraw_now();
        Ok(())
    }

    /// Tear down: drop the view, abort pending work, reset navigation.
    pub fn detach(&self) {
        if let Some(handle) = self
            .inner
            .pending_redraw
            .lock()
            .expect("redraw lock poisoned")
            .take()
        {
            handle.abort();
        }
        if let Some(handle) = self.inner.animation.lock().expect("anim lock poisoned").take() {
            handle.abort();
        }
        *self.inner.map.write().expect("map lock poisoned") = None;
        *self.inner.nav.lock().expect("nav lock poisoned") = NavState::Idle;
        self.inner.update_ready();
    }

    /// Dataset change: swap in the freshly built index and redraw. Distinct
    /// from a viewport change, which only queries the existing index.
    pub fn set_index(&self, index: Arc<ClusterIndex>) {
        *self.inner.index.write().expect("index lock poisoned") = Some(index);
        self.inner.update_ready();
        self.redraw_now();
    }

    /// Viewport moved: coalesce rapid events, then recompute the draw list.
    pub fn on_viewport_change(&self) {
        let mut pending = self
            .inner
            .pending_redraw
            .lock()
            .expect("redraw lock poisoned");
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            inner.redraw();
            inner
                .pending_redraw
                .lock()
                .expect("redraw lock poisoned")
                .take();
        });
        *pending = Some(task.abort_handle());
    }

    /// Cluster click. No-op while animating, in the list view, or for a
    /// stale cluster id.
    pub fn on_cluster_click(&self, cluster_id: u64) {
        {
            let nav = self.inner.nav.lock().expect("nav lock poisoned");
            if *nav != NavState::Idle {
                return;
            }
        }

        let Some(map) = self.inner.map_view() else {
            return;
        };
        let Some(index) = self.inner.cluster_index() else {
            return;
        };
        let Some(expansion_zoom) = index.expansion_zoom(cluster_id) else {
            // Index rebuilt since the click was queued.
            tracing::debug!(cluster_id, "ignoring click on unknown cluster");
            return;
        };

        let plan = plan_cluster_click(
            map.zoom(),
            expansion_zoom as f64,
            map.max_zoom(),
            &ZOOM_LADDER,
        );

        match plan {
            ClickPlan::ZoomTo { zoom } => {
                let Some(center) = index.cluster_center(cluster_id) else {
                    return;
                };
                *self.inner.nav.lock().expect("nav lock poisoned") = NavState::Animating;
                map.fly_to(center, zoom, FLY_DURATION);

                let inner = Arc::clone(&self.inner);
                let task = tokio::spawn(async move {
                    tokio::time::sleep(FLY_DURATION).await;
                    let mut nav = inner.nav.lock().expect("nav lock poisoned");
                    if *nav == NavState::Animating {
                        *nav = NavState::Idle;
                    }
                });
                *self.inner.animation.lock().expect("anim lock poisoned") =
                    Some(task.abort_handle());
            }
            ClickPlan::OpenList => {
                let Some(members) = index.leaves(cluster_id) else {
                    return;
                };
                *self.inner.nav.lock().expect("nav lock poisoned") = NavState::ListView(members);
            }
        }
    }

    /// Close the list view. The viewport is left untouched.
    pub fn dismiss_list_view(&self) {
        let mut nav = self.inner.nav.lock().expect("nav lock poisoned");
        if matches!(*nav, NavState::ListView(_)) {
            *nav = NavState::Idle;
        }
    }

    pub fn nav_state(&self) -> NavState {
        self.inner.nav.lock().expect("nav lock poisoned").clone()
    }

    /// Latest successfully computed draw list.
    pub fn draw_list(&self) -> Vec<ClusterNode> {
        self.inner
            .draw_list
            .read()
            .expect("draw list lock poisoned")
            .clone()
    }

    /// Readiness signal: true once both the map view and an index exist.
    /// Replaces polling "are the refs ready yet" with an awaitable value.
    pub fn ready(&self) -> watch::Receiver<bool> {
        self.inner.ready_tx.subscribe()
    }

    fn redraw_now(&self) {
        self.inner.redraw();
    }
}

impl Inner {
    fn map_view(&self) -> Option<Arc<dyn MapView>> {
        self.map.read().expect("map lock poisoned").clone()
    }

    fn cluster_index(&self) -> Option<Arc<ClusterIndex>> {
        self.index.read().expect("index lock poisoned").clone()
    }

    fn update_ready(&self) {
        let ready = self.map.read().expect("map lock poisoned").is_some()
            && self.index.read().expect("index lock poisoned").is_some();
        self.ready_tx.send_replace(ready);
    }

    /// Recompute the draw list from the current viewport. Failures keep the
    /// previous draw list visible.
    fn redraw(&self) {
        let (Some(map), Some(index)) = (self.map_view(), self.cluster_index()) else {
            tracing::warn!("skipping redraw: map or index not ready");
            return;
        };

        let nodes = index.get_clusters(map.bounds(), map.zoom());
        *self.draw_list.write().expect("draw list lock poisoned") = nodes;
    }
}
