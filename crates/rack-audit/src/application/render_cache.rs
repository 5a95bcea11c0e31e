//! Rack views and a small cache for them.
//!
//! A [`RackView`] bundles everything a screen needs from one rack snapshot:
//! the elevation rows, the utilization summary and any occupancy issues.  It
//! is built from a single resolver pass.
//!
//! [`RenderCache`] keeps the last view per rack and rebuilds it when the
//! rack's name, height or device list changes.  Entries stay until they are
//! invalidated or the cache is cleared, one per rack id ever viewed.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rack_core::{OccupancyIssue, OccupancyMap, Rack, RackId, RenderRow, Utilization};
use serde::Serialize;
use tracing::debug;

/// Everything a presentation layer needs to draw one rack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RackView {
    pub rack_id: RackId,
    pub name: String,
    pub height_units: u32,
    /// One row per unit, top of the rack first.
    pub rows: Vec<RenderRow>,
    pub utilization: Utilization,
    pub issues: Vec<OccupancyIssue>,
}

impl RackView {
    /// Builds the view of `rack`, resolving its occupancy once.
    pub fn build(rack: &Rack) -> Self {
        let map = OccupancyMap::resolve(rack);
        Self {
            rack_id: rack.id(),
            name: rack.name().to_string(),
            height_units: rack.height_units(),
            rows: RenderRow::from_occupancy(&map),
            utilization: Utilization::from_occupancy(&map, rack.devices()),
            issues: map.issues().to_vec(),
        }
    }
}

/// Memoizes [`RackView`]s by rack id and layout fingerprint.
///
/// There is no eviction.  Callers that view an open-ended set of racks should
/// [`invalidate`](Self::invalidate) deleted racks or [`clear`](Self::clear)
/// the cache periodically.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<RackId, (u64, Arc<RackView>)>,
    hits: u64,
    misses: u64,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the view of `rack`, rebuilding it if the layout changed since
    /// the last call for the same rack id.
    pub fn view(&mut self, rack: &Rack) -> Arc<RackView> {
        let key = layout_key(rack);
        if let Some((cached_key, view)) = self.entries.get(&rack.id()) {
            if *cached_key == key {
                self.hits += 1;
                return Arc::clone(view);
            }
        }

        self.misses += 1;
        debug!("rebuilding view for rack {}", rack.name());
        let view = Arc::new(RackView::build(rack));
        self.entries.insert(rack.id(), (key, Arc::clone(&view)));
        view
    }

    /// Drops the cached view of rack `id`, if any.
    pub fn invalidate(&mut self, id: RackId) {
        self.entries.remove(&id);
    }

    /// Drops every cached view.  Hit and miss counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn layout_key(rack: &Rack) -> u64 {
    let mut hasher = DefaultHasher::new();
    rack.name().hash(&mut hasher);
    rack.height_units().hash(&mut hasher);
    rack.devices().hash(&mut hasher);
    hasher.finish()
}
