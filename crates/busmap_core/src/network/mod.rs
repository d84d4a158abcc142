//! The in-memory transit network: stop and route registries and the links between them.

mod route;
mod stop;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use busmap_model::{RouteNo, StopNo};

pub use route::{Route, RoutePattern, RouteRegistry};
pub use stop::{
    SelectionError, Stop, StopRegistry, DEFAULT_SEARCH_RADIUS_METERS, PLACEHOLDER_STOP_LOCATION,
};

/// Both registries of a session. Stop/route links are only changed here so the two
/// sides always agree.
#[derive(Debug, Default, Clone)]
pub struct TransitNetwork {
    pub stops: StopRegistry,
    pub routes: RouteRegistry,
}

impl TransitNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `route` serves `stop`, creating either as a placeholder when unknown.
    /// Linking twice has no further effect.
    pub fn link(&mut self, stop: StopNo, route: &str) {
        let entry = self.stops.get_or_create(stop);
        if !entry.routes.contains(route) {
            entry.routes.insert(RouteNo::from(route));
        }
        let entry = self.routes.get_or_create(route);
        if !entry.stops.contains(&stop) {
            entry.stops.push(stop);
        }
    }

    /// Removes the link in both directions. Returns whether a link existed.
    pub fn unlink(&mut self, stop: StopNo, route: &str) -> bool {
        let removed_from_stop = self
            .stops
            .get_mut(stop)
            .map(|entry| entry.routes.remove(route))
            .unwrap_or(false);
        let removed_from_route = self
            .routes
            .get_mut(route)
            .map(|entry| {
                let before = entry.stops.len();
                entry.stops.retain(|number| *number != stop);
                entry.stops.len() != before
            })
            .unwrap_or(false);
        removed_from_stop || removed_from_route
    }

    /// Drops every stop (and the selection). Routes stay but lose their stop lists.
    pub fn clear_stops(&mut self) {
        self.stops.clear();
        for route in self.routes.iter_mut() {
            route.stops.clear();
        }
    }

    /// Drops every route. Stops stay but lose their route sets.
    pub fn clear_routes(&mut self) {
        self.routes.clear();
        for stop in self.stops.iter_mut() {
            stop.routes.clear();
        }
    }

    pub fn clear(&mut self) {
        self.stops.clear();
        self.routes.clear();
    }
}

/// A [`TransitNetwork`] shared between the ingestion side and readers.
///
/// A panicked writer does not lock readers out: poisoned guards are recovered.
#[derive(Debug, Clone, Default)]
pub struct SharedNetwork {
    inner: Arc<RwLock<TransitNetwork>>,
}

impl SharedNetwork {
    pub fn new(network: TransitNetwork) -> Self {
        Self {
            inner: Arc::new(RwLock::new(network)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TransitNetwork> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TransitNetwork> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
