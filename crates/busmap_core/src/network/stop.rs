use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use busmap_model::{Arrival, Bus, LatLon, RouteNo, StopNo};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::geo::distance;

/// Location given to a stop first mentioned by a feed that does not describe it.
pub const PLACEHOLDER_STOP_LOCATION: LatLon = LatLon::new(49.2827, -123.1207);

/// Search radius used by [`StopRegistry::nearest_to_default`].
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("stop {0} is not registered")]
    UnknownStop(StopNo),
}

/// A bus stop. Identity and equality are the stop number alone.
#[derive(Debug, Clone)]
pub struct Stop {
    number: StopNo,
    name: String,
    location: LatLon,
    pub(super) routes: BTreeSet<RouteNo>,
    buses: Vec<Bus>,
    arrivals: Vec<Arrival>,
}

impl Stop {
    pub(crate) fn new(number: StopNo, name: impl Into<String>, location: LatLon) -> Self {
        Self {
            number,
            name: name.into(),
            location,
            routes: BTreeSet::new(),
            buses: Vec::new(),
            arrivals: Vec::new(),
        }
    }

    pub fn number(&self) -> StopNo {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn location(&self) -> LatLon {
        self.location
    }

    pub fn set_location(&mut self, location: LatLon) {
        self.location = location;
    }

    /// Route numbers serving this stop. Mutated only through `TransitNetwork::link`/`unlink`.
    pub fn routes(&self) -> &BTreeSet<RouteNo> {
        &self.routes
    }

    pub fn serves(&self, route: &str) -> bool {
        self.routes.contains(route)
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    /// Adds the bus if its route serves this stop; returns whether it was added.
    pub fn add_bus(&mut self, bus: Bus) -> bool {
        if !self.serves(&bus.route) {
            return false;
        }
        self.buses.push(bus);
        true
    }

    pub fn clear_buses(&mut self) {
        self.buses.clear();
    }

    /// Swaps in a complete new bus list, dropping buses on routes that do not serve
    /// this stop. Returns the previous list.
    pub fn replace_buses(&mut self, buses: Vec<Bus>) -> Vec<Bus> {
        let served = buses
            .into_iter()
            .filter(|bus| self.routes.contains(&bus.route))
            .collect();
        std::mem::replace(&mut self.buses, served)
    }

    pub fn arrivals(&self) -> &[Arrival] {
        &self.arrivals
    }

    pub fn add_arrival(&mut self, arrival: Arrival) {
        self.arrivals.push(arrival);
    }

    pub fn clear_arrivals(&mut self) {
        self.arrivals.clear();
    }

    /// Swaps in a complete new arrival list. Returns the previous list.
    pub fn replace_arrivals(&mut self, arrivals: Vec<Arrival>) -> Vec<Arrival> {
        std::mem::replace(&mut self.arrivals, arrivals)
    }
}

impl PartialEq for Stop {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for Stop {}

impl Hash for Stop {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.number.hash(state);
    }
}

/// Identity-preserving store of every stop in a session, plus the user's selected stop.
#[derive(Debug, Default, Clone)]
pub struct StopRegistry {
    stops: FxHashMap<StopNo, Stop>,
    selected: Option<StopNo>,
}

impl StopRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stop with `number`, creating a placeholder (empty name,
    /// [`PLACEHOLDER_STOP_LOCATION`]) on first reference.
    pub fn get_or_create(&mut self, number: StopNo) -> &mut Stop {
        self.stops
            .entry(number)
            .or_insert_with(|| Stop::new(number, "", PLACEHOLDER_STOP_LOCATION))
    }

    /// Returns the stop with `number`, creating it with `name` and `location` on first
    /// reference. An existing stop is returned untouched; use the setters to update it.
    pub fn get_or_create_with(
        &mut self,
        number: StopNo,
        name: impl Into<String>,
        location: LatLon,
    ) -> &mut Stop {
        self.stops
            .entry(number)
            .or_insert_with(|| Stop::new(number, name, location))
    }

    pub fn get(&self, number: StopNo) -> Option<&Stop> {
        self.stops.get(&number)
    }

    pub fn get_mut(&mut self, number: StopNo) -> Option<&mut Stop> {
        self.stops.get_mut(&number)
    }

    pub fn contains(&self, number: StopNo) -> bool {
        self.stops.contains_key(&number)
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Every stop exactly once, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Stop> {
        self.stops.values_mut()
    }

    /// Drops every stop and the selection with them.
    pub(crate) fn clear(&mut self) {
        self.stops.clear();
        self.selected = None;
    }

    /// Selects a registered stop. An unknown stop leaves the current selection in place.
    pub fn select(&mut self, number: StopNo) -> Result<&Stop, SelectionError> {
        let stop = self
            .stops
            .get(&number)
            .ok_or(SelectionError::UnknownStop(number))?;
        self.selected = Some(number);
        Ok(stop)
    }

    pub fn selected(&self) -> Option<&Stop> {
        self.selected.and_then(|number| self.stops.get(&number))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The stop closest to `point` among those strictly closer than `radius_meters`.
    ///
    /// Equidistant candidates resolve to the lowest stop number.
    pub fn nearest_to(&self, point: LatLon, radius_meters: f64) -> Option<&Stop> {
        #[cfg(feature = "parallel")]
        let nearest = self
            .stops
            .par_iter()
            .map(|(_, stop)| (distance(point, stop.location), stop))
            .filter(|(meters, _)| *meters < radius_meters)
            .min_by(compare_candidates);

        #[cfg(not(feature = "parallel"))]
        let nearest = self
            .stops
            .values()
            .map(|stop| (distance(point, stop.location), stop))
            .filter(|(meters, _)| *meters < radius_meters)
            .min_by(compare_candidates);

        nearest.map(|(_, stop)| stop)
    }

    pub fn nearest_to_default(&self, point: LatLon) -> Option<&Stop> {
        self.nearest_to(point, DEFAULT_SEARCH_RADIUS_METERS)
    }
}

fn compare_candidates(a: &(f64, &Stop), b: &(f64, &Stop)) -> Ordering {
    a.0.total_cmp(&b.0)
        .then_with(|| a.1.number.cmp(&b.1.number))
}
