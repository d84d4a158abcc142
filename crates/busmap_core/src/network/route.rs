use busmap_model::{LatLon, RouteNo, StopNo};
use rustc_hash::FxHashMap;

/// One variant path of a route. Equality is `(route, name)`.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    route: RouteNo,
    name: String,
    destination: String,
    direction: String,
    path: Vec<LatLon>,
}

impl RoutePattern {
    fn new(route: RouteNo, name: &str) -> Self {
        Self {
            route,
            name: name.to_string(),
            destination: String::new(),
            direction: String::new(),
            path: Vec::new(),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.destination = destination.into();
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }

    pub fn set_direction(&mut self, direction: impl Into<String>) {
        self.direction = direction.into();
    }

    pub fn path(&self) -> &[LatLon] {
        &self.path
    }

    /// Replaces the whole path; an empty path is allowed.
    pub fn set_path(&mut self, path: Vec<LatLon>) {
        self.path = path;
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.route == other.route && self.name == other.name
    }
}

impl Eq for RoutePattern {}

/// A bus route. Identity and equality are the route number alone.
#[derive(Debug, Clone)]
pub struct Route {
    number: RouteNo,
    name: String,
    pub(super) stops: Vec<StopNo>,
    patterns: Vec<RoutePattern>,
}

impl Route {
    fn new(number: RouteNo, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            stops: Vec::new(),
            patterns: Vec::new(),
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Stops on this route in link order. Mutated only through `TransitNetwork::link`/`unlink`.
    pub fn stops(&self) -> &[StopNo] {
        &self.stops
    }

    pub fn has_stop(&self, stop: StopNo) -> bool {
        self.stops.contains(&stop)
    }

    pub fn patterns(&self) -> &[RoutePattern] {
        &self.patterns
    }

    pub fn find_pattern(&self, name: &str) -> Option<&RoutePattern> {
        self.patterns.iter().find(|pattern| pattern.name == name)
    }

    /// Returns the pattern named `name`, creating an empty one if absent.
    pub fn pattern(&mut self, name: &str) -> &mut RoutePattern {
        let index = match self.patterns.iter().position(|pattern| pattern.name == name) {
            Some(index) => index,
            None => {
                self.patterns
                    .push(RoutePattern::new(self.number.clone(), name));
                self.patterns.len() - 1
            }
        };
        &mut self.patterns[index]
    }

    /// Get-or-create by name, then overwrite destination and direction.
    pub fn pattern_with(
        &mut self,
        name: &str,
        destination: impl Into<String>,
        direction: impl Into<String>,
    ) -> &mut RoutePattern {
        let pattern = self.pattern(name);
        pattern.set_destination(destination);
        pattern.set_direction(direction);
        pattern
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for Route {}

#[derive(Debug, Default, Clone)]
pub struct RouteRegistry {
    routes: FxHashMap<RouteNo, Route>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the route with `number`, creating it with an empty name on first reference.
    pub fn get_or_create(&mut self, number: &str) -> &mut Route {
        self.routes
            .entry(RouteNo::from(number))
            .or_insert_with_key(|key| Route::new(key.clone(), ""))
    }

    /// Returns the route with `number`, creating it with `name` on first reference.
    /// An existing route keeps its name.
    pub fn get_or_create_with_name(&mut self, number: &str, name: impl Into<String>) -> &mut Route {
        self.routes
            .entry(RouteNo::from(number))
            .or_insert_with_key(|key| Route::new(key.clone(), name))
    }

    pub fn get(&self, number: &str) -> Option<&Route> {
        self.routes.get(number)
    }

    pub fn get_mut(&mut self, number: &str) -> Option<&mut Route> {
        self.routes.get_mut(number)
    }

    pub fn contains(&self, number: &str) -> bool {
        self.routes.contains_key(number)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Route> {
        self.routes.values_mut()
    }

    pub(crate) fn clear(&mut self) {
        self.routes.clear();
    }

    pub fn pattern_count(&self) -> usize {
        self.routes.values().map(|route| route.patterns.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_preserves_identity() {
        let mut registry = RouteRegistry::new();
        registry.get_or_create_with_name("099", "COMMERCIAL-BROADWAY/UBC (B-LINE)");
        let route = registry.get_or_create_with_name("099", "ignored");
        assert_eq!(route.name(), "COMMERCIAL-BROADWAY/UBC (B-LINE)");
        assert_eq!(registry.len(), 1);

        registry.get_or_create("099").set_name("renamed");
        assert_eq!(registry.get("099").map(Route::name), Some("renamed"));
    }

    #[test]
    fn route_numbers_are_opaque_text() {
        let mut registry = RouteRegistry::new();
        registry.get_or_create("099");
        registry.get_or_create("99");
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("099"));
        assert!(!registry.contains("N19"));
    }

    #[test]
    fn pattern_lookup_creates_once() {
        let mut route = Route::new(RouteNo::from("043"), "");
        route.pattern_with("EB1", "JOYCE STN", "EAST");
        route.pattern("EB1").set_path(vec![LatLon::new(49.2, -123.1)]);
        route.pattern("WB1");

        assert_eq!(route.patterns().len(), 2);
        let eastbound = route.find_pattern("EB1").unwrap();
        assert_eq!(eastbound.route(), "043");
        assert_eq!(eastbound.destination(), "JOYCE STN");
        assert_eq!(eastbound.direction(), "EAST");
        assert_eq!(eastbound.path(), &[LatLon::new(49.2, -123.1)]);
        assert!(route.find_pattern("missing").is_none());
    }

    #[test]
    fn pattern_with_overwrites_metadata_and_keeps_path() {
        let mut route = Route::new(RouteNo::from("043"), "");
        route
            .pattern("EB1")
            .set_path(vec![LatLon::new(49.2, -123.1), LatLon::new(49.3, -123.2)]);
        route.pattern_with("EB1", "JOYCE STN", "EAST");

        let pattern = route.find_pattern("EB1").unwrap();
        assert_eq!(pattern.destination(), "JOYCE STN");
        assert_eq!(pattern.path().len(), 2);
    }

    #[test]
    fn pattern_with_overwrites_on_every_call() {
        let mut route = Route::new(RouteNo::from("043"), "");
        route.pattern_with("EB1", "JOYCE STN", "EAST");
        route.pattern_with("EB1", "UBC", "WEST");
        route.pattern("EB1");

        assert_eq!(route.patterns().len(), 1);
        let pattern = route.find_pattern("EB1").unwrap();
        assert_eq!(pattern.destination(), "UBC");
        assert_eq!(pattern.direction(), "WEST");
    }

    #[test]
    fn pattern_equality_is_route_and_name() {
        let mut first = Route::new(RouteNo::from("043"), "");
        let mut second = Route::new(RouteNo::from("043"), "");
        first.pattern_with("EB1", "JOYCE STN", "EAST");
        second.pattern_with("EB1", "SOMEWHERE", "WEST");
        assert_eq!(first.patterns()[0], second.patterns()[0]);

        let mut other_route = Route::new(RouteNo::from("044"), "");
        other_route.pattern("EB1");
        assert_ne!(first.patterns()[0], other_route.patterns()[0]);
    }
}
