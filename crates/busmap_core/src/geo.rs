use busmap_model::LatLon;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters (haversine).
pub fn distance(a: LatLon, b: LatLon) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const UBC: LatLon = LatLon::new(49.2606, -123.2460);
    const DOWNTOWN: LatLon = LatLon::new(49.2827, -123.1207);

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance(UBC, UBC), 0.0);
        assert_eq!(distance(DOWNTOWN, DOWNTOWN), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(distance(UBC, DOWNTOWN), distance(DOWNTOWN, UBC));
    }

    #[test]
    fn matches_known_distance() {
        // UBC to downtown Vancouver is roughly 9.4 km.
        let meters = distance(UBC, DOWNTOWN);
        assert!((meters - 9_400.0).abs() < 150.0, "got {}", meters);
    }

    #[test]
    fn one_degree_of_latitude() {
        let meters = distance(LatLon::new(0.0, 0.0), LatLon::new(1.0, 0.0));
        let expected = EARTH_RADIUS_METERS * 1f64.to_radians();
        assert!((meters - expected).abs() < 1e-6);
    }

    #[test]
    fn grows_monotonically_along_a_bearing() {
        let mut previous = 0.0;
        for step in 1..=50 {
            let point = LatLon::new(
                UBC.latitude + step as f64 * 0.005,
                UBC.longitude + step as f64 * 0.005,
            );
            let meters = distance(UBC, point);
            assert!(meters > previous);
            previous = meters;
        }
    }
}
