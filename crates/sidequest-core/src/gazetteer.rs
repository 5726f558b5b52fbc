//! Static points-of-interest gazetteer with a great-circle distance filter.
//!
//! Purely functional collaborator: given a position and a radius it returns
//! the fixed POIs inside that radius. No mutation, no I/O. The seed data is
//! the San Francisco landmark set the overlay demo ships with.

use sidequest_types::Poi;

/// Earth's mean radius in kilometers, used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Seed table of San Francisco landmarks, coffee shops, parks, and venues.
const SF_POIS: &[(f64, f64, &str)] = &[
    // Major landmarks
    (37.8199, -122.4783, "Golden Gate Bridge"),
    (37.8080, -122.4177, "Alcatraz Island"),
    (37.7749, -122.4194, "San Francisco City Hall"),
    (37.8024, -122.4058, "Coit Tower"),
    (37.7955, -122.4058, "Pier 39"),
    (37.8030, -122.4187, "Lombard Street"),
    (37.7694, -122.4862, "Golden Gate Park"),
    (37.7790, -122.5190, "Ocean Beach"),
    (37.7648, -122.4201, "Mission Dolores"),
    (37.8025, -122.4186, "Fisherman's Wharf"),
    // Coffee shops
    (37.7955, -122.3937, "Blue Bottle Coffee - Ferry Building"),
    (37.7870, -122.4070, "Philz Coffee - Mission"),
    (37.7991, -122.4075, "Sightglass Coffee"),
    (37.7749, -122.4312, "Ritual Coffee Roasters"),
    (37.7847, -122.4072, "Four Barrel Coffee"),
    (37.7956, -122.4077, "Contraband Coffee Bar"),
    (37.7614, -122.4221, "Andytown Coffee Roasters"),
    (37.7683, -122.4278, "Flywheel Coffee Roasters"),
    // Parks and recreation
    (37.7694, -122.4862, "Japanese Tea Garden"),
    (37.7691, -122.4833, "California Academy of Sciences"),
    (37.7715, -122.4696, "de Young Museum"),
    (37.8007, -122.4467, "Palace of Fine Arts"),
    // Shopping and culture
    (37.7879, -122.4074, "Ferry Building Marketplace"),
    (37.7883, -122.4076, "Embarcadero Center"),
    (37.7879, -122.4101, "Union Square"),
    (37.7986, -122.4099, "Chinatown Gate"),
    (37.8013, -122.4058, "North Beach"),
    // Stadiums and arenas
    (37.7767, -122.3908, "Oracle Park"),
    (37.7858, -122.3970, "Chase Center"),
];

/// Great-circle distance between two coordinates in kilometers.
///
/// Standard haversine formula. Inputs are decimal degrees; no validation is
/// performed, matching the permissive external contract.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();
    let a = sin_dlat.mul_add(
        sin_dlat,
        lat1.to_radians().cos() * lat2.to_radians().cos() * sin_dlon * sin_dlon,
    );
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// The fixed points-of-interest table.
///
/// Holds the seed POI set and answers radius queries. Cheap to clone and
/// free of interior mutability, so the store can own one outright.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    _private: (),
}

impl Gazetteer {
    /// Create a gazetteer over the built-in San Francisco table.
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// All POIs within `radius_km` of the given position, in table order.
    ///
    /// Zero results is a normal outcome, not an error.
    pub fn nearby(&self, lat: f64, lon: f64, radius_km: f64) -> Vec<Poi> {
        SF_POIS
            .iter()
            .filter(|(poi_lat, poi_lon, _)| {
                haversine_km(lat, lon, *poi_lat, *poi_lon) <= radius_km
            })
            .map(|&(poi_lat, poi_lon, label)| Poi {
                lat: poi_lat,
                lon: poi_lon,
                label: label.to_owned(),
            })
            .collect()
    }

    /// The complete POI table.
    pub fn all(&self) -> Vec<Poi> {
        SF_POIS
            .iter()
            .map(|&(lat, lon, label)| Poi {
                lat,
                lon,
                label: label.to_owned(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_known_distance() {
        // City Hall to Coit Tower is roughly 3.3 km.
        let d = haversine_km(37.7749, -122.4194, 37.8024, -122.4058);
        assert!(d > 3.0 && d < 3.6, "unexpected distance {d}");
    }

    #[test]
    fn haversine_zero_for_identical_points() {
        let d = haversine_km(37.7749, -122.4194, 37.7749, -122.4194);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn nearby_filters_by_radius() {
        let gazetteer = Gazetteer::new();
        let near = gazetteer.nearby(37.7749, -122.4194, 1.5);

        // City Hall itself is in the table at distance zero.
        assert!(near.iter().any(|p| p.label == "San Francisco City Hall"));
        // The Golden Gate Bridge is ~7 km away and must be filtered out.
        assert!(!near.iter().any(|p| p.label == "Golden Gate Bridge"));
        assert!(near.len() < gazetteer.all().len());
    }

    #[test]
    fn nearby_far_from_everything_is_empty() {
        let gazetteer = Gazetteer::new();
        // Middle of the Pacific.
        let near = gazetteer.nearby(0.0, -150.0, 1.5);
        assert!(near.is_empty());
    }

    #[test]
    fn nearby_preserves_table_order() {
        let gazetteer = Gazetteer::new();
        let near = gazetteer.nearby(37.7749, -122.4194, 50.0);
        let all = gazetteer.all();
        assert_eq!(near, all);
    }
}
