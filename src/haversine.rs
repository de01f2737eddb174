//! Haversine travel-time provider (fallback when no routing service is
//! reachable).
//!
//! Estimates whole-minute travel times from great-circle distance at an
//! assumed average speed. Ignores the road network.

use rayon::prelude::*;

use crate::model::Waypoint;
use crate::traits::{MatrixError, TravelTimeProvider};

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based travel-time provider.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Great-circle distance between two (lat, lon) points in kilometers.
    fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
        let (lat1, lon1) = from;
        let (lat2, lon2) = to;

        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lon = (lon2 - lon1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    /// Convert distance in km to travel time in whole minutes.
    fn km_to_minutes(&self, km: f64) -> i32 {
        (km / self.speed_kmh * 60.0).round() as i32
    }
}

impl TravelTimeProvider for HaversineMatrix {
    fn time_matrix(&self, waypoints: &[Waypoint]) -> Result<Vec<Vec<i32>>, MatrixError> {
        let coords: Vec<(f64, f64)> = waypoints
            .iter()
            .map(|waypoint| (waypoint.lat, waypoint.lon))
            .collect();

        let matrix = coords
            .par_iter()
            .enumerate()
            .map(|(i, &from)| {
                coords
                    .iter()
                    .enumerate()
                    .map(|(j, &to)| {
                        if i == j {
                            0
                        } else {
                            self.km_to_minutes(Self::haversine_km(from, to))
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(matrix)
    }
}
