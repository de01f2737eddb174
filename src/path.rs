//! Decoded route geometry for solved legs.
//!
//! A [`RoutePath`] holds one leg of driving geometry between consecutive
//! stops as decoded (latitude, longitude) points, labeled by leg for the
//! presentation layer. Encoding to a compact wire format is a boundary
//! concern and does not happen here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    leg: String,
    points: Vec<(f64, f64)>,
}

impl RoutePath {
    pub fn new(leg: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            leg: leg.into(),
            points,
        }
    }

    /// Leg label, e.g. `"trip 1"`.
    pub fn leg(&self) -> &str {
        &self.leg
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_accessors() {
        let points = vec![(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
        let path = RoutePath::new("trip 1", points.clone());
        assert_eq!(path.leg(), "trip 1");
        assert_eq!(path.points(), &points[..]);
    }

    #[test]
    fn into_points_returns_ownership() {
        let points = vec![(38.5, -120.2), (40.7, -120.95)];
        let path = RoutePath::new("trip 2", points.clone());
        assert_eq!(path.into_points(), points);
    }

    #[test]
    fn empty_path() {
        let path = RoutePath::new("trip 1", vec![]);
        assert!(path.points().is_empty());
    }

    #[test]
    fn equality_by_value() {
        let a = RoutePath::new("trip 1", vec![(1.0, 2.0)]);
        let b = RoutePath::new("trip 1", vec![(1.0, 2.0)]);
        let c = RoutePath::new("trip 2", vec![(1.0, 2.0)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
