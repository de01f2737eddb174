//! Waypoint intake: KML placemark coordinates and raw coordinate lists.
//!
//! The first point becomes the depot; the rest are numbered targets
//! (`tgt1`, `tgt2`, ...).

use std::error::Error;
use std::fmt;

use crate::model::Waypoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KmlError {
    MissingCoordinates,
    MalformedTuple(String),
}

impl fmt::Display for KmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KmlError::MissingCoordinates => {
                write!(f, "no <coordinates> block found in KML document")
            }
            KmlError::MalformedTuple(tuple) => {
                write!(f, "malformed coordinate tuple {tuple:?}")
            }
        }
    }
}

impl Error for KmlError {}

/// Parses the first `<coordinates>` block of a KML document into callsigned
/// waypoints.
///
/// KML tuples are `lon,lat[,alt]`, whitespace-separated; altitude is
/// ignored.
pub fn waypoints_from_kml(kml: &str) -> Result<Vec<Waypoint>, KmlError> {
    const OPEN: &str = "<coordinates>";
    const CLOSE: &str = "</coordinates>";

    let start = kml.find(OPEN).ok_or(KmlError::MissingCoordinates)? + OPEN.len();
    let end = kml[start..]
        .find(CLOSE)
        .ok_or(KmlError::MissingCoordinates)?
        + start;

    let mut points = Vec::new();
    for tuple in kml[start..end].split_whitespace() {
        let mut fields = tuple.split(',');
        let lon = parse_field(fields.next(), tuple)?;
        let lat = parse_field(fields.next(), tuple)?;
        points.push((lat, lon));
    }

    if points.is_empty() {
        return Err(KmlError::MissingCoordinates);
    }
    Ok(callsigned(points))
}

/// Builds callsigned waypoints from raw `(lat, lon)` pairs; the first pair
/// is the depot.
pub fn waypoints_from_pairs(pairs: &[(f64, f64)]) -> Vec<Waypoint> {
    callsigned(pairs.to_vec())
}

fn parse_field(field: Option<&str>, tuple: &str) -> Result<f64, KmlError> {
    field
        .and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| KmlError::MalformedTuple(tuple.to_string()))
}

fn callsigned(points: Vec<(f64, f64)>) -> Vec<Waypoint> {
    points
        .into_iter()
        .enumerate()
        .map(|(i, (lat, lon))| {
            let callsign = if i == 0 {
                "depot".to_string()
            } else {
                format!("tgt{i}")
            };
            Waypoint { callsign, lat, lon }
        })
        .collect()
}
