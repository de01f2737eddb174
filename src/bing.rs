//! Bing Maps HTTP adapter for travel-time matrices and route geometry.
//!
//! Wraps the Distance Matrix API (whole-minute `travelDuration` values,
//! POSTed origin/destination lists) behind [`TravelTimeProvider`], and the
//! Routes/Driving API for the per-leg path geometry used by visualization.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Waypoint;
use crate::path::RoutePath;
use crate::traits::{MatrixError, TravelTimeProvider};

#[derive(Debug, Clone)]
pub struct BingMapsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Zero the travel time of every arc back into the first waypoint (the
    /// depot), treating the return leg as free.
    pub free_return_to_depot: bool,
}

impl BingMapsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://dev.virtualearth.net".to_string(),
            api_key: api_key.into(),
            timeout_secs: 10,
            free_return_to_depot: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BingMapsClient {
    config: BingMapsConfig,
    client: reqwest::blocking::Client,
}

impl BingMapsClient {
    pub fn new(config: BingMapsConfig) -> Result<Self, MatrixError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Driving geometry for one leg between consecutive stops.
    pub fn route_path(
        &self,
        from: &Waypoint,
        to: &Waypoint,
        leg: usize,
    ) -> Result<RoutePath, MatrixError> {
        let url = format!("{}/REST/V1/Routes/Driving", self.config.base_url);
        let response: RouteResponse = self
            .client
            .get(url)
            .query(&[
                ("wp.0", format!("{},{}", from.lat, from.lon)),
                ("wp.1", format!("{},{}", to.lat, to.lon)),
                ("optmz", "distance".to_string()),
                ("ra", "RoutePath".to_string()),
                ("rpo", "Points".to_string()),
                ("key", self.config.api_key.clone()),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        let points = first_resource(response.resource_sets)
            .ok_or_else(|| MatrixError::MalformedResponse("no route resource".into()))?
            .route_path
            .line
            .coordinates;

        Ok(RoutePath::new(format!("trip {leg}"), points))
    }

    /// Geometry for every leg of an ordered stop sequence.
    pub fn route_geometry(&self, stops: &[Waypoint]) -> Result<Vec<RoutePath>, MatrixError> {
        let mut legs = Vec::new();
        for (i, pair) in stops.windows(2).enumerate() {
            legs.push(self.route_path(&pair[0], &pair[1], i + 1)?);
        }
        Ok(legs)
    }
}

impl TravelTimeProvider for BingMapsClient {
    fn time_matrix(&self, waypoints: &[Waypoint]) -> Result<Vec<Vec<i32>>, MatrixError> {
        if waypoints.is_empty() {
            return Ok(Vec::new());
        }

        let points: Vec<Point> = waypoints
            .iter()
            .map(|waypoint| Point {
                latitude: waypoint.lat,
                longitude: waypoint.lon,
            })
            .collect();
        let body = MatrixRequest {
            travel_mode: "driving",
            origins: points.clone(),
            destinations: points,
        };

        let url = format!(
            "{}/REST/v1/Routes/DistanceMatrix?key={}",
            self.config.base_url, self.config.api_key
        );
        debug!(waypoints = waypoints.len(), "requesting travel-time matrix");
        let response: MatrixResponse = self
            .client
            .post(url)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        let results = first_resource(response.resource_sets)
            .ok_or_else(|| MatrixError::MalformedResponse("no matrix resource".into()))?
            .results;

        let n = waypoints.len();
        let mut cells = vec![vec![None; n]; n];
        for cell in results {
            if cell.origin_index < n && cell.destination_index < n {
                cells[cell.origin_index][cell.destination_index] =
                    Some(cell.travel_duration as i32);
            }
        }

        let mut matrix = Vec::with_capacity(n);
        for (from, row) in cells.into_iter().enumerate() {
            let mut minutes = Vec::with_capacity(n);
            for (to, cell) in row.into_iter().enumerate() {
                match cell {
                    Some(value) => minutes.push(value),
                    None => return Err(MatrixError::IncompleteMatrix { from, to }),
                }
            }
            matrix.push(minutes);
        }

        if self.config.free_return_to_depot {
            for row in &mut matrix {
                row[0] = 0;
            }
        }

        Ok(matrix)
    }
}

fn first_resource<T>(sets: Vec<ResourceSet<T>>) -> Option<T> {
    sets.into_iter().next()?.resources.into_iter().next()
}

#[derive(Debug, Clone, Serialize)]
struct Point {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
struct MatrixRequest {
    #[serde(rename = "travelMode")]
    travel_mode: &'static str,
    origins: Vec<Point>,
    destinations: Vec<Point>,
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    #[serde(rename = "resourceSets", default)]
    resource_sets: Vec<ResourceSet<MatrixResource>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ResourceSet<T> {
    #[serde(default)]
    resources: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MatrixResource {
    #[serde(default)]
    results: Vec<MatrixCell>,
}

#[derive(Debug, Deserialize)]
struct MatrixCell {
    #[serde(rename = "originIndex")]
    origin_index: usize,
    #[serde(rename = "destinationIndex")]
    destination_index: usize,
    #[serde(rename = "travelDuration")]
    travel_duration: f64,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(rename = "resourceSets", default)]
    resource_sets: Vec<ResourceSet<RouteResource>>,
}

#[derive(Debug, Deserialize)]
struct RouteResource {
    #[serde(rename = "routePath")]
    route_path: RoutePathBody,
}

#[derive(Debug, Deserialize)]
struct RoutePathBody {
    line: Line,
}

#[derive(Debug, Deserialize)]
struct Line {
    coordinates: Vec<(f64, f64)>,
}
