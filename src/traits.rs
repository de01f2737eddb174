//! Collaborator seams for the planner.
//!
//! The solver itself only consumes a square travel-time matrix; where that
//! matrix comes from (a routing service, a great-circle estimate) is behind
//! [`TravelTimeProvider`]. Concrete adapters live in [`crate::bing`] and
//! [`crate::haversine`].

use std::error::Error;
use std::fmt;

use crate::model::Waypoint;

/// Provides a square whole-minute travel-time matrix for a waypoint list.
///
/// `matrix[i][j]` is the travel time from `waypoints[i]` to `waypoints[j]`.
/// Implementations must return one row per waypoint, in input order, with a
/// zero diagonal. Asymmetric times are allowed.
pub trait TravelTimeProvider {
    fn time_matrix(&self, waypoints: &[Waypoint]) -> Result<Vec<Vec<i32>>, MatrixError>;
}

/// Failure to acquire a travel-time matrix from a provider.
#[derive(Debug)]
pub enum MatrixError {
    Http(reqwest::Error),
    MalformedResponse(String),
    IncompleteMatrix { from: usize, to: usize },
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixError::Http(err) => write!(f, "matrix request failed: {err}"),
            MatrixError::MalformedResponse(detail) => {
                write!(f, "malformed matrix response: {detail}")
            }
            MatrixError::IncompleteMatrix { from, to } => {
                write!(f, "matrix response missing entry from {from} to {to}")
            }
        }
    }
}

impl Error for MatrixError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MatrixError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MatrixError {
    fn from(err: reqwest::Error) -> Self {
        MatrixError::Http(err)
    }
}
