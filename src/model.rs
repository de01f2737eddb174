//! Problem data model and input validation.
//!
//! A [`RoutingProblem`] is the caller-facing request: a square travel-time
//! matrix, one time window per non-depot location, and a callsign per
//! location. Validation happens before any model construction; the solver
//! then works on an owned [`ProblemState`] that shrinks as locations are
//! pruned.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive cumulative-time range (whole minutes) in which a visit is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub earliest: i32,
    pub latest: i32,
}

impl TimeWindow {
    pub fn new(earliest: i32, latest: i32) -> Self {
        Self { earliest, latest }
    }

    pub fn contains(&self, time: i32) -> bool {
        self.earliest <= time && time <= self.latest
    }
}

/// A named location: callsign plus WGS84 coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub callsign: String,
    pub lat: f64,
    pub lon: f64,
}

impl Waypoint {
    pub fn new(callsign: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            callsign: callsign.into(),
            lat,
            lon,
        }
    }
}

/// Malformed routing input, rejected before model construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    NonSquareMatrix { row: usize, len: usize, expected: usize },
    CallsignCountMismatch { matrix: usize, callsigns: usize },
    WindowCountMismatch { expected: usize, actual: usize },
    NegativeTravelTime { from: usize, to: usize, value: i32 },
    NonZeroDiagonal { index: usize, value: i32 },
    InvertedWindow { index: usize, earliest: i32, latest: i32 },
    DepotOutOfRange { depot: usize, locations: usize },
    DuplicateCallsign(String),
    NoVehicles,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NonSquareMatrix { row, len, expected } => {
                write!(f, "matrix row {row} has {len} entries, expected {expected}")
            }
            InputError::CallsignCountMismatch { matrix, callsigns } => {
                write!(f, "matrix is {matrix}x{matrix} but {callsigns} callsigns were given")
            }
            InputError::WindowCountMismatch { expected, actual } => {
                write!(f, "expected {expected} time windows (one per non-depot location), got {actual}")
            }
            InputError::NegativeTravelTime { from, to, value } => {
                write!(f, "negative travel time {value} from location {from} to {to}")
            }
            InputError::NonZeroDiagonal { index, value } => {
                write!(f, "matrix diagonal at {index} is {value}, expected 0")
            }
            InputError::InvertedWindow { index, earliest, latest } => {
                write!(f, "window for location {index} has earliest {earliest} after latest {latest}")
            }
            InputError::DepotOutOfRange { depot, locations } => {
                write!(f, "depot index {depot} out of range for {locations} locations")
            }
            InputError::DuplicateCallsign(callsign) => {
                write!(f, "duplicate callsign {callsign:?}")
            }
            InputError::NoVehicles => write!(f, "num_vehicles must be at least 1"),
        }
    }
}

impl Error for InputError {}

/// A routing request: visit every location from the depot and return, within
/// each location's time window.
///
/// `time_windows` carries one window per non-depot location, in location
/// order with the depot skipped. The depot's own window (bounding the
/// vehicle's start and end cumulative time) defaults to `[0, horizon]`
/// unless `depot_window` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingProblem {
    pub time_matrix: Vec<Vec<i32>>,
    pub time_windows: Vec<TimeWindow>,
    pub callsigns: Vec<String>,
    pub num_vehicles: usize,
    pub depot: usize,
    pub depot_window: Option<TimeWindow>,
}

impl RoutingProblem {
    /// Single-vehicle problem with the depot at index 0.
    pub fn new(
        time_matrix: Vec<Vec<i32>>,
        time_windows: Vec<TimeWindow>,
        callsigns: Vec<String>,
    ) -> Self {
        Self {
            time_matrix,
            time_windows,
            callsigns,
            num_vehicles: 1,
            depot: 0,
            depot_window: None,
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        let n = self.time_matrix.len();

        if self.num_vehicles == 0 {
            return Err(InputError::NoVehicles);
        }
        if self.callsigns.len() != n {
            return Err(InputError::CallsignCountMismatch {
                matrix: n,
                callsigns: self.callsigns.len(),
            });
        }
        if self.depot >= n {
            return Err(InputError::DepotOutOfRange {
                depot: self.depot,
                locations: n,
            });
        }
        if self.time_windows.len() != n - 1 {
            return Err(InputError::WindowCountMismatch {
                expected: n - 1,
                actual: self.time_windows.len(),
            });
        }

        for (i, row) in self.time_matrix.iter().enumerate() {
            if row.len() != n {
                return Err(InputError::NonSquareMatrix {
                    row: i,
                    len: row.len(),
                    expected: n,
                });
            }
            for (j, &value) in row.iter().enumerate() {
                if value < 0 {
                    return Err(InputError::NegativeTravelTime { from: i, to: j, value });
                }
            }
            if row[i] != 0 {
                return Err(InputError::NonZeroDiagonal { index: i, value: row[i] });
            }
        }

        for (i, window) in self.time_windows.iter().enumerate() {
            if window.earliest > window.latest {
                return Err(InputError::InvertedWindow {
                    index: i,
                    earliest: window.earliest,
                    latest: window.latest,
                });
            }
        }
        if let Some(window) = self.depot_window {
            if window.earliest > window.latest {
                return Err(InputError::InvertedWindow {
                    index: self.depot,
                    earliest: window.earliest,
                    latest: window.latest,
                });
            }
        }

        for (i, callsign) in self.callsigns.iter().enumerate() {
            if self.callsigns[..i].contains(callsign) {
                return Err(InputError::DuplicateCallsign(callsign.clone()));
            }
        }

        Ok(())
    }
}

/// The owned working set for one solve attempt chain.
///
/// Windows are stored per location index with the depot's window in place,
/// so pruning a location removes one parallel entry from each field. Each
/// pruning pass shrinks the state by exactly one location.
#[derive(Debug, Clone)]
pub(crate) struct ProblemState {
    pub callsigns: Vec<String>,
    pub matrix: Vec<Vec<i32>>,
    pub windows: Vec<TimeWindow>,
    pub depot: usize,
}

impl ProblemState {
    /// Builds the initial state from a validated problem. The depot window
    /// defaults to `[0, horizon]` when the caller supplied none.
    pub fn from_problem(problem: &RoutingProblem, horizon: i32) -> Self {
        let depot_window = problem
            .depot_window
            .unwrap_or_else(|| TimeWindow::new(0, horizon));

        let mut windows = Vec::with_capacity(problem.callsigns.len());
        let mut targets = problem.time_windows.iter();
        for index in 0..problem.callsigns.len() {
            if index == problem.depot {
                windows.push(depot_window);
            } else {
                // validate() guarantees one window per non-depot location
                windows.push(targets.next().copied().unwrap_or(depot_window));
            }
        }

        Self {
            callsigns: problem.callsigns.clone(),
            matrix: problem.time_matrix.clone(),
            windows,
            depot: problem.depot,
        }
    }

    /// Number of active locations, depot included.
    pub fn len(&self) -> usize {
        self.callsigns.len()
    }

    /// Removes a location's matrix row and column, window, and callsign,
    /// returning the callsign. The caller never removes the depot.
    pub fn remove(&mut self, index: usize) -> String {
        self.matrix.remove(index);
        for row in &mut self.matrix {
            row.remove(index);
        }
        self.windows.remove(index);
        if index < self.depot {
            self.depot -= 1;
        }
        self.callsigns.remove(index)
    }
}
