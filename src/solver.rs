//! VRPTW solver: routing model construction, cheapest-arc first-solution
//! search, infeasibility pruning, and schedule extraction.
//!
//! The solve path is all-integer and synchronous. A single cumulative time
//! dimension accumulates travel along each route; every non-depot location
//! bounds the dimension with its window, and the depot's window bounds each
//! vehicle's start and end arrival. When the search finds no assignment, the
//! location farthest from the depot is dropped and the attempt repeats on
//! the smaller problem.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::{InputError, ProblemState, RoutingProblem, TimeWindow};

/// Default waiting allowance at a stop, minutes.
pub const DEFAULT_SLACK_MAX: i32 = 240;
/// Default maximum cumulative route time, minutes.
pub const DEFAULT_HORIZON: i32 = 240;

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Maximum waiting time at any stop (minutes).
    pub slack_max: i32,
    /// Maximum cumulative time reachable on a route (minutes).
    pub horizon: i32,
    /// Search-node expansion budget per solve attempt. Exhausting it counts
    /// as "no assignment found".
    pub max_expansions: usize,
    /// Cap on pruning iterations. `None` allows one per active location.
    pub max_prune_iterations: Option<usize>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            slack_max: DEFAULT_SLACK_MAX,
            horizon: DEFAULT_HORIZON,
            max_expansions: 200_000,
            max_prune_iterations: None,
        }
    }
}

/// One vehicle's solved tour: callsigns with parallel cumulative arrival
/// minutes, depot first and last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRoute {
    pub callsigns: Vec<String>,
    pub timestamps: Vec<i32>,
    /// Arrival time back at the depot.
    pub duration: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub routes: Vec<VehicleRoute>,
    /// Callsigns pruned to restore feasibility, in removal order.
    pub dropped: Vec<String>,
    /// Sum of vehicle end arrivals, for diagnostics.
    pub total_time: i32,
}

/// Outcome of a solve: a complete plan, or a definitive "no solution" once
/// pruning has degenerated the problem to the depot alone. Never a partial
/// route.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerOutcome {
    Planned(RoutePlan),
    NoSolution,
}

/// Solves the routing problem: validate, then build/search until a feasible
/// plan is found, pruning the farthest location after each infeasible
/// attempt.
pub fn solve(problem: &RoutingProblem, options: SolveOptions) -> Result<PlannerOutcome, InputError> {
    problem.validate()?;

    let mut state = ProblemState::from_problem(problem, options.horizon);
    let prune_cap = options.max_prune_iterations.unwrap_or(state.len());
    let mut dropped: Vec<String> = Vec::new();

    loop {
        // A state holding only the depot has nothing left to route; fall
        // through to the terminal farthest-node check.
        if state.len() > 1 {
            let model = RoutingModel::build(&state, problem.num_vehicles, &options);
            let mut engine = SearchEngine::new(&model, options.max_expansions);
            if let Some(orders) = engine.run() {
                if let Some(plan) = extract_plan(&model, &orders, &dropped) {
                    info!(
                        stops = state.len() - 1,
                        dropped = dropped.len(),
                        total_time = plan.total_time,
                        "route found"
                    );
                    return Ok(PlannerOutcome::Planned(plan));
                }
            }
        }

        let farthest = farthest_from_depot(&state);
        if farthest == state.depot {
            info!("no solution: problem reduced to the depot alone");
            return Ok(PlannerOutcome::NoSolution);
        }
        if dropped.len() >= prune_cap {
            warn!(cap = prune_cap, "pruning cap reached without a feasible route");
            return Ok(PlannerOutcome::NoSolution);
        }

        let callsign = state.remove(farthest);
        info!(callsign = %callsign, "dropped farthest location after infeasible attempt");
        dropped.push(callsign);
    }
}

/// Cumulative time dimension: slack, horizon, and per-node window bounds.
#[derive(Debug, Clone)]
struct TimeDimension {
    slack_max: i32,
    horizon: i32,
    windows: Vec<TimeWindow>,
}

impl TimeDimension {
    /// Feasible cumul range at `node` in isolation.
    fn bounds(&self, node: usize) -> (i32, i32) {
        let window = self.windows[node];
        (window.earliest, window.latest.min(self.horizon))
    }

    /// Folds a cumul interval across an arc into `node`: travel, then up to
    /// `slack_max` waiting, clipped to the node's bounds. `None` means the
    /// arc cannot be taken.
    fn propagate(&self, (lo, hi): (i32, i32), travel: i32, node: usize) -> Option<(i32, i32)> {
        let (earliest, latest) = self.bounds(node);
        let lo = (lo + travel).max(earliest);
        let hi = (hi + travel + self.slack_max).min(latest);
        (lo <= hi).then_some((lo, hi))
    }
}

/// Search-ready routing graph over the active location set: arc costs read
/// from the matrix, time dimension attached with each location's window and
/// the depot's window on every vehicle's start and end.
struct RoutingModel<'a> {
    state: &'a ProblemState,
    dimension: TimeDimension,
    num_vehicles: usize,
}

impl<'a> RoutingModel<'a> {
    fn build(state: &'a ProblemState, num_vehicles: usize, options: &SolveOptions) -> Self {
        // state.windows carries the depot window at the depot index, which
        // doubles as the start/end bound for every vehicle
        let dimension = TimeDimension {
            slack_max: options.slack_max,
            horizon: options.horizon,
            windows: state.windows.clone(),
        };
        debug!(locations = state.len(), num_vehicles, "routing model built");
        Self {
            state,
            dimension,
            num_vehicles,
        }
    }

    fn arc_cost(&self, from: usize, to: usize) -> i32 {
        self.state.matrix[from][to]
    }

    fn depot(&self) -> usize {
        self.state.depot
    }

    /// Cumul bounds at a vehicle start. `None` when the depot window is
    /// empty under the horizon.
    fn start_bounds(&self) -> Option<(i32, i32)> {
        let (earliest, latest) = self.dimension.bounds(self.depot());
        (earliest <= latest).then_some((earliest, latest))
    }
}

/// Deterministic cheapest-arc first-solution search.
///
/// Depth-first route construction: from the current stop, unvisited
/// locations are tried in ascending arc-cost order (ties to the lower
/// index) with the time dimension propagated along the way, and dead ends
/// backtrack. A route closes back to the depot only once its extension
/// candidates are exhausted. Every active location is mandatory. No
/// local-search improvement pass runs on the first solution.
struct SearchEngine<'a, 'b> {
    model: &'b RoutingModel<'a>,
    expansions: usize,
    budget: usize,
    exhausted: bool,
}

impl<'a, 'b> SearchEngine<'a, 'b> {
    fn new(model: &'b RoutingModel<'a>, budget: usize) -> Self {
        Self {
            model,
            expansions: 0,
            budget,
            exhausted: false,
        }
    }

    /// Runs the search, returning per-vehicle visit orders (non-depot
    /// locations only) or `None` when no complete assignment exists.
    fn run(&mut self) -> Option<Vec<Vec<usize>>> {
        let mut visited = vec![false; self.model.state.len()];
        visited[self.model.depot()] = true;
        let mut routes = Vec::with_capacity(self.model.num_vehicles);

        if self.place_vehicle(0, &mut visited, &mut routes) {
            return Some(routes);
        }
        if self.exhausted {
            warn!(budget = self.budget, "search expansion budget exhausted");
        }
        None
    }

    fn place_vehicle(
        &mut self,
        vehicle: usize,
        visited: &mut [bool],
        routes: &mut Vec<Vec<usize>>,
    ) -> bool {
        let Some(bounds) = self.model.start_bounds() else {
            return false;
        };
        let mut route = Vec::new();
        self.extend(vehicle, self.model.depot(), bounds, visited, &mut route, routes)
    }

    fn extend(
        &mut self,
        vehicle: usize,
        current: usize,
        bounds: (i32, i32),
        visited: &mut [bool],
        route: &mut Vec<usize>,
        routes: &mut Vec<Vec<usize>>,
    ) -> bool {
        if self.expansions >= self.budget {
            self.exhausted = true;
            return false;
        }
        self.expansions += 1;

        let mut candidates: Vec<usize> =
            (0..visited.len()).filter(|&node| !visited[node]).collect();
        candidates.sort_by_key(|&node| (self.model.arc_cost(current, node), node));

        for node in candidates {
            let travel = self.model.arc_cost(current, node);
            let Some(next_bounds) = self.model.dimension.propagate(bounds, travel, node) else {
                continue;
            };
            visited[node] = true;
            route.push(node);
            if self.extend(vehicle, node, next_bounds, visited, route, routes) {
                return true;
            }
            route.pop();
            visited[node] = false;
        }

        // Extensions exhausted; try closing the route back to the depot.
        let depot = self.model.depot();
        let return_travel = self.model.arc_cost(current, depot);
        if self.model.dimension.propagate(bounds, return_travel, depot).is_none() {
            return false;
        }

        if visited.iter().all(|&seen| seen) {
            routes.push(route.clone());
            // remaining vehicles stay at the depot
            while routes.len() < self.model.num_vehicles {
                routes.push(Vec::new());
            }
            return true;
        }
        if vehicle + 1 < self.model.num_vehicles {
            routes.push(route.clone());
            if self.place_vehicle(vehicle + 1, visited, routes) {
                return true;
            }
            routes.pop();
        }
        false
    }
}

/// Minimal feasible schedule for one vehicle's visit order.
///
/// Forward pass folds cumul intervals node by node; the backward pass pins
/// the end arrival to its minimum, then minimizes every earlier cumul (the
/// unpinned start included) against the waiting allowance.
fn schedule(model: &RoutingModel<'_>, order: &[usize]) -> Option<Vec<i32>> {
    let depot = model.depot();
    let mut nodes = Vec::with_capacity(order.len() + 2);
    nodes.push(depot);
    nodes.extend_from_slice(order);
    nodes.push(depot);

    let mut bounds = Vec::with_capacity(nodes.len());
    bounds.push(model.start_bounds()?);
    for pair in nodes.windows(2) {
        let prev = *bounds.last()?;
        let travel = model.arc_cost(pair[0], pair[1]);
        bounds.push(model.dimension.propagate(prev, travel, pair[1])?);
    }

    let mut times = vec![0; nodes.len()];
    let last = nodes.len() - 1;
    times[last] = bounds[last].0;
    for i in (0..last).rev() {
        let travel = model.arc_cost(nodes[i], nodes[i + 1]);
        times[i] = bounds[i].0.max(times[i + 1] - travel - model.dimension.slack_max);
    }
    Some(times)
}

/// Walks the solved visit orders into a [`RoutePlan`], reading the scheduled
/// cumulative time at each stop.
fn extract_plan(
    model: &RoutingModel<'_>,
    orders: &[Vec<usize>],
    dropped: &[String],
) -> Option<RoutePlan> {
    let depot_callsign = &model.state.callsigns[model.depot()];
    let mut routes = Vec::with_capacity(orders.len());
    let mut total_time = 0;

    for order in orders {
        let timestamps = schedule(model, order)?;
        let mut callsigns = Vec::with_capacity(order.len() + 2);
        callsigns.push(depot_callsign.clone());
        for &node in order {
            callsigns.push(model.state.callsigns[node].clone());
        }
        callsigns.push(depot_callsign.clone());

        let duration = *timestamps.last()?;
        total_time += duration;
        routes.push(VehicleRoute {
            callsigns,
            timestamps,
            duration,
        });
    }

    Some(RoutePlan {
        routes,
        dropped: dropped.to_vec(),
        total_time,
    })
}

/// Index of the maximum entry in the depot's matrix row, ties broken by the
/// first occurrence in index order. Dropping the single most expensive
/// location is a heuristic relaxation, not an optimality guarantee.
fn farthest_from_depot(state: &ProblemState) -> usize {
    let row = &state.matrix[state.depot];
    let mut farthest = 0;
    for (node, &travel) in row.iter().enumerate().skip(1) {
        if travel > row[farthest] {
            farthest = node;
        }
    }
    farthest
}
